use serde::Serialize;
use sqlx::FromRow;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use crate::db::Db;
use crate::error::ApiError;

/// Purchase record. Created only by [`make_purchase`], immutable and
/// never deleted afterwards. JSON uses the `userId`/`productId` wire
/// names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Purchase {
    pub id: i32,
    #[serde(rename = "userId")]
    pub user_id: i32,
    #[serde(rename = "productId")]
    pub product_id: i32,
    pub quantity: i32,
    pub timestamp: String,
}

/// Stored timestamp format, second precision.
const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

fn purchase_timestamp(now: OffsetDateTime) -> Result<String, ApiError> {
    now.format(&TIMESTAMP_FORMAT)
        .map_err(|e| ApiError::Internal(e.into()))
}

/// The purchase transaction. One unit of work covers both writes: the
/// conditional stock decrement and the purchase insert commit together
/// or not at all.
///
/// The decrement is a single conditional UPDATE, so two concurrent
/// purchases of the same product serialize on the row; whichever loses
/// the race re-checks against the committed stock and gets the
/// insufficient-stock error instead of overselling.
pub async fn make_purchase(
    db: &Db,
    user_id: i32,
    product_id: i32,
    quantity: i32,
) -> Result<(), ApiError> {
    let timestamp = purchase_timestamp(OffsetDateTime::now_utc())?;

    db.with_timeout(async {
        let mut tx = db.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity - $1
            WHERE id = $2 AND quantity >= $1
            "#,
        )
        .bind(quantity)
        .bind(product_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            // Nothing was decremented; tell an absent product apart
            // from one that is merely out of stock.
            let stock =
                sqlx::query_scalar::<_, i32>(r#"SELECT quantity FROM products WHERE id = $1"#)
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match stock {
                Some(_) => ApiError::InsufficientStock,
                None => ApiError::NotFound("product"),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO purchases (user_id, product_id, quantity, timestamp)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(&timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    })
    .await
}

pub async fn list_by_user(db: &Db, user_id: i32) -> Result<Vec<Purchase>, ApiError> {
    db.with_timeout(
        sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, user_id, product_id, quantity, timestamp
            FROM purchases
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(db.pool()),
    )
    .await
}

pub async fn list_by_product(db: &Db, product_id: i32) -> Result<Vec<Purchase>, ApiError> {
    db.with_timeout(
        sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, user_id, product_id, quantity, timestamp
            FROM purchases
            WHERE product_id = $1
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .fetch_all(db.pool()),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn timestamp_has_second_precision() {
        let formatted = purchase_timestamp(datetime!(2024-01-02 03:04:05.678 UTC)).unwrap();
        assert_eq!(formatted, "2024-01-02 03:04:05");
    }

    #[test]
    fn purchase_wire_names() {
        let purchase = Purchase {
            id: 1,
            user_id: 42,
            product_id: 3,
            quantity: 2,
            timestamp: "2024-01-02 03:04:05".into(),
        };
        let json = serde_json::to_value(&purchase).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "userId": 42,
                "productId": 3,
                "quantity": 2,
                "timestamp": "2024-01-02 03:04:05"
            })
        );
    }
}
