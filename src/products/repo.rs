use serde::Serialize;
use sqlx::FromRow;

use crate::db::Db;
use crate::error::ApiError;

/// Catalog entry. `price` is in the smallest currency unit, `quantity`
/// is the available stock and never goes negative.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: i32,
    pub quantity: i32,
}

pub async fn insert(
    db: &Db,
    name: &str,
    description: &str,
    price: i32,
    quantity: i32,
) -> Result<(), ApiError> {
    db.with_timeout(
        sqlx::query(
            r#"
            INSERT INTO products (name, description, price, quantity)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(quantity)
        .execute(db.pool()),
    )
    .await?;
    Ok(())
}

pub async fn list_all(db: &Db) -> Result<Vec<Product>, ApiError> {
    db.with_timeout(
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, quantity
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(db.pool()),
    )
    .await
}

pub async fn fetch(db: &Db, product_id: i32) -> Result<Product, ApiError> {
    db.with_timeout(
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, quantity
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(db.pool()),
    )
    .await?
    .ok_or(ApiError::NotFound("product"))
}

/// Full-row overwrite. Updating an id that does not exist is a silent
/// no-op, matching the catalog contract.
pub async fn update(
    db: &Db,
    product_id: i32,
    name: &str,
    description: &str,
    price: i32,
    quantity: i32,
) -> Result<(), ApiError> {
    db.with_timeout(
        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, description = $2, price = $3, quantity = $4
            WHERE id = $5
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(quantity)
        .bind(product_id)
        .execute(db.pool()),
    )
    .await?;
    Ok(())
}

/// Deleting an absent id is likewise a silent no-op.
pub async fn delete(db: &Db, product_id: i32) -> Result<(), ApiError> {
    db.with_timeout(
        sqlx::query(r#"DELETE FROM products WHERE id = $1"#)
            .bind(product_id)
            .execute(db.pool()),
    )
    .await?;
    Ok(())
}
