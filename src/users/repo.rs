use serde::Serialize;
use sqlx::FromRow;

use crate::auth::password::hash_password;
use crate::db::Db;
use crate::error::ApiError;

/// Stored role for ordinary accounts. Admins are promoted by an
/// operator action, never through registration.
pub const ROLE_USER: &str = "user";

/// User record as persisted. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: Option<String>,
    pub role: String,
}

/// What login needs to know about an account.
#[derive(Debug, FromRow)]
pub struct Credentials {
    pub id: i32,
    pub password_hash: String,
    pub role: String,
}

/// Hashes the password and inserts the new user. Duplicate usernames
/// are rejected with the non-unique error, whether caught by the
/// pre-check or by the UNIQUE constraint under a registration race.
pub async fn register(
    db: &Db,
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<(), ApiError> {
    let password_hash = hash_password(password)?;

    db.with_timeout(async {
        let taken = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_one(db.pool())
        .await?;
        if taken != 0 {
            return Err(ApiError::NonUnique);
        }

        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, email, role)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(email)
        .bind(ROLE_USER)
        .execute(db.pool())
        .await
        .map_err(|e| {
            if e.as_database_error()
                .map_or(false, |dbe| dbe.is_unique_violation())
            {
                ApiError::NonUnique
            } else {
                ApiError::Database(e)
            }
        })?;
        Ok(())
    })
    .await
}

/// Looks up the stored hash and role by username. `None` for unknown
/// usernames; the caller folds that into the same invalid-credentials
/// outcome as a wrong password.
pub async fn find_credentials(db: &Db, username: &str) -> Result<Option<Credentials>, ApiError> {
    db.with_timeout(
        sqlx::query_as::<_, Credentials>(
            r#"SELECT id, password_hash, role FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(db.pool()),
    )
    .await
}

pub async fn profile(db: &Db, user_id: i32) -> Result<User, ApiError> {
    db.with_timeout(
        sqlx::query_as::<_, User>(
            r#"SELECT id, username, password_hash, email, role FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(db.pool()),
    )
    .await?
    .ok_or(ApiError::NotFound("user"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password_hash: "$argon2id$secret".into(),
            email: Some("alice@example.com".into()),
            role: ROLE_USER.into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "username": "alice",
                "email": "alice@example.com",
                "role": "user"
            })
        );
    }
}
