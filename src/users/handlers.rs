use axum::{
    extract::{FromRef, Path, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::ROLE_ADMIN,
        extractors::{AdminUser, AuthUser},
        jwt::JwtKeys,
        password::verify_password,
    },
    error::{ApiError, MessageResponse},
    state::AppState,
    users::dto::{LoginRequest, RegisterRequest},
    users::repo::{self, User},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/profile", get(own_profile))
        .route("/users/:id", get(user_profile))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "username and password are required".into(),
        ));
    }

    // Email is optional; when present it must at least look like one.
    let email = payload.email.as_deref().filter(|e| !e.is_empty());
    if let Some(email) = email {
        if !is_valid_email(email) {
            warn!(email, "invalid email");
            return Err(ApiError::Validation("invalid email".into()));
        }
    }

    repo::register(&state.db, &payload.username, &payload.password, email).await?;

    info!(username = %payload.username, "user registered");
    Ok(Json(MessageResponse::new("user successfully created")))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "username and password are required".into(),
        ));
    }

    // Unknown username and wrong password take the same exit: the
    // caller cannot probe which usernames exist.
    let creds = repo::find_credentials(&state.db, &payload.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&payload.password, &creds.password_hash)? {
        warn!(username = %payload.username, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = if creds.role == ROLE_ADMIN {
        keys.sign_admin(creds.id)?
    } else {
        keys.sign_user(creds.id)?
    };

    info!(user_id = creds.id, "user logged in");
    Ok(Json(MessageResponse::new(token)))
}

#[instrument(skip(state))]
pub async fn user_profile(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<User>, ApiError> {
    let user = repo::profile(&state.db, id).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn own_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = repo::profile(&state.db, user_id).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }
}
