use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;

/// Extracts and validates the session token, yielding the subject id.
#[derive(Debug)]
pub struct AuthUser(pub i32);

/// Same as [`AuthUser`] but additionally requires the admin role.
/// A valid token without the role is rejected with 403, distinct from
/// the 401 cases.
#[derive(Debug)]
pub struct AdminUser(pub i32);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized("Authorization token is missing"))?;

    // The header carries the bare token; a conventional "Bearer " prefix
    // is tolerated.
    Ok(header.strip_prefix("Bearer ").unwrap_or(header))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token")
        })?;
        Ok(AuthUser(claims.id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token")
        })?;
        if !claims.is_admin() {
            warn!(user_id = claims.id, "admin route denied");
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(claims.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::{header::AUTHORIZATION, Request, StatusCode};

    fn parts_with_auth(token: Option<&str>) -> Parts {
        let builder = Request::builder().uri("/");
        let builder = match token {
            Some(t) => builder.header(AUTHORIZATION, t),
            None => builder,
        };
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("garbage"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn user_token_yields_subject_id() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_user(42).unwrap();
        let mut parts = parts_with_auth(Some(&token));
        let AuthUser(id) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(id, 42);
    }

    #[tokio::test]
    async fn bearer_prefix_is_tolerated() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_user(5).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let AuthUser(id) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(id, 5);
    }

    #[tokio::test]
    async fn user_token_is_forbidden_on_admin_routes() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_user(42).unwrap();
        let mut parts = parts_with_auth(Some(&token));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_token_passes_both_extractors() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_admin(1).unwrap();

        let mut parts = parts_with_auth(Some(&token));
        let AdminUser(id) = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(id, 1);

        let mut parts = parts_with_auth(Some(&token));
        let AuthUser(id) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(id, 1);
    }
}
