use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::{ApiError, MessageResponse},
    purchases::dto::PurchaseParams,
    purchases::repo::{self, Purchase},
    state::AppState,
};

pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/purchases/:id", post(make_purchase))
        .route("/purchases/list", get(own_purchases))
        .route("/purchases/list/:id", get(product_purchases))
}

#[instrument(skip(state))]
pub async fn make_purchase(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(product_id): Path<i32>,
    Query(params): Query<PurchaseParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    // A non-positive quantity would restock through the decrement.
    if params.quantity <= 0 {
        return Err(ApiError::Validation("quantity must be positive".into()));
    }

    repo::make_purchase(&state.db, user_id, product_id, params.quantity).await?;

    info!(user_id, product_id, quantity = params.quantity, "purchase made");
    Ok(Json(MessageResponse::new("purchase successfully made")))
}

/// Only the caller's own purchases: the list is keyed by the token
/// subject, never by a client-supplied id.
#[instrument(skip(state))]
pub async fn own_purchases(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Purchase>>, ApiError> {
    let purchases = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(purchases))
}

#[instrument(skip(state))]
pub async fn product_purchases(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(product_id): Path<i32>,
) -> Result<Json<Vec<Purchase>>, ApiError> {
    let purchases = repo::list_by_product(&state.db, product_id).await?;
    Ok(Json(purchases))
}
