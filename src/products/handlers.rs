use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::{ApiError, MessageResponse},
    products::dto::ProductRequest,
    products::repo::{self, Product},
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products/", post(add_product))
        .route("/products/list", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id", put(update_product))
        .route("/products/:id", delete(delete_product))
}

fn validate(payload: &ProductRequest) -> Result<(), ApiError> {
    if payload.name.is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    if payload.price < 0 {
        return Err(ApiError::Validation("price must not be negative".into()));
    }
    if payload.quantity < 0 {
        return Err(ApiError::Validation("quantity must not be negative".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn add_product(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate(&payload)?;
    repo::insert(
        &state.db,
        &payload.name,
        &payload.description,
        payload.price,
        payload.quantity,
    )
    .await?;

    info!(name = %payload.name, "product added");
    Ok(Json(MessageResponse::new("product successfully added")))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = repo::list_all(&state.db).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Product>, ApiError> {
    let product = repo::fetch(&state.db, id).await?;
    Ok(Json(product))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate(&payload)?;
    repo::update(
        &state.db,
        id,
        &payload.name,
        &payload.description,
        payload.price,
        payload.quantity,
    )
    .await?;

    info!(product_id = id, "product updated");
    Ok(Json(MessageResponse::new("product successfully updated")))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    repo::delete(&state.db, id).await?;

    info!(product_id = id, "product deleted");
    Ok(Json(MessageResponse::new("product successfully deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, price: i32, quantity: i32) -> ProductRequest {
        ProductRequest {
            name: name.into(),
            description: "desc".into(),
            price,
            quantity,
        }
    }

    #[test]
    fn validate_accepts_sane_products() {
        assert!(validate(&request("widget", 0, 0)).is_ok());
        assert!(validate(&request("widget", 250, 10)).is_ok());
    }

    #[test]
    fn validate_rejects_bad_fields() {
        assert!(validate(&request("", 250, 10)).is_err());
        assert!(validate(&request("widget", -1, 10)).is_err());
        assert!(validate(&request("widget", 250, -1)).is_err());
    }
}
