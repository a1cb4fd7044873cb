use serde::Deserialize;

/// Body for creating or fully overwriting a product.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price: i32,
    pub quantity: i32,
}
