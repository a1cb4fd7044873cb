use serde::Deserialize;

/// Query string for POST /purchases/:id.
#[derive(Debug, Deserialize)]
pub struct PurchaseParams {
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_comes_from_the_query_string() {
        let params: PurchaseParams = serde_json::from_str(r#"{"quantity":3}"#).unwrap();
        assert_eq!(params.quantity, 3);
    }
}
