use serde::{Deserialize, Serialize};

/// Role claim value for administrators.
pub const ROLE_ADMIN: &str = "admin";

/// JWT payload. Claim names are part of the wire contract: clients see
/// `id`, `expiresAt` and an optional `role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32, // user ID
    #[serde(rename = "expiresAt")]
    pub expires_at: i64, // unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>, // "admin" for elevated tokens
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ROLE_ADMIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_claims_omit_role() {
        let claims = Claims {
            id: 42,
            expires_at: 1_700_000_000,
            role: None,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 42, "expiresAt": 1_700_000_000i64 })
        );
        assert!(!claims.is_admin());
    }

    #[test]
    fn admin_claims_carry_role() {
        let claims = Claims {
            id: 1,
            expires_at: 1_700_000_000,
            role: Some(ROLE_ADMIN.to_string()),
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["role"], "admin");
        assert!(claims.is_admin());
    }

    #[test]
    fn role_defaults_to_none_when_absent() {
        let claims: Claims =
            serde_json::from_value(serde_json::json!({ "id": 7, "expiresAt": 0 })).unwrap();
        assert_eq!(claims.role, None);
    }
}
