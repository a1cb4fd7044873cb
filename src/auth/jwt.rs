use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::{Claims, ROLE_ADMIN};
use crate::config::JwtConfig;
use crate::state::AppState;

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    fn sign_with_role(&self, user_id: i32, role: Option<String>) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc() + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            id: user_id,
            expires_at: exp.unix_timestamp(),
            role,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, admin = claims.is_admin(), "jwt signed");
        Ok(token)
    }

    pub fn sign_user(&self, user_id: i32) -> anyhow::Result<String> {
        self.sign_with_role(user_id, None)
    }

    pub fn sign_admin(&self, user_id: i32) -> anyhow::Result<String> {
        self.sign_with_role(user_id, Some(ROLE_ADMIN.to_string()))
    }

    /// Decodes and checks the signature, then checks expiry by hand.
    /// The expiry claim is named `expiresAt` on the wire, so the
    /// library's built-in `exp` handling never sees it.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_required_spec_claims::<&str>(&[]);
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;

        if data.claims.expires_at < OffsetDateTime::now_utc().unix_timestamp() {
            anyhow::bail!("token expired");
        }
        debug!(user_id = data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}
