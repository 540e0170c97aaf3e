//! Session token issuance and validation.

use botpanel_core::db::unix_timestamp;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

use super::claims::Claims;

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: i64,
    pub ttl_secs: i64,
}

/// Signs and validates session tokens (HS256).
#[derive(Clone)]
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    remember_ttl_secs: i64,
}

impl SessionTokens {
    pub fn new(secret: &[u8], ttl_secs: i64, remember_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
            remember_ttl_secs,
        }
    }

    /// Issue a session token for the given user. Remembered sessions get the
    /// long lifetime.
    pub fn issue(
        &self,
        user_id: i64,
        email: &str,
        remember: bool,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let ttl_secs = if remember {
            self.remember_ttl_secs
        } else {
            self.ttl_secs
        };
        let now = unix_timestamp();
        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + ttl_secs,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(IssuedToken {
            token,
            jti: claims.jti,
            expires_at: claims.exp,
            ttl_secs,
        })
    }

    /// Validate a token's signature and expiry and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}
