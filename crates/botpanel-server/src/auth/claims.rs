//! Claims carried by a session token.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token ID; doubles as the `sessions` row id.
    pub jti: String,
    /// Subject (user ID).
    pub sub: String,
    pub email: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// User ID from `sub`, if it is numeric.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}
