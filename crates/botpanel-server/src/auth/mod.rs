//! Authentication for the panel.
//!
//! Provides signed session tokens and password hashing.

pub mod claims;
pub mod password;
pub mod token;

pub use claims::Claims;
pub use token::{IssuedToken, SessionTokens};
