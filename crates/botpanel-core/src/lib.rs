//! `BotPanel` Core Library
//!
//! Shared functionality for `BotPanel` components:
//! - Configuration resolution (defaults, settings file, environment)
//! - `SQLite` pool helpers and the shared database error type
//! - Tracing initialisation
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::PanelConfig;
pub use error::{Error, Result};
