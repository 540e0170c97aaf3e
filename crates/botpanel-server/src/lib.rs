//! `BotPanel` Server Library
//!
//! Core functionality for the panel:
//! - `SQLite` storage for users, their bot records, and login sessions
//! - Password hashing and signed session tokens
//! - Per-user upload namespaces
//! - The HTTP router (register, login, dashboard, bot toggles, admin)
//!
//! The bot processes themselves are run by an external runner that reads
//! the status flag this server maintains.

pub mod accounts;
pub mod auth;
pub mod bot;
pub mod error;
pub mod namespace;
pub mod storage;
pub mod web;

pub use error::PanelError;
pub use web::{AppState, build_router};
