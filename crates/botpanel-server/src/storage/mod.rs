//! `SQLite` storage for the `BotPanel` server.
//!
//! Provides persistence for users, their bot records, and login sessions.

mod db;
mod models;
mod queries;


pub use botpanel_core::db::DatabaseError;
pub use db::PanelDatabase;
pub use models::*;
