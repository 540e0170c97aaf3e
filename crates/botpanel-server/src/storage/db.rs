//! `SQLite` database for the `BotPanel` server.

botpanel_core::define_database!(PanelDatabase, "Panel database migrations complete");
