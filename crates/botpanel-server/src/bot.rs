//! Bot status flag and the transitions the panel can request.
//!
//! The panel never supervises processes. It only flips the flag, and the
//! external runner polls it to start or stop the user's script. `Error` is
//! written by the runner alone and is display-only here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a user's bot as stored in `bots.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum BotStatus {
    Stopped,
    Running,
    Error,
}

/// A status change requested from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Stop,
}

impl BotStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Running => "Running",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl BotCommand {
    /// Status a bot ends up in after this command. Transitions do not depend
    /// on the current status: `Start` from `Error` is a restart.
    pub const fn target(self) -> BotStatus {
        match self {
            Self::Start => BotStatus::Running,
            Self::Stop => BotStatus::Stopped,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}
