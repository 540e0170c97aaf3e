//! Per-user storage directories and the three upload slots.
//!
//! Layout: `<user_data_root>/<user_id>/{bot.py, requirements.txt, user.db, bot.log}`.
//! Directories are created lazily and never removed by the panel.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Name of the log file the runner writes next to the uploads.
pub const LOG_FILE: &str = "bot.log";

/// One of the fixed upload targets in a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSlot {
    BotScript,
    Requirements,
    Database,
}

impl UploadSlot {
    pub const ALL: [Self; 3] = [Self::BotScript, Self::Requirements, Self::Database];

    /// Slot selected by the dashboard form's `action` value.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "upload_bot" => Some(Self::BotScript),
            "upload_reqs" => Some(Self::Requirements),
            "upload_db" => Some(Self::Database),
            _ => None,
        }
    }

    /// Multipart field carrying the file for this slot.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::BotScript => "bot_file",
            Self::Requirements => "req_file",
            Self::Database => "db_file",
        }
    }

    /// Name the file is stored under, whatever it was uploaded as.
    pub const fn stored_name(self) -> &'static str {
        match self {
            Self::BotScript => "bot.py",
            Self::Requirements => "requirements.txt",
            Self::Database => "user.db",
        }
    }

    /// Whether an uploaded filename is acceptable for this slot. Only the
    /// name is checked, never the content.
    pub fn accepts(self, filename: &str) -> bool {
        match self {
            Self::BotScript => filename.ends_with(".py"),
            Self::Requirements => filename == "requirements.txt",
            Self::Database => filename.ends_with(".db"),
        }
    }
}

/// Which slots currently hold a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileInventory {
    pub bot_script: bool,
    pub requirements: bool,
    pub database: bool,
}

impl FileInventory {
    pub const fn has(&self, slot: UploadSlot) -> bool {
        match slot {
            UploadSlot::BotScript => self.bot_script,
            UploadSlot::Requirements => self.requirements,
            UploadSlot::Database => self.database,
        }
    }
}

/// What the dashboard shows in place of the runner's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogView {
    Missing,
    Contents(String),
    Unreadable(String),
}

impl LogView {
    pub fn text(&self) -> String {
        match self {
            Self::Missing => "No log file found.".to_string(),
            Self::Contents(text) => text.clone(),
            Self::Unreadable(err) => format!("Error reading log file: {err}"),
        }
    }
}

/// A single user's directory.
#[derive(Debug, Clone)]
pub struct UserNamespace {
    dir: PathBuf,
}

impl UserNamespace {
    pub fn new(user_data_root: &Path, user_id: i64) -> Self {
        Self {
            dir: user_data_root.join(user_id.to_string()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: UploadSlot) -> PathBuf {
        self.dir.join(slot.stored_name())
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write `contents` into `slot`, replacing any previous upload.
    pub async fn store(&self, slot: UploadSlot, contents: &[u8]) -> io::Result<PathBuf> {
        self.ensure().await?;
        let path = self.slot_path(slot);
        tokio::fs::write(&path, contents).await?;
        info!(path = %path.display(), bytes = contents.len(), "Stored upload");
        Ok(path)
    }

    pub async fn inventory(&self) -> FileInventory {
        FileInventory {
            bot_script: is_file(&self.slot_path(UploadSlot::BotScript)).await,
            requirements: is_file(&self.slot_path(UploadSlot::Requirements)).await,
            database: is_file(&self.slot_path(UploadSlot::Database)).await,
        }
    }

    /// Read the runner's log. Failures are reported in the view, not raised.
    pub async fn read_log(&self) -> LogView {
        let path = self.log_path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => LogView::Contents(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => LogView::Missing,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Log file unreadable");
                LogView::Unreadable(e.to_string())
            }
        }
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|m| m.is_file())
}
