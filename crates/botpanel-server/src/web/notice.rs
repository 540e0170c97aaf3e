//! One-shot notices carried across a redirect in a cookie.
//!
//! The cookie only ever holds a short code; the text lives here, so nothing
//! user-controlled is reflected back from it.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::namespace::UploadSlot;

pub const NOTICE_COOKIE: &str = "panel_notice";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Success,
    Info,
    Danger,
}

impl Category {
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    AccountCreated,
    LoginRequired,
    Uploaded(UploadSlot),
    Rejected(UploadSlot),
    StartRequested,
    StopRequested,
}

impl Notice {
    pub const fn code(self) -> &'static str {
        match self {
            Self::AccountCreated => "account_created",
            Self::LoginRequired => "login_required",
            Self::Uploaded(UploadSlot::BotScript) => "uploaded_bot",
            Self::Uploaded(UploadSlot::Requirements) => "uploaded_reqs",
            Self::Uploaded(UploadSlot::Database) => "uploaded_db",
            Self::Rejected(UploadSlot::BotScript) => "rejected_bot",
            Self::Rejected(UploadSlot::Requirements) => "rejected_reqs",
            Self::Rejected(UploadSlot::Database) => "rejected_db",
            Self::StartRequested => "start_requested",
            Self::StopRequested => "stop_requested",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let notice = match code {
            "account_created" => Self::AccountCreated,
            "login_required" => Self::LoginRequired,
            "uploaded_bot" => Self::Uploaded(UploadSlot::BotScript),
            "uploaded_reqs" => Self::Uploaded(UploadSlot::Requirements),
            "uploaded_db" => Self::Uploaded(UploadSlot::Database),
            "rejected_bot" => Self::Rejected(UploadSlot::BotScript),
            "rejected_reqs" => Self::Rejected(UploadSlot::Requirements),
            "rejected_db" => Self::Rejected(UploadSlot::Database),
            "start_requested" => Self::StartRequested,
            "stop_requested" => Self::StopRequested,
            _ => return None,
        };
        Some(notice)
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::AccountCreated => "Your account has been created! You are now able to log in.",
            Self::LoginRequired => "Please log in to access this page.",
            Self::Uploaded(UploadSlot::BotScript) => "bot.py uploaded successfully!",
            Self::Uploaded(UploadSlot::Requirements) => "requirements.txt uploaded successfully!",
            Self::Uploaded(UploadSlot::Database) => "Database file uploaded successfully!",
            Self::Rejected(UploadSlot::BotScript) => "Invalid file. Please upload a .py file.",
            Self::Rejected(UploadSlot::Requirements) => {
                "Invalid file. Please upload a file named requirements.txt."
            }
            Self::Rejected(UploadSlot::Database) => "Invalid file. Please upload a .db file.",
            Self::StartRequested => {
                "Bot start request sent! It may take up to a minute to come online."
            }
            Self::StopRequested => "Bot stop request sent!",
        }
    }

    pub const fn category(self) -> Category {
        match self {
            Self::AccountCreated | Self::Uploaded(_) => Category::Success,
            Self::LoginRequired | Self::StartRequested | Self::StopRequested => Category::Info,
            Self::Rejected(_) => Category::Danger,
        }
    }
}

/// Queue a notice for the next page render.
pub fn push(jar: CookieJar, notice: Notice) -> CookieJar {
    jar.add(
        Cookie::build((NOTICE_COOKIE, notice.code()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Pop the pending notice, if any. The returned jar clears the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Notice>) {
    let Some(notice) = jar.get(NOTICE_COOKIE).map(|c| Notice::from_code(c.value())) else {
        return (jar, None);
    };
    let jar = jar.remove(Cookie::build(NOTICE_COOKIE).path("/"));
    (jar, notice)
}
