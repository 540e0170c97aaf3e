//! Server-rendered HTML pages.

use std::fmt::Write;

use super::notice::{Category, Notice};
use crate::bot::BotStatus;
use crate::namespace::{FileInventory, LogView, UploadSlot};
use crate::storage::{Bot, User, UserWithBot};

/// A message box at the top of a page.
#[derive(Debug, Clone)]
pub struct Alert {
    pub category: Category,
    pub text: String,
}

impl Alert {
    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            category: Category::Danger,
            text: text.into(),
        }
    }
}

impl From<Notice> for Alert {
    fn from(notice: Notice) -> Self {
        Self {
            category: notice.category(),
            text: notice.message().to_string(),
        }
    }
}

/// Navigation links depend on who is looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Anonymous,
    User,
    Admin,
}

impl Nav {
    pub const fn for_user(user: &User) -> Self {
        if user.is_admin { Self::Admin } else { Self::User }
    }
}

/// Escape text for use in HTML content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, nav: Nav, alerts: &[Alert], body: &str) -> String {
    let links = match nav {
        Nav::Anonymous => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#,
        Nav::User => r#"<a href="/dashboard">Dashboard</a> <a href="/logout">Logout</a>"#,
        Nav::Admin => {
            r#"<a href="/dashboard">Dashboard</a> <a href="/admin">Admin</a> <a href="/logout">Logout</a>"#
        }
    };
    let mut alert_html = String::new();
    for alert in alerts {
        let _ = write!(
            alert_html,
            r#"<div class="alert alert-{}">{}</div>"#,
            alert.category.css_class(),
            escape(&alert.text)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - Bot Panel</title>
<style>
  body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         color: #e0e0e0; background: #0d1117; line-height: 1.5; }}
  .container {{ max-width: 860px; margin: 0 auto; padding: 1.5rem 1rem; }}
  nav {{ display: flex; gap: 1rem; margin-bottom: 1.5rem; }}
  a {{ color: #58a6ff; text-decoration: none; }}
  .alert {{ padding: 0.6rem 0.9rem; border-radius: 6px; margin-bottom: 0.75rem; }}
  .alert-success {{ background: #12361f; }}
  .alert-info {{ background: #0f2a47; }}
  .alert-danger {{ background: #4a1515; }}
  form {{ margin-bottom: 1.25rem; }}
  label {{ display: block; margin-top: 0.5rem; }}
  pre {{ background: #161b22; padding: 1rem; border-radius: 8px; overflow-x: auto;
         border: 1px solid #30363d; max-height: 30rem; }}
  table {{ width: 100%; border-collapse: collapse; }}
  th, td {{ padding: 0.4rem 0.6rem; text-align: left; border-bottom: 1px solid #21262d; }}
</style>
</head>
<body>
<div class="container">
<nav>{links}</nav>
{alert_html}
<h1>{title}</h1>
{body}
</div>
</body>
</html>"#
    )
}

pub fn register_page(alerts: &[Alert], email: &str) -> String {
    let body = format!(
        r#"<form method="post" action="/register">
  <label>Email <input type="email" name="email" value="{email}" required></label>
  <label>Password <input type="password" name="password" required></label>
  <label>Confirm Password <input type="password" name="confirm_password" required></label>
  <button type="submit">Sign Up</button>
</form>
<p>Already have an account? <a href="/login">Log in</a></p>"#,
        email = escape(email),
    );
    layout("Register", Nav::Anonymous, alerts, &body)
}

pub fn login_page(alerts: &[Alert], email: &str, next: Option<&str>) -> String {
    let action = next.map_or_else(
        || "/login".to_string(),
        |n| format!("/login?next={}", escape(n)),
    );
    let body = format!(
        r#"<form method="post" action="{action}">
  <label>Email <input type="email" name="email" value="{email}" required></label>
  <label>Password <input type="password" name="password" required></label>
  <label><input type="checkbox" name="remember"> Remember Me</label>
  <button type="submit">Login</button>
</form>
<p>Need an account? <a href="/register">Sign up</a></p>"#,
        email = escape(email),
    );
    layout("Login", Nav::Anonymous, alerts, &body)
}

fn upload_form(slot: UploadSlot, present: bool) -> String {
    let (action, label, accept) = match slot {
        UploadSlot::BotScript => ("upload_bot", "Bot script (.py)", ".py"),
        UploadSlot::Requirements => ("upload_reqs", "requirements.txt", ".txt"),
        UploadSlot::Database => ("upload_db", "Database file (.db)", ".db"),
    };
    let state = if present { "uploaded" } else { "missing" };
    format!(
        r#"<form method="post" action="/dashboard" enctype="multipart/form-data">
  <input type="hidden" name="action" value="{action}">
  <label>{label} <em>({stored}: {state})</em>
    <input type="file" name="{field}" accept="{accept}"></label>
  <button type="submit">Upload</button>
</form>"#,
        stored = slot.stored_name(),
        field = slot.field_name(),
    )
}

pub fn dashboard_page(
    alerts: &[Alert],
    user: &User,
    bot: &Bot,
    files: FileInventory,
    log: &LogView,
) -> String {
    let mut body = format!(
        "<p>Signed in as {email}</p>\n<h2>Bot</h2>\n<p>Status: <strong class=\"status-{class}\">{status}</strong></p>\n",
        email = escape(&user.email),
        class = bot.status.label().to_ascii_lowercase(),
        status = bot.status,
    );
    if let Some(pid) = bot.pid {
        let _ = writeln!(body, "<p>Process ID: {pid}</p>");
    }
    body.push_str(match bot.status {
        BotStatus::Running => r#"<p><a href="/bot/stop">Stop bot</a></p>"#,
        BotStatus::Stopped | BotStatus::Error => r#"<p><a href="/bot/start">Start bot</a></p>"#,
    });

    body.push_str("\n<h2>Files</h2>\n");
    for slot in UploadSlot::ALL {
        body.push_str(&upload_form(slot, files.has(slot)));
        body.push('\n');
    }

    let _ = write!(body, "<h2>Log</h2>\n<pre>{}</pre>", escape(&log.text()));
    layout("Dashboard", Nav::for_user(user), alerts, &body)
}

pub fn admin_page(viewer: &User, rows: &[UserWithBot]) -> String {
    let mut table = String::from(
        "<table>\n<thead><tr><th>User ID</th><th>Email</th><th>Admin</th><th>Bot Status</th><th>PID</th><th>Log File</th></tr></thead>\n<tbody>\n",
    );
    for row in rows {
        let _ = writeln!(
            table,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.user_id,
            escape(&row.email),
            if row.is_admin { "yes" } else { "no" },
            row.status,
            row.pid.map_or_else(String::new, |p| p.to_string()),
            escape(row.log_file.as_deref().unwrap_or("")),
        );
    }
    table.push_str("</tbody>\n</table>");
    layout("Admin Panel", Nav::for_user(viewer), &[], &table)
}
