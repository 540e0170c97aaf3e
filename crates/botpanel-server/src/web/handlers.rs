//! Route handlers.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Multipart, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::AppState;
use super::notice::{self, Notice};
use super::pages::{self, Alert};
use super::session::{self, CurrentUser, Session};
use crate::accounts;
use crate::bot::BotCommand;
use crate::error::PanelError;
use crate::namespace::UploadSlot;

/// `GET /`, `GET /home`
pub async fn home(session: Session) -> Redirect {
    if session.is_authenticated() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// `GET /register`
pub async fn register_page(session: Session, jar: CookieJar) -> Response {
    if session.is_authenticated() {
        return Redirect::to("/dashboard").into_response();
    }
    let (jar, notice) = notice::take(jar);
    let alerts: Vec<Alert> = notice.into_iter().map(Alert::from).collect();
    (jar, Html(pages::register_page(&alerts, ""))).into_response()
}

/// `POST /register`
#[instrument(skip_all)]
pub async fn register_submit(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PanelError> {
    if session.is_authenticated() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    match accounts::register(&state.db, &form.email, &form.password, &form.confirm_password).await
    {
        Ok(_) => {
            let jar = notice::push(jar, Notice::AccountCreated);
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(PanelError::Validation(msg)) => {
            let alerts = [Alert::danger(msg)];
            Ok(Html(pages::register_page(&alerts, &form.email)).into_response())
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Checkbox; present when ticked.
    pub remember: Option<String>,
}

/// `GET /login`
pub async fn login_page(
    session: Session,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    if session.is_authenticated() {
        return Redirect::to("/dashboard").into_response();
    }
    let (jar, notice) = notice::take(jar);
    let alerts: Vec<Alert> = notice.into_iter().map(Alert::from).collect();
    let next = session::safe_next(query.next.as_deref());
    (jar, Html(pages::login_page(&alerts, "", next))).into_response()
}

/// `POST /login`
#[instrument(skip_all)]
pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PanelError> {
    if session.is_authenticated() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let next = session::safe_next(query.next.as_deref());

    let user = match accounts::authenticate(&state.db, &form.email, &form.password).await {
        Ok(user) => user,
        Err(PanelError::Auth(msg)) => {
            let alerts = [Alert::danger(msg)];
            return Ok(Html(pages::login_page(&alerts, &form.email, next)).into_response());
        }
        Err(e) => return Err(e),
    };

    let remember = form.remember.is_some();
    let issued = state.tokens.issue(user.id, &user.email, remember)?;
    let purged = state.db.purge_stale_sessions().await?;
    if purged > 0 {
        debug!(purged, "Purged stale sessions");
    }
    state
        .db
        .create_session(&issued.jti, user.id, issued.expires_at)
        .await?;
    let jar = session::set_cookie(jar, &issued, remember, state.config.session.secure_cookie);

    info!(user_id = user.id, remember, "User logged in");
    Ok((jar, Redirect::to(next.unwrap_or("/dashboard"))).into_response())
}

/// `GET /logout`
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), PanelError> {
    if let Some(id) = &session.session_id {
        state.db.revoke_session(id).await?;
        if let Some(user) = &session.user {
            info!(user_id = user.id, "User logged out");
        }
    }
    Ok((session::clear_cookie(jar), Redirect::to("/login")))
}

/// `GET /dashboard`
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), PanelError> {
    let namespace = state.namespace(user.id);
    namespace.ensure().await?;

    let bot = state.db.get_bot_for_user(user.id).await?;
    let files = namespace.inventory().await;
    let log = namespace.read_log().await;

    let (jar, notice) = notice::take(jar);
    let alerts: Vec<Alert> = notice.into_iter().map(Alert::from).collect();
    let html = pages::dashboard_page(&alerts, &user, &bot, files, &log);
    Ok((jar, Html(html)))
}

struct UploadedFile {
    filename: Option<String>,
    data: Bytes,
}

/// Fields of the dashboard upload form.
#[derive(Default)]
struct UploadForm {
    action: Option<String>,
    files: HashMap<String, UploadedFile>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, PanelError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        if name == "action" {
            form.action = Some(field.text().await?);
            continue;
        }
        let filename = field.file_name().map(ToString::to_string);
        let data = field.bytes().await?;
        form.files.insert(name, UploadedFile { filename, data });
    }
    Ok(form)
}

/// `POST /dashboard`: one of the three upload actions.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn dashboard_upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<(CookieJar, Redirect), PanelError> {
    let form = read_upload_form(multipart).await?;
    let Some(slot) = form.action.as_deref().and_then(UploadSlot::from_action) else {
        return Ok((jar, Redirect::to("/dashboard")));
    };

    let accepted = form.files.get(slot.field_name()).filter(|file| {
        file.filename
            .as_deref()
            .is_some_and(|name| !name.is_empty() && slot.accepts(name))
    });

    let notice = match accepted {
        Some(file) => {
            state.namespace(user.id).store(slot, &file.data).await?;
            info!(slot = slot.stored_name(), bytes = file.data.len(), "Upload accepted");
            Notice::Uploaded(slot)
        }
        None => {
            warn!(slot = slot.stored_name(), "Upload rejected");
            Notice::Rejected(slot)
        }
    };

    Ok((notice::push(jar, notice), Redirect::to("/dashboard")))
}

/// `GET /bot/start`
pub async fn start_bot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), PanelError> {
    toggle(&state, user.id, jar, BotCommand::Start).await
}

/// `GET /bot/stop`
pub async fn stop_bot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), PanelError> {
    toggle(&state, user.id, jar, BotCommand::Stop).await
}

#[instrument(skip(state, jar))]
async fn toggle(
    state: &AppState,
    user_id: i64,
    jar: CookieJar,
    command: BotCommand,
) -> Result<(CookieJar, Redirect), PanelError> {
    let bot = state.db.apply_bot_command(user_id, command).await?;
    info!(bot_id = bot.id, status = %bot.status, command = command.as_str(), "Bot status changed");

    let notice = match command {
        BotCommand::Start => Notice::StartRequested,
        BotCommand::Stop => Notice::StopRequested,
    };
    Ok((notice::push(jar, notice), Redirect::to("/dashboard")))
}

/// `GET /admin`: every user with its bot. Admins only.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn admin_panel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, PanelError> {
    if !user.is_admin {
        warn!("Non-admin requested admin panel");
        return Err(PanelError::Forbidden);
    }
    let rows = state.db.list_users_with_bots().await?;
    Ok(Html(pages::admin_page(&user, &rows)))
}
