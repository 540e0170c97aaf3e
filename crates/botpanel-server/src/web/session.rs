//! Session cookie handling and the identity extractors.
//!
//! [`Session`] never rejects: it resolves the cookie to a user or to
//! anonymous. [`CurrentUser`] is for protected routes and bounces anonymous
//! requests to the login page.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use super::AppState;
use super::notice::{self, Notice};
use crate::auth::IssuedToken;
use crate::error::PanelError;
use crate::storage::{DatabaseError, User};

pub const SESSION_COOKIE: &str = "panel_session";

/// The identity behind a request, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<User>,
    /// ID of the live `sessions` row backing the cookie.
    pub session_id: Option<String>,
}

impl Session {
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = PanelError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self::default());
        };

        let claims = match state.tokens.validate(cookie.value()) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Ignoring invalid session cookie");
                return Ok(Self::default());
            }
        };
        let Some(user_id) = claims.user_id() else {
            return Ok(Self::default());
        };

        match state.db.get_live_session(&claims.jti).await? {
            Some(row) if row.user_id == user_id => {}
            _ => return Ok(Self::default()),
        }

        let user = match state.db.get_user(user_id).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            user: Some(user),
            session_id: Some(claims.jti),
        })
    }
}

/// An authenticated user. Anonymous requests are redirected to
/// `/login?next=<path>`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match session.user {
            Some(user) => Ok(Self(user)),
            None => {
                let jar = notice::push(CookieJar::new(), Notice::LoginRequired);
                let target = format!("/login?next={}", parts.uri.path());
                Err((jar, Redirect::to(&target)).into_response())
            }
        }
    }
}

/// Attach the session cookie. Remembered sessions persist across browser
/// restarts; others end with the browser session.
pub fn set_cookie(jar: CookieJar, issued: &IssuedToken, remember: bool, secure: bool) -> CookieJar {
    let mut cookie = Cookie::build((SESSION_COOKIE, issued.token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax);
    if remember {
        cookie = cookie.max_age(time::Duration::seconds(issued.ttl_secs));
    }
    jar.add(cookie)
}

pub fn clear_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Accept a post-login redirect target only if it stays on this site.
///
/// Browsers strip tab and newline characters from URLs, so `/\t/host` would
/// become protocol-relative; control characters and whitespace are refused.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && !n.chars().any(|c| c.is_control() || c.is_whitespace())
    })
}
