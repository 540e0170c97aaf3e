//! End-to-end tests driving the panel router.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::Router;
use tower::ServiceExt;

use botpanel_core::PanelConfig;
use botpanel_server::bot::BotStatus;
use botpanel_server::storage::PanelDatabase;
use botpanel_server::{AppState, build_router};

const BOUNDARY: &str = "----botpanel-test-boundary";

struct TestApp {
    router: Router,
    state: AppState,
    _disk: tempfile::TempDir,
}

async fn app() -> TestApp {
    app_with(|_| {}).await
}

async fn app_with(configure: impl FnOnce(&mut PanelConfig)) -> TestApp {
    let disk = tempfile::tempdir().unwrap();
    let mut config = PanelConfig {
        disk_path: disk.path().to_path_buf(),
        ..PanelConfig::default()
    };
    configure(&mut config);
    config.ensure_directories().unwrap();
    let db = PanelDatabase::open_in_memory().await.unwrap();
    let state = AppState::new(db, config);
    TestApp {
        router: build_router(state.clone()),
        state,
        _disk: disk,
    }
}

fn text_part(name: &str, value: &str) -> String {
    format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
}

fn file_part(name: &str, filename: &str, contents: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n{contents}\r\n"
    )
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    cookies: Vec<String>,
    body: String,
}

impl Reply {
    /// `name=value` of a cookie set by the response, if any.
    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies
            .iter()
            .map(|c| c.split(';').next().unwrap_or_default().to_string())
            .find(|pair| pair.starts_with(&format!("{name}=")) && pair.len() > name.len() + 1)
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> Reply {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let cookies = resp
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        Reply {
            status,
            location,
            cookies,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }

    async fn upload(
        &self,
        cookie: &str,
        action: &str,
        field: &str,
        filename: &str,
        contents: &str,
    ) -> Reply {
        self.post_multipart(
            cookie,
            &[
                text_part("action", action),
                file_part(field, filename, contents),
            ],
        )
        .await
    }

    async fn post_multipart(&self, cookie: &str, parts: &[String]) -> Reply {
        let body = format!("{}--{BOUNDARY}--\r\n", parts.concat());
        let req = Request::builder()
            .method("POST")
            .uri("/dashboard")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    async fn register(&self, email: &str) -> Reply {
        self.post_form(
            "/register",
            &format!("email={email}&password=password123&confirm_password=password123"),
            None,
        )
        .await
    }

    /// Register and log in, returning the session cookie pair.
    async fn signed_in(&self, email: &str) -> String {
        self.register(email).await;
        self.login(email).await
    }

    async fn login(&self, email: &str) -> String {
        let reply = self
            .post_form("/login", &format!("email={email}&password=password123"), None)
            .await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        reply.cookie("panel_session").expect("session cookie")
    }

    async fn user_id(&self, email: &str) -> i64 {
        self.state
            .db
            .find_user_by_email(email)
            .await
            .unwrap()
            .unwrap()
            .id
    }
}

#[tokio::test]
async fn home_redirects_by_session() {
    let app = app().await;

    for uri in ["/", "/home"] {
        let reply = app.get(uri, None).await;
        assert_eq!(reply.location.as_deref(), Some("/login"));
    }

    let cookie = app.signed_in("alice@example.com").await;
    let reply = app.get("/home", Some(&cookie)).await;
    assert_eq!(reply.location.as_deref(), Some("/dashboard"));
}

#[tokio::test]
async fn register_login_and_view_dashboard() {
    let app = app().await;

    let reply = app.register("alice@example.com").await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/login"));
    let notice = reply.cookie("panel_notice").unwrap();

    let login = app.get("/login", Some(&notice)).await;
    assert!(login.body.contains("Your account has been created!"));

    let cookie = app.login("alice@example.com").await;
    let dash = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(dash.status, StatusCode::OK);
    assert!(dash.body.contains("alice@example.com"));
    assert!(dash.body.contains("Stopped"));
    assert!(dash.body.contains("No log file found."));

    let user_id = app.user_id("alice@example.com").await;
    assert!(app.state.namespace(user_id).dir().is_dir());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = app().await;
    app.register("alice@example.com").await;

    let reply = app.register("alice@example.com").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("That email is taken."));

    let rows = app.state.db.list_users_with_bots().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, BotStatus::Stopped);
}

#[tokio::test]
async fn invalid_registration_rerenders_form() {
    let app = app().await;
    let reply = app
        .post_form(
            "/register",
            "email=alice%40example.com&password=password123&confirm_password=different1",
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Passwords must match."));
    assert!(reply.body.contains(r#"value="alice@example.com""#));
    assert!(app.state.db.list_users_with_bots().await.unwrap().is_empty());
}

#[tokio::test]
async fn bad_credentials_create_no_session() {
    let app = app().await;
    app.register("alice@example.com").await;

    let reply = app
        .post_form("/login", "email=alice@example.com&password=wrong-password", None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Login Unsuccessful. Please check email and password."));
    assert!(reply.cookie("panel_session").is_none());
}

#[tokio::test]
async fn protected_routes_bounce_to_login_with_next() {
    let app = app().await;

    for uri in ["/dashboard", "/bot/start", "/bot/stop", "/admin"] {
        let reply = app.get(uri, None).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(reply.location, Some(format!("/login?next={uri}")));
        assert!(reply.cookie("panel_notice").is_some());
    }
}

#[tokio::test]
async fn login_follows_local_next_only() {
    let app = app().await;
    app.register("alice@example.com").await;

    let reply = app
        .post_form(
            "/login?next=/admin",
            "email=alice@example.com&password=password123",
            None,
        )
        .await;
    assert_eq!(reply.location.as_deref(), Some("/admin"));

    for next in ["//evil.example", "/%09/evil.example", "/%0A/evil.example"] {
        let reply = app
            .post_form(
                &format!("/login?next={next}"),
                "email=alice@example.com&password=password123",
                None,
            )
            .await;
        assert_eq!(reply.location.as_deref(), Some("/dashboard"), "{next}");
    }
}

#[tokio::test]
async fn remember_me_sets_persistent_cookie() {
    let app = app().await;
    app.register("alice@example.com").await;

    let plain = app
        .post_form("/login", "email=alice@example.com&password=password123", None)
        .await;
    assert!(plain.cookies.iter().all(|c| !c.contains("Max-Age")));

    let remembered = app
        .post_form(
            "/login",
            "email=alice@example.com&password=password123&remember=on",
            None,
        )
        .await;
    assert!(
        remembered
            .cookies
            .iter()
            .any(|c| c.starts_with("panel_session=") && c.contains("Max-Age"))
    );
}

#[tokio::test]
async fn signed_in_users_skip_register_and_login() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;

    for uri in ["/register", "/login"] {
        let reply = app.get(uri, Some(&cookie)).await;
        assert_eq!(reply.location.as_deref(), Some("/dashboard"), "{uri}");
    }
}

#[tokio::test]
async fn start_then_stop_leaves_bot_stopped() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;

    let reply = app.get("/bot/start", Some(&cookie)).await;
    assert_eq!(reply.location.as_deref(), Some("/dashboard"));
    let bot = app.state.db.get_bot_for_user(user_id).await.unwrap();
    assert_eq!(bot.status, BotStatus::Running);

    let notice = reply.cookie("panel_notice").unwrap();
    let dash = app
        .get("/dashboard", Some(&format!("{cookie}; {notice}")))
        .await;
    assert!(dash.body.contains("It may take up to a minute to come online."));

    app.get("/bot/stop", Some(&cookie)).await;
    let bot = app.state.db.get_bot_for_user(user_id).await.unwrap();
    assert_eq!(bot.status, BotStatus::Stopped);
}

#[tokio::test]
async fn bot_script_with_wrong_extension_is_rejected() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;
    app.get("/dashboard", Some(&cookie)).await;

    let reply = app
        .upload(&cookie, "upload_bot", "bot_file", "malware.txt", "rm -rf /")
        .await;
    assert_eq!(reply.location.as_deref(), Some("/dashboard"));

    let dir = app.state.namespace(user_id).dir().to_path_buf();
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

    let notice = reply.cookie("panel_notice").unwrap();
    let dash = app
        .get("/dashboard", Some(&format!("{cookie}; {notice}")))
        .await;
    assert!(dash.body.contains("Invalid file. Please upload a .py file."));
}

#[tokio::test]
async fn each_slot_stores_under_fixed_name() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;

    app.upload(&cookie, "upload_bot", "bot_file", "my_bot.py", "print('hi')")
        .await;
    app.upload(&cookie, "upload_db", "db_file", "data.db", "SQLite")
        .await;

    let dir = app.state.namespace(user_id).dir().to_path_buf();
    assert_eq!(std::fs::read_to_string(dir.join("bot.py")).unwrap(), "print('hi')");
    assert_eq!(std::fs::read_to_string(dir.join("user.db")).unwrap(), "SQLite");
    assert!(!dir.join("requirements.txt").exists());
}

#[tokio::test]
async fn requirements_reupload_replaces_content() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;

    app.upload(
        &cookie,
        "upload_reqs",
        "req_file",
        "requirements.txt",
        "requests==2.31.0\nflask==3.0.0",
    )
    .await;
    let reply = app
        .upload(&cookie, "upload_reqs", "req_file", "requirements.txt", "httpx")
        .await;
    assert!(reply.cookie("panel_notice").unwrap().ends_with("uploaded_reqs"));

    let path = app.state.namespace(user_id).dir().join("requirements.txt");
    assert_eq!(std::fs::read_to_string(path).unwrap(), "httpx");
}

#[tokio::test]
async fn requirements_slot_requires_exact_name() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;

    let reply = app
        .upload(&cookie, "upload_reqs", "req_file", "reqs.txt", "httpx")
        .await;
    assert!(reply.cookie("panel_notice").unwrap().ends_with("rejected_reqs"));
    assert!(!app.state.namespace(user_id).dir().join("requirements.txt").exists());
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;
    app.get("/dashboard", Some(&cookie)).await;

    let reply = app
        .post_multipart(&cookie, &[text_part("action", "upload_bot")])
        .await;
    assert_eq!(reply.location.as_deref(), Some("/dashboard"));
    assert!(reply.cookie("panel_notice").unwrap().ends_with("rejected_bot"));

    let dir = app.state.namespace(user_id).dir().to_path_buf();
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[tokio::test]
async fn upload_with_empty_filename_is_rejected() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;
    app.get("/dashboard", Some(&cookie)).await;

    let reply = app
        .upload(&cookie, "upload_db", "db_file", "", "SQLite")
        .await;
    assert!(reply.cookie("panel_notice").unwrap().ends_with("rejected_db"));

    let dir = app.state.namespace(user_id).dir().to_path_buf();
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[tokio::test]
async fn unknown_or_missing_action_is_ignored() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;
    app.get("/dashboard", Some(&cookie)).await;

    let unknown = app
        .upload(&cookie, "upload_everything", "bot_file", "bot.py", "print(1)")
        .await;
    let missing = app
        .post_multipart(&cookie, &[file_part("bot_file", "bot.py", "print(1)")])
        .await;

    for reply in [unknown, missing] {
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location.as_deref(), Some("/dashboard"));
        assert!(reply.cookie("panel_notice").is_none());
    }
    let dir = app.state.namespace(user_id).dir().to_path_buf();
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let app = app_with(|config| config.server.max_upload_bytes = 256).await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;
    app.get("/dashboard", Some(&cookie)).await;

    let script = "#".repeat(4096);
    let reply = app
        .upload(&cookie, "upload_bot", "bot_file", "bot.py", &script)
        .await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);

    let dir = app.state.namespace(user_id).dir().to_path_buf();
    assert!(!dir.join("bot.py").exists());
}

#[tokio::test]
async fn dashboard_shows_runner_log() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;

    let namespace = app.state.namespace(user_id);
    namespace.ensure().await.unwrap();
    std::fs::write(namespace.log_path(), "bot online <ok>\n").unwrap();

    let dash = app.get("/dashboard", Some(&cookie)).await;
    assert!(dash.body.contains("bot online &lt;ok&gt;"));
}

#[tokio::test]
async fn runner_error_status_is_displayed() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;
    let user_id = app.user_id("alice@example.com").await;
    app.state
        .db
        .set_bot_status(user_id, BotStatus::Error)
        .await
        .unwrap();

    let dash = app.get("/dashboard", Some(&cookie)).await;
    assert!(dash.body.contains("status-error"));
    assert!(dash.body.contains("/bot/start"));
}

#[tokio::test]
async fn admin_panel_is_admin_only() {
    let app = app().await;
    botpanel_server::accounts::create_admin(&app.state.db, "admin@example.com", "password123")
        .await
        .unwrap();
    let alice = app.signed_in("alice@example.com").await;
    app.register("bob@example.com").await;

    let reply = app.get("/admin", Some(&alice)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let admin = app.login("admin@example.com").await;
    let reply = app.get("/admin", Some(&admin)).await;
    assert_eq!(reply.status, StatusCode::OK);
    for email in ["admin@example.com", "alice@example.com", "bob@example.com"] {
        assert_eq!(reply.body.matches(&format!("<td>{email}</td>")).count(), 1, "{email}");
    }
}

#[tokio::test]
async fn logout_revokes_session() {
    let app = app().await;
    let cookie = app.signed_in("alice@example.com").await;

    let reply = app.get("/logout", Some(&cookie)).await;
    assert_eq!(reply.location.as_deref(), Some("/login"));
    assert!(
        reply
            .cookies
            .iter()
            .any(|c| c.starts_with("panel_session=") && c.contains("Max-Age=0"))
    );

    // Replaying the old cookie no longer authenticates.
    let reply = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/login?next=/dashboard"));
}

#[tokio::test]
async fn tampered_session_cookie_is_anonymous() {
    let app = app().await;
    let reply = app
        .get("/dashboard", Some("panel_session=not-a-token"))
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
}
