//! `BotPanel` server binary.
//!
//! `botpanel serve` runs the web panel; `botpanel create-admin` bootstraps
//! the admin account from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use botpanel_core::PanelConfig;
use botpanel_core::config::load_config;
use botpanel_core::tracing_init::init_tracing;
use botpanel_server::accounts::{self, AdminBootstrap};
use botpanel_server::storage::PanelDatabase;
use botpanel_server::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "botpanel")]
#[command(version, about = "Multi-tenant bot hosting panel")]
struct Cli {
    /// JSON settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of the persistent disk (instance/ and user_data/ live here).
    #[arg(long, global = true)]
    disk_path: Option<PathBuf>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web panel.
    Serve {
        /// Address to listen on.
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Create the admin user from environment variables (idempotent).
    CreateAdmin {
        #[arg(long, env = "ADMIN_EMAIL", default_value = "")]
        email: String,

        #[arg(long, env = "ADMIN_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing("botpanel_server=info,botpanel=info,tower_http=info", cli.log_json);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(disk_path) = cli.disk_path {
        config.disk_path = disk_path;
    }
    config.ensure_directories()?;
    if config.session.uses_default_secret() {
        warn!("Session secret is the built-in default; set PANEL_SECRET_KEY before exposing the panel");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        disk_path = %config.disk_path.display(),
        "Starting botpanel"
    );
    let db = PanelDatabase::open(&config.database_path()).await?;

    match cli.command {
        Command::Serve { addr } => {
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            serve(db, config).await
        }
        Command::CreateAdmin { email, password } => {
            match accounts::create_admin(&db, &email, &password).await? {
                AdminBootstrap::Created(user) => {
                    info!(user_id = user.id, email = %user.email, "Admin user created successfully");
                }
                AdminBootstrap::AlreadyExists => {
                    info!(email = %email, "Admin user already exists");
                }
            }
            Ok(())
        }
    }
}

async fn serve(db: PanelDatabase, config: PanelConfig) -> anyhow::Result<()> {
    let addr = config.server.addr;
    let purged = db.purge_stale_sessions().await?;
    info!(purged, "Purged stale sessions");
    let app = build_router(AppState::new(db, config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Panel listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await?;

    info!("Panel stopped");
    Ok(())
}
