use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::tracks::repo::seaorm::SeaOrmTrackRepository;
use service::tracks::repository::TrackRepository;

use crate::auth::{ServerAuthConfig, ServerState};
use crate::errors::StartupError;
use crate::graphql::build_schema;
use crate::routes;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Config file when present, environment otherwise.
pub fn load_config() -> Result<AppConfig, StartupError> {
    dotenv().ok();
    AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

/// Shared logging init; a second call is a no-op.
pub fn init_logging(cfg: &AppConfig) {
    common::utils::logging::init_logging(cfg.logging.format == LogFormat::Json);
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl_c");
        std::future::pending::<()>().await;
    }
    info!(service = "tracks", event = "shutdown_signal", "shutdown signal received");
}

/// Public entry: load config, then serve.
pub async fn run() -> anyhow::Result<()> {
    let cfg = load_config()?;
    init_logging(&cfg);
    run_with_config(cfg).await
}

/// Connect storage, apply migrations if enabled, and run the HTTP server
/// until Ctrl+C.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let missing = common::env::ensure_env(&["DATABASE_URL", "JWT_SECRET"]);
    if !missing.is_empty() {
        info!(?missing, "using config file or defaults for unset variables");
    }

    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Runtime(format!("migration failed: {e}")))?;
        info!("migrations applied");
    }

    let repo: Arc<dyn TrackRepository> = Arc::new(SeaOrmTrackRepository::new(db));
    let state = ServerState {
        auth: ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone() },
        schema: build_schema(repo),
    };

    let app: Router = routes::build_router(state, build_cors());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting tracks server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
