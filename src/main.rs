use anyhow::Context;
use clap::Parser;
use practica::{
    AppConfig, AppState, CredentialHasher, TokenIssuer,
    auth::TokenSettings,
    db::{InMemorySessionStore, InMemoryUserStore},
    types::Role,
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "practica.toml";

/// Practica training-program tracker server
#[derive(Debug, Parser)]
#[command(name = "practica-server", version, about)]
struct Cli {
    /// Path to the TOML configuration file (defaults to ./practica.toml if present)
    #[arg(short, long, env = "PRACTICA_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(cli.config)?;
    init_tracing(&config);

    let settings = TokenSettings::try_from(&config.auth)?;
    let issuer = TokenIssuer::new(&config.jwt_secret()?, settings)
        .context("Failed to initialize token issuer")?;

    let users = Arc::new(InMemoryUserStore::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let sweep_interval = Duration::from_secs(config.rate_limit.sweep_interval_secs);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host/server.port")?;

    let state = AppState::new(
        &config,
        issuer,
        users,
        sessions,
        CredentialHasher::default(),
    );

    seed_admin(&state).await?;

    let sweeper = state.rate_limiter.spawn_sweeper(sweep_interval);
    let app = practica::api::routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Practica server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    sweeper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None if PathBuf::from(DEFAULT_CONFIG).exists() => {
            AppConfig::load(DEFAULT_CONFIG).context("Failed to load practica.toml")
        }
        None => {
            let config = AppConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let level = &config.server.log_level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("practica={level},practica_server={level},tower_http={level}").into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.server.log_format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Creates the admin account named by `PRACTICA_ADMIN_EMAIL` and
/// `PRACTICA_ADMIN_PASSWORD`, if both are set.
async fn seed_admin(state: &AppState) -> anyhow::Result<()> {
    let (Ok(email), Ok(password)) = (
        std::env::var("PRACTICA_ADMIN_EMAIL"),
        std::env::var("PRACTICA_ADMIN_PASSWORD"),
    ) else {
        tracing::debug!("No admin seed configured");
        return Ok(());
    };

    let identity = state
        .auth_service
        .create_user(&email, &password, "Administrator", Role::Admin)
        .await
        .context("Failed to seed admin account")?;
    tracing::info!(user_id = %identity.id, "Seeded admin account");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
