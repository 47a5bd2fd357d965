//! wbid-web - Wetland bird identification service
//!
//! Startup order: configuration, logging, database, admin bootstrap,
//! session secret, classifier, HTTP server.

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wbid_ai::SpeciesClassifier;
use wbid_common::auth::load_session_secret;
use wbid_common::config::{
    load_toml_config, LoggingConfig, ModelConfig, RootFolderInitializer, RootFolderResolver,
};
use wbid_common::db::admins::ensure_bootstrap_admin;
use wbid_common::db::init_database;
use wbid_web::{build_router, AppState, ServiceSettings};

/// Command-line arguments for wbid-web
#[derive(Parser, Debug)]
#[command(name = "wbid-web")]
#[command(about = "Wetland bird identification web service")]
#[command(version)]
struct Args {
    /// Bootstrap TOML config file
    #[arg(short, long, env = "WBID_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database and uploads (also WBID_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "WBID_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "WBID_PORT")]
    port: Option<u16>,

    /// Username for the first admin when none exists
    #[arg(long, env = "WBID_ADMIN_USERNAME")]
    admin_username: Option<String>,

    /// Password for the first admin when none exists
    #[arg(long, env = "WBID_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

#[cfg(feature = "onnx")]
fn load_classifier(model: &ModelConfig) -> Result<Arc<dyn SpeciesClassifier>> {
    let model_path = model
        .path
        .as_ref()
        .context("[model] path is not configured")?;
    let labels_path = model
        .labels
        .as_ref()
        .context("[model] labels is not configured")?;

    let classifier = wbid_ai::OnnxClassifier::load(model_path, labels_path, model.temperature)?;
    Ok(Arc::new(classifier))
}

#[cfg(not(feature = "onnx"))]
fn load_classifier(_model: &ModelConfig) -> Result<Arc<dyn SpeciesClassifier>> {
    anyhow::bail!("wbid-web was built without a classifier backend; rebuild with `--features onnx`")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_toml_config(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.admin_username.is_some() {
        config.admin.username = args.admin_username;
    }
    if args.admin_password.is_some() {
        config.admin.password = args.admin_password;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(
        "Starting wbid-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new(args.root_folder, &config).resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    ensure_bootstrap_admin(&db, &config.admin).await?;
    let session_secret = load_session_secret(&db).await?;

    let upload_dir = initializer.upload_dir(&config)?;
    info!("Uploads: {}", upload_dir.display());

    let classifier = load_classifier(&config.model).context("Failed to load classifier")?;
    info!("Classifier ready ({} classes)", classifier.class_count());

    let state = AppState::new(
        db,
        classifier,
        session_secret,
        upload_dir,
        ServiceSettings::from_config(&config),
    );
    let app = build_router(state);

    let ip: std::net::IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.host))?;
    let addr = SocketAddr::new(ip, config.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("wbid-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
