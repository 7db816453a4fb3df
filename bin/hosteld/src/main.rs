//! `hosteld` — the hostel management server binary.
//!
//! Usage:
//!   hosteld -c <config-name-or-path> [--listen <addr>]
//!
//! The config name resolves to `/etc/hosteld/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use hostel_allocation::gate::ProfileGate;
use hostel_allocation::service::AllocationService;
use hostel_allocation::AllocationModule;
use hostel_core::Module;
use hostel_desk::service::DeskService;
use hostel_desk::{
    AnnouncementModule, FeedbackModule, LeaveModule, MenuModule, RulesModule,
};
use hostel_store::{BlobStore, FsBlobStore, SqliteStore, SqlStore};
use hostel_student::service::StudentService;
use hostel_student::{StudentModule, StudentProfileGate};
use tracing::info;

use auth_middleware::JwtState;
use config::ServerConfig;

/// Hostel management server.
#[derive(Parser, Debug)]
#[command(name = "hosteld", about = "Hostel management server")]
struct Cli {
    /// Config name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    let listen = cli
        .listen
        .or_else(|| {
            if server_config.server.listen.is_empty() {
                None
            } else {
                Some(server_config.server.listen.clone())
            }
        })
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());

    // Initialize storage (shared by all modules).
    std::fs::create_dir_all(&server_config.storage.data_dir)?;
    let sql: Arc<dyn SqlStore> = Arc::new(
        SqliteStore::open(&server_config.sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let blob: Arc<dyn BlobStore> = Arc::new(
        FsBlobStore::open(&server_config.blob_dir())
            .map_err(|e| anyhow::anyhow!("failed to open blob store: {}", e))?,
    );

    // Services. Allocation review reaches into student profiles through
    // the gate, so the student service comes first.
    let student_service = StudentService::new(Arc::clone(&sql), Arc::clone(&blob))
        .map_err(|e| anyhow::anyhow!("student service init failed: {}", e))?;
    let gate: Arc<dyn ProfileGate> =
        Arc::new(StudentProfileGate::new(Arc::clone(&student_service)));
    let allocation_service =
        AllocationService::new(Arc::clone(&sql), Arc::clone(&blob), gate)
            .map_err(|e| anyhow::anyhow!("allocation service init failed: {}", e))?;
    let desk_service = DeskService::new(Arc::clone(&sql), Arc::clone(&blob))
        .map_err(|e| anyhow::anyhow!("desk service init failed: {}", e))?;
    info!("Storage and services initialized");

    let modules: Vec<Box<dyn Module>> = vec![
        Box::new(AllocationModule::new(allocation_service)),
        Box::new(StudentModule::new(student_service)),
        Box::new(LeaveModule::new(Arc::clone(&desk_service))),
        Box::new(FeedbackModule::new(Arc::clone(&desk_service))),
        Box::new(MenuModule::new(Arc::clone(&desk_service))),
        Box::new(RulesModule::new(Arc::clone(&desk_service))),
        Box::new(AnnouncementModule::new(desk_service)),
    ];
    for module in &modules {
        info!("Module mounted at /api/{}", module.name());
    }

    let jwt_state = Arc::new(JwtState::from_secret(&server_config.jwt.secret));

    let app = routes::build_router(jwt_state, blob, modules);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("hosteld listening on {}", listen);
    axum::serve(listener, app).await?;

    Ok(())
}
