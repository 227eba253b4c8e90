//! ChitConnect Backend Service
//!
//! Main entry point for the chit-fund management backend.
//! This service provides:
//! - gRPC API for admins, employees and members
//! - SMS and WhatsApp notifications for receipts and auction results
//! - Background purge of expired sessions

use chitconnect_backend::config::AppConfig;
use chitconnect_backend::database::{create_pool, run_migrations};
use chitconnect_backend::error::{AppError, AppResult};
use chitconnect_backend::grpc_service::ChitGrpcService;
use chitconnect_backend::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Server;
use tracing::{error, info, warn};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("chitconnect_backend={},sqlx=warn,tonic=info", config.log_level).into()
    });
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           ChitConnect Backend Service Starting           ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("gRPC port: {}", config.grpc_port);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    info!("Initializing core services...");

    let app_state = Arc::new(AppState::new(pool, &config).map_err(|e| {
        error!("Failed to initialize application state: {}", e);
        e
    })?);
    info!("✓ Application state initialized");
    info!("✓ Audit trail writing to {:?} (one file per UTC day)", app_state.audit.log_file());

    if app_state.notification_service.is_simulated() {
        warn!("Twilio credentials not configured - notifications run in simulation mode");
    } else {
        info!("✓ Notification service initialized (SMS + WhatsApp)");
    }

    let grpc_service = ChitGrpcService::new(app_state.clone());
    info!("✓ gRPC service initialized");

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    let purge_state = app_state.clone();
    let purge_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match purge_state.auth_service.purge_expired_sessions().await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired sessions", n),
                Err(e) => warn!("Session purge failed: {}", e),
            }
        }
    });
    info!("✓ Session purge task started (hourly)");

    // =========================================================================
    // START SERVER
    // =========================================================================
    let grpc_addr: SocketAddr = format!("0.0.0.0:{}", config.grpc_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid gRPC address: {}", e)))?;

    info!("Starting gRPC server on {}...", grpc_addr);

    let grpc_server = Server::builder()
        .add_service(grpc_service.into_server())
        .serve(grpc_addr);

    let grpc_handle = tokio::spawn(async move {
        if let Err(e) = grpc_server.await {
            error!("gRPC server error: {}", e);
        }
    });

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           ChitConnect Backend Service Ready!             ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  gRPC API:     0.0.0.0:{}                              ║", config.grpc_port);
    info!("║  Environment:  {}                                    ║", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = grpc_handle => {
            error!("gRPC server exited unexpectedly");
        }
        _ = purge_handle => {
            error!("Session purge task exited unexpectedly");
        }
    }

    app_state.database.pool().close().await;
    info!("ChitConnect backend service shutdown complete");
    Ok(())
}
