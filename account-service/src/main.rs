use account_service::{
    build_router,
    config::AccountConfig,
    db,
    services::{AuthService, HttpImagePublisher, ImagePublisher, JwtService, UserService},
    store::{PgStore, RefreshTokenStore, UserStore},
    AppState,
};
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = AccountConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level, config.log_json);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting account service"
    );

    // Database pool and schema
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database initialized");

    let store = Arc::new(PgStore::new(pool));
    let users: Arc<dyn UserStore> = store.clone();
    let tokens: Arc<dyn RefreshTokenStore> = store;

    // Outbound image topic client
    let images: Arc<dyn ImagePublisher> = Arc::new(HttpImagePublisher::new(&config.image_topic)?);

    // JWT service
    let jwt = JwtService::new(&config.jwt)?;
    tracing::info!("JWT service initialized");

    let auth = AuthService::new(users.clone(), tokens.clone(), jwt.clone());
    let accounts = UserService::new(users, tokens, images);

    let state = AppState {
        config: config.clone(),
        jwt,
        auth,
        accounts,
    };

    let app = build_router(state).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
