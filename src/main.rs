use media_gateway::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    storage::{LocalMediaStore, MediaStoreState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, media store, then the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "media_gateway=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Media gateway starting in {:?} mode", config.env);

    // 4. Media Store Initialization
    let media_store = LocalMediaStore::new(config.storage_root.clone());
    if !media_store.root().is_dir() {
        tracing::warn!(
            root = %media_store.root().display(),
            "Storage root does not exist; every media request will fail until it is created"
        );
    }
    let store = Arc::new(media_store) as MediaStoreState;

    // 5. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState { store, config };

    // 6. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: Failed to bind {}: {}", bind_addr, e));

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server terminated");
    }
}
