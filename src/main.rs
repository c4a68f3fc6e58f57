mod clients;
mod config;
mod coordinator;
mod db;
mod docs;
mod handlers;
mod models;
mod routes;
mod ws;

use axum::http::HeaderValue;
use axum::{routing::get, Router};
use config::Config;
use coordinator::Coordinator;
use docs::ApiDoc;
use routes::create_api_routes;
use std::panic;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared handler state: the coordinator owns all live room state.
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Load configuration before tracing so the configured level can seed
    // the default filter
    let loaded = Config::load();
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };

    // Initialize tracing; RUST_LOG still wins over the configured level
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into()))
        .init();

    info!("Starting server...");

    match loaded {
        Ok(_) => info!("Configuration loaded successfully"),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            warn!("Using default configuration");
        }
    }

    // Initialize database connection if URL is provided
    if let Some(db_url) = &config.db_url {
        match db::store::init_db(db_url).await {
            Ok(_) => info!("Database initialized successfully"),
            Err(e) => {
                error!("Failed to initialize database: {}", e);
                warn!("Room and note persistence will not be available");
            }
        }
    } else {
        warn!("No database URL configured - room and note persistence will not be available");
    }

    // Initialize the execution service client if a key is configured
    match &config.judge_api_key {
        Some(key) => {
            if let Err(e) =
                clients::judge::init_judge_client(config.judge_api_url.clone(), key.clone())
            {
                error!("Failed to initialize execution client: {}", e);
            }
        }
        None => warn!("No execution service key configured - /api/judge will not be available"),
    }

    let app_state = Arc::new(AppState {
        coordinator: Arc::new(Coordinator::new()),
    });

    // Create API routes
    let api_routes = create_api_routes(app_state.clone());

    // The coordinator's WebSocket channel
    let ws_routes = Router::new()
        .route("/ws", get(ws::websocket_handler))
        .with_state(app_state);

    // Combine all routes
    let app_routes = Router::new()
        // Mount API routes
        .nest("/api", api_routes)
        // Mount the WebSocket endpoint
        .merge(ws_routes)
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    // Start the HTTP server
    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("Server running on http://{}", config.server_address());
    info!("WebSocket available at ws://{}/ws", config.server_address());
    info!("Swagger UI available at http://{}/swagger", config.server_address());

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}

fn cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}
