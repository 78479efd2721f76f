//! Application startup and lifecycle management.

use crate::config::SatbotConfig;
use crate::context::StaticContext;
use crate::handlers::{
    chat_completion, handle_middleware_error, health_check, method_not_allowed, not_found,
};
use crate::services::{
    AuditLog, ChatService, GroqConfig, GroqProvider, AUDIT_CHANNEL_CAPACITY,
};
use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    access_policy_middleware, request_id_middleware, AccessPolicy, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

/// Origins allowed to read responses cross-origin. Matched exactly.
pub const ALLOWED_ORIGINS: &[&str] = &[
    "https://saturnalia.in",
    "https://www.saturnalia.in",
    "http://localhost:3000",
    "http://localhost:5173",
];

pub const HEALTH_PATH: &str = "/health";
pub const CHAT_PATH: &str = "/chat";

/// Paths whose preflight requests are answered by the access policy.
pub const PREFLIGHT_PATHS: &[&str] = &[HEALTH_PATH, CHAT_PATH];

/// Per-request envelope. Wider than the 30s upstream budget so an upstream
/// timeout is always reported as a JSON error instead of being cut off.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Largest inbound request body (10 MiB). Larger bodies are rejected as an
/// invalid request format.
pub const MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
}

/// Assemble routes and layers. The access policy is outermost so preflight
/// requests are answered before routing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health_check).fallback(method_not_allowed))
        .route(CHAT_PATH, post(chat_completion).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn_with_state(
            AccessPolicy::new(ALLOWED_ORIGINS, PREFLIGHT_PATHS),
            access_policy_middleware,
        ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// Reads the context document, creates the upstream client and binds the
    /// listener (port 0 picks a random port, which tests rely on).
    pub async fn build(config: SatbotConfig) -> Result<Self, AppError> {
        let context = StaticContext::load(config.context_file());

        let provider = GroqProvider::new(GroqConfig {
            api_url: config.groq_api_url.clone(),
            ..GroqConfig::default()
        })
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

        tracing::info!(
            endpoint = %provider.config().api_url,
            timeout_secs = provider.config().timeout.as_secs(),
            "Initialized Groq provider"
        );

        let chat = ChatService::new(
            Arc::new(provider),
            context,
            config.groq_api_key,
            AuditLog::spawn(AUDIT_CHANNEL_CAPACITY),
        );

        if !chat.is_configured() {
            tracing::warn!("GROQ_API_KEY is not set, /chat will fail until it is configured");
        }

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state: AppState { chat },
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!("Server starting on port {}", self.port);
        tracing::info!("Health check endpoint: http://localhost:{}/health", self.port);
        tracing::info!("Chat completion endpoint: http://localhost:{}/chat", self.port);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
