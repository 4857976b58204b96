pub mod auth;
pub mod handlers;

use crate::components::{ActionBackend, Dispatcher, IntentResolver, LanguageModel};
use crate::config::Config;
pub use crate::utils::time::Clock;
use auth::SessionService;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use handlers::{health_handler, process_voice_handler};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Maximum accepted request body
const BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Session token verification
    pub sessions: Arc<SessionService>,
    /// Intent resolution
    pub resolver: IntentResolver,
    /// Action dispatch
    pub dispatcher: Dispatcher,
    /// Current time, replaceable in tests
    pub clock: Clock,
}

impl AppState {
    /// Wire the pipeline from its collaborators
    pub fn new(
        config: Config,
        model: Arc<dyn LanguageModel>,
        backend: Arc<dyn ActionBackend>,
    ) -> Self {
        let clock: Clock = Arc::new(Utc::now);
        Self {
            sessions: Arc::new(SessionService::new(config.session_secret.clone())),
            resolver: IntentResolver::new(model),
            dispatcher: Dispatcher::from_config(backend, &config).with_clock(clock.clone()),
            config: Arc::new(config),
            clock,
        }
    }

    /// Replace the clock used for resolving and listing
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.dispatcher = self.dispatcher.with_clock(clock.clone());
        self.clock = clock;
        self
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/api/process-voice", post(process_voice_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
