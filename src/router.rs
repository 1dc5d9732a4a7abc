use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::api::clarifai_api::FaceDetector;
use crate::config::Config;
use crate::db::store::AccountStore;
use crate::handlers::{accounts, clarifai};
use crate::service::{CredentialHasher, ErrorLog};

/// Everything a handler may touch, built once at startup and shared.
#[derive(Clone)]
pub struct BrainState {
    pub store: Arc<dyn AccountStore>,
    pub detector: Arc<dyn FaceDetector>,
    pub hasher: CredentialHasher,
    pub error_log: ErrorLog,
    /// Limit for each store or detector call made by a handler.
    pub backend_timeout: Duration,
}

impl BrainState {
    pub fn new(
        store: Arc<dyn AccountStore>,
        detector: Arc<dyn FaceDetector>,
        hasher: CredentialHasher,
        error_log: ErrorLog,
    ) -> Self {
        Self {
            store,
            detector,
            hasher,
            error_log,
            backend_timeout: Config::default().backend_timeout(),
        }
    }

    pub fn with_backend_timeout(mut self, backend_timeout: Duration) -> Self {
        self.backend_timeout = backend_timeout;
        self
    }
}

/// `request_timeout` is a backstop; it should exceed the state's
/// `backend_timeout` so handlers answer with their own failure first.
pub fn brain_router(state: BrainState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(accounts::health_count))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/update", put(accounts::update_entries))
        .route("/clarifai", post(clarifai::detect_face))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
