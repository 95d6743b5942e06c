pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use model::Backend;
use utils::Config;

/// Process-wide state: written once before the server starts, read-only per
/// request afterwards. Shared as a plain `Arc`; handlers never lock, so no
/// request can stall another.
pub struct AppState {
    pub backend: Backend,
    pub http: reqwest::Client,
    pub static_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

pub fn app(state: SharedState, config: &Config) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/predict-file", post(handlers::predict_file))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_shares_across_tasks_without_locking() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppState>();
    }
}
