use std::path::PathBuf;
use std::sync::Arc;

use deepfake_service_rs::model::Backend;
use deepfake_service_rs::utils::{get_env, FETCH_TIMEOUT};
use deepfake_service_rs::{app, AppState};

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = get_env();

    let backend = Backend::init(&config.model_path);
    log::info!("Model mode: {}", backend.mode());

    let http = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client");

    let state = Arc::new(AppState {
        backend,
        http,
        static_dir: PathBuf::from(&config.static_dir),
    });

    let router = app(state, &config);

    log::info!("Listening on http://0.0.0.0:{}", config.port);
    axum::Server::bind(&format!("0.0.0.0:{}", config.port).parse().unwrap())
        .serve(router.into_make_service())
        .await
        .unwrap();
}
