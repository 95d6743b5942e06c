use std::env;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use url::Url;

use crate::error::ApiError;

pub const DEFAULT_MODEL_PATH: &str = "./model/frozen_graph.pb";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Config {
    pub port: u16,
    pub body_limit_bytes: usize,
    pub model_path: String,
    pub static_dir: String,
}

/// Reads all configuration from the environment once at startup. Every
/// variable has a default, so a bare process still comes up in mock mode.
pub fn get_env() -> Config {
    let body_limit_bytes = {
        let mb = env::var("BODY_LIMIT_MB")
            .unwrap_or_else(|_| "5".into())
            .parse::<usize>()
            .expect("BODY_LIMIT_MB must be a valid integer");
        mb * 1024 * 1024
    };

    let port = env::var("PORT")
        .unwrap_or_else(|_| "5020".into())
        .parse::<u16>()
        .expect("PORT must be a valid number between 0 and 65535");

    let model_path = env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.into());
    let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());

    Config {
        port,
        body_limit_bytes,
        model_path,
        static_dir,
    }
}

/// Epoch seconds for the health timestamp. Non-decreasing within a process.
pub fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Downloads the image behind a client-supplied URL. Timeouts come from the
/// client's configuration; any transport failure or non-2xx status is a
/// `Fetch` error attributed to the caller's input.
pub async fn fetch_image_bytes(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>, ApiError> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|err| ApiError::Fetch(err.to_string()))?;

    if !response.status().is_success() {
        return Err(ApiError::Fetch(format!(
            "remote returned {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|err| ApiError::Fetch(err.to_string()))?;

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_now_is_non_decreasing() {
        let first = epoch_now();
        let second = epoch_now();
        assert!(second >= first);
    }
}
