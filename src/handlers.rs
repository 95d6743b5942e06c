use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::Json;
use serde_json::{json, Value};
use url::Url;

use crate::error::ApiError;
use crate::model::{mock_prediction, Backend};
use crate::response::{PredictionResult, MODE_MOCK, MODE_REAL};
use crate::utils::{epoch_now, fetch_image_bytes};
use crate::SharedState;

pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": epoch_now(),
        "model_mode": state.backend.mode(),
    }))
}

/// Accepts any non-empty JSON object. A payload carrying `image_url` goes
/// through the real backend; anything else gets a synthesized result with the
/// payload echoed back.
pub async fn predict(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<Json<PredictionResult>, ApiError> {
    let object = match &payload {
        Value::Object(map) if !map.is_empty() => map,
        _ => {
            return Err(ApiError::InvalidRequest(
                "Request body cannot be empty".into(),
            ))
        }
    };

    let Some(raw_url) = object.get("image_url") else {
        let result = PredictionResult::from_prediction(mock_prediction(), MODE_MOCK)
            .with_input(payload.clone());
        return Ok(Json(result));
    };

    // URL validation happens before any mode check or network access.
    let raw_url = raw_url
        .as_str()
        .ok_or_else(|| ApiError::InvalidSchema("image_url must be a string".into()))?;
    let url = Url::parse(raw_url)
        .map_err(|err| ApiError::InvalidSchema(format!("image_url is not a valid URL: {}", err)))?;

    let Backend::Local(classifier) = &state.backend else {
        return Err(ApiError::ServiceUnavailable);
    };

    let bytes = fetch_image_bytes(&state.http, &url).await?;
    let image = image::load_from_memory(&bytes)?;
    let top = top_prediction(classifier.classify(&image)?)?;

    Ok(Json(
        PredictionResult::from_prediction(top, MODE_REAL).with_source(url.to_string()),
    ))
}

pub async fn predict_file(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<PredictionResult>, ApiError> {
    let mut image_data = Vec::new();
    let mut filename = String::from("upload");

    // Walk the multipart form to find the file field.
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::InvalidRequest(err.to_string()))?
    {
        if field.name() == Some("file") {
            if let Some(name) = field.file_name() {
                filename = name.to_string();
            }
            image_data = field
                .bytes()
                .await
                .map_err(|err| ApiError::InvalidRequest(err.to_string()))?
                .to_vec();
            break;
        }
    }

    if image_data.is_empty() {
        return Err(ApiError::InvalidRequest("No file uploaded".into()));
    }

    let result = match &state.backend {
        Backend::Local(classifier) => {
            let image = image::load_from_memory(&image_data)?;
            let top = top_prediction(classifier.classify(&image)?)?;
            PredictionResult::from_prediction(top, MODE_REAL)
        }
        Backend::Mock => PredictionResult::from_prediction(mock_prediction(), MODE_MOCK),
    };

    Ok(Json(result.with_filename(filename)))
}

/// Serves the landing page when the static bundle is present; a missing page
/// is a handled case, not an error.
pub async fn root(State(state): State<SharedState>) -> Html<String> {
    let index_path = state.static_dir.join("index.html");

    match tokio::fs::read_to_string(&index_path).await {
        Ok(page) => Html(page),
        Err(_) => Html("<h3>UI not found</h3>".to_string()),
    }
}

fn top_prediction(
    predictions: Vec<crate::model::Prediction>,
) -> Result<crate::model::Prediction, ApiError> {
    // The classifier's own ordering is authoritative; no re-sort here.
    predictions
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("classifier returned no predictions".into()))
}
