use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::accounts::reject;
use super::{bounded, lenient_integer, present};
use crate::error::{ApiFailure, BrainError};
use crate::router::BrainState;

#[derive(Debug, Deserialize)]
pub struct DetectFaceRequest {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub id: Option<i64>,
    #[serde(default)]
    pub imageurl: Option<String>,
}

/// POST /clarifai -> forwards the image url to the face-detection model and
/// relays its prediction payload.
pub async fn detect_face(
    State(state): State<BrainState>,
    payload: Result<Json<DetectFaceRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiFailure> {
    match detect(&state, payload).await {
        Ok(prediction) => Ok(Json(prediction)),
        Err(e) => Err(reject(&state, e, |_| {
            ApiFailure::text(StatusCode::BAD_REQUEST, "Bad request")
        })
        .await),
    }
}

async fn detect(
    state: &BrainState,
    payload: Result<Json<DetectFaceRequest>, JsonRejection>,
) -> Result<Value, BrainError> {
    let Json(req) = payload.map_err(|_| BrainError::Validation("request body"))?;
    let (Some(id), Some(image_url)) = (req.id, present(&req.imageurl)) else {
        return Err(BrainError::Validation("id and imageurl"));
    };
    let detection = state.detector.detect_faces(image_url);
    let prediction = bounded(state, "face detection", detection).await?;
    info!(id, "face detection completed");
    Ok(prediction)
}
