use crate::config::Config;
use crate::error::BrainError;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::error;
use url::Url;

/// Clarifai reports success in the body as well as the HTTP status.
const CLARIFAI_SUCCESS: u64 = 10000;

/// Remote face detection. The prediction payload is passed through untouched.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect_faces(&self, image_url: &str) -> Result<Value, BrainError>;
}

pub struct ClarifaiClient {
    http: reqwest::Client,
    outputs_url: Url,
    api_key: String,
}

impl ClarifaiClient {
    pub fn new(cfg: &Config) -> Result<Self, BrainError> {
        let http = reqwest::Client::builder()
            .user_agent("smart-brain/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(cfg.backend_timeout())
            .build()?;
        Self::with_client(
            http,
            &cfg.clarifai_api_url,
            &cfg.face_model_id,
            cfg.clarifai_api_key.clone(),
        )
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: &Url,
        model_id: &str,
        api_key: String,
    ) -> Result<Self, BrainError> {
        let outputs_url = base_url.join(&format!("v2/models/{model_id}/outputs"))?;
        Ok(Self {
            http,
            outputs_url,
            api_key,
        })
    }

    pub fn outputs_url(&self) -> &Url {
        &self.outputs_url
    }
}

#[async_trait]
impl FaceDetector for ClarifaiClient {
    async fn detect_faces(&self, image_url: &str) -> Result<Value, BrainError> {
        let body = json!({
            "inputs": [{ "data": { "image": { "url": image_url } } }]
        });

        let resp = self
            .http
            .post(self.outputs_url.clone())
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            error!("Clarifai returned error status: {}", status);
            return Err(BrainError::UpstreamStatus(status));
        }

        let payload: Value = resp.json().await?;
        check_payload_status(&payload)?;
        Ok(payload)
    }
}

/// Reject payloads whose `status.code` is present and not the success code.
fn check_payload_status(payload: &Value) -> Result<(), BrainError> {
    let Some(code) = payload.pointer("/status/code").and_then(Value::as_u64) else {
        return Ok(());
    };
    if code == CLARIFAI_SUCCESS {
        return Ok(());
    }
    let description = payload
        .pointer("/status/description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    error!(code, %description, "Clarifai rejected prediction");
    Err(BrainError::UpstreamRejected { code, description })
}
