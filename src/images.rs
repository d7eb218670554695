//! Image-hosting collaborator: logo bytes in, stable URL out.

use thiserror::Error;

use crate::config::Settings;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Request(String),

    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("malformed upload response")]
    Malformed,
}

/// External image host. The core stores whatever URL comes back and never
/// touches the bytes again.
#[allow(async_fn_in_trait)]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, UploadError>;
}

/// Unsigned-preset uploader, the contract the hosted widget speaks.
pub struct PresetUploader {
    http: reqwest::Client,
    endpoint: String,
    preset: String,
}

impl PresetUploader {
    pub fn new(settings: &Settings) -> Self {
        PresetUploader {
            http: reqwest::Client::new(),
            endpoint: settings.upload_endpoint.clone(),
            preset: settings.upload_preset.clone(),
        }
    }
}

impl ImageHost for PresetUploader {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, UploadError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned());
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", self.preset.clone())
            .part("file", part);

        let resp = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(UploadError::Rejected(format!("status {}", resp.status())));
        }

        let payload: serde_json::Value = resp.json().await.map_err(|_| UploadError::Malformed)?;
        payload["secure_url"]
            .as_str()
            .map(str::to_owned)
            .ok_or(UploadError::Malformed)
    }
}
