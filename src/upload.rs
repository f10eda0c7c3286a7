// SPDX-License-Identifier: MPL-2.0

//! Multipart uploads to the media server

use crate::config::ServerConfig;
use crate::constants::{endpoints, form_fields};
use crate::errors::ServerError;
use reqwest::multipart::{Form, Part};
use tracing::{debug, error, info};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("camera-upload/", env!("GIT_VERSION"));

/// A captured file ready to upload or save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

impl MediaFile {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            mime: mime.into(),
        }
    }

    /// Extension of `file_name`, if any
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// Kind of media, selecting endpoint, form field and user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            MediaKind::Photo => endpoints::UPLOAD_PHOTO,
            MediaKind::Video => endpoints::UPLOAD_VIDEO,
        }
    }

    pub fn form_field(&self) -> &'static str {
        match self {
            MediaKind::Photo => form_fields::PHOTO,
            MediaKind::Video => form_fields::VIDEO,
        }
    }

    pub fn uploading_message(&self) -> &'static str {
        match self {
            MediaKind::Photo => "Uploading photo...",
            MediaKind::Video => "Uploading video...",
        }
    }

    pub fn uploaded_message(&self) -> &'static str {
        match self {
            MediaKind::Photo => "Photo uploaded successfully!",
            MediaKind::Video => "Video uploaded successfully!",
        }
    }

    pub fn failed_message(&self) -> &'static str {
        match self {
            MediaKind::Photo => "Error uploading photo. Please try again.",
            MediaKind::Video => "Error uploading video. Please try again.",
        }
    }
}

/// Body returned by an upload endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResponse {
    Json(serde_json::Value),
    Text(String),
}

impl UploadResponse {
    fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => UploadResponse::Json(value),
            Err(_) => UploadResponse::Text(body),
        }
    }
}

impl std::fmt::Display for UploadResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadResponse::Json(value) => write!(f, "{}", value),
            UploadResponse::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Build the shared HTTP client, validating the base URL
pub(crate) fn http_client(server: &ServerConfig) -> Result<reqwest::Client, ServerError> {
    reqwest::Url::parse(&server.base_url)
        .map_err(|e| ServerError::InvalidUrl(format!("{}: {}", server.base_url, e)))?;

    reqwest::Client::builder()
        .timeout(server.timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(ServerError::from)
}

/// Uploads photos and recordings
#[derive(Debug, Clone)]
pub struct UploadClient {
    client: reqwest::Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(server: &ServerConfig) -> Result<Self, ServerError> {
        Ok(Self {
            client: http_client(server)?,
            base_url: server.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn upload_photo(&self, file: MediaFile) -> Result<UploadResponse, ServerError> {
        self.upload(MediaKind::Photo, file).await
    }

    pub async fn upload_video(&self, file: MediaFile) -> Result<UploadResponse, ServerError> {
        self.upload(MediaKind::Video, file).await
    }

    /// POST `file` as the single part of a multipart form
    pub async fn upload(
        &self,
        kind: MediaKind,
        file: MediaFile,
    ) -> Result<UploadResponse, ServerError> {
        let endpoint = kind.endpoint();
        let url = format!("{}{}", self.base_url, endpoint);
        let size = file.bytes.len();

        info!(url = %url, file = %file.file_name, bytes = size, "Uploading");

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime)?;
        let form = Form::new().part(kind.form_field(), part);

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "Upload rejected");
            return Err(ServerError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(url = %url, body = %body, "Upload response");
        info!(url = %url, bytes = size, "Upload complete");
        Ok(UploadResponse::from_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_media_kind_routing() {
        assert_eq!(MediaKind::Photo.endpoint(), "/upload");
        assert_eq!(MediaKind::Photo.form_field(), "photo");
        assert_eq!(MediaKind::Video.endpoint(), "/upload-video");
        assert_eq!(MediaKind::Video.form_field(), "video");
        assert_eq!(MediaKind::Video.uploading_message(), "Uploading video...");
    }

    #[test]
    fn test_response_body_parsing() {
        assert_eq!(
            UploadResponse::from_body(r#"{"path":"/uploads/a.webm"}"#.to_string()),
            UploadResponse::Json(serde_json::json!({"path": "/uploads/a.webm"}))
        );
        assert_eq!(
            UploadResponse::from_body("File uploaded".to_string()),
            UploadResponse::Text("File uploaded".to_string())
        );
    }

    #[test]
    fn test_extension() {
        let file = MediaFile::new(vec![], "video.webm", "video/webm");
        assert_eq!(file.extension(), Some("webm"));
        assert_eq!(MediaFile::new(vec![], "blob", "x/y").extension(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        let server = ServerConfig::new("not a url", Duration::from_secs(1));
        assert!(matches!(
            UploadClient::new(&server),
            Err(ServerError::InvalidUrl(_))
        ));
    }
}
