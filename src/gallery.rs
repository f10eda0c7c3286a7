// SPDX-License-Identifier: MPL-2.0

//! Listings of uploaded photos and videos

use crate::config::ServerConfig;
use crate::constants::endpoints;
use crate::errors::ServerError;
use crate::upload::http_client;
use tracing::{error, info};

/// Which gallery to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKind {
    Photos,
    Videos,
}

impl GalleryKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            GalleryKind::Photos => endpoints::PHOTOS,
            GalleryKind::Videos => endpoints::VIDEOS,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GalleryKind::Photos => "Uploaded Photos",
            GalleryKind::Videos => "Uploaded Videos",
        }
    }

    /// URL the media itself is served from
    ///
    /// Photos are served at the listed path; videos through
    /// `/video/<file name>`.
    pub fn media_url(&self, base_url: &str, path: &str) -> String {
        match self {
            GalleryKind::Photos => {
                if path.starts_with('/') {
                    format!("{}{}", base_url, path)
                } else {
                    format!("{}/{}", base_url, path)
                }
            }
            GalleryKind::Videos => {
                format!("{}{}{}", base_url, endpoints::VIDEO_BY_NAME, file_name(path))
            }
        }
    }
}

/// Last `/`-separated segment of a path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// One uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// Path as listed by the server
    pub path: String,
    /// Where the media can be fetched
    pub url: String,
}

impl GalleryItem {
    pub fn name(&self) -> &str {
        file_name(&self.path)
    }
}

/// Fetches gallery listings
#[derive(Debug, Clone)]
pub struct GalleryClient {
    client: reqwest::Client,
    base_url: String,
}

impl GalleryClient {
    pub fn new(server: &ServerConfig) -> Result<Self, ServerError> {
        Ok(Self {
            client: http_client(server)?,
            base_url: server.base_url.clone(),
        })
    }

    pub async fn photos(&self) -> Result<Vec<GalleryItem>, ServerError> {
        self.fetch(GalleryKind::Photos).await
    }

    pub async fn videos(&self) -> Result<Vec<GalleryItem>, ServerError> {
        self.fetch(GalleryKind::Videos).await
    }

    /// GET the listing: a JSON array of path strings
    pub async fn fetch(&self, kind: GalleryKind) -> Result<Vec<GalleryItem>, ServerError> {
        let endpoint = kind.endpoint();
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "Gallery listing failed");
            return Err(ServerError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let paths: Vec<String> = response.json().await?;
        info!(url = %url, count = paths.len(), "Fetched gallery");

        Ok(paths
            .into_iter()
            .map(|path| GalleryItem {
                url: kind.media_url(&self.base_url, &path),
                path,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:5000";

    #[test]
    fn test_photo_url_appends_path() {
        assert_eq!(
            GalleryKind::Photos.media_url(BASE, "/uploads/photo-1.jpg"),
            "http://localhost:5000/uploads/photo-1.jpg"
        );
        assert_eq!(
            GalleryKind::Photos.media_url(BASE, "uploads/photo-1.jpg"),
            "http://localhost:5000/uploads/photo-1.jpg"
        );
    }

    #[test]
    fn test_video_url_uses_file_name() {
        assert_eq!(
            GalleryKind::Videos.media_url(BASE, "uploads/videos/1700000000.webm"),
            "http://localhost:5000/video/1700000000.webm"
        );
        assert_eq!(
            GalleryKind::Videos.media_url(BASE, "clip.webm"),
            "http://localhost:5000/video/clip.webm"
        );
    }

    #[test]
    fn test_item_name() {
        let item = GalleryItem {
            path: "/uploads/a/b.jpg".to_string(),
            url: String::new(),
        };
        assert_eq!(item.name(), "b.jpg");
    }
}
