//! Installer package fetch over HTTP.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ArtifactError;
use crate::platform::PlatformId;

use super::model::{InstallerArtifact, PackageEntry, package_index};

/// Source of installer packages.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, platform: PlatformId) -> Result<InstallerArtifact, ArtifactError>;
}

/// Fetches the package listing from the deployment's package endpoint.
pub struct HttpArtifactFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpArtifactFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ArtifactFetcher for HttpArtifactFetcher {
    async fn fetch(&self, platform: PlatformId) -> Result<InstallerArtifact, ArtifactError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ArtifactError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ArtifactError::Status {
                status: resp.status().as_u16(),
            });
        }

        let entries: Vec<PackageEntry> = resp
            .json()
            .await
            .map_err(|e| ArtifactError::InvalidPayload(e.to_string()))?;
        debug!(count = entries.len(), %platform, "Fetched package listing");

        select_package(entries, platform)
    }
}

/// Pick the platform's entry out of a listing.
pub fn select_package(
    entries: Vec<PackageEntry>,
    platform: PlatformId,
) -> Result<InstallerArtifact, ArtifactError> {
    let entry = entries
        .into_iter()
        .nth(package_index(platform))
        .ok_or_else(|| ArtifactError::Missing {
            platform: platform.to_string(),
        })?;
    InstallerArtifact::try_from(entry)
}

/// URI that hands an ephemeral package link to the native client.
pub fn handoff_uri(scheme: &str, url: &str) -> Result<String, ArtifactError> {
    let uri = reqwest::Url::parse_with_params(&format!("{scheme}://import"), &[("url", url)])
        .map_err(|e| ArtifactError::InvalidPayload(e.to_string()))?;
    Ok(uri.to_string())
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::{Json, Router};

    use super::*;

    fn entry(title: &str) -> PackageEntry {
        PackageEntry {
            title: title.into(),
            filename: format!("{title}.zip"),
            data: Some("data:application/zip;base64,UEsDBA==".into()),
            url: None,
            expires_at: None,
        }
    }

    #[test]
    fn selects_by_platform_index() {
        let listing = vec![entry("atak"), entry("itak"), entry("tracker")];
        let artifact = select_package(listing, PlatformId::Ios).unwrap();
        assert_eq!(artifact.title(), "itak");
    }

    #[test]
    fn short_listing_is_missing() {
        let err = select_package(vec![entry("atak")], PlatformId::Tracker).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { ref platform } if platform == "tracker"));
    }

    #[test]
    fn handoff_uri_encodes_url() {
        let uri = handoff_uri("tak", "https://pkg.test/e?id=a b&x=1").unwrap();
        assert!(uri.starts_with("tak://import?url="));
        assert!(uri.contains("https%3A%2F%2Fpkg.test%2Fe%3Fid%3Da+b%26x%3D1"));
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/packages")
    }

    #[tokio::test]
    async fn fetches_listing_over_http() {
        let app = Router::new().route(
            "/packages",
            get(|| async { Json(vec![entry("atak"), entry("itak")]) }),
        );
        let fetcher = HttpArtifactFetcher::new(serve(app).await);

        let artifact = fetcher.fetch(PlatformId::Android).await.unwrap();
        match artifact {
            InstallerArtifact::Inline { filename, bytes, .. } => {
                assert_eq!(filename, "atak.zip");
                assert_eq!(bytes, b"PK\x03\x04");
            }
            other => panic!("expected inline artifact, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let app = Router::new().route(
            "/packages",
            get(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let fetcher = HttpArtifactFetcher::new(serve(app).await);
        let err = fetcher.fetch(PlatformId::Android).await.unwrap_err();
        assert!(matches!(err, ArtifactError::Status { status: 500 }));
    }
}
