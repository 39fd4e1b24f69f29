//! DownloadService: turns a fetched package into something the user can
//! save or hand to the native client.
//!
//! Failures are reported through the notifier and returned; onboarding and
//! wizard state are never touched from here.

use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ArtifactError;
use crate::identity::IdentityProvider;
use crate::notify::{self, Notifier};
use crate::platform::PlatformId;

use super::fetcher::{ArtifactFetcher, handoff_uri};
use super::model::InstallerArtifact;

/// A package ready for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreparedDownload {
    File {
        title: String,
        filename: String,
        #[serde(serialize_with = "serialize_base64")]
        data: Vec<u8>,
    },
    Handoff {
        title: String,
        url: String,
        handoff_uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
    },
}

fn serialize_base64<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

pub struct DownloadService {
    fetcher: Option<Arc<dyn ArtifactFetcher>>,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    handoff_scheme: String,
}

impl DownloadService {
    pub fn new(
        fetcher: Option<Arc<dyn ArtifactFetcher>>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        handoff_scheme: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            identity,
            notifier,
            handoff_scheme: handoff_scheme.into(),
        }
    }

    /// Fetch and prepare the package for `platform`.
    pub async fn download(&self, platform: PlatformId) -> Result<PreparedDownload, ArtifactError> {
        match self.prepare(platform).await {
            Ok(prepared) => {
                info!(%platform, "Installer package prepared");
                Ok(prepared)
            }
            Err(e) => {
                warn!(%platform, error = %e, "Installer download failed");
                self.notifier.failure(notify::DOWNLOAD_FAILED);
                Err(e)
            }
        }
    }

    async fn prepare(&self, platform: PlatformId) -> Result<PreparedDownload, ArtifactError> {
        let fetcher = self.fetcher.as_ref().ok_or(ArtifactError::NotConfigured)?;
        match fetcher.fetch(platform).await? {
            InstallerArtifact::Inline {
                title,
                filename,
                bytes,
            } => Ok(PreparedDownload::File {
                title,
                filename: self.personalize(&filename),
                data: bytes,
            }),
            InstallerArtifact::Ephemeral {
                title,
                url,
                expires_at,
            } => {
                if expires_at.is_some_and(|at| at <= Utc::now()) {
                    return Err(ArtifactError::Expired { title });
                }
                let handoff_uri = handoff_uri(&self.handoff_scheme, &url)?;
                Ok(PreparedDownload::Handoff {
                    title,
                    url,
                    handoff_uri,
                    expires_at,
                })
            }
        }
    }

    /// Prefix the saved filename with the user's callsign.
    fn personalize(&self, filename: &str) -> String {
        match self.identity.identity() {
            Some(identity) => format!("{}_{filename}", identity.user_id),
            None => filename.to_string(),
        }
    }
}
