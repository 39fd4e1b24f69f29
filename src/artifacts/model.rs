//! Installer package payloads.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::platform::PlatformId;

/// What the package server hands back for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerArtifact {
    /// Bytes to save directly.
    Inline {
        title: String,
        filename: String,
        bytes: Vec<u8>,
    },
    /// Short-lived link a native client imports itself.
    Ephemeral {
        title: String,
        url: String,
        expires_at: Option<DateTime<Utc>>,
    },
}

impl InstallerArtifact {
    pub fn title(&self) -> &str {
        match self {
            Self::Inline { title, .. } | Self::Ephemeral { title, .. } => title,
        }
    }
}

/// One entry of the package listing, as sent on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    pub title: String,
    #[serde(default)]
    pub filename: String,
    /// `data:<mime>;base64,<payload>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<PackageEntry> for InstallerArtifact {
    type Error = ArtifactError;

    fn try_from(entry: PackageEntry) -> Result<Self, Self::Error> {
        if let Some(data) = entry.data {
            return Ok(Self::Inline {
                title: entry.title,
                filename: entry.filename,
                bytes: decode_data_uri(&data)?,
            });
        }
        if let Some(url) = entry.url {
            return Ok(Self::Ephemeral {
                title: entry.title,
                url,
                expires_at: entry.expires_at,
            });
        }
        Err(ArtifactError::InvalidPayload(format!(
            "package {} has neither data nor url",
            entry.title
        )))
    }
}

/// Position of a platform's package in the server listing.
pub fn package_index(platform: PlatformId) -> usize {
    match platform {
        PlatformId::Android | PlatformId::Windows => 0,
        PlatformId::Ios => 1,
        PlatformId::Tracker => 2,
    }
}

/// Decode a base64 `data:` URI into raw bytes.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ArtifactError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ArtifactError::InvalidPayload("not a data URI".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ArtifactError::InvalidPayload("data URI has no payload".into()))?;
    if !header.ends_with(";base64") {
        return Err(ArtifactError::InvalidPayload(
            "data URI is not base64 encoded".into(),
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ArtifactError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_zip_data_uri() {
        let bytes = decode_data_uri("data:application/zip;base64,UEsDBA==").unwrap();
        assert_eq!(bytes, b"PK\x03\x04");
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("https://example.test/a.zip").is_err());
        assert!(decode_data_uri("data:application/zip;base64,@@@").is_err());
    }

    #[test]
    fn entry_with_url_is_ephemeral() {
        let entry: PackageEntry = serde_json::from_str(
            r#"{"title":"iTAK","url":"https://pkg.test/e/abc","expires_at":"2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let artifact = InstallerArtifact::try_from(entry).unwrap();
        assert!(matches!(artifact, InstallerArtifact::Ephemeral { ref url, expires_at: Some(_), .. } if url.ends_with("/abc")));
    }

    #[test]
    fn empty_entry_is_invalid() {
        let entry = PackageEntry {
            title: "broken".into(),
            filename: String::new(),
            data: None,
            url: None,
            expires_at: None,
        };
        assert!(matches!(
            InstallerArtifact::try_from(entry),
            Err(ArtifactError::InvalidPayload(_))
        ));
    }

    #[test]
    fn package_indices() {
        assert_eq!(package_index(PlatformId::Android), 0);
        assert_eq!(package_index(PlatformId::Ios), 1);
        assert_eq!(package_index(PlatformId::Windows), 0);
        assert_eq!(package_index(PlatformId::Tracker), 2);
    }
}
