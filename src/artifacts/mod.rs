//! Installer packages for the TAK clients.

pub mod download;
pub mod fetcher;
pub mod model;
pub mod routes;

pub use download::{DownloadService, PreparedDownload};
pub use fetcher::{ArtifactFetcher, HttpArtifactFetcher, handoff_uri, select_package};
pub use model::{InstallerArtifact, PackageEntry, decode_data_uri, package_index};
pub use routes::{ArtifactRouteState, artifact_routes};
