//! REST endpoint for installer packages.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::platform::PlatformId;

use super::download::DownloadService;

#[derive(Clone)]
pub struct ArtifactRouteState {
    pub downloads: Arc<DownloadService>,
}

/// GET /api/artifacts/{platform}
async fn get_artifact(
    State(state): State<ArtifactRouteState>,
    Path(platform): Path<String>,
) -> Response {
    let platform = match platform.parse::<PlatformId>() {
        Ok(p) => p,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": e })))
                .into_response();
        }
    };
    match state.downloads.download(platform).await {
        Ok(prepared) => Json(prepared).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub fn artifact_routes(state: ArtifactRouteState) -> Router {
    Router::new()
        .route("/api/artifacts/{platform}", get(get_artifact))
        .with_state(state)
}
