//! REST endpoints driving the onboarding overlay.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::identity::{Identity, IdentityCell};
use crate::platform::PlatformId;

use super::manager::OnboardingController;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub controller: Arc<Mutex<OnboardingController>>,
    pub identity: Arc<IdentityCell>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformRequest {
    pub platform: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageEvent {
    Loaded,
    Failed,
    Enlarge,
    Dismiss,
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub event: ImageEvent,
}

fn bad_request(message: String) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// GET /api/onboarding/status
async fn get_status(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let mut controller = state.controller.lock().await;
    // Identity may have resolved since the last request.
    controller.initialize().await;
    Json(controller.status())
}

/// POST /api/onboarding/advance
async fn advance(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let mut controller = state.controller.lock().await;
    controller.advance().await;
    Json(controller.status())
}

/// POST /api/onboarding/retreat
async fn retreat(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let mut controller = state.controller.lock().await;
    controller.retreat().await;
    Json(controller.status())
}

/// POST /api/onboarding/complete
///
/// Returns the completion outcome alongside the new status.
async fn complete(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let mut controller = state.controller.lock().await;
    let outcome = controller.complete().await;
    Json(serde_json::json!({
        "result": outcome,
        "status": controller.status(),
    }))
}

/// POST /api/onboarding/reopen
async fn reopen(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let mut controller = state.controller.lock().await;
    controller.reopen().await;
    Json(controller.status())
}

/// POST /api/onboarding/close
async fn close(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let mut controller = state.controller.lock().await;
    controller.close();
    Json(controller.status())
}

/// POST /api/onboarding/platform
async fn change_platform(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<PlatformRequest>,
) -> axum::response::Response {
    let platform = match body.platform.parse::<PlatformId>() {
        Ok(p) => p,
        Err(e) => return bad_request(e),
    };
    let mut controller = state.controller.lock().await;
    controller.change_platform(platform).await;
    Json(controller.status()).into_response()
}

/// POST /api/onboarding/image
async fn image_event(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<ImageRequest>,
) -> impl IntoResponse {
    let mut controller = state.controller.lock().await;
    match body.event {
        ImageEvent::Loaded => controller.image_loaded(),
        ImageEvent::Failed => controller.image_failed(),
        ImageEvent::Enlarge => {
            controller.enlarge_image();
        }
        ImageEvent::Dismiss => controller.dismiss_enlarged(),
    }
    Json(controller.status())
}

/// PUT /api/onboarding/identity
///
/// Called once the host resolves the deployment and user. Re-scopes all
/// progress to the new identity.
async fn set_identity(
    State(state): State<OnboardingRouteState>,
    Json(identity): Json<Identity>,
) -> axum::response::Response {
    if !identity.is_complete() {
        return bad_request("deployment_id and user_id are required".to_string());
    }
    state.identity.set(Some(identity));
    let mut controller = state.controller.lock().await;
    controller.rebind_identity().await;
    Json(controller.status()).into_response()
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/advance", post(advance))
        .route("/api/onboarding/retreat", post(retreat))
        .route("/api/onboarding/complete", post(complete))
        .route("/api/onboarding/reopen", post(reopen))
        .route("/api/onboarding/close", post(close))
        .route("/api/onboarding/platform", post(change_platform))
        .route("/api/onboarding/image", post(image_event))
        .route("/api/onboarding/identity", put(set_identity))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::notify::LogNotifier;
    use crate::onboarding::manager::OnboardingDeps;
    use crate::onboarding::model::StepCatalog;
    use crate::store::MemoryStore;

    fn state(identity: Option<Identity>) -> OnboardingRouteState {
        let identity = Arc::new(IdentityCell::new(identity));
        let controller = OnboardingController::new(
            Arc::new(StepCatalog::builtin()),
            OnboardingDeps {
                store: Arc::new(MemoryStore::new()),
                identity: identity.clone(),
                notifier: Arc::new(LogNotifier),
            },
            PlatformId::Android,
        );
        OnboardingRouteState {
            controller: Arc::new(Mutex::new(controller)),
            identity,
        }
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn status_initializes_lazily() {
        let app = onboarding_routes(state(Some(Identity::new("d", "ALPHA-1"))));
        let (status, body) = send(app, "GET", "/api/onboarding/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "active");
        assert_eq!(body["dialog_open"], true);
        assert_eq!(body["total_steps"], 7);
        assert_eq!(body["step"]["id"], "atak-welcome");
    }

    #[tokio::test]
    async fn complete_reports_outcome() {
        let s = state(Some(Identity::new("d", "ALPHA-1")));
        send(onboarding_routes(s.clone()), "GET", "/api/onboarding/status", None).await;
        let (_, body) = send(onboarding_routes(s), "POST", "/api/onboarding/complete", None).await;
        assert_eq!(body["result"]["outcome"], "advanced");
        assert_eq!(body["result"]["step"], 1);
        assert_eq!(body["status"]["current_step"], 1);
    }

    #[tokio::test]
    async fn unknown_platform_is_rejected() {
        let app = onboarding_routes(state(Some(Identity::new("d", "ALPHA-1"))));
        let (status, _) = send(
            app,
            "POST",
            "/api/onboarding/platform",
            Some(r#"{"platform":"symbian"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn identity_put_initializes_deferred_controller() {
        let s = state(None);
        let (_, body) = send(onboarding_routes(s.clone()), "GET", "/api/onboarding/status", None).await;
        assert_eq!(body["phase"], "uninitialized");

        let (status, body) = send(
            onboarding_routes(s),
            "PUT",
            "/api/onboarding/identity",
            Some(r#"{"deployment_id":"d","user_id":"ALPHA-1"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "active");
    }

    #[tokio::test]
    async fn blank_identity_is_rejected() {
        let app = onboarding_routes(state(None));
        let (status, _) = send(
            app,
            "PUT",
            "/api/onboarding/identity",
            Some(r#"{"deployment_id":"d","user_id":" "}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
