//! REST endpoints for the instruction wizards.
//!
//! The `{phase}` segment is the raw route parameter; each request builds a
//! controller over a navigator positioned at that route and reports where
//! the host should navigate.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::controller::WizardController;
use super::phases::{FlowId, InstructionFlow};
use super::router::MemoryNavigator;

/// Shared state for wizard routes.
#[derive(Clone)]
pub struct WizardRouteState {
    pub flows: Arc<HashMap<FlowId, Arc<InstructionFlow>>>,
    pub completion_path: String,
}

impl WizardRouteState {
    /// All shipped flows.
    pub fn builtin(completion_path: impl Into<String>) -> Self {
        let flows = FlowId::ALL
            .into_iter()
            .map(|id| (id, Arc::new(InstructionFlow::builtin(id))))
            .collect();
        Self {
            flows: Arc::new(flows),
            completion_path: completion_path.into(),
        }
    }

    fn controller(&self, flow: &str, phase: &str) -> Result<WizardController, Response> {
        let flow = flow
            .parse::<FlowId>()
            .ok()
            .and_then(|id| self.flows.get(&id).cloned())
            .ok_or_else(|| not_found(format!("unknown instruction flow: {flow}")))?;
        let navigator = Arc::new(MemoryNavigator::at(format!("{}/{}", flow.base_path, phase)));
        Ok(WizardController::new(flow, navigator).with_completion_path(self.completion_path.clone()))
    }
}

fn not_found(message: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn navigate(target: Option<String>) -> Response {
    Json(serde_json::json!({ "navigate": target })).into_response()
}

/// GET /api/wizard/{flow}/{phase}
async fn get_view(
    State(state): State<WizardRouteState>,
    Path((flow, phase)): Path<(String, String)>,
) -> Response {
    match state.controller(&flow, &phase) {
        Ok(c) => match c.view() {
            Some(view) => Json(view).into_response(),
            None => not_found(format!("instruction flow {flow} has no phases")),
        },
        Err(resp) => resp,
    }
}

/// POST /api/wizard/{flow}/{phase}/next
async fn next(
    State(state): State<WizardRouteState>,
    Path((flow, phase)): Path<(String, String)>,
) -> Response {
    match state.controller(&flow, &phase) {
        Ok(c) => navigate(Some(c.next())),
        Err(resp) => resp,
    }
}

/// POST /api/wizard/{flow}/{phase}/previous
///
/// `navigate` is null on the first phase.
async fn previous(
    State(state): State<WizardRouteState>,
    Path((flow, phase)): Path<(String, String)>,
) -> Response {
    match state.controller(&flow, &phase) {
        Ok(c) => navigate(c.previous()),
        Err(resp) => resp,
    }
}

/// POST /api/wizard/{flow}/{phase}/jump/{index}
async fn jump(
    State(state): State<WizardRouteState>,
    Path((flow, phase, index)): Path<(String, String, usize)>,
) -> Response {
    match state.controller(&flow, &phase) {
        Ok(c) => navigate(c.jump_to(index)),
        Err(resp) => resp,
    }
}

/// Build the wizard REST routes.
pub fn wizard_routes(state: WizardRouteState) -> Router {
    Router::new()
        .route("/api/wizard/{flow}/{phase}", get(get_view))
        .route("/api/wizard/{flow}/{phase}/next", post(next))
        .route("/api/wizard/{flow}/{phase}/previous", post(previous))
        .route("/api/wizard/{flow}/{phase}/jump/{index}", post(jump))
        .with_state(state)
}
