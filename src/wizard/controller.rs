//! WizardController: linear navigation over a flow's phases.
//!
//! Holds no position of its own. Every read asks the router for the phase
//! parameter, every move is a navigation.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::phases::{InstructionFlow, WizardPhase};
use super::router::Navigator;

/// Where `next()` on the last phase goes when nothing else is configured.
pub const DEFAULT_COMPLETION_PATH: &str = "/";

/// Snapshot for rendering the wizard chrome.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub flow: String,
    pub index: usize,
    pub total: usize,
    pub progress: f64,
    pub phase: WizardPhase,
    pub is_first: bool,
    pub is_last: bool,
}

pub struct WizardController {
    flow: Arc<InstructionFlow>,
    navigator: Arc<dyn Navigator>,
    completion_path: String,
}

impl WizardController {
    pub fn new(flow: Arc<InstructionFlow>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            flow,
            navigator,
            completion_path: DEFAULT_COMPLETION_PATH.to_string(),
        }
    }

    pub fn with_completion_path(mut self, path: impl Into<String>) -> Self {
        self.completion_path = path.into();
        self
    }

    /// Index of the phase named by the route parameter.
    ///
    /// An absent, unparseable or unknown parameter maps to phase 0.
    pub fn current_index(&self) -> usize {
        let Some(raw) = self.navigator.current_param() else {
            return 0;
        };
        let Ok(id) = raw.trim().parse::<u32>() else {
            debug!(param = %raw, "Unparseable wizard phase, using first phase");
            return 0;
        };
        self.flow
            .phases
            .iter()
            .position(|p| p.id == id)
            .unwrap_or(0)
    }

    /// Go to the next phase, or to the completion path from the last one.
    /// Returns the path navigated to.
    pub fn next(&self) -> String {
        let index = self.current_index();
        let target = if index + 1 < self.flow.len() {
            self.flow.phase_path(index + 1)
        } else {
            None
        }
        .unwrap_or_else(|| self.completion_path.clone());
        self.navigator.navigate(&target);
        target
    }

    /// Go to the previous phase. `None` on the first phase.
    pub fn previous(&self) -> Option<String> {
        let index = self.current_index();
        if index == 0 {
            return None;
        }
        let target = self.flow.phase_path(index - 1)?;
        self.navigator.navigate(&target);
        Some(target)
    }

    /// Go straight to any phase. `None` if `index` is out of range.
    pub fn jump_to(&self, index: usize) -> Option<String> {
        let Some(target) = self.flow.phase_path(index) else {
            warn!(flow = %self.flow.id, index, "Ignoring jump past the last wizard phase");
            return None;
        };
        self.navigator.navigate(&target);
        Some(target)
    }

    /// `(current + 1) / total`.
    pub fn progress(&self) -> f64 {
        if self.flow.is_empty() {
            return 0.0;
        }
        (self.current_index() + 1) as f64 / self.flow.len() as f64
    }

    pub fn view(&self) -> Option<WizardView> {
        let index = self.current_index();
        let phase = self.flow.phases.get(index)?.clone();
        Some(WizardView {
            flow: self.flow.id.to_string(),
            index,
            total: self.flow.len(),
            progress: self.progress(),
            phase,
            is_first: index == 0,
            is_last: index + 1 == self.flow.len(),
        })
    }
}
