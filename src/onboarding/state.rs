//! Onboarding state machine: phases and pure resume derivation.

use serde::{Deserialize, Serialize};

use crate::store::{ProgressRecord, SessionSlot};

use super::model::OnboardingStep;

/// Lifecycle of an onboarding controller.
///
/// Uninitialized → Resuming → Active → Completed. `Resuming` only exists
/// while stored progress is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingPhase {
    /// Identity not known yet; nothing is read or written.
    Uninitialized,
    Resuming,
    Active,
    /// The last step of the current platform has been completed.
    Completed,
}

impl OnboardingPhase {
    /// Whether stored progress has been loaded.
    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Active | Self::Completed)
    }
}

impl Default for OnboardingPhase {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl std::fmt::Display for OnboardingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Resuming => "resuming",
            Self::Active => "active",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Load state of the current step's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageState {
    Loading,
    Loaded,
    Failed,
}

impl Default for ImageState {
    fn default() -> Self {
        Self::Loading
    }
}

/// Index of the first step not in `record`, scanning from the start.
///
/// Earlier gaps win even when later steps were completed out of order.
pub fn first_incomplete(steps: &[OnboardingStep], record: &ProgressRecord) -> Option<usize> {
    steps.iter().position(|s| !record.is_completed(&s.id))
}

/// Where a freshly initialized controller should start.
///
/// A stored session index wins if it is in range and its step is still
/// incomplete, even when it lies past the first incomplete step. Otherwise
/// the first incomplete step, or the last step when everything is done.
pub fn derive_resume_state(
    steps: &[OnboardingStep],
    record: &ProgressRecord,
    session: Option<SessionSlot>,
) -> usize {
    let fallback = first_incomplete(steps, record).unwrap_or(steps.len().saturating_sub(1));

    session
        .and_then(|slot| slot.index_within(steps.len()))
        .filter(|&i| !record.is_completed(&steps[i].id))
        .unwrap_or(fallback)
}

/// Where a manual reopen or a platform switch lands: the first incomplete
/// step, or step 0 when everything is done.
pub fn reseek_target(steps: &[OnboardingStep], record: &ProgressRecord) -> usize {
    first_incomplete(steps, record).unwrap_or(0)
}
