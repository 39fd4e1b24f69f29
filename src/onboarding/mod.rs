//! Onboarding overlay: per-platform steps the user walks through and
//! checks off, resumable across reloads.
//!
//! Progress is scoped to (deployment, user, platform). Switching platforms
//! swaps in that platform's steps and its own stored progress.

pub mod manager;
pub mod model;
pub mod routes;
pub mod state;
pub mod steps;

pub use manager::{CompletionOutcome, OnboardingController, OnboardingDeps, OnboardingStatus};
pub use model::{EmbeddedView, OnboardingStep, StepCatalog};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::{ImageState, OnboardingPhase, derive_resume_state, first_incomplete, reseek_target};
