//! OnboardingController: drives the first-run overlay for one mounted UI.
//!
//! Owns derivation only. Durable state lives in the [`ProgressStore`]; the
//! controller mirrors the current platform's record so every transition can
//! be answered without a read, and awaits each write before returning so a
//! later platform change never interleaves with it.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::identity::IdentityProvider;
use crate::notify::{self, Notifier};
use crate::platform::PlatformId;
use crate::store::{IdentityKey, KeyValueStore, ProgressRecord, ProgressStore, SessionSlot};

use super::model::{OnboardingStep, StepCatalog};
use super::state::{
    ImageState, OnboardingPhase, derive_resume_state, first_incomplete, reseek_target,
};

/// External collaborators injected into the controller.
#[derive(Clone)]
pub struct OnboardingDeps {
    pub store: Arc<dyn KeyValueStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub notifier: Arc<dyn Notifier>,
}

/// Result of [`OnboardingController::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// Identity not ready; nothing happened.
    NotReady,
    /// Step recorded, moved on to `step`.
    Advanced { step: usize },
    /// Last step recorded; the overlay closed and the user was notified.
    Finished,
    /// Last step recorded again on an already finished platform.
    AlreadyFinished,
}

/// Serializable snapshot for the host shell.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatus {
    pub phase: OnboardingPhase,
    pub platform: PlatformId,
    pub current_step: usize,
    pub total_steps: usize,
    pub progress: f64,
    pub dialog_open: bool,
    pub finished: bool,
    pub image: ImageState,
    pub image_enlarged: bool,
    pub completed_step_ids: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<OnboardingStep>,
}

/// The onboarding state machine.
pub struct OnboardingController {
    catalog: Arc<StepCatalog>,
    store: ProgressStore,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    identity_key: Option<IdentityKey>,
    platform: PlatformId,
    phase: OnboardingPhase,
    record: ProgressRecord,
    current_step: usize,
    dialog_open: bool,
    image: ImageState,
    image_enlarged: bool,
}

impl OnboardingController {
    /// Create a controller for `platform`. Call [`initialize`](Self::initialize)
    /// once identity may be available.
    pub fn new(catalog: Arc<StepCatalog>, deps: OnboardingDeps, platform: PlatformId) -> Self {
        Self {
            catalog,
            store: ProgressStore::new(deps.store),
            identity: deps.identity,
            notifier: deps.notifier,
            identity_key: None,
            platform,
            phase: OnboardingPhase::Uninitialized,
            record: ProgressRecord::default(),
            current_step: 0,
            dialog_open: false,
            image: ImageState::Loading,
            image_enlarged: false,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn phase(&self) -> OnboardingPhase {
        self.phase
    }

    pub fn platform(&self) -> PlatformId {
        self.platform
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn steps(&self) -> &[OnboardingStep] {
        self.catalog.steps(self.platform)
    }

    /// The step on screen, once initialized.
    pub fn step(&self) -> Option<&OnboardingStep> {
        if !self.phase.is_initialized() {
            return None;
        }
        self.steps().get(self.current_step)
    }

    /// Image of the current step, mobile variant on small screens.
    pub fn image_url(&self, mobile: bool) -> Option<&str> {
        self.step().map(|s| s.image_url(mobile))
    }

    pub fn dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn is_finished(&self) -> bool {
        self.record.finished
    }

    pub fn completed_step_ids(&self) -> &BTreeSet<String> {
        &self.record.completed_step_ids
    }

    pub fn image_state(&self) -> ImageState {
        self.image
    }

    pub fn image_enlarged(&self) -> bool {
        self.image_enlarged
    }

    /// `(current + 1, total)` for the step counter.
    pub fn step_counter(&self) -> (usize, usize) {
        (self.current_step + 1, self.steps().len())
    }

    /// Fraction of the flow reached, in `(0, 1]`.
    pub fn progress(&self) -> f64 {
        let (current, total) = self.step_counter();
        if total == 0 {
            return 0.0;
        }
        current as f64 / total as f64
    }

    pub fn status(&self) -> OnboardingStatus {
        OnboardingStatus {
            phase: self.phase,
            platform: self.platform,
            current_step: self.current_step,
            total_steps: self.steps().len(),
            progress: self.progress(),
            dialog_open: self.dialog_open,
            finished: self.record.finished,
            image: self.image,
            image_enlarged: self.image_enlarged,
            completed_step_ids: self.record.completed_step_ids.clone(),
            step: self.step().cloned(),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Load stored progress and compute the resume point.
    ///
    /// Returns `false` while identity is not ready. Calling again after a
    /// successful initialization is a no-op.
    pub async fn initialize(&mut self) -> bool {
        if self.phase.is_initialized() {
            return true;
        }
        let Some(identity_key) = IdentityKey::from_identity(self.identity.identity().as_ref())
        else {
            debug!("Identity not ready, deferring onboarding initialization");
            return false;
        };

        self.phase = OnboardingPhase::Resuming;

        if let Some(preferred) = self.store.load_platform(&identity_key).await {
            if preferred != self.platform {
                debug!(detected = %self.platform, %preferred, "Using stored platform preference");
                self.platform = preferred;
            }
        }

        let scope = identity_key.scope(self.platform);
        let record = self.store.load(&scope).await;
        let session = self.store.load_session(&scope).await;

        let steps = self.catalog.steps(self.platform);
        let remaining = first_incomplete(steps, &record);
        self.current_step = derive_resume_state(steps, &record, session);
        self.dialog_open = !record.finished && remaining.is_some();
        self.phase = if record.finished {
            OnboardingPhase::Completed
        } else {
            OnboardingPhase::Active
        };
        self.record = record;
        self.identity_key = Some(identity_key);
        self.reset_image();

        info!(
            %scope,
            step = self.current_step,
            completed = self.record.completed_step_ids.len(),
            auto_open = self.dialog_open,
            "Onboarding initialized"
        );

        self.write_session().await;
        true
    }

    /// Drop loaded state and initialize again against the current identity.
    ///
    /// Used when the host reports a different user or deployment.
    pub async fn rebind_identity(&mut self) -> bool {
        self.phase = OnboardingPhase::Uninitialized;
        self.identity_key = None;
        self.record = ProgressRecord::default();
        self.current_step = 0;
        self.dialog_open = false;
        self.reset_image();
        self.initialize().await
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Move to the next step. No-op on the last step.
    pub async fn advance(&mut self) -> bool {
        if !self.ready() || self.current_step + 1 >= self.steps().len() {
            return false;
        }
        self.move_to(self.current_step + 1).await;
        true
    }

    /// Move to the previous step. No-op on step 0.
    pub async fn retreat(&mut self) -> bool {
        if !self.ready() || self.current_step == 0 {
            return false;
        }
        self.move_to(self.current_step - 1).await;
        true
    }

    /// Record the current step as done, then advance or finish.
    pub async fn complete(&mut self) -> CompletionOutcome {
        if !self.ready() {
            return CompletionOutcome::NotReady;
        }
        let Some(scope) = self.scope() else {
            return CompletionOutcome::NotReady;
        };
        let Some(step_id) = self.steps().get(self.current_step).map(|s| s.id.clone()) else {
            return CompletionOutcome::NotReady;
        };

        let newly = self.record.mark_completed(&step_id);
        debug!(step = %step_id, newly, "Onboarding step completed");

        let is_last = self.current_step + 1 == self.steps().len();
        if !is_last {
            // Saves the record along with the new position.
            self.move_to(self.current_step + 1).await;
            return CompletionOutcome::Advanced {
                step: self.current_step,
            };
        }

        let was_finished = self.record.finished;
        self.record.finished = true;
        self.record.last_viewed_step_index = self.current_step;
        self.store.save(&scope, &self.record).await;
        self.phase = OnboardingPhase::Completed;
        self.close();

        if was_finished {
            CompletionOutcome::AlreadyFinished
        } else {
            info!(platform = %self.platform, "Onboarding finished");
            self.notifier.success(notify::ONBOARDING_COMPLETE);
            CompletionOutcome::Finished
        }
    }

    /// Re-point at another platform's steps and its own stored progress.
    ///
    /// A full reset: the step becomes that platform's first incomplete step
    /// (0 if none remain or nothing is stored).
    pub async fn change_platform(&mut self, platform: PlatformId) {
        if platform == self.platform {
            return;
        }
        if self.phase.is_initialized() && !self.ready() {
            debug!(%platform, "Identity no longer ready, ignoring platform change");
            return;
        }
        info!(from = %self.platform, to = %platform, "Onboarding platform changed");
        self.platform = platform;
        self.image_enlarged = false;
        self.reset_image();

        let Some(identity_key) = self.identity_key.clone() else {
            self.current_step = 0;
            return;
        };
        self.store.save_platform(&identity_key, platform).await;

        let scope = identity_key.scope(platform);
        self.record = self.store.load(&scope).await;
        self.current_step = reseek_target(self.steps(), &self.record);
        self.phase = if self.record.finished {
            OnboardingPhase::Completed
        } else {
            OnboardingPhase::Active
        };
        self.write_session().await;
    }

    /// Manual reopen: seek to the first incomplete step (0 if all done) and
    /// show the overlay.
    pub async fn reopen(&mut self) {
        if !self.ready() {
            return;
        }
        let target = reseek_target(self.steps(), &self.record);
        self.move_to(target).await;
        self.dialog_open = true;
    }

    /// Hide the overlay. Recorded progress is untouched.
    pub fn close(&mut self) {
        self.dialog_open = false;
        self.image_enlarged = false;
    }

    // ── Transient image state ───────────────────────────────────────

    pub fn image_loaded(&mut self) {
        self.image = ImageState::Loaded;
    }

    pub fn image_failed(&mut self) {
        self.image = ImageState::Failed;
        self.image_enlarged = false;
    }

    /// Show the enlarged preview. Only possible once the image loaded.
    pub fn enlarge_image(&mut self) -> bool {
        if self.image != ImageState::Loaded {
            return false;
        }
        self.image_enlarged = true;
        true
    }

    pub fn dismiss_enlarged(&mut self) {
        self.image_enlarged = false;
    }

    // ── Internals ───────────────────────────────────────────────────

    /// Initialized, and the provider still reports the identity progress
    /// was loaded for. Otherwise every store access is deferred.
    fn ready(&self) -> bool {
        self.phase.is_initialized() && self.scope().is_some()
    }

    /// Scope for the current platform, re-checked against the provider.
    fn scope(&self) -> Option<crate::store::ScopeKey> {
        let cached = self.identity_key.as_ref()?;
        let live = IdentityKey::from_identity(self.identity.identity().as_ref())?;
        (live == *cached).then(|| cached.scope(self.platform))
    }

    fn reset_image(&mut self) {
        self.image = ImageState::Loading;
        self.image_enlarged = false;
    }

    async fn move_to(&mut self, step: usize) {
        self.current_step = step;
        self.reset_image();
        self.record.last_viewed_step_index = step;
        if let Some(scope) = self.scope() {
            self.store.save(&scope, &self.record).await;
        }
        self.write_session().await;
    }

    async fn write_session(&self) {
        if let Some(scope) = self.scope() {
            self.store
                .save_session(&scope, SessionSlot::at(self.current_step))
                .await;
        }
    }
}
