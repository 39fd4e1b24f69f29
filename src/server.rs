//! HTTP assembly: every route group behind one CORS-enabled router.

use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::artifacts::{ArtifactFetcher, ArtifactRouteState, DownloadService, artifact_routes};
use crate::config::GuideConfig;
use crate::error::Error;
use crate::identity::IdentityCell;
use crate::notify::Notifier;
use crate::onboarding::{
    OnboardingController, OnboardingDeps, OnboardingRouteState, StepCatalog, onboarding_routes,
};
use crate::platform::PlatformId;
use crate::store::{KeyValueStore, LibSqlStore};
use crate::wizard::{WizardRouteState, wizard_routes};

/// Everything the router needs from the outside world.
pub struct GuideParts {
    pub catalog: Arc<StepCatalog>,
    pub store: Arc<dyn KeyValueStore>,
    pub identity: Arc<IdentityCell>,
    pub notifier: Arc<dyn Notifier>,
    pub platform: PlatformId,
    pub fetcher: Option<Arc<dyn ArtifactFetcher>>,
    pub handoff_scheme: String,
    pub completion_redirect: String,
}

/// Open the configured database and load the step catalog, falling back to
/// the built-in catalog when no path is set.
pub async fn open_backing(
    config: &GuideConfig,
) -> Result<(Arc<dyn KeyValueStore>, StepCatalog), Error> {
    let store: Arc<dyn KeyValueStore> = Arc::new(LibSqlStore::new_local(&config.db_path).await?);
    let catalog = match &config.catalog_path {
        Some(path) => StepCatalog::from_file(path)?,
        None => StepCatalog::builtin(),
    };
    Ok((store, catalog))
}

/// Build the controller and the full router. The controller is returned so
/// callers can initialize it before serving.
pub fn build_app(parts: GuideParts) -> (Arc<Mutex<OnboardingController>>, Router) {
    let controller = Arc::new(Mutex::new(OnboardingController::new(
        parts.catalog,
        OnboardingDeps {
            store: parts.store,
            identity: parts.identity.clone(),
            notifier: Arc::clone(&parts.notifier),
        },
        parts.platform,
    )));

    let downloads = Arc::new(DownloadService::new(
        parts.fetcher,
        parts.identity.clone(),
        parts.notifier,
        parts.handoff_scheme,
    ));

    let app = onboarding_routes(OnboardingRouteState {
        controller: Arc::clone(&controller),
        identity: parts.identity,
    })
    .merge(wizard_routes(WizardRouteState::builtin(
        parts.completion_redirect,
    )))
    .merge(artifact_routes(ArtifactRouteState { downloads }))
    .layer(CorsLayer::permissive());

    (controller, app)
}
