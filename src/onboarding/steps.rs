//! Built-in onboarding steps for each client variant.

use std::collections::BTreeMap;

use crate::platform::PlatformId;

use super::model::{EmbeddedView, OnboardingStep, StepCatalog};

const ASSETS: &str = "/ui/tak/assets/Onboarding";

const PLAY_STORE_URL: &str = "https://play.google.com/store/apps/details?id=com.atakmap.app.civ";
const APP_STORE_URL: &str = "https://apps.apple.com/us/app/itak/id1561656396";

fn asset(path: &str) -> String {
    format!("{ASSETS}/{path}")
}

/// Step whose desktop and mobile images are the same file.
fn step(id: &str, title: &str, description: &str, image: &str) -> OnboardingStep {
    OnboardingStep::new(id, title, description, asset(image)).with_mobile_image(asset(image))
}

fn android_steps() -> Vec<OnboardingStep> {
    vec![
        step(
            "atak-welcome",
            "onboarding.android.steps.tak-welcome.title",
            "onboarding.android.steps.tak-welcome.description",
            "WELCOME.png",
        ),
        step(
            "atak-download",
            "onboarding.android.steps.tak-download.title",
            "onboarding.android.steps.tak-download.description",
            "android/tak/atak_install.png",
        )
        .with_embedded(EmbeddedView::StoreLink {
            url: PLAY_STORE_URL.to_string(),
            label: "onboarding.android.downloadFromPlayStore".to_string(),
        }),
        step(
            "atak-return",
            "onboarding.general.steps.return.title",
            "onboarding.general.steps.return.description",
            "RETURN.png",
        ),
        OnboardingStep::new(
            "atak-auto-import",
            "onboarding.android.steps.tak-auto-import.title",
            "onboarding.android.steps.tak-auto-import.description",
            asset("AUTO_IMPORT.png"),
        )
        .with_mobile_image(asset("android/default/auto_connect.png")),
        step(
            "atak-home",
            "onboarding.android.steps.tak-home.title",
            "onboarding.android.steps.tak-home.description",
            "android/tak/atak_home(1).png",
        ),
        step(
            "atak-plugins",
            "onboarding.android.steps.tak-plugins.title",
            "onboarding.android.steps.tak-plugins.description",
            "android/tak/atak_plugins(1).png",
        ),
        step(
            "atak-data-sync",
            "onboarding.android.steps.tak-data-sync.title",
            "onboarding.android.steps.tak-data-sync.description",
            "android/tak/atak_plugin_load.png",
        ),
    ]
}

fn ios_steps() -> Vec<OnboardingStep> {
    vec![
        step(
            "ios-welcome",
            "onboarding.ios.steps.welcome.title",
            "onboarding.ios.steps.welcome.description",
            "WELCOME.png",
        ),
        step(
            "ios-download",
            "onboarding.ios.steps.tak-download.title",
            "onboarding.ios.steps.tak-download.description",
            "ios/download.png",
        )
        .with_embedded(EmbeddedView::StoreLink {
            url: APP_STORE_URL.to_string(),
            label: "onboarding.ios.downloadFromAppStore".to_string(),
        }),
        step(
            "ios-return",
            "onboarding.general.steps.return.title",
            "onboarding.general.steps.return.description",
            "RETURN.png",
        ),
        step(
            "ios-package",
            "onboarding.ios.steps.tak-package.title",
            "onboarding.ios.steps.tak-package.description",
            "ios/package_download.png",
        ),
        step(
            "ios-setup",
            "onboarding.ios.steps.itak-setup.title",
            "onboarding.ios.steps.itak-setup.description",
            "ios/itak_pages.png",
        ),
        step(
            "ios-settings",
            "onboarding.ios.steps.itak-settings.title",
            "onboarding.ios.steps.itak-settings.description",
            "ios/itak_settings.png",
        ),
        step(
            "ios-import",
            "onboarding.ios.steps.itak-import.title",
            "onboarding.ios.steps.itak-import.description",
            "ios/itak_package.png",
        ),
        step(
            "ios-sync1",
            "onboarding.ios.steps.itak-sync1.title",
            "onboarding.ios.steps.itak-sync1.description",
            "ios/itak_sync1.png",
        ),
        step(
            "ios-sync2",
            "onboarding.ios.steps.itak-sync2.title",
            "onboarding.ios.steps.itak-sync2.description",
            "ios/itak_sync2.png",
        ),
    ]
}

fn windows_steps() -> Vec<OnboardingStep> {
    vec![
        step(
            "tak-welcome",
            "onboarding.general.steps.welcome.title",
            "onboarding.general.steps.welcome.description",
            "WELCOME.png",
        ),
        step(
            "windows-import",
            "onboarding.general.steps.install.title",
            "onboarding.wintak.description",
            "general/wintak.png",
        ),
    ]
}

fn tracker_steps() -> Vec<OnboardingStep> {
    vec![
        step(
            "tracker-welcome",
            "onboarding.general.steps.welcome.title",
            "onboarding.general.steps.welcome.description",
            "WELCOME.png",
        ),
        step(
            "tracker-import",
            "onboarding.general.steps.install.title",
            "onboarding.general.steps.install.description",
            "general/download.png",
        ),
    ]
}

impl StepCatalog {
    /// The catalog shipped with the guide.
    pub fn builtin() -> Self {
        let platforms: BTreeMap<PlatformId, Vec<OnboardingStep>> = BTreeMap::from([
            (PlatformId::Android, android_steps()),
            (PlatformId::Ios, ios_steps()),
            (PlatformId::Windows, windows_steps()),
            (PlatformId::Tracker, tracker_steps()),
        ]);
        // Checked by `builtin_catalog_is_valid`.
        Self::from_validated(platforms)
    }
}
