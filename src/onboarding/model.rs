//! Onboarding step and catalog models.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::platform::PlatformId;

/// Interactive sub-view embedded in a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmbeddedView {
    /// Link-out to an app store listing.
    StoreLink { url: String, label: String },
}

/// One unit of the onboarding overlay. Identity is `id`, never position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingStep {
    pub id: String,
    /// Localization key of the title.
    pub title: String,
    /// Localization key of the body text.
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<EmbeddedView>,
}

impl OnboardingStep {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            image: image.into(),
            mobile_image: None,
            embedded: None,
        }
    }

    pub fn with_mobile_image(mut self, image: impl Into<String>) -> Self {
        self.mobile_image = Some(image.into());
        self
    }

    pub fn with_embedded(mut self, view: EmbeddedView) -> Self {
        self.embedded = Some(view);
        self
    }

    /// Image to show, preferring the mobile variant on small screens.
    pub fn image_url(&self, mobile: bool) -> &str {
        match (&self.mobile_image, mobile) {
            (Some(m), true) => m,
            _ => &self.image,
        }
    }
}

/// Ordered step lists keyed by platform.
///
/// Construction validates that every platform has at least one step and
/// that ids are unique within a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepCatalog {
    platforms: BTreeMap<PlatformId, Vec<OnboardingStep>>,
}

impl StepCatalog {
    pub fn new(platforms: BTreeMap<PlatformId, Vec<OnboardingStep>>) -> Result<Self, CatalogError> {
        for platform in PlatformId::ALL {
            let steps = platforms.get(&platform).map(Vec::as_slice).unwrap_or(&[]);
            if steps.is_empty() {
                return Err(CatalogError::EmptyPlatform {
                    platform: platform.to_string(),
                });
            }
            let mut seen = HashSet::new();
            for step in steps {
                if !seen.insert(step.id.as_str()) {
                    return Err(CatalogError::DuplicateStep {
                        platform: platform.to_string(),
                        id: step.id.clone(),
                    });
                }
            }
        }
        Ok(Self { platforms })
    }

    /// Wrap platforms already known to be valid.
    pub(crate) fn from_validated(platforms: BTreeMap<PlatformId, Vec<OnboardingStep>>) -> Self {
        Self { platforms }
    }

    /// Parse a JSON object of `{ "<platform>": [step, ...] }`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let platforms: BTreeMap<PlatformId, Vec<OnboardingStep>> = serde_json::from_str(json)?;
        Self::new(platforms)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Steps for a platform, in presentation order. Never empty.
    pub fn steps(&self, platform: PlatformId) -> &[OnboardingStep] {
        self.platforms
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str) -> OnboardingStep {
        OnboardingStep::new(id, "t", "d", "/img.png")
    }

    fn all_platforms(ids: &[&str]) -> BTreeMap<PlatformId, Vec<OnboardingStep>> {
        PlatformId::ALL
            .into_iter()
            .map(|p| (p, ids.iter().map(|id| step(id)).collect()))
            .collect()
    }

    #[test]
    fn accepts_valid_catalog() {
        let catalog = StepCatalog::new(all_platforms(&["a", "b"])).unwrap();
        assert_eq!(catalog.steps(PlatformId::Ios).len(), 2);
    }

    #[test]
    fn rejects_empty_platform() {
        let mut platforms = all_platforms(&["a"]);
        platforms.insert(PlatformId::Tracker, vec![]);
        let err = StepCatalog::new(platforms).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyPlatform { ref platform } if platform == "tracker"));
    }

    #[test]
    fn rejects_missing_platform() {
        let mut platforms = all_platforms(&["a"]);
        platforms.remove(&PlatformId::Windows);
        assert!(StepCatalog::new(platforms).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = StepCatalog::new(all_platforms(&["a", "b", "a"])).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateStep { ref id, .. } if id == "a"));
    }

    #[test]
    fn same_id_on_different_platforms_is_fine() {
        assert!(StepCatalog::new(all_platforms(&["welcome"])).is_ok());
    }

    #[test]
    fn parses_json_catalog() {
        let json = r#"{
            "android": [{"id": "a1", "title": "t", "description": "d", "image": "/a.png",
                         "mobile_image": "/a-m.png",
                         "embedded": {"kind": "store_link", "url": "https://example.test", "label": "get"}}],
            "ios": [{"id": "i1", "title": "t", "description": "d", "image": "/i.png"}],
            "windows": [{"id": "w1", "title": "t", "description": "d", "image": "/w.png"}],
            "tracker": [{"id": "t1", "title": "t", "description": "d", "image": "/t.png"}]
        }"#;
        let catalog = StepCatalog::from_json(json).unwrap();
        let first = &catalog.steps(PlatformId::Android)[0];
        assert_eq!(first.image_url(true), "/a-m.png");
        assert_eq!(first.image_url(false), "/a.png");
        assert!(matches!(first.embedded, Some(EmbeddedView::StoreLink { .. })));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            StepCatalog::from_json("[1, 2]"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn image_url_falls_back_without_mobile_variant() {
        let s = step("a");
        assert_eq!(s.image_url(true), "/img.png");
    }
}
