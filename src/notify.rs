//! User-facing toast notifications.

use tracing::{info, warn};

/// Localization key shown when onboarding finishes.
pub const ONBOARDING_COMPLETE: &str = "onboarding.completion";
/// Localization key shown when an installer download fails.
pub const DOWNLOAD_FAILED: &str = "download.failed";

/// One-shot toast sink provided by the host shell.
pub trait Notifier: Send + Sync {
    fn success(&self, message_key: &str);
    fn failure(&self, message_key: &str);
}

/// Notifier that only writes to the log. Used when no host toast sink exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message_key: &str) {
        info!(toast = message_key, "Success notification");
    }

    fn failure(&self, message_key: &str) {
        warn!(toast = message_key, "Failure notification");
    }
}
