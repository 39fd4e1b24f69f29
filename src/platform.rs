//! Platform identifiers and user-agent based detection.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Client variant the guide targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Android,
    Ios,
    Windows,
    Tracker,
}

impl PlatformId {
    /// Every platform, in selector order.
    pub const ALL: [PlatformId; 4] = [Self::Android, Self::Ios, Self::Windows, Self::Tracker];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Windows => "windows",
            Self::Tracker => "tracker",
        }
    }
}

impl Default for PlatformId {
    fn default() -> Self {
        Self::Android
    }
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlatformId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "windows" => Ok(Self::Windows),
            "tracker" => Ok(Self::Tracker),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

static ANDROID_UA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)android").expect("static regex"));
static IOS_UA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"iPad|iPhone|iPod").expect("static regex"));
static WINDOWS_UA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Windows NT").expect("static regex"));

/// Map a user-agent string to a platform.
///
/// Total: a missing signal or an unrecognised agent yields Android, the most
/// common client. Tracker is never detected, only selected.
pub fn detect(user_agent: Option<&str>) -> PlatformId {
    let Some(ua) = user_agent else {
        return PlatformId::Android;
    };

    if ANDROID_UA.is_match(ua) {
        PlatformId::Android
    } else if IOS_UA.is_match(ua) {
        PlatformId::Ios
    } else if WINDOWS_UA.is_match(ua) {
        PlatformId::Windows
    } else {
        PlatformId::Android
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_android_case_insensitively() {
        let ua = "Mozilla/5.0 (Linux; ANDROID 14; Pixel 8) AppleWebKit/537.36";
        assert_eq!(detect(Some(ua)), PlatformId::Android);
    }

    #[test]
    fn detects_ios_devices() {
        for ua in [
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)",
            "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X)",
            "Mozilla/5.0 (iPod touch; CPU iPhone OS 12_0 like Mac OS X)",
        ] {
            assert_eq!(detect(Some(ua)), PlatformId::Ios, "{ua}");
        }
    }

    #[test]
    fn detects_windows() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
        assert_eq!(detect(Some(ua)), PlatformId::Windows);
    }

    #[test]
    fn android_wins_over_later_patterns() {
        // Some Android tablets advertise desktop tokens as well.
        let ua = "Mozilla/5.0 (Windows NT 10.0; Android 13)";
        assert_eq!(detect(Some(ua)), PlatformId::Android);
    }

    #[test]
    fn unknown_or_missing_defaults_to_android() {
        assert_eq!(detect(None), PlatformId::Android);
        assert_eq!(detect(Some("")), PlatformId::Android);
        assert_eq!(
            detect(Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0")),
            PlatformId::Android
        );
        // Case matters for the iOS and Windows tokens.
        assert_eq!(detect(Some("windows nt 10.0")), PlatformId::Android);
    }

    #[test]
    fn display_matches_serde() {
        for platform in PlatformId::ALL {
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{platform}\""));
            assert_eq!(platform.as_str().parse::<PlatformId>().unwrap(), platform);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("blackberry".parse::<PlatformId>().is_err());
        assert_eq!(" iOS ".parse::<PlatformId>().unwrap(), PlatformId::Ios);
    }
}
