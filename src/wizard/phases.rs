//! Instruction flows and their ordered phases.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One route-addressed unit of an instruction flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardPhase {
    pub id: u32,
    /// Localization key.
    pub title: String,
}

/// Which client an instruction flow walks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowId {
    Android,
    Ios,
    Windows,
}

impl FlowId {
    pub const ALL: [FlowId; 3] = [FlowId::Android, FlowId::Ios, FlowId::Windows];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Windows => "windows",
        }
    }

    fn phase_count(&self) -> u32 {
        match self {
            Self::Android | Self::Ios => 5,
            Self::Windows => 4,
        }
    }
}

impl std::fmt::Display for FlowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "windows" => Ok(Self::Windows),
            other => Err(format!("unknown instruction flow: {other}")),
        }
    }
}

/// Fixed phase list plus the route prefix its phases live under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionFlow {
    pub id: FlowId,
    pub base_path: String,
    pub phases: Vec<WizardPhase>,
}

impl InstructionFlow {
    /// The shipped flow for `id`: phases `1..=N` under `/<id>`.
    pub fn builtin(id: FlowId) -> Self {
        let phases = (1..=id.phase_count())
            .map(|n| WizardPhase {
                id: n,
                title: format!("tabs.{id}.wizard_title.phase{n}"),
            })
            .collect();
        Self {
            id,
            base_path: format!("/{id}"),
            phases,
        }
    }

    /// Route of the phase at `index`.
    pub fn phase_path(&self, index: usize) -> Option<String> {
        self.phases
            .get(index)
            .map(|p| format!("{}/{}", self.base_path, p.id))
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_phase_counts() {
        assert_eq!(InstructionFlow::builtin(FlowId::Android).len(), 5);
        assert_eq!(InstructionFlow::builtin(FlowId::Ios).len(), 5);
        assert_eq!(InstructionFlow::builtin(FlowId::Windows).len(), 4);
    }

    #[test]
    fn phase_paths_and_titles() {
        let flow = InstructionFlow::builtin(FlowId::Windows);
        assert_eq!(flow.phase_path(0).as_deref(), Some("/windows/1"));
        assert_eq!(flow.phase_path(3).as_deref(), Some("/windows/4"));
        assert!(flow.phase_path(4).is_none());
        assert_eq!(flow.phases[1].title, "tabs.windows.wizard_title.phase2");
    }

    #[test]
    fn flow_id_parsing() {
        assert_eq!("iOS".parse::<FlowId>(), Ok(FlowId::Ios));
        assert!("tracker".parse::<FlowId>().is_err());
    }
}
