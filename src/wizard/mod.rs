//! Instruction wizards: route-addressed, unpersisted phase navigation.

pub mod controller;
pub mod phases;
pub mod router;
pub mod routes;

pub use controller::{DEFAULT_COMPLETION_PATH, WizardController, WizardView};
pub use phases::{FlowId, InstructionFlow, WizardPhase};
pub use router::{MemoryNavigator, Navigator};
pub use routes::{WizardRouteState, wizard_routes};
