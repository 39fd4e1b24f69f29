//! TAK Guide: client install onboarding and instruction wizards.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod identity;
pub mod notify;
pub mod onboarding;
pub mod platform;
pub mod server;
pub mod store;
pub mod wizard;
