//! Asgard - a launcher for user-authored scripts
//!
//! Discovers scripts under a root folder, counts how often each one is
//! launched, and promotes the busiest ones into a favorites group so they
//! surface first.

pub mod clicks;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod registry;
pub mod scripts;

pub use clicks::{ClickDatabase, ClickStore};
pub use error::{AsgardError, Result};
pub use registry::{LaunchOutcome, ScriptRegistry};
pub use scripts::{Percentile, RegistryView, ScriptFile};
