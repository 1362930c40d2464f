//! # Configuration
//!
//! Operator-level settings loaded from environment variables.

pub mod controller;

pub use controller::{ControllerConfig, LogFormat};
