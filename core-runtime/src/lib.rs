//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the performance engine:
//! - Event bus system
//! - Logging and tracing setup
//! - Engine configuration management
//!
//! ## Overview
//!
//! This crate contains the ambient utilities the engine crates depend on. It
//! establishes the logging conventions, event broadcasting mechanism, and
//! the fail-fast configuration builder used to assemble an engine from host
//! collaborators.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use events::EventBus;
