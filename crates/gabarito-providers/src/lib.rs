//! gabarito-providers — Vision oracle integrations.
//!
//! Implements the `VisionOracle` trait for Google Gemini (the original
//! deployment's service) and Anthropic, plus a scripted mock for tests.

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod mock;

pub use config::{create_oracle, load_config, load_config_from, GabaritoConfig, OracleConfig};
