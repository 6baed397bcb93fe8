//! Configuration module for Courier
//!
//! Handles loading and parsing of `.courier.toml` configuration files
//! with support for environment variable expansion.

mod loader;
mod types;

pub use loader::{load_config, load_from_file, sample_config, ConfigError};
pub use types::{
    CapabilitiesConfig, CourierConfig, DialogueConfig, LlmConfig, MessagingConfig,
    PipelineConfig, SearchConfig, SocialConfig, SourceControlConfig, TransportConfig,
};
pub(crate) use types::default_system_prompt;
