//! Capability registry
//!
//! Built once at startup and read-only afterwards.

use super::{
    Capability, GitHubIssues, SharedCapability, TavilySearch, TelegramNotifier, TwitterPoster,
};
use crate::config::CapabilitiesConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry mapping each capability to its provider
#[derive(Default, Clone)]
pub struct CapabilityRegistry {
    providers: HashMap<Capability, SharedCapability>,
}

impl CapabilityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from configuration
    ///
    /// Only providers that are enabled and have credentials are registered.
    pub fn from_config(config: &CapabilitiesConfig) -> Self {
        let mut registry = Self::new();

        if config.search.is_ready() {
            if let Some(provider) = TavilySearch::from_config(&config.search) {
                registry.register(Arc::new(provider));
            }
        }
        if config.source_control.is_ready() {
            if let Some(provider) = GitHubIssues::from_config(&config.source_control) {
                registry.register(Arc::new(provider));
            }
        }
        if config.social.is_ready() {
            if let Some(provider) = TwitterPoster::from_config(&config.social) {
                registry.register(Arc::new(provider));
            }
        }
        if config.messaging.is_ready() {
            if let Some(provider) = TelegramNotifier::from_config(&config.messaging) {
                registry.register(Arc::new(provider));
            }
        }

        registry
    }

    /// Register a provider, replacing any earlier one for the same capability
    pub fn register(&mut self, provider: SharedCapability) {
        self.providers.insert(provider.capability(), provider);
    }

    /// Get the provider for a capability
    pub fn get(&self, capability: Capability) -> Option<SharedCapability> {
        self.providers.get(&capability).cloned()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.providers.contains_key(&capability)
    }

    /// Registered capabilities in stable order
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities: Vec<Capability> = self.providers.keys().copied().collect();
        capabilities.sort();
        capabilities
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}
