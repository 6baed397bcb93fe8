//! Capability router
//!
//! Invokes each planned capability through the retry executor and records
//! one outcome per invocation, in plan order.

use super::retry::RetryExecutor;
use super::types::{CapabilityPlan, InvocationOutcome};
use crate::capabilities::CapabilityRegistry;
use futures::future::join_all;
use std::sync::Arc;

pub struct CapabilityRouter {
    registry: Arc<CapabilityRegistry>,
    executor: RetryExecutor,
}

impl CapabilityRouter {
    pub fn new(registry: Arc<CapabilityRegistry>, executor: RetryExecutor) -> Self {
        Self { registry, executor }
    }

    /// Run every capability of `plan` against `task`
    ///
    /// A failing invocation never stops the others.
    pub async fn dispatch(&self, plan: &CapabilityPlan, task: &str) -> Vec<InvocationOutcome> {
        let invocations = plan
            .capabilities
            .iter()
            .filter_map(|&capability| match self.registry.get(capability) {
                Some(provider) => Some((capability, provider)),
                None => {
                    tracing::warn!(%capability, "no provider registered, skipping");
                    None
                }
            })
            .map(|(capability, provider)| async move {
                match self
                    .executor
                    .run(capability.as_str(), || provider.invoke(task))
                    .await
                {
                    Ok(text) => {
                        tracing::info!(%capability, "capability succeeded");
                        InvocationOutcome::success(capability, text)
                    }
                    Err(err) => {
                        tracing::warn!(%capability, attempts = err.attempts, error = %err.last, "capability failed");
                        InvocationOutcome::failure(capability, err.last.to_string())
                    }
                }
            });

        join_all(invocations).await
    }
}
