//! Dialogue controller
//!
//! Entry point for one inbound message. Control commands are answered
//! directly; everything else runs Planner, Router and Summarizer in order
//! while the user's session is locked.

use super::planner::Planner;
use super::retry::{RetryExecutor, RetryPolicy};
use super::router::CapabilityRouter;
use super::store::ConversationStore;
use super::summarizer::Summarizer;
use super::types::{TaskRequest, Turn, UserId, NO_ACTION_MESSAGE, RESET_CONFIRMATION};
use crate::capabilities::CapabilityRegistry;
use crate::commands::{self, Input, HELP_TEXT, USAGE_HINT};
use crate::config::{CourierConfig, PipelineConfig};
use crate::llm::{OpenAIModel, SharedModel};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

pub struct DialogueController {
    store: Arc<ConversationStore>,
    registry: Arc<CapabilityRegistry>,
    planner: Planner,
    router: CapabilityRouter,
    summarizer: Summarizer,
    task_timeout: Duration,
}

impl DialogueController {
    pub fn new(
        model: SharedModel,
        registry: Arc<CapabilityRegistry>,
        store: Arc<ConversationStore>,
        config: &PipelineConfig,
    ) -> Self {
        let executor = RetryExecutor::new(RetryPolicy::from_config(config));
        Self {
            planner: Planner::new(model, executor.clone()),
            router: CapabilityRouter::new(registry.clone(), executor),
            summarizer: Summarizer::from_config(config),
            task_timeout: config.task_timeout(),
            store,
            registry,
        }
    }

    /// Build the whole pipeline from configuration
    ///
    /// Fails when the language model cannot be set up. Capabilities without
    /// credentials are left out of the registry.
    pub fn from_config(config: &CourierConfig) -> crate::Result<Self> {
        let model = OpenAIModel::from_config(&config.llm)?;
        let registry = CapabilityRegistry::from_config(&config.capabilities);
        if registry.is_empty() {
            tracing::warn!("no capability providers configured; every task will report no action");
        }
        let store = ConversationStore::with_system_prompt(config.dialogue.system_prompt.clone());
        Ok(Self::new(
            Arc::new(model),
            Arc::new(registry),
            Arc::new(store),
            &config.pipeline,
        ))
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Handle one message and return the reply text
    pub async fn handle(&self, user_id: &UserId, text: &str) -> String {
        match commands::classify(text) {
            Input::Reset => {
                self.store.reset(user_id).await;
                tracing::info!(%user_id, "conversation reset");
                RESET_CONFIRMATION.to_string()
            }
            Input::Help => HELP_TEXT.to_string(),
            Input::Usage => USAGE_HINT.to_string(),
            Input::Task(task) => self.run_task(TaskRequest::new(user_id.clone(), task)).await,
        }
    }

    async fn run_task(&self, request: TaskRequest) -> String {
        let span = tracing::info_span!(
            "task",
            request_id = %request.id,
            user_id = %request.user_id
        );

        async {
            let session = self.store.session(&request.user_id);
            let mut session = session.lock().await;
            session.push(Turn::user(request.text.as_str()));

            let reply = match tokio::time::timeout(self.task_timeout, self.pipeline(&request.text))
                .await
            {
                Ok(reply) => reply,
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = self.task_timeout.as_secs(),
                        "task timed out"
                    );
                    NO_ACTION_MESSAGE.to_string()
                }
            };

            session.push(Turn::assistant(reply.as_str()));
            reply
        }
        .instrument(span)
        .await
    }

    async fn pipeline(&self, task: &str) -> String {
        let plan = self.planner.plan(task, &self.registry).await;
        let outcomes = self.router.dispatch(&plan, task).await;
        self.summarizer.summarize(&outcomes)
    }
}
