//! Task orchestration pipeline
//!
//! One inbound task flows through these stages:
//! - Planner: asks the language model which capabilities the task needs
//! - CapabilityRouter: invokes each planned capability with retries
//! - Summarizer: renders the outcomes into one reply
//!
//! The [`DialogueController`] owns the stages and the per-user
//! [`ConversationStore`]; the [`Dispatcher`] feeds it from a chat transport.
//!
//! # Example
//!
//! ```no_run
//! use courier_core::capabilities::CapabilityRegistry;
//! use courier_core::config::PipelineConfig;
//! use courier_core::llm::OpenAIModel;
//! use courier_core::orchestration::{ConversationStore, DialogueController, UserId};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let model = Arc::new(OpenAIModel::new("sk-...", "gpt-4o-mini"));
//! let controller = DialogueController::new(
//!     model,
//!     Arc::new(CapabilityRegistry::new()),
//!     Arc::new(ConversationStore::new()),
//!     &PipelineConfig::default(),
//! );
//! let reply = controller.handle(&UserId::from("42"), "find today's weather").await;
//! println!("{}", reply);
//! # }
//! ```

mod controller;
mod dispatcher;
mod planner;
mod retry;
mod router;
mod store;
mod summarizer;
mod types;

pub use controller::DialogueController;
pub use dispatcher::{handle_inbound, Dispatcher, PROCESSING_NOTICE};
pub use planner::{build_planner_messages, parse_plan, strip_reasoning, Planner};
pub use retry::{RetryError, RetryExecutor, RetryPolicy};
pub use router::CapabilityRouter;
pub use store::{ConversationStore, SessionHandle, UserSession};
pub use summarizer::{truncate_chars, Summarizer};
pub use types::{
    CapabilityPlan, InvocationOutcome, TaskRequest, Turn, UserId, ANALYSIS_FAILED,
    NO_ACTION_MESSAGE, RESET_CONFIRMATION,
};
