//! Scripted stand-ins for the model, providers and transport

use crate::capabilities::{Capability, CapabilityProvider};
use crate::llm::{ChatMessage, LanguageModel};
use crate::transport::{ChatTransport, ConversationId, Inbound, TransportError};
use crate::ProviderError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Replies in script order; the last entry repeats
struct Script(Mutex<VecDeque<Result<String, ProviderError>>>);

impl Script {
    fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self(Mutex::new(responses.into()))
    }

    fn next(&self) -> Result<String, ProviderError> {
        let mut queue = self.0.lock();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ProviderError::internal("script is empty")))
        }
    }
}

pub(crate) struct FakeModel {
    script: Script,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeModel {
    pub fn script(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Script::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::script(vec![Ok(text.to_string())])
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::script(vec![Err(error)])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    fn id(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.requests.lock().push(messages.to_vec());
        self.script.next()
    }
}

pub(crate) struct FakeCapability {
    capability: Capability,
    script: Script,
    delay: Duration,
    tasks: Mutex<Vec<String>>,
    attempt_times: Mutex<Vec<Instant>>,
}

impl FakeCapability {
    pub fn script(capability: Capability, responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            capability,
            script: Script::new(responses),
            delay: Duration::ZERO,
            tasks: Mutex::new(Vec::new()),
            attempt_times: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(capability: Capability, text: &str) -> Self {
        Self::script(capability, vec![Ok(text.to_string())])
    }

    pub fn failing(capability: Capability, error: ProviderError) -> Self {
        Self::script(capability, vec![Err(error)])
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempt_times.lock().len()
    }

    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempt_times.lock().clone()
    }

    pub fn tasks(&self) -> Vec<String> {
        self.tasks.lock().clone()
    }
}

#[async_trait]
impl CapabilityProvider for FakeCapability {
    fn capability(&self) -> Capability {
        self.capability
    }

    async fn invoke(&self, task: &str) -> Result<String, ProviderError> {
        self.attempt_times.lock().push(Instant::now());
        self.tasks.lock().push(task.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script.next()
    }
}

/// Hands out scripted batches, then waits forever; records every send
pub(crate) struct RecordingTransport {
    batches: Mutex<VecDeque<Vec<Inbound>>>,
    sent: Mutex<Vec<(ConversationId, String)>>,
    send_attempts: AtomicUsize,
    fail_sends: bool,
    fail_receives: bool,
}

impl RecordingTransport {
    pub fn new(batches: Vec<Vec<Inbound>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            sent: Mutex::new(Vec::new()),
            send_attempts: AtomicUsize::new(0),
            fail_sends: false,
            fail_receives: false,
        }
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn failing_receives(mut self) -> Self {
        self.fail_receives = true;
        self
    }

    pub fn sent(&self) -> Vec<(ConversationId, String)> {
        self.sent.lock().clone()
    }

    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn receive(&self) -> Result<Vec<Inbound>, TransportError> {
        if self.fail_receives {
            return Err(TransportError::Http("connection reset".to_string()));
        }
        let batch = self.batches.lock().pop_front();
        match batch {
            Some(batch) => Ok(batch),
            None => std::future::pending().await,
        }
    }

    async fn send(&self, conversation: &ConversationId, text: &str) -> Result<(), TransportError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_sends {
            return Err(TransportError::Http("connection refused".to_string()));
        }
        self.sent.lock().push((conversation.clone(), text.to_string()));
        Ok(())
    }
}
