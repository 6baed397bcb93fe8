//! Inbound message dispatch
//!
//! Each user gets one worker task fed by an unbounded channel, so messages
//! from the same user are handled in arrival order while different users run
//! concurrently. A worker that stays idle for [`WORKER_IDLE_TIMEOUT`] closes
//! its queue, answers what is left in it and exits; the next message for that
//! user starts a new worker, which waits for the old one first.

use super::controller::DialogueController;
use super::types::UserId;
use crate::commands;
use crate::transport::{ChatTransport, Inbound};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Interim notice sent before a task runs
pub const PROCESSING_NOTICE: &str = "Processing your request...";

/// Pause after a failed receive before polling again
const RECEIVE_ERROR_DELAY: Duration = Duration::from_secs(5);

/// How long a worker waits for its next message before exiting
pub const WORKER_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

struct Worker {
    tx: mpsc::UnboundedSender<Inbound>,
    handle: JoinHandle<()>,
}

pub struct Dispatcher {
    controller: Arc<DialogueController>,
    transport: Arc<dyn ChatTransport>,
    processing_notice: bool,
    workers: HashMap<UserId, Worker>,
}

impl Dispatcher {
    pub fn new(
        controller: Arc<DialogueController>,
        transport: Arc<dyn ChatTransport>,
        processing_notice: bool,
    ) -> Self {
        Self {
            controller,
            transport,
            processing_notice,
            workers: HashMap::new(),
        }
    }

    /// Queue a message on its user's worker
    pub fn dispatch(&mut self, message: Inbound) {
        self.workers.retain(|_, worker| !worker.handle.is_finished());

        let user_id = message.user_id.clone();
        let (message, previous) = match self.workers.remove(&user_id) {
            Some(worker) => match worker.tx.send(message) {
                Ok(()) => {
                    self.workers.insert(user_id, worker);
                    return;
                }
                // Worker went idle and closed its queue
                Err(mpsc::error::SendError(message)) => (message, Some(worker.handle)),
            },
            None => (message, None),
        };

        let worker = self.spawn_worker(&user_id, previous);
        if let Err(err) = worker.tx.send(message) {
            tracing::error!(%user_id, text = %err.0.text, "could not queue message");
        }
        self.workers.insert(user_id, worker);
    }

    /// Workers still running
    pub fn active_workers(&self) -> usize {
        self.workers
            .values()
            .filter(|worker| !worker.handle.is_finished())
            .count()
    }

    fn spawn_worker(&self, user_id: &UserId, previous: Option<JoinHandle<()>>) -> Worker {
        let (tx, mut rx) = mpsc::unbounded_channel::<Inbound>();
        let controller = self.controller.clone();
        let transport = self.transport.clone();
        let processing_notice = self.processing_notice;
        let user = user_id.clone();
        tracing::debug!(%user_id, "starting worker");

        let handle = tokio::spawn(async move {
            // Keep arrival order across a worker restart
            if let Some(previous) = previous {
                if let Err(err) = previous.await {
                    tracing::error!(user_id = %user, error = %err, "previous worker ended abnormally");
                }
            }

            loop {
                match tokio::time::timeout(WORKER_IDLE_TIMEOUT, rx.recv()).await {
                    Ok(Some(message)) => {
                        handle_inbound(&controller, transport.as_ref(), processing_notice, message)
                            .await;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        tracing::debug!(user_id = %user, "worker idle, stopping");
                        rx.close();
                        while let Some(message) = rx.recv().await {
                            handle_inbound(
                                &controller,
                                transport.as_ref(),
                                processing_notice,
                                message,
                            )
                            .await;
                        }
                        break;
                    }
                }
            }
        });
        Worker { tx, handle }
    }

    /// Poll the transport until `shutdown` completes, then drain the workers
    pub async fn run<S>(mut self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let transport = self.transport.clone();
        tokio::pin!(shutdown);
        let mut backoff = false;

        loop {
            if backoff {
                backoff = false;
                tokio::select! {
                    _ = &mut shutdown => {
                        tracing::info!("shutdown requested");
                        break;
                    }
                    _ = tokio::time::sleep(RECEIVE_ERROR_DELAY) => {}
                }
            }

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                batch = transport.receive() => match batch {
                    Ok(messages) => {
                        for message in messages {
                            self.dispatch(message);
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "receive failed");
                        backoff = true;
                    }
                },
            }
        }

        self.finish().await;
    }

    /// Wait for every queued message to be answered
    pub async fn finish(self) {
        let users = self.active_workers();
        for (user_id, worker) in self.workers {
            drop(worker.tx);
            if let Err(err) = worker.handle.await {
                tracing::error!(%user_id, error = %err, "worker ended abnormally");
            }
        }
        tracing::info!(
            users,
            sessions = self.controller.store().len(),
            "dispatcher stopped"
        );
    }
}

/// Answer one message on its conversation
pub async fn handle_inbound(
    controller: &DialogueController,
    transport: &dyn ChatTransport,
    processing_notice: bool,
    message: Inbound,
) {
    if processing_notice && commands::classify(&message.text).is_task() {
        if let Err(err) = transport
            .send(&message.conversation_id, PROCESSING_NOTICE)
            .await
        {
            tracing::error!(conversation = %message.conversation_id, error = %err, "could not send notice");
        }
    }

    let reply = controller.handle(&message.user_id, &message.text).await;
    if let Err(err) = transport.send(&message.conversation_id, &reply).await {
        tracing::error!(conversation = %message.conversation_id, error = %err, "could not send reply");
    }
}
