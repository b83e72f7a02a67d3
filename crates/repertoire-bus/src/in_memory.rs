//! In-process message bus.
//!
//! One unbounded `tokio::sync::mpsc` channel per registered queue. Starting
//! the bus spawns a dispatch loop per queue that fans each message out to
//! the handlers subscribed to its topic, running them on a bounded worker
//! pool. A handler that fails with a transient error gets the message again
//! after a delay, up to `max_deliveries` attempts. Any other error drops the
//! message for that handler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use repertoire_core::error::DomainError;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::bus::MessageBus;
use crate::handler::MessageHandler;
use crate::message::Message;
use crate::topic::TopicRegistry;

/// Runtime settings for [`InMemoryBus`].
#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    /// Maximum concurrently running handlers per queue.
    pub workers_per_queue: usize,
    /// Delivery attempts per handler before a message is dropped.
    pub max_deliveries: u32,
    /// Pause before a failed message is redelivered.
    pub redelivery_delay: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            workers_per_queue: 4,
            max_deliveries: 5,
            redelivery_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug)]
struct Delivery {
    message: Message,
    /// Set on redelivery so only the handler that failed runs again.
    target: Option<&'static str>,
    attempt: u32,
}

type QueueReceivers = HashMap<String, mpsc::UnboundedReceiver<Delivery>>;

/// Channel-backed [`MessageBus`] with a worker-pool dispatcher.
#[derive(Debug)]
pub struct InMemoryBus {
    registry: Arc<TopicRegistry>,
    senders: HashMap<String, mpsc::UnboundedSender<Delivery>>,
    receivers: Mutex<Option<QueueReceivers>>,
}

impl InMemoryBus {
    /// Creates one channel per queue in `registry`.
    #[must_use]
    pub fn new(registry: Arc<TopicRegistry>) -> Self {
        let mut senders = HashMap::new();
        let mut receivers = HashMap::new();
        for queue in registry.queues() {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.insert(queue.to_owned(), tx);
            receivers.insert(queue.to_owned(), rx);
        }
        Self {
            registry,
            senders,
            receivers: Mutex::new(Some(receivers)),
        }
    }

    /// Spawns the dispatch loops. Can be called once per bus.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownTopic` if a handler subscribes to a topic
    /// the registry does not route, or `DomainError::Infrastructure` if the
    /// bus was already started.
    pub fn start(
        &self,
        handlers: Vec<Arc<dyn MessageHandler>>,
        config: BusConfig,
    ) -> Result<BusHandle, DomainError> {
        let mut by_queue: HashMap<String, Vec<Arc<dyn MessageHandler>>> = HashMap::new();
        for handler in handlers {
            let queue = self.registry.queue_for(handler.topic())?;
            by_queue.entry(queue.to_owned()).or_default().push(handler);
        }

        let receivers = self
            .receivers
            .lock()
            .map_err(|_| DomainError::Infrastructure("bus state poisoned".into()))?
            .take()
            .ok_or_else(|| DomainError::Infrastructure("bus already started".into()))?;

        let token = CancellationToken::new();
        let mut tasks = Vec::with_capacity(receivers.len());
        for (queue, receiver) in receivers {
            let Some(sender) = self.senders.get(&queue).cloned() else {
                continue;
            };
            let worker = QueueWorker {
                handlers: Arc::new(by_queue.remove(&queue).unwrap_or_default()),
                sender,
                pool: Arc::new(Semaphore::new(config.workers_per_queue.max(1))),
                config,
                queue,
            };
            tasks.push(tokio::spawn(worker.run(receiver, token.clone())));
        }

        Ok(BusHandle { token, tasks })
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn send(&self, queue: &str, message: Message) -> Result<(), DomainError> {
        let sender = self
            .senders
            .get(queue)
            .ok_or_else(|| DomainError::Infrastructure(format!("no such queue: {queue}")))?;
        sender
            .send(Delivery {
                message,
                target: None,
                attempt: 1,
            })
            .map_err(|_| DomainError::Infrastructure(format!("queue closed: {queue}")))
    }
}

/// Handle to a started bus.
#[derive(Debug)]
pub struct BusHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl BusHandle {
    /// Stops accepting deliveries and waits for the dispatch loops to exit.
    /// Handlers already running finish on their own.
    pub async fn shutdown(self) {
        self.token.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

struct QueueWorker {
    queue: String,
    handlers: Arc<Vec<Arc<dyn MessageHandler>>>,
    sender: mpsc::UnboundedSender<Delivery>,
    pool: Arc<Semaphore>,
    config: BusConfig,
}

impl QueueWorker {
    async fn run(self, mut receiver: mpsc::UnboundedReceiver<Delivery>, token: CancellationToken) {
        loop {
            let delivery = tokio::select! {
                () = token.cancelled() => break,
                next = receiver.recv() => match next {
                    Some(delivery) => delivery,
                    None => break,
                },
            };

            let targets: Vec<Arc<dyn MessageHandler>> = self
                .handlers
                .iter()
                .filter(|h| h.topic() == delivery.message.topic)
                .filter(|h| delivery.target.is_none_or(|name| name == h.name()))
                .cloned()
                .collect();

            if targets.is_empty() {
                debug!(
                    queue = %self.queue,
                    topic = %delivery.message.topic,
                    message_id = %delivery.message.id,
                    "no subscriber for message"
                );
                continue;
            }

            for handler in targets {
                let Ok(permit) = self.pool.clone().acquire_owned().await else {
                    return;
                };
                let message = delivery.message.clone();
                let attempt = delivery.attempt;
                let sender = self.sender.clone();
                let config = self.config;

                tokio::spawn(async move {
                    let result = handler.handle(&message).await;
                    drop(permit);

                    let Err(err) = result else {
                        debug!(handler = handler.name(), message_id = %message.id, attempt, "message handled");
                        return;
                    };

                    if !err.is_transient() {
                        error!(
                            handler = handler.name(),
                            message_id = %message.id,
                            attempt,
                            error = %err,
                            "dropping message after non-retryable error"
                        );
                        return;
                    }

                    if attempt >= config.max_deliveries {
                        error!(
                            handler = handler.name(),
                            message_id = %message.id,
                            attempt,
                            error = %err,
                            "giving up on message"
                        );
                        return;
                    }

                    warn!(
                        handler = handler.name(),
                        message_id = %message.id,
                        attempt,
                        error = %err,
                        "handler failed, scheduling redelivery"
                    );
                    tokio::time::sleep(config.redelivery_delay).await;
                    let message_id = message.id;
                    let redelivery = Delivery {
                        message,
                        target: Some(handler.name()),
                        attempt: attempt + 1,
                    };
                    if sender.send(redelivery).is_err() {
                        warn!(
                            handler = handler.name(),
                            %message_id,
                            attempt,
                            "queue closed, redelivery lost"
                        );
                    }
                });
            }
        }
    }
}
