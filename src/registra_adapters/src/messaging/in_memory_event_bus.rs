use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;

use registra_core::{DomainEvent, EventBusError, EventPublisher, EventSubscriber, EventType};

use crate::config::EventBusSettings;
use crate::messaging::{DeadLetter, DeadLetterQueue};

/// Number of published events whose delivery has not finished yet.
#[derive(Debug, Default)]
struct InFlight {
    count: AtomicUsize,
    drained: Notify,
}

impl InFlight {
    fn begin(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    async fn settled(&self) {
        loop {
            let drained = self.drained.notified();
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            drained.await;
        }
    }
}

/// Publishing half of the in-process event bus.
///
/// Events are queued on an unbounded channel and consumed in FIFO order by a
/// single [`EventDispatcher`] task, so `publish` never waits on subscribers.
#[derive(Debug, Clone)]
pub struct InMemoryEventBus {
    sender: mpsc::UnboundedSender<DomainEvent>,
    in_flight: Arc<InFlight>,
}

impl InMemoryEventBus {
    /// Creates the publisher together with the dispatcher that will drain it.
    /// Subscribers are registered on the dispatcher before it is spawned.
    pub fn channel(settings: &EventBusSettings) -> (Self, EventDispatcher) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let in_flight = Arc::new(InFlight::default());

        let bus = Self {
            sender,
            in_flight: in_flight.clone(),
        };
        let dispatcher = EventDispatcher {
            receiver,
            in_flight,
            subscribers: HashMap::new(),
            max_attempts: settings.max_delivery_attempts.max(1),
            backoff: settings.redelivery_backoff(),
            dead_letters: DeadLetterQueue::new(),
        };
        (bus, dispatcher)
    }

    /// Resolves once every published event, including the ones published by
    /// subscribers while handling, has been delivered or dead-lettered.
    pub async fn settled(&self) {
        self.in_flight.settled().await
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EventPublisher for InMemoryEventBus {
    #[tracing::instrument(name = "InMemoryEventBus::publish", skip_all, fields(event = %event.event_type()))]
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError> {
        self.in_flight.begin();
        if self.sender.send(event).is_err() {
            self.in_flight.finish();
            tracing::error!("Dispatcher is gone, event dropped");
            return Err(EventBusError::Closed);
        }
        Ok(())
    }
}

/// Consuming half of the bus. The subscriber table is fixed once
/// [`EventDispatcher::spawn`] is called.
pub struct EventDispatcher {
    receiver: mpsc::UnboundedReceiver<DomainEvent>,
    in_flight: Arc<InFlight>,
    subscribers: HashMap<EventType, Vec<Arc<dyn EventSubscriber>>>,
    max_attempts: u32,
    backoff: Duration,
    dead_letters: DeadLetterQueue,
}

impl EventDispatcher {
    pub fn subscribe(mut self, event_type: EventType, subscriber: Arc<dyn EventSubscriber>) -> Self {
        tracing::debug!(%event_type, subscriber = subscriber.name(), "Subscribed");
        self.subscribers
            .entry(event_type)
            .or_default()
            .push(subscriber);
        self
    }

    pub fn dead_letters(&self) -> DeadLetterQueue {
        self.dead_letters.clone()
    }

    pub fn spawn(self) -> DispatcherHandle {
        DispatcherHandle {
            task: tokio::spawn(self.run()),
        }
    }

    async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            let subscribers = self
                .subscribers
                .get(&event.event_type())
                .cloned()
                .unwrap_or_default();

            if subscribers.is_empty() {
                tracing::debug!(event = %event.event_type(), "No subscriber for event");
            }
            for subscriber in subscribers {
                self.deliver(subscriber.as_ref(), &event).await;
            }

            self.in_flight.finish();
        }
        tracing::info!("Event bus closed, dispatcher stopping");
    }

    #[tracing::instrument(
        name = "EventDispatcher::deliver",
        skip_all,
        fields(
            event = %event.event_type(),
            auth_id = %event.auth_id(),
            subscriber = subscriber.name()
        )
    )]
    async fn deliver(&self, subscriber: &dyn EventSubscriber, event: &DomainEvent) {
        let mut attempt = 1;
        loop {
            let Err(err) = subscriber.handle(event.clone()).await else {
                return;
            };

            if attempt >= self.max_attempts {
                tracing::error!(error = %err, attempt, "Delivery failed, event dead-lettered");
                self.dead_letters
                    .push(DeadLetter {
                        event: event.clone(),
                        subscriber: subscriber.name(),
                        error: err.to_string(),
                        attempts: attempt,
                        failed_at: Utc::now(),
                    })
                    .await;
                return;
            }

            tracing::warn!(error = %err, attempt, "Delivery failed, redelivering");
            tokio::time::sleep(self.backoff).await;
            attempt += 1;
        }
    }
}

/// Owns the dispatcher task and stops it when dropped.
#[derive(Debug)]
pub struct DispatcherHandle {
    task: JoinHandle<()>,
}

impl DispatcherHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for DispatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
