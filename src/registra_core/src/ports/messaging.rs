use async_trait::async_trait;
use thiserror::Error;

use crate::events::DomainEvent;

#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

/// Publishing side of the event bus. Delivery is at-least-once, so every
/// subscriber must tolerate duplicates.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError>;
}

#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Name used in logs and dead letters.
    fn name(&self) -> &'static str;

    /// An `Err` asks the bus to redeliver.
    async fn handle(&self, event: DomainEvent) -> Result<(), SubscriberError>;
}
