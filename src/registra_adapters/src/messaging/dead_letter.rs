use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use registra_core::DomainEvent;

/// An event a subscriber kept rejecting after every delivery attempt.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub event: DomainEvent,
    pub subscriber: &'static str,
    pub error: String,
    pub attempts: u32,
    pub failed_at: DateTime<Utc>,
}

/// Parking lot for undeliverable events, kept for inspection and manual
/// replay. Cloning shares the same queue.
#[derive(Debug, Clone, Default)]
pub struct DeadLetterQueue {
    letters: Arc<Mutex<Vec<DeadLetter>>>,
}

impl DeadLetterQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, letter: DeadLetter) {
        self.letters.lock().await.push(letter);
    }

    pub async fn len(&self) -> usize {
        self.letters.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.letters.lock().await.is_empty()
    }

    pub async fn list(&self) -> Vec<DeadLetter> {
        self.letters.lock().await.clone()
    }

    /// Empties the queue, handing back its content.
    pub async fn drain(&self) -> Vec<DeadLetter> {
        std::mem::take(&mut *self.letters.lock().await)
    }
}
