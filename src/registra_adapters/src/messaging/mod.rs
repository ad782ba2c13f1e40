pub mod dead_letter;
pub mod in_memory_event_bus;

pub use dead_letter::{DeadLetter, DeadLetterQueue};
pub use in_memory_event_bus::{DispatcherHandle, EventDispatcher, InMemoryEventBus};
