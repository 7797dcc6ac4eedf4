//! Input event queue.
//!
//! The queue owns one append-only buffer. Producers append events during a
//! tick; the update step drains everything once and reclaims the buffer.
//! Event views borrow the queue, so none can outlive a reclaim.

pub mod config;
pub mod error;
pub mod queue;

pub use config::QueueConfig;
pub use error::{QueueError, Result};
pub use queue::{EventQueue, Events, UpdateStats};
