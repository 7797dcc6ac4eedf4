//! Binary input events for real-time input pipelines.
//!
//! inputprims frames raw device state changes into self-describing binary
//! events, overlays action notifications on top of state deltas, and moves
//! them through a single-owner queue drained once per update.
//!
//! # Crate Structure
//!
//! - [`event`]: Event header, state delta and action event views, trace streams
//! - [`queue`]: Append-only event queue (behind `queue` feature)

/// Re-export event types.
pub mod event {
    pub use inputprims_event::*;
}

/// Re-export queue types (requires `queue` feature).
#[cfg(feature = "queue")]
pub mod queue {
    pub use inputprims_queue::*;
}
