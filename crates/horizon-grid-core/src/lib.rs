//! Core plumbing for Horizon Grid.
//!
//! This crate provides the table-agnostic building blocks the grid store is
//! made of:
//!
//! - **Signal/Slot System**: Type-safe change notification ([`Signal`])
//! - **Debouncing**: A single-slot coalescing queue driven by explicit instants ([`Debouncer`])
//! - **Cached Projections**: Dirty-flag lazy recompute cells ([`Cached`])
//! - **Logging**: `tracing` target names for filtering ([`logging::targets`])
//!
//! # Signal Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Debounce Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use horizon_grid_core::Debouncer;
//!
//! let start = Instant::now();
//! let mut debouncer = Debouncer::new(Duration::from_millis(10));
//!
//! debouncer.schedule("first", start);
//! debouncer.schedule("second", start + Duration::from_millis(3));
//!
//! assert_eq!(debouncer.take_due(start + Duration::from_millis(10)), None);
//! assert_eq!(debouncer.take_due(start + Duration::from_millis(13)), Some("second"));
//! ```

mod cache;
mod debounce;
pub mod logging;
pub mod signal;

pub use cache::Cached;
pub use debounce::Debouncer;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
