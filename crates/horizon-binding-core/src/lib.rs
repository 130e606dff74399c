//! Core systems for Horizon Binding.
//!
//! This crate provides the foundational components the binding layer is
//! built on:
//!
//! - **Signal/Slot System**: Type-safe, synchronous change notification
//! - **Logging**: Tracing targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_binding_core::Signal;
//!
//! // Create a signal that notifies when a row changes
//! let row_changed = Signal::<usize>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = row_changed.connect(|row| {
//!     println!("Row {} changed", row);
//! });
//!
//! // Emit the signal
//! row_changed.emit(3);
//!
//! // Disconnect when done
//! row_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal, SignalError};
