//! Core systems for Horizon Grid.
//!
//! This crate provides the foundational pieces shared by the grid model:
//!
//! - **Signal/Slot System**: Type-safe change notification ([`Signal`])
//! - **Logging**: `tracing` targets, performance spans and de-duplicated
//!   warnings ([`logging`])
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let height_changed = Signal::<i64>::new();
//!
//! let conn_id = height_changed.connect(|delta| {
//!     println!("Content height changed by {}", delta);
//! });
//!
//! height_changed.emit(48);
//! height_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::SignalError;
pub use logging::{LogOnce, PerfSpan, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
