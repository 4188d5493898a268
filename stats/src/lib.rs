//! # Router traffic counters
//!
//! The pure part of cwrouter: turning a router status page into a
//! [`StatsSnapshot`] and computing how much traffic was used between two
//! snapshots.
//!
//! - **`snapshot`**: the counter record with its equality and ordering rules
//! - **`parse`**: extraction of the counters from the status page HTML
//! - **`delta`**: usage between two snapshots, tolerant of counter resets
//!
//! Nothing in this crate performs I/O or logs. Failures are returned as the
//! typed errors in [`error`].

pub mod delta;
pub mod error;
pub mod parse;
pub mod snapshot;

pub use delta::delta;
pub use error::{
    DocumentParseError,
    EmptyStatsError,
    Operand,
};
pub use snapshot::{
    Counter,
    StatsSnapshot,
};
