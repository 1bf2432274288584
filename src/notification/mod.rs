//! Notification records, their store, and the dispatch state machine.
//!
//! # State machine
//!
//! ```text
//! queued --> processing --> sent
//!                      \--> failed
//! ```
//!
//! `NotificationStore::transition` is the only way to change a status and checks
//! every move against `NotificationStatus::successors`. `DispatchProcessor`
//! drives a record through the machine exactly once.

mod dispatcher;
mod event_log;
mod store;
mod types;

pub use dispatcher::{
    DispatchError, DispatchProcessor, DispatcherStats, DispatcherStatsSnapshot, ProcessOutcome,
};
pub use event_log::{EventSink, FileEventLog, StoreEvent};
pub use store::{NotificationStore, StatusCounts, StoreError};
pub use types::{Channel, Notification, NotificationStatus};
