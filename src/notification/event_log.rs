//! Write-behind event log for committed store changes.
//!
//! The store hands every committed create/transition to an `EventSink`.
//! `FileEventLog` buffers events in a bounded channel and appends them as JSON
//! lines from a background task, so the state machine never waits on disk I/O.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Notification, NotificationStatus};

/// A committed change to a notification record
#[derive(Debug, Clone, Serialize)]
pub struct StoreEvent {
    /// Snapshot after the change
    pub notification: Notification,
    /// Status before the change; `None` for creation
    pub previous_status: Option<NotificationStatus>,
    pub recorded_at: DateTime<Utc>,
}

impl StoreEvent {
    pub fn created(notification: Notification) -> Self {
        Self {
            notification,
            previous_status: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn transitioned(notification: Notification, previous: NotificationStatus) -> Self {
        Self {
            notification,
            previous_status: Some(previous),
            recorded_at: Utc::now(),
        }
    }
}

/// Receiver of committed store changes.
///
/// Called after the record lock is released; implementations must not block.
pub trait EventSink: Send + Sync {
    fn record(&self, event: StoreEvent);
}

/// Append-only JSON lines log fed through a bounded channel
pub struct FileEventLog {
    tx: mpsc::Sender<StoreEvent>,
}

impl FileEventLog {
    /// Start the writer task. Must be called inside a Tokio runtime.
    ///
    /// The task finishes once every `FileEventLog` handle is dropped and the
    /// buffered events are flushed.
    pub fn spawn(path: impl Into<PathBuf>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(write_events(path.into(), rx));
        (Self { tx }, handle)
    }
}

impl EventSink for FileEventLog {
    fn record(&self, event: StoreEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!(error = %e, "Event log buffer unavailable, dropping store event");
        }
    }
}

async fn write_events(path: PathBuf, mut rx: mpsc::Receiver<StoreEvent>) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            tracing::error!(path = %path.display(), error = %e, "Failed to create event log directory");
        }
    }

    let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to open event log, events will be discarded");
            while rx.recv().await.is_some() {}
            return;
        }
    };

    tracing::info!(path = %path.display(), "Event log writer started");

    while let Some(event) = rx.recv().await {
        let mut line = match serde_json::to_vec(&event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize store event");
                continue;
            }
        };
        line.push(b'\n');

        if let Err(e) = file.write_all(&line).await {
            tracing::warn!(
                notification_id = %event.notification.id,
                error = %e,
                "Failed to append store event"
            );
        }
    }

    if let Err(e) = file.flush().await {
        tracing::warn!(error = %e, "Failed to flush event log");
    }
    tracing::info!("Event log writer stopped");
}
