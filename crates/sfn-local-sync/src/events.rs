//! Synchronization events for observers.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Where the drain loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrainPhase {
  Scanning,
  Deleting,
  Backoff,
  Done,
}

/// Events emitted during a synchronization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncEvent {
  /// The drain loop entered a phase during pass `pass` (1-based).
  Drain { pass: u32, phase: DrainPhase },

  /// A stale record was deleted.
  Deleted { arn: String },

  /// A target was registered.
  Created { name: String, arn: String },

  /// An identifier was written to the store.
  Published { key: String, arn: String },
}

/// Receives events during synchronization.
pub trait SyncNotifier: Send + Sync {
  fn notify(&self, event: SyncEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl SyncNotifier for NoopNotifier {
  fn notify(&self, _event: SyncEvent) {}
}

/// Sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<SyncEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<SyncEvent>) -> Self {
    Self { sender }
  }
}

impl SyncNotifier for ChannelNotifier {
  fn notify(&self, event: SyncEvent) {
    // Receiver may be gone.
    let _ = self.sender.send(event);
  }
}
