//! Typed channel for delivery notifications
//!
//! Status transitions are fire-and-forget: the refresher pushes events into
//! a bounded mpsc channel and never awaits delivery. Uses `try_send` - if
//! the channel is full, events are dropped rather than blocking a refresh.

use crate::domain::DeliveryId;
use tokio::sync::{mpsc, watch};
use tracing::info;

/// A user-facing notification event
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyEvent {
    /// The canonical status moved to a new, non-terminal stage
    StatusChanged {
        id: DeliveryId,
        tracking_number: String,
        status_label: String,
        location: String,
    },
    /// The parcel reached its destination
    Delivered { id: DeliveryId, tracking_number: String, location: String },
}

/// Sender handle for notification events
///
/// Clone this to share across refresh tasks. Non-blocking - if the channel
/// is full, events are dropped.
#[derive(Clone)]
pub struct NotifySender {
    tx: mpsc::Sender<NotifyEvent>,
}

impl NotifySender {
    pub fn new(tx: mpsc::Sender<NotifyEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: NotifyEvent) {
        let _ = self.tx.try_send(event);
    }
}

/// Create a new notification channel pair
///
/// Returns (sender, receiver) where the sender can be cloned and shared.
pub fn create_notify_channel(
    buffer_size: usize,
) -> (NotifySender, mpsc::Receiver<NotifyEvent>) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (NotifySender::new(tx), rx)
}

/// Consumes notification events and renders them to the structured log.
/// Stands in for a platform push service at the process boundary.
pub struct NotifyPublisher {
    rx: mpsc::Receiver<NotifyEvent>,
}

impl NotifyPublisher {
    pub fn new(rx: mpsc::Receiver<NotifyEvent>) -> Self {
        Self { rx }
    }

    /// Run until the channel closes or shutdown is signalled
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                event = self.rx.recv() => {
                    match event {
                        Some(event) => publish(&event),
                        None => break,
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

fn publish(event: &NotifyEvent) {
    match event {
        NotifyEvent::StatusChanged { id, tracking_number, status_label, location } => {
            info!(
                id = %id,
                tracking_number = %tracking_number,
                status = %status_label,
                location = %location,
                "delivery_status_changed"
            );
        }
        NotifyEvent::Delivered { id, tracking_number, location } => {
            info!(
                id = %id,
                tracking_number = %tracking_number,
                location = %location,
                "delivery_completed"
            );
        }
    }
}
