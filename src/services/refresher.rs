//! Refresh orchestration
//!
//! Keeps stored deliveries in sync with their carrier pages and detects
//! status transitions worth surfacing. Transition state is not persisted
//! anywhere - it is reconstructed on every refresh by classifying the
//! latest timeline entry before and after the fetch. Persisting a "last
//! notified status" instead would change the repeat-notification semantics.

use crate::domain::{DeliveryId, DeliveryItem, DeliveryStatusType, TimelineEntry, TrackingResult};
use crate::infra::store::DeliveryStore;
use crate::io::client::TrackingClient;
use crate::io::notify::{NotifyEvent, NotifySender};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Cheap to clone: one handle per concurrent refresh task
#[derive(Clone)]
pub struct Refresher {
    store: Arc<dyn DeliveryStore>,
    client: Arc<TrackingClient>,
    /// Absent when transition notifications are gated off
    notify: Option<NotifySender>,
}

impl Refresher {
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        client: Arc<TrackingClient>,
        notify: Option<NotifySender>,
    ) -> Self {
        Self { store, client, notify }
    }

    /// Refresh a single delivery.
    ///
    /// On success the stored timeline is replaced wholesale; on any error it
    /// is left untouched. Fetch-then-persist is strictly sequential.
    pub async fn refresh_one(&self, id: DeliveryId) -> TrackingResult {
        let item = match self.store.get_by_id(id).await {
            Ok(Some(item)) => item,
            Ok(None) => return TrackingResult::Error(format!("delivery {id} not found")),
            Err(e) => return TrackingResult::Error(format!("store read failed: {e:#}")),
        };
        let previous = item.latest_status_type();

        let result = self.client.track(&item.tracking_number, item.carrier).await;

        match &result {
            TrackingResult::Success(timeline) => {
                if let Err(e) = self.store.replace_timeline(id, timeline).await {
                    warn!(id = %id, error = %e, "timeline_persist_failed");
                    return TrackingResult::Error(format!("store write failed: {e:#}"));
                }
                info!(
                    id = %id,
                    tracking_number = %item.tracking_number,
                    entries = timeline.len(),
                    "delivery_refreshed"
                );
                self.detect_transition(&item, previous, timeline.last());
            }
            TrackingResult::Error(message) => {
                warn!(
                    id = %id,
                    tracking_number = %item.tracking_number,
                    error = %message,
                    "delivery_refresh_failed"
                );
            }
        }

        result
    }

    /// Refresh every stored delivery concurrently.
    ///
    /// Each delivery is handled by its own task; one failure never cancels
    /// or affects siblings. The result list completes only when every task
    /// has settled and carries no ordering guarantee - correlate by id, not
    /// position.
    pub async fn refresh_all(&self) -> Vec<(DeliveryId, TrackingResult)> {
        let items = match self.store.get_all().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "store_read_failed");
                return Vec::new();
            }
        };
        info!(deliveries = items.len(), "refresh_all_started");

        let mut tasks = JoinSet::new();
        for item in items {
            let refresher = self.clone();
            tasks.spawn(async move { (item.id, refresher.refresh_one(item.id).await) });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(pair) => results.push(pair),
                Err(e) => warn!(error = %e, "refresh_task_failed"),
            }
        }

        let failed = results.iter().filter(|(_, result)| !result.is_success()).count();
        info!(deliveries = results.len(), failed = failed, "refresh_all_finished");
        results
    }

    /// Compare the classified latest entry from before and after the refresh
    /// and emit at most one event. A first-ever refresh has no previous
    /// entry and never fires; a repeat Delivered classification is not a new
    /// transition.
    fn detect_transition(
        &self,
        item: &DeliveryItem,
        previous: Option<DeliveryStatusType>,
        latest: Option<&TimelineEntry>,
    ) {
        let current = latest.map(TimelineEntry::status_type);
        let (Some(previous), Some(current)) = (previous, current) else {
            return;
        };
        if previous == current {
            return;
        }

        info!(
            id = %item.id,
            from = previous.as_str(),
            to = current.as_str(),
            "status_transition"
        );

        let Some(notify) = &self.notify else {
            return;
        };
        let tracking_number = item.formatted_tracking_number();
        let location = latest.map(|entry| entry.location.clone()).unwrap_or_default();

        if current == DeliveryStatusType::Delivered {
            notify.send(NotifyEvent::Delivered { id: item.id, tracking_number, location });
        } else {
            notify.send(NotifyEvent::StatusChanged {
                id: item.id,
                tracking_number,
                status_label: current.label().to_string(),
                location,
            });
        }
    }
}
