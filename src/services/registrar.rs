//! Delivery registration
//!
//! An add only succeeds for a tracking number the carrier actually
//! recognizes: the number is normalized and length-checked, then tracked
//! once before anything is inserted.

use crate::domain::{normalize_tracking_number, Carrier, DeliveryId, TrackingResult};
use crate::infra::store::{DeliveryStore, NewDelivery};
use crate::io::client::TrackingClient;
use std::sync::Arc;
use tracing::info;

/// Why an add was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum AddError {
    /// Tracking number length outside the carrier's accepted range
    InvalidLength { carrier: Carrier, length: usize },
    /// Same number already registered for this carrier
    Duplicate { id: DeliveryId },
    /// The initial tracking fetch failed
    Tracking(String),
    Store(String),
}

impl std::fmt::Display for AddError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddError::InvalidLength { carrier, length } => write!(
                f,
                "tracking number length {length} is not valid for {}",
                carrier.display_name()
            ),
            AddError::Duplicate { id } => write!(f, "already registered as delivery {id}"),
            AddError::Tracking(message) => write!(f, "tracking failed: {message}"),
            AddError::Store(message) => write!(f, "store failed: {message}"),
        }
    }
}

impl std::error::Error for AddError {}

pub struct Registrar {
    store: Arc<dyn DeliveryStore>,
    client: Arc<TrackingClient>,
}

impl Registrar {
    pub fn new(store: Arc<dyn DeliveryStore>, client: Arc<TrackingClient>) -> Self {
        Self { store, client }
    }

    /// Validate, track once, then insert with the fetched timeline.
    pub async fn add(
        &self,
        tracking_number: &str,
        carrier: Carrier,
        memo: &str,
    ) -> Result<DeliveryId, AddError> {
        let cleaned = normalize_tracking_number(tracking_number);
        if !carrier.accepts(&cleaned) {
            return Err(AddError::InvalidLength { carrier, length: cleaned.chars().count() });
        }

        match self.store.get_by_tracking_number(&cleaned, carrier).await {
            Ok(Some(existing)) => return Err(AddError::Duplicate { id: existing.id }),
            Ok(None) => {}
            Err(e) => return Err(AddError::Store(format!("{e:#}"))),
        }

        let timeline = match self.client.track(&cleaned, carrier).await {
            TrackingResult::Success(timeline) => timeline,
            TrackingResult::Error(message) => return Err(AddError::Tracking(message)),
        };

        let id = self
            .store
            .insert(NewDelivery {
                tracking_number: cleaned.clone(),
                carrier,
                memo: memo.to_string(),
            })
            .await
            .map_err(|e| AddError::Store(format!("{e:#}")))?;
        self.store
            .replace_timeline(id, &timeline)
            .await
            .map_err(|e| AddError::Store(format!("{e:#}")))?;

        info!(
            id = %id,
            carrier = %carrier,
            tracking_number = %cleaned,
            entries = timeline.len(),
            "delivery_added"
        );
        Ok(id)
    }
}
