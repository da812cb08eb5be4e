//! Delivery aggregate - one tracked parcel and its timeline

use crate::domain::status::DeliveryStatusType;
use crate::domain::types::{normalize_tracking_number, Carrier, TimelineEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Newtype wrapper for delivery ids to provide type safety
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct DeliveryId(pub i64);

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked parcel.
///
/// The timeline is replaced wholesale by a successful refresh or left
/// untouched; it is never partially updated. An empty timeline means the
/// carrier has not reported anything yet.
#[derive(Debug, Clone)]
pub struct DeliveryItem {
    pub id: DeliveryId,
    pub tracking_number: String,
    pub carrier: Carrier,
    pub timeline: Vec<TimelineEntry>,
    pub registered_at: DateTime<Utc>,
    pub memo: String,
}

impl DeliveryItem {
    /// Most recent tracking event, if any
    pub fn latest_entry(&self) -> Option<&TimelineEntry> {
        self.timeline.last()
    }

    /// Canonical stage of the most recent event
    pub fn latest_status_type(&self) -> Option<DeliveryStatusType> {
        self.latest_entry().map(TimelineEntry::status_type)
    }

    pub fn is_delivered(&self) -> bool {
        self.latest_status_type() == Some(DeliveryStatusType::Delivered)
    }

    /// Domestic 12-digit numbers display as XXXX-XXXX-XXXX; everything else
    /// is shown as entered.
    pub fn formatted_tracking_number(&self) -> String {
        let cleaned = normalize_tracking_number(&self.tracking_number);
        if cleaned.len() == 12 && cleaned.bytes().all(|b| b.is_ascii_digit()) {
            format!("{}-{}-{}", &cleaned[0..4], &cleaned[4..8], &cleaned[8..12])
        } else {
            self.tracking_number.clone()
        }
    }
}
