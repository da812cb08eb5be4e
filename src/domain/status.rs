//! Canonical delivery lifecycle stages and status-text classification
//!
//! Carrier pages describe the same stage with different wording, so filtering
//! and notification logic never touches the raw status text. Classification
//! is substring containment against fixed keyword groups, checked in
//! declaration order: the first group containing a match wins.

/// Keyword groups, one per canonical stage. Earlier groups take priority
/// when a status string matches more than one.
const RECEIVED_KEYWORDS: &[&str] = &["受付", "引受", "集荷"];
const SENT_KEYWORDS: &[&str] = &["発送", "出荷"];
const IN_TRANSIT_KEYWORDS: &[&str] = &["輸送", "通過", "到着"];
const OUT_FOR_DELIVERY_KEYWORDS: &[&str] =
    &["配達中", "持戻", "不在", "持ち出し", "保管", "配送中"];
const DELIVERED_KEYWORDS: &[&str] = &["配達完了", "お届け済", "完了", "宅配ボックス"];

/// Canonical lifecycle stage of a parcel, ordered by progress.
///
/// Derived from a `TimelineEntry`'s status text on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeliveryStatusType {
    Received,
    Sent,
    InTransit,
    OutForDelivery,
    Delivered,
}

impl DeliveryStatusType {
    /// Classify a carrier-native status string.
    ///
    /// Total over every input: text matching none of the keyword groups is
    /// unknown wording for a parcel that is still moving, so it classifies
    /// as `InTransit`.
    pub fn classify(status: &str) -> DeliveryStatusType {
        const GROUPS: [(&[&str], DeliveryStatusType); 5] = [
            (RECEIVED_KEYWORDS, DeliveryStatusType::Received),
            (SENT_KEYWORDS, DeliveryStatusType::Sent),
            (IN_TRANSIT_KEYWORDS, DeliveryStatusType::InTransit),
            (OUT_FOR_DELIVERY_KEYWORDS, DeliveryStatusType::OutForDelivery),
            (DELIVERED_KEYWORDS, DeliveryStatusType::Delivered),
        ];

        for (keywords, status_type) in GROUPS {
            if keywords.iter().any(|keyword| status.contains(keyword)) {
                return status_type;
            }
        }
        DeliveryStatusType::InTransit
    }

    /// Japanese display label
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatusType::Received => "荷物受付",
            DeliveryStatusType::Sent => "発送済み",
            DeliveryStatusType::InTransit => "輸送中",
            DeliveryStatusType::OutForDelivery => "配達中",
            DeliveryStatusType::Delivered => "配達完了",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatusType::Received => "received",
            DeliveryStatusType::Sent => "sent",
            DeliveryStatusType::InTransit => "in_transit",
            DeliveryStatusType::OutForDelivery => "out_for_delivery",
            DeliveryStatusType::Delivered => "delivered",
        }
    }

    /// Progress through the delivery lifecycle, 0.2 (received) to 1.0 (delivered)
    pub fn progress(&self) -> f32 {
        match self {
            DeliveryStatusType::Received => 0.2,
            DeliveryStatusType::Sent => 0.4,
            DeliveryStatusType::InTransit => 0.6,
            DeliveryStatusType::OutForDelivery => 0.8,
            DeliveryStatusType::Delivered => 1.0,
        }
    }
}
