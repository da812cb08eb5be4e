//! Shared types for carrier tracking

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// A parcel shipping company with its own tracking website.
///
/// The set is closed: each variant is bound to a display name, an accepted
/// tracking-number length range, and (in `io::client`) an endpoint request
/// builder and (in `parsers`) a page parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Carrier {
    Yamato,
    Sagawa,
    JapanPost,
}

impl Carrier {
    pub const ALL: [Carrier; 3] = [Carrier::Yamato, Carrier::Sagawa, Carrier::JapanPost];

    /// Customer-facing carrier name
    pub fn display_name(&self) -> &'static str {
        match self {
            Carrier::Yamato => "ヤマト運輸",
            Carrier::Sagawa => "佐川急便",
            Carrier::JapanPost => "日本郵便",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Carrier::Yamato => "yamato",
            Carrier::Sagawa => "sagawa",
            Carrier::JapanPost => "japan_post",
        }
    }

    /// Accepted tracking-number length range, separators removed
    pub fn tracking_number_lengths(&self) -> RangeInclusive<usize> {
        match self {
            Carrier::Yamato => 12..=12,
            Carrier::Sagawa => 12..=12,
            Carrier::JapanPost => 11..=13,
        }
    }

    /// Whether a normalized tracking number has an acceptable length
    pub fn accepts(&self, tracking_number: &str) -> bool {
        self.tracking_number_lengths().contains(&tracking_number.chars().count())
    }

    /// Guess the carrier from the shape of a tracking number.
    ///
    /// Only the international mail format (two letters, nine digits, two
    /// letters) is unambiguous. Domestic 12-digit numbers are used by both
    /// Yamato and Sagawa and yield `None`.
    pub fn from_tracking_number(number: &str) -> Option<Carrier> {
        let cleaned = normalize_tracking_number(number);
        let bytes = cleaned.as_bytes();
        if bytes.len() == 13
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2..11].iter().all(u8::is_ascii_digit)
            && bytes[11..].iter().all(u8::is_ascii_uppercase)
        {
            return Some(Carrier::JapanPost);
        }
        None
    }
}

impl std::str::FromStr for Carrier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yamato" => Ok(Carrier::Yamato),
            "sagawa" => Ok(Carrier::Sagawa),
            "japan-post" | "japan_post" | "japanpost" => Ok(Carrier::JapanPost),
            other => Err(format!("unknown carrier: {other}")),
        }
    }
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip the separators users paste along with tracking numbers.
pub fn normalize_tracking_number(raw: &str) -> String {
    raw.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
}

/// One parsed tracking event.
///
/// `date` is normalized to "M/D" (no year); `time` is "HH:MM" when the page
/// provides one. `status` and `location` stay in the carrier's own wording.
/// Entries are immutable once produced by a parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub location: String,
}

impl TimelineEntry {
    /// Canonical lifecycle stage for this entry, derived on demand
    pub fn status_type(&self) -> crate::domain::DeliveryStatusType {
        crate::domain::DeliveryStatusType::classify(&self.status)
    }
}

/// Outcome of a single tracking fetch. Consumed immediately, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingResult {
    Success(Vec<TimelineEntry>),
    Error(String),
}

impl TrackingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TrackingResult::Success(_))
    }
}
