//! Carrier page parsers
//!
//! Each carrier publishes tracking data in a different, loosely structured
//! HTML layout with no stable contract. Parsers extract as many valid
//! timeline entries as the page yields and return an empty list when nothing
//! usable is present - malformed rows are skipped, never surfaced as errors.
//!
//! - `html` - tag-level HTML slicing helpers
//! - `dates` - date/time normalization shared by every carrier
//! - `yamato` / `sagawa` / `japan_post` - per-carrier extraction

pub mod dates;
pub mod html;
pub mod japan_post;
pub mod sagawa;
pub mod yamato;

use crate::domain::{Carrier, TimelineEntry};

/// Parse a carrier tracking page into timeline entries, oldest first as
/// emitted by the page. Dispatch is a closed lookup on the carrier tag.
pub fn parse(carrier: Carrier, page: &str) -> Vec<TimelineEntry> {
    match carrier {
        Carrier::Yamato => yamato::parse(page),
        Carrier::Sagawa => sagawa::parse(page),
        Carrier::JapanPost => japan_post::parse(page),
    }
}
