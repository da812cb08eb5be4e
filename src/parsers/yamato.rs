//! Yamato Transport tracking page parser
//!
//! The page wraps the current parcel's timeline in a single
//! `tracking-invoice-block-detail` block; any later blocks belong to other
//! invoices and are ignored. Within the block each event is a four-cell
//! table row: status, date, time, location. Rows whose status contains a
//! full-width colon are sub-label rows, not status rows.

use crate::domain::TimelineEntry;
use crate::parsers::{dates, html};

const DETAIL_BLOCK_CLASS: &str = "tracking-invoice-block-detail";
const MIN_CELLS: usize = 4;

pub fn parse(page: &str) -> Vec<TimelineEntry> {
    let Some(block) = html::class_block(page, "div", DETAIL_BLOCK_CLASS) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for row in html::tag_contents(block, "tr") {
        let cells: Vec<String> =
            html::tag_contents(row, "td").into_iter().map(html::inner_text).collect();
        if cells.len() < MIN_CELLS {
            continue;
        }

        let status = cells[0].clone();
        if status.is_empty() || status.contains('：') {
            continue;
        }

        let date = dates::normalize_date(&cells[1]);
        if date.is_empty() {
            continue;
        }

        let time = (!cells[2].is_empty()).then(|| cells[2].clone());
        entries.push(TimelineEntry { status, date, time, location: cells[3].clone() });
    }
    entries
}
