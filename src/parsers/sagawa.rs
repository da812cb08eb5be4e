//! Sagawa Express tracking page parser
//!
//! The structured layout is one or more `table_basic` tables with three-cell
//! rows: status, date+time in a shared cell, location. Status cells carry
//! decorative flow arrows and location cells trail TEL/FAX annotations, both
//! stripped before storage. Pages without the marker table fall back to a
//! keyword scan over the flattened page text.

use crate::domain::TimelineEntry;
use crate::parsers::{dates, html};

/// Vocabulary that marks a cell or token as a shipping status
const STATUS_KEYWORDS: &[&str] = &[
    "集荷", "輸送中", "配達中", "配達完了", "持戻り", "不在", "保管中", "配送中", "到着", "出荷",
];

const TABLE_CLASS: &str = "table_basic";
const MIN_CELLS: usize = 3;

pub fn parse(page: &str) -> Vec<TimelineEntry> {
    let tables = html::class_blocks(page, "table", TABLE_CLASS);
    if tables.is_empty() {
        return parse_fallback(page);
    }

    let mut entries = Vec::new();
    for table in tables {
        for row in html::tag_contents(table, "tr") {
            let cells: Vec<String> =
                html::tag_contents(row, "td").into_iter().map(html::inner_text).collect();
            if cells.len() < MIN_CELLS {
                continue;
            }

            let status = clean_status(&cells[0]);
            if status.is_empty() || !contains_keyword(&status) {
                continue;
            }

            let date = dates::normalize_date(&cells[1]);
            if date.is_empty() {
                continue;
            }

            let time = dates::find_time(&cells[1]);
            let location = strip_contact_info(&cells[2]);
            entries.push(TimelineEntry { status, date, time, location });
        }
    }
    entries
}

/// Keyword scan over the flattened page text when no structured table is
/// present. Each match consumes a fixed three-token window: status,
/// date/time, location. A match whose following token holds no date is
/// discarded, and the window still advances.
fn parse_fallback(page: &str) -> Vec<TimelineEntry> {
    let text = html::inner_text(page);
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let mut entries = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if !contains_keyword(tokens[i]) {
            i += 1;
            continue;
        }

        let status = clean_status(tokens[i]);
        let (date, time) = match tokens.get(i + 1) {
            Some(next) => (dates::normalize_date(next), dates::find_time(next)),
            None => (String::new(), None),
        };
        let location = tokens.get(i + 2).map(|t| strip_contact_info(t)).unwrap_or_default();

        if !date.is_empty() && !status.is_empty() {
            entries.push(TimelineEntry { status, date, time, location });
        }
        i += 3;
    }
    entries
}

fn contains_keyword(text: &str) -> bool {
    STATUS_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Remove the decorative flow arrows Sagawa puts in status cells
fn clean_status(raw: &str) -> String {
    raw.replace('↓', "").replace('⇒', "").trim().to_string()
}

/// Drop trailing TEL/FAX annotations from a location cell
fn strip_contact_info(raw: &str) -> String {
    let mut text = raw.to_string();
    if let Some(at) = text.find("TEL:") {
        text.truncate(at);
    }
    if let Some(at) = text.find("FAX:") {
        text.truncate(at);
    }
    text.trim().to_string()
}
