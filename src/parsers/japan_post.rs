//! Japan Post tracking page parser
//!
//! The structured layout is one or more `tableType01` tables with four-cell
//! rows: status, date, time, office. Pages without the marker table fall
//! back to scanning generic table rows for status vocabulary; in that
//! variant the office name is recovered by its suffix (郵便局, 支店,
//! センター, 局).

use crate::domain::TimelineEntry;
use crate::parsers::{dates, html};
use regex::Regex;
use std::sync::OnceLock;

const STATUS_KEYWORDS: &[&str] = &[
    "引受",
    "到着",
    "発送",
    "通過",
    "配達中",
    "お届け済み",
    "持ち出し中",
    "ご不在のため持ち戻り",
    "保管",
];

const TABLE_CLASS: &str = "tableType01";
const MIN_CELLS: usize = 4;

fn office_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(.+?(?:郵便局|支店|センター|局))").expect("valid regex pattern")
    })
}

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

            let status = cells[0].clone();
            if status.is_empty() {
                continue;
            }

            let date = dates::normalize_date(&cells[1]);
            if date.is_empty() {
                continue;
            }

            let time = (!cells[2].is_empty()).then(|| cells[2].clone());
            entries.push(TimelineEntry { status, date, time, location: cells[3].clone() });
        }
    }
    entries
}

/// Row scan for the page variant without the marker table. A row counts
/// when its text contains status vocabulary; the first matching keyword
/// becomes the status, and date, time, and office are fished out of the
/// row text.
fn parse_fallback(page: &str) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();
    for row in html::tag_contents(page, "tr") {
        if html::tag_contents(row, "td").is_empty() {
            continue;
        }

        let text = html::inner_text(row);
        let Some(status) = STATUS_KEYWORDS.iter().find(|keyword| text.contains(*keyword))
        else {
            continue;
        };

        let date = dates::normalize_date(&text);
        if date.is_empty() {
            continue;
        }

        let location = office_suffix()
            .captures(&text)
            .map(|captures| captures[1].to_string())
            .unwrap_or_default();
        entries.push(TimelineEntry {
            status: (*status).to_string(),
            date,
            time: dates::find_time(&text),
            location,
        });
    }
    entries
}
