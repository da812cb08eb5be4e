//! Tag-level HTML slicing helpers
//!
//! Deliberately naive: carrier tracking pages are loosely structured and
//! often invalid, so these helpers walk raw tag boundaries instead of
//! building a DOM. Tag and attribute matching is ASCII case-insensitive.
//! Nested elements of the same tag are not tracked; the first closing tag
//! wins.

/// Byte offsets of one element occurrence within a document
struct Element {
    start: usize,
    open_end: usize,
    close_start: usize,
    close_end: usize,
}

/// ASCII-only lowercasing. Leaves multi-byte characters untouched so byte
/// offsets into the lowered copy are valid in the original.
fn lowercase_ascii(s: &str) -> String {
    s.chars().map(|c| c.to_ascii_lowercase()).collect()
}

/// Locate the next `<tag ...>...</tag>` occurrence at or after `from`.
fn find_element(lowered: &str, tag: &str, from: usize) -> Option<Element> {
    let open_pat = format!("<{tag}");
    let close_pat = format!("</{tag}");

    let mut at = from;
    loop {
        let start = lowered.get(at..)?.find(&open_pat)? + at;
        let after_name = start + open_pat.len();
        // Reject prefixes of longer tag names, e.g. <td> matching <tdata>
        if lowered.as_bytes().get(after_name).is_some_and(u8::is_ascii_alphanumeric) {
            at = start + 1;
            continue;
        }
        let open_end = lowered[start..].find('>')? + start + 1;
        let close_start = lowered[open_end..].find(&close_pat)? + open_end;
        let close_end = lowered[close_start..].find('>')? + close_start + 1;
        return Some(Element { start, open_end, close_start, close_end });
    }
}

/// Inner HTML of the first `tag` element whose opening-tag attributes
/// mention `class_marker`.
pub fn class_block<'a>(html: &'a str, tag: &str, class_marker: &str) -> Option<&'a str> {
    class_blocks(html, tag, class_marker).into_iter().next()
}

/// Inner HTML of every `tag` element whose opening-tag attributes mention
/// `class_marker`, in document order.
pub fn class_blocks<'a>(html: &'a str, tag: &str, class_marker: &str) -> Vec<&'a str> {
    let lowered = lowercase_ascii(html);
    let marker = lowercase_ascii(class_marker);
    let mut blocks = Vec::new();
    let mut at = 0;
    while let Some(element) = find_element(&lowered, tag, at) {
        if lowered[element.start..element.open_end].contains(&marker) {
            blocks.push(&html[element.open_end..element.close_start]);
            at = element.close_end;
        } else {
            // Step inside unmarked elements so nested marked ones are found
            at = element.open_end;
        }
    }
    blocks
}

/// Inner HTML of each `tag` element, in document order.
pub fn tag_contents<'a>(html: &'a str, tag: &str) -> Vec<&'a str> {
    let lowered = lowercase_ascii(html);
    let mut contents = Vec::new();
    let mut at = 0;
    while let Some(element) = find_element(&lowered, tag, at) {
        contents.push(&html[element.open_end..element.close_start]);
        at = element.close_end;
    }
    contents
}

/// Visible text of an HTML fragment: tags removed, common entities decoded,
/// whitespace collapsed to single spaces, trimmed.
pub fn inner_text(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    collapse_whitespace(&decode_entities(&text))
}

/// Minimal entity decoding for the handful that show up on carrier pages
fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&")
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}
