//! Raw table markup → rectangular text grid
//!
//! Two input dialects reach the extractor: markdown pipe tables (LLM output and
//! most splitter output) and HTML tables kept from the source document. Both
//! are reduced to the same padded grid of trimmed strings.

use crate::error::ExtractorError;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

/// Rows of cell text, padded to equal width
pub type RawGrid = Vec<Vec<String>>;

/// Upper bound for colspan/rowspan attributes
const MAX_SPAN: usize = 1000;

static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").expect("valid regex"));
static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("valid regex"));
static CELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<t[dh]\b([^>]*)>(.*?)</t[dh]\s*>").expect("valid regex")
});
static COLSPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bcolspan\s*=\s*["']?(\d+)"#).expect("valid regex"));
static ROWSPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\browspan\s*=\s*["']?(\d+)"#).expect("valid regex"));
static BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// Parse the first table in `text`, HTML or markdown
pub fn parse_table(text: &str) -> Result<RawGrid, ExtractorError> {
    let grid = if looks_like_html(text) {
        parse_html_table(text)
    } else {
        parse_markdown_table(text)
    };
    grid.ok_or_else(|| ExtractorError::TableParse("no table found in markup".to_string()))
}

/// Whether the text carries an HTML table
pub fn looks_like_html(text: &str) -> bool {
    text.to_ascii_lowercase().contains("<table")
}

/// Parse the first markdown pipe table
pub fn parse_markdown_table(text: &str) -> Option<RawGrid> {
    let mut rows: RawGrid = Vec::new();
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<String> = None;

    for event in Parser::new_ext(text, Options::ENABLE_TABLES) {
        match event {
            Event::End(TagEnd::Table) => break,
            Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => row = Some(Vec::new()),
            Event::End(TagEnd::TableHead) | Event::End(TagEnd::TableRow) => {
                if let Some(r) = row.take() {
                    rows.push(r);
                }
            }
            Event::Start(Tag::TableCell) => cell = Some(String::new()),
            Event::End(TagEnd::TableCell) => {
                if let (Some(c), Some(r)) = (cell.take(), row.as_mut()) {
                    r.push(collapse_whitespace(&c));
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some(c) = cell.as_mut() {
                    c.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(c) = cell.as_mut() {
                    c.push(' ');
                }
            }
            Event::Html(t) | Event::InlineHtml(t) => {
                if let Some(c) = cell.as_mut() {
                    if BREAK_RE.is_match(&t) {
                        c.push(' ');
                    }
                }
            }
            _ => {}
        }
    }

    pad(rows)
}

/// Parse the first HTML table, expanding colspan/rowspan by duplication
pub fn parse_html_table(text: &str) -> Option<RawGrid> {
    let table = TABLE_RE.captures(text)?.get(1)?.as_str();

    let mut rows: RawGrid = Vec::new();
    // Per column: (rows still covered, text) of an open rowspan
    let mut pending: Vec<Option<(usize, String)>> = Vec::new();

    for row_cap in ROW_RE.captures_iter(table) {
        let mut row = Vec::new();
        let mut cells = CELL_RE.captures_iter(&row_cap[1]);
        let mut col = 0;

        loop {
            if let Some(slot) = pending.get_mut(col) {
                if let Some((remaining, text)) = slot.take() {
                    row.push(text.clone());
                    if remaining > 1 {
                        *slot = Some((remaining - 1, text));
                    }
                    col += 1;
                    continue;
                }
            }

            let Some(cell) = cells.next() else { break };
            let attrs = &cell[1];
            let text = clean_html_text(&cell[2]);
            let colspan = span(&COLSPAN_RE, attrs);
            let rowspan = span(&ROWSPAN_RE, attrs);

            for _ in 0..colspan {
                if pending.len() <= col {
                    pending.resize(col + 1, None);
                }
                if rowspan > 1 {
                    pending[col] = Some((rowspan - 1, text.clone()));
                }
                row.push(text.clone());
                col += 1;
            }
        }

        // Rowspans still open to the right of the last explicit cell
        if pending[col.min(pending.len())..].iter().any(Option::is_some) {
            for slot in pending.iter_mut().skip(col) {
                match slot.take() {
                    Some((remaining, text)) => {
                        row.push(text.clone());
                        if remaining > 1 {
                            *slot = Some((remaining - 1, text));
                        }
                    }
                    None => row.push(String::new()),
                }
            }
        }

        rows.push(row);
    }

    pad(rows)
}

fn span(re: &Regex, attrs: &str) -> usize {
    re.captures(attrs)
        .and_then(|c| c[1].parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

fn clean_html_text(html: &str) -> String {
    let text = BREAK_RE.replace_all(html, " ");
    let text = TAG_RE.replace_all(&text, "");
    collapse_whitespace(&html_escape::decode_html_entities(&text))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pad ragged rows; `None` when there is nothing to pad
fn pad(mut rows: RawGrid) -> Option<RawGrid> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return None;
    }
    for row in &mut rows {
        row.resize(width, String::new());
    }
    Some(rows)
}

/// Strip a surrounding code fence from LLM output
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let body = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => return "",
    };
    body.trim_end().trim_end_matches("```").trim()
}
