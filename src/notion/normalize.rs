//! Cleanup of Markdown exported from Notion.
//!
//! Notion breaks table rows when a cell contains a newline, leaves invisible
//! characters behind and pads content with blank lines. The normalizer
//! repairs those without touching fenced code.

use crate::notion::markdown::MarkdownPage;
use crate::parser::{is_table_delimiter, split_table_cells};

/// Input accepted by [`normalize_notion_markdown`].
#[derive(Debug, Clone)]
pub enum MdInput {
    Text(String),
    Page(MarkdownPage),
}

impl MdInput {
    fn flatten(self) -> String {
        match self {
            MdInput::Text(text) => text,
            MdInput::Page(page) => page.flatten(),
        }
    }
}

impl From<&str> for MdInput {
    fn from(text: &str) -> Self {
        MdInput::Text(text.to_string())
    }
}

impl From<String> for MdInput {
    fn from(text: String) -> Self {
        MdInput::Text(text)
    }
}

impl From<MarkdownPage> for MdInput {
    fn from(page: MarkdownPage) -> Self {
        MdInput::Page(page)
    }
}

/// Normalize Notion Markdown so it renders predictably.
///
/// - line endings become `\n`, NBSP becomes a space and zero-width
///   characters are removed
/// - table rows broken across lines are rejoined with `<br>`, a missing
///   header separator is added and cells are tidied
/// - runs of blank lines are capped at two
///
/// Lines inside fenced code blocks are left untouched.
pub fn normalize_notion_markdown(input: impl Into<MdInput>) -> String {
    let markdown = input.into().flatten();
    let cleaned = clean_characters(&markdown);
    let tables = normalize_tables(&cleaned);
    collapse_blank_lines(&tables).trim().to_string()
}

fn clean_characters(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter_map(|c| match c {
            '\u{00A0}' => Some(' '),
            '\u{200B}'..='\u{200D}' | '\u{FEFF}' => None,
            _ => Some(c),
        })
        .collect()
}

/// Tracks whether we are inside a fenced code block.
#[derive(Default)]
struct FenceState {
    open: Option<&'static str>,
}

impl FenceState {
    /// Update the state for `line`; true when the line is a fence delimiter.
    fn toggle(&mut self, line: &str) -> bool {
        let marker = if line.starts_with("```") {
            "```"
        } else if line.starts_with("~~~") {
            "~~~"
        } else {
            return false;
        };

        match self.open {
            None => {
                self.open = Some(marker);
                true
            }
            Some(open) if open == marker => {
                self.open = None;
                true
            }
            Some(_) => false,
        }
    }

    fn inside(&self) -> bool {
        self.open.is_some()
    }
}

fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2
        && trimmed.starts_with('|')
        && trimmed.ends_with('|')
        && !trimmed.ends_with("\\|")
}

fn normalize_tables(input: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut table: Vec<String> = Vec::new();
    let mut fence = FenceState::default();

    for line in input.split('\n') {
        if fence.toggle(line) {
            flush_table(&mut table, &mut out);
            out.push(line.to_string());
            continue;
        }

        if fence.inside() {
            out.push(line.to_string());
            continue;
        }

        if is_table_row(line) {
            table.push(line.to_string());
        } else if !line.trim().is_empty() && !table.is_empty() {
            // Notion spills multi-line cells onto the following lines
            if let Some(last) = table.pop() {
                table.push(append_continuation(&last, line));
            }
        } else {
            flush_table(&mut table, &mut out);
            out.push(line.to_string());
        }
    }

    flush_table(&mut table, &mut out);
    out.join("\n")
}

fn flush_table(table: &mut Vec<String>, out: &mut Vec<String>) {
    if table.is_empty() {
        return;
    }
    out.push(normalize_table_block(table));
    table.clear();
}

/// Append a stray line to the last cell of `row`.
fn append_continuation(row: &str, continuation: &str) -> String {
    let mut cells = split_table_cells(row);
    if let Some(last) = cells.last_mut() {
        last.push_str("<br>");
        last.push_str(continuation.trim());
    }
    format!("| {} |", cells.join(" | "))
}

fn normalize_table_block(rows: &[String]) -> String {
    let mut rows: Vec<String> = rows
        .iter()
        .filter(|row| !row.trim().is_empty())
        .cloned()
        .collect();

    if rows.len() >= 2 && !is_table_delimiter(&rows[1]) {
        let columns = split_table_cells(&rows[0]).len();
        rows.insert(1, format!("|{}|", vec![" --- "; columns].join("|")));
    }

    rows.iter()
        .map(|row| {
            let cells: Vec<String> = split_table_cells(row)
                .iter()
                .map(|cell| normalize_table_cell(cell))
                .collect();
            format!("| {} |", cells.join(" | "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse whitespace in a cell and turn every line break into one `<br>`.
fn normalize_table_cell(cell: &str) -> String {
    split_breaks(cell)
        .into_iter()
        .flat_map(|segment| segment.split('\n'))
        .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Split on `<br>`, `<br/>` and `<br />` in any letter case.
fn split_breaks(cell: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while let Some(offset) = cell[i..].find('<') {
        let at = i + offset;
        match break_tag_len(&cell[at..]) {
            Some(len) => {
                parts.push(&cell[start..at]);
                start = at + len;
                i = start;
            }
            None => i = at + 1,
        }
    }

    parts.push(&cell[start..]);
    parts
}

fn break_tag_len(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.len() < 4 || !bytes[1].eq_ignore_ascii_case(&b'b') || !bytes[2].eq_ignore_ascii_case(&b'r')
    {
        return None;
    }

    let mut pos = 3;
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'/' {
        pos += 1;
    }
    (pos < bytes.len() && bytes[pos] == b'>').then_some(pos + 1)
}

fn collapse_blank_lines(input: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut fence = FenceState::default();
    let mut blank_run = 0;

    for line in input.split('\n') {
        if fence.toggle(line) {
            blank_run = 0;
            out.push(line);
            continue;
        }
        if fence.inside() {
            out.push(line);
            continue;
        }

        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= 2 {
                out.push("");
            }
        } else {
            blank_run = 0;
            out.push(line);
        }
    }

    out.join("\n")
}
