//! Block-level parsing for Markdown.

use crate::ast::{Alignment, Block, Inline, ListItem};
use crate::error::Result;
use crate::parser::inline::parse_inlines;
use crate::parser::lexer::{
    block_quote_marker, fenced_code_start, heading, list_item_marker, thematic_break, ListMarker,
    Token,
};

/// Tags that open an HTML block rather than inline HTML.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "details", "dialog", "div", "dl",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "iframe", "li", "nav", "ol", "p", "picture", "pre", "section", "summary", "table", "tbody",
    "td", "tfoot", "th", "thead", "tr", "ul", "video",
];

/// Parse all blocks from content.
pub fn parse_blocks(input: &str) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    let lines: Vec<&str> = input.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        // Skip blank lines
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        // Try parsing different block types
        if let Some((block, consumed)) = try_parse_heading(line)? {
            blocks.push(block);
            i += consumed;
        } else if let Some((block, consumed)) = try_parse_fenced_code(&lines[i..]) {
            blocks.push(block);
            i += consumed;
        } else if let Some((block, consumed)) = try_parse_thematic_break(line) {
            blocks.push(block);
            i += consumed;
        } else if let Some((block, consumed)) = try_parse_html_block(&lines[i..]) {
            blocks.push(block);
            i += consumed;
        } else if let Some((block, consumed)) = try_parse_block_quote(&lines[i..])? {
            blocks.push(block);
            i += consumed;
        } else if let Some((block, consumed)) = try_parse_list(&lines[i..])? {
            blocks.push(block);
            i += consumed;
        } else if let Some((block, consumed)) = try_parse_table(&lines[i..])? {
            blocks.push(block);
            i += consumed;
        } else {
            // Default: paragraph
            let (block, consumed) = parse_paragraph(&lines[i..])?;
            blocks.push(block);
            i += consumed;
        }
    }

    Ok(blocks)
}

fn try_parse_heading(line: &str) -> Result<Option<(Block, usize)>> {
    let trimmed = line.trim_start();
    if indent_of(line) > 3 || !trimmed.starts_with('#') {
        return Ok(None);
    }

    match heading(trimmed) {
        Ok((_, Token::Heading(level, content))) => {
            let inlines = parse_inlines(content)?;
            Ok(Some((
                Block::Heading {
                    level,
                    content: inlines,
                },
                1,
            )))
        }
        _ => Ok(None),
    }
}

fn try_parse_thematic_break(line: &str) -> Option<(Block, usize)> {
    if indent_of(line) <= 3 && thematic_break(line.trim_start()).is_ok() {
        Some((Block::ThematicBreak, 1))
    } else {
        None
    }
}

fn try_parse_fenced_code(lines: &[&str]) -> Option<(Block, usize)> {
    let indent = indent_of(lines[0]);
    let first = lines[0].trim_start();
    if indent > 3 {
        return None;
    }

    let Ok((_, Token::FencedCodeStart(fence, lang))) = fenced_code_start(first) else {
        return None;
    };
    let fence_char = fence.chars().next()?;
    let language = if lang.is_empty() {
        None
    } else {
        Some(lang.to_string())
    };

    let mut content_lines = Vec::new();
    for (offset, line) in lines[1..].iter().enumerate() {
        let trimmed = line.trim();
        let closes = trimmed.len() >= fence.len() && trimmed.chars().all(|c| c == fence_char);
        if closes {
            return Some((
                Block::CodeBlock {
                    language,
                    content: content_lines.join("\n"),
                },
                offset + 2,
            ));
        }
        content_lines.push(strip_indent(line, indent));
    }

    // Unclosed fence - treat rest as code
    Some((
        Block::CodeBlock {
            language,
            content: content_lines.join("\n"),
        },
        lines.len(),
    ))
}

/// Whether a line opens an HTML block (block-level tag or comment).
fn is_html_block_start(line: &str) -> bool {
    let trimmed = line.trim_start();
    if indent_of(line) > 3 || !trimmed.starts_with('<') {
        return false;
    }
    if trimmed.starts_with("<!--") {
        return true;
    }

    let after = trimmed[1..].strip_prefix('/').unwrap_or(&trimmed[1..]);
    let name: String = after
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    let terminated = after[name.len()..]
        .chars()
        .next()
        .map_or(true, |c| c == '>' || c == '/' || c.is_whitespace());

    terminated && BLOCK_TAGS.contains(&name.as_str())
}

fn try_parse_html_block(lines: &[&str]) -> Option<(Block, usize)> {
    if !is_html_block_start(lines[0]) {
        return None;
    }

    let consumed = lines
        .iter()
        .position(|line| line.trim().is_empty())
        .unwrap_or(lines.len());

    Some((Block::HtmlBlock(lines[..consumed].join("\n")), consumed))
}

fn try_parse_block_quote(lines: &[&str]) -> Result<Option<(Block, usize)>> {
    if indent_of(lines[0]) > 3 || !lines[0].trim_start().starts_with('>') {
        return Ok(None);
    }

    let mut quote_lines = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim_start();

        if let Ok((_, content)) = block_quote_marker(trimmed) {
            quote_lines.push(content);
            i += 1;
        } else if trimmed.is_empty()
            && i + 1 < lines.len()
            && lines[i + 1].trim_start().starts_with('>')
        {
            // Blank line within quote
            quote_lines.push("");
            i += 1;
        } else {
            break;
        }
    }

    let inner_blocks = parse_blocks(&quote_lines.join("\n"))?;

    Ok(Some((Block::BlockQuote(inner_blocks), i)))
}

fn same_list_kind(a: &ListMarker, b: &ListMarker) -> bool {
    matches!(
        (a, b),
        (ListMarker::Ordered(_), ListMarker::Ordered(_))
            | (
                ListMarker::Unordered | ListMarker::Checkbox(_),
                ListMarker::Unordered | ListMarker::Checkbox(_)
            )
    )
}

/// Index of the next non-blank line at or after `from`.
fn next_non_blank(lines: &[&str], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&j| !lines[j].trim().is_empty())
}

fn try_parse_list(lines: &[&str]) -> Result<Option<(Block, usize)>> {
    let indent = indent_of(lines[0]);
    if indent > 3 {
        return Ok(None);
    }

    let Ok((_, Token::ListItemMarker(marker_type))) = list_item_marker(lines[0].trim_start())
    else {
        return Ok(None);
    };

    let ordered = matches!(marker_type, ListMarker::Ordered(_));
    let start = match marker_type {
        ListMarker::Ordered(n) => Some(n),
        _ => None,
    };

    let mut items = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        // Blank lines between items keep the list going
        if line.trim().is_empty() {
            match next_non_blank(lines, i) {
                Some(j) if starts_list_item(lines[j], indent, &marker_type) => {
                    i = j;
                    continue;
                }
                _ => break,
            }
        }

        let trimmed = line.trim_start();
        let current_indent = indent_of(line);
        let Ok((rest, Token::ListItemMarker(m))) = list_item_marker(trimmed) else {
            break;
        };
        if current_indent > indent || !same_list_kind(&marker_type, &m) {
            break;
        }

        let marker_width = match m {
            ListMarker::Checkbox(_) => 2,
            _ => trimmed.len() - rest.len(),
        };
        let content_indent = current_indent + marker_width;

        let mut item_lines = vec![rest.to_string()];
        i += 1;

        while i < lines.len() {
            let next_line = lines[i];

            if next_line.trim().is_empty() {
                // Blank lines belong to the item only if indented content follows
                match next_non_blank(lines, i) {
                    Some(j) if indent_of(lines[j]) >= content_indent => {
                        item_lines.extend((i..j).map(|_| String::new()));
                        i = j;
                        continue;
                    }
                    _ => break,
                }
            }

            let next_indent = indent_of(next_line);
            if next_indent >= content_indent {
                item_lines.push(strip_indent(next_line, content_indent));
            } else if next_indent > indent {
                // Under-indented nested content
                item_lines.push(next_line.trim_start().to_string());
            } else if list_item_marker(next_line.trim_start()).is_err() && !starts_block(next_line)
            {
                // Lazy paragraph continuation
                item_lines.push(next_line.trim_start().to_string());
            } else {
                break;
            }
            i += 1;
        }

        let content_blocks = parse_blocks(&item_lines.join("\n"))?;
        let checked = match m {
            ListMarker::Checkbox(c) => Some(c),
            _ => None,
        };

        items.push(ListItem {
            content: content_blocks,
            checked,
        });
    }

    if items.is_empty() {
        return Ok(None);
    }

    Ok(Some((
        Block::List {
            ordered,
            start,
            items,
        },
        i,
    )))
}

fn starts_list_item(line: &str, indent: usize, kind: &ListMarker) -> bool {
    indent_of(line) <= indent
        && matches!(
            list_item_marker(line.trim_start()),
            Ok((_, Token::ListItemMarker(m))) if same_list_kind(kind, &m)
        )
}

fn try_parse_table(lines: &[&str]) -> Result<Option<(Block, usize)>> {
    // Need at least header row and delimiter row
    if lines.len() < 2 || !lines[0].contains('|') || !is_table_delimiter(lines[1]) {
        return Ok(None);
    }

    let headers = parse_table_row(lines[0])?;
    let mut alignments = parse_alignments(lines[1]);
    alignments.resize(headers.len(), Alignment::None);

    // Parse body rows
    let mut rows = Vec::new();
    let mut i = 2;

    while i < lines.len() {
        let line = lines[i];
        if !line.contains('|') || line.trim().is_empty() {
            break;
        }
        let mut row = parse_table_row(line)?;
        row.resize(headers.len(), Vec::new());
        rows.push(row);
        i += 1;
    }

    Ok(Some((
        Block::Table {
            headers,
            alignments,
            rows,
        },
        i,
    )))
}

pub(crate) fn is_table_delimiter(line: &str) -> bool {
    let trimmed = line.trim();
    if !trimmed.contains('|') {
        return false;
    }

    let cells = split_table_cells(trimmed);
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let inner = cell.trim_start_matches(':').trim_end_matches(':');
            !inner.is_empty() && inner.chars().all(|c| c == '-')
        })
}

fn parse_alignments(line: &str) -> Vec<Alignment> {
    split_table_cells(line)
        .iter()
        .map(|cell| {
            let left = cell.starts_with(':');
            let right = cell.ends_with(':');
            match (left, right) {
                (true, true) => Alignment::Center,
                (true, false) => Alignment::Left,
                (false, true) => Alignment::Right,
                (false, false) => Alignment::None,
            }
        })
        .collect()
}

/// Cells are unescaped before inline parsing, so `\|` inside code spans
/// becomes a plain pipe.
fn parse_table_row(line: &str) -> Result<Vec<Vec<Inline>>> {
    split_table_cells(line)
        .iter()
        .map(|cell| parse_inlines(&cell.replace("\\|", "|")))
        .collect()
}

/// Split a pipe table row into trimmed cells; `\|` is kept inside a cell.
pub(crate) fn split_table_cells(line: &str) -> Vec<String> {
    let mut trimmed = line.trim();
    trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    if trimmed.ends_with('|') && !trimmed.ends_with("\\|") {
        trimmed = &trimmed[..trimmed.len() - 1];
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('\\');
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Whether a line would start a block other than a paragraph.
fn starts_block(line: &str) -> bool {
    let trimmed = line.trim_start();
    if indent_of(line) > 3 {
        return false;
    }

    heading(trimmed).is_ok()
        || fenced_code_start(trimmed).is_ok()
        || thematic_break(trimmed).is_ok()
        || trimmed.starts_with('>')
        || is_html_block_start(line)
        || matches!(
            list_item_marker(trimmed),
            Ok((rest, Token::ListItemMarker(m)))
                if !rest.trim().is_empty() && !matches!(m, ListMarker::Ordered(n) if n != 1)
        )
}

fn parse_paragraph(lines: &[&str]) -> Result<(Block, usize)> {
    let mut para_lines = vec![lines[0].trim_start()];
    let mut i = 1;

    while i < lines.len() {
        let line = lines[i];

        // End paragraph on blank line or block-level element
        if line.trim().is_empty() || starts_block(line) {
            break;
        }

        // A table may interrupt a paragraph
        if line.contains('|') && i + 1 < lines.len() && is_table_delimiter(lines[i + 1]) {
            break;
        }

        para_lines.push(line.trim_start());
        i += 1;
    }

    let inlines = parse_inlines(&para_lines.join("\n"))?;

    Ok((Block::Paragraph(inlines), i))
}

/// Leading indentation in columns (tabs count as four).
fn indent_of(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

/// Remove up to `columns` of leading indentation.
fn strip_indent(line: &str, columns: usize) -> String {
    let mut width = 0;
    for (i, c) in line.char_indices() {
        if width >= columns {
            return line[i..].to_string();
        }
        match c {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => return line[i..].to_string(),
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_parse_heading() {
        let blocks = parse_blocks("# Hello World").unwrap();
        assert_eq!(
            blocks,
            vec![Block::Heading {
                level: 1,
                content: vec![text("Hello World")],
            }]
        );
    }

    #[test]
    fn test_parse_code_block() {
        let input = "```rust\nfn main() {\n    # not a heading\n}\n```";
        let blocks = parse_blocks(input).unwrap();
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: Some("rust".into()),
                content: "fn main() {\n    # not a heading\n}".into(),
            }]
        );
    }

    #[test]
    fn test_unclosed_code_block() {
        let blocks = parse_blocks("~~~\nstill code").unwrap();
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: None,
                content: "still code".into(),
            }]
        );
    }

    #[test]
    fn test_paragraph_then_list() {
        let blocks = parse_blocks("Intro line\n- one\n- two").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], Block::Paragraph(vec![text("Intro line")]));
        let Block::List { ordered, items, .. } = &blocks[1] else {
            panic!("Expected list");
        };
        assert!(!ordered);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_nested_list() {
        let input = "- parent\n  - child\n    - grandchild\n- sibling";
        let blocks = parse_blocks(input).unwrap();
        let Block::List { items, .. } = &blocks[0] else {
            panic!("Expected list");
        };
        assert_eq!(items.len(), 2);
        let Block::List { items: children, .. } = &items[0].content[1] else {
            panic!("Expected nested list");
        };
        assert_eq!(children.len(), 1);
        assert!(matches!(&children[0].content[1], Block::List { .. }));
    }

    #[test]
    fn test_ordered_list_start_and_tasks() {
        let blocks = parse_blocks("3. three\n4. four\n\n- [x] done\n- [ ] todo").unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(matches!(
            &blocks[0],
            Block::List { ordered: true, start: Some(3), .. }
        ));
        let Block::List { items, .. } = &blocks[1] else {
            panic!("Expected task list");
        };
        assert_eq!(items[0].checked, Some(true));
        assert_eq!(items[1].checked, Some(false));
    }

    #[test]
    fn test_loose_list_keeps_items_together() {
        let blocks = parse_blocks("- one\n\n- two\n\nAfter").unwrap();
        assert_eq!(blocks.len(), 2);
        let Block::List { items, .. } = &blocks[0] else {
            panic!("Expected list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(blocks[1], Block::Paragraph(vec![text("After")]));
    }

    #[test]
    fn test_block_quote() {
        let blocks = parse_blocks("> 💡 Tip\n> second line").unwrap();
        assert_eq!(
            blocks,
            vec![Block::BlockQuote(vec![Block::Paragraph(vec![
                text("💡 Tip"),
                Inline::SoftBreak,
                text("second line"),
            ])])]
        );
    }

    #[test]
    fn test_html_block() {
        let input = "<div class=\"notion-embed\">\n  <iframe src=\"x\"></iframe>\n</div>\n\nText";
        let blocks = parse_blocks(input).unwrap();
        assert_eq!(
            blocks[0],
            Block::HtmlBlock(
                "<div class=\"notion-embed\">\n  <iframe src=\"x\"></iframe>\n</div>".into()
            )
        );
        assert_eq!(blocks[1], Block::Paragraph(vec![text("Text")]));
    }

    #[test]
    fn test_inline_tag_starts_paragraph() {
        let blocks = parse_blocks("<u>under</u> line").unwrap();
        assert!(matches!(&blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_table() {
        let input = "| Name | Notes |\n| :--- | ---: |\n| a \\| b | x<br>y |";
        let blocks = parse_blocks(input).unwrap();
        let Block::Table {
            headers,
            alignments,
            rows,
        } = &blocks[0]
        else {
            panic!("Expected table");
        };
        assert_eq!(headers.len(), 2);
        assert_eq!(alignments, &vec![Alignment::Left, Alignment::Right]);
        assert_eq!(rows[0][0], vec![text("a | b")]);
        assert_eq!(
            rows[0][1],
            vec![text("x"), Inline::RawHtml("<br>".into()), text("y")]
        );
    }

    #[test]
    fn test_table_cell_code_span_with_pipe() {
        let blocks = parse_blocks("| `a\\|b` |\n| --- |\n| `a\\|b` |").unwrap();
        let Block::Table { headers, rows, .. } = &blocks[0] else {
            panic!("Expected table");
        };
        assert_eq!(headers[0], vec![Inline::Code("a|b".into())]);
        assert_eq!(rows[0][0], vec![Inline::Code("a|b".into())]);
    }

    #[test]
    fn test_table_delimiter() {
        assert!(is_table_delimiter("| --- | :---: | ---: |"));
        assert!(is_table_delimiter("|---|:---:|---:|"));
        assert!(is_table_delimiter("| --- |"));
        assert!(!is_table_delimiter("| not | a | delimiter |"));
        assert!(!is_table_delimiter("|"));
    }

    #[test]
    fn test_split_table_cells_keeps_escaped_pipes() {
        assert_eq!(
            split_table_cells("| a \\| b | c |"),
            vec!["a \\| b".to_string(), "c".to_string()]
        );
        assert_eq!(split_table_cells("a|b"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_thematic_break_between_paragraphs() {
        let blocks = parse_blocks("above\n\n---\n\nbelow").unwrap();
        assert_eq!(blocks[1], Block::ThematicBreak);
        assert_eq!(blocks.len(), 3);
    }
}
