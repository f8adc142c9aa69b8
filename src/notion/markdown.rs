//! Conversion of Notion block trees to Markdown.
//!
//! Most blocks map onto GitHub-flavoured Markdown. Embeds, videos and file
//! attachments have no Markdown form and are emitted as HTML snippets, which
//! the Notion pipeline renders without sanitizing.

use tracing::debug;

use crate::notion::types::{rich_text_plain, Block, BlockKind, FileObject, Icon, RichText};
use crate::render::escape_html;

/// Markdown for a page: its own content plus one entry per child page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkdownPage {
    pub parent: String,
    pub children: Vec<String>,
}

impl MarkdownPage {
    /// Parent and children joined by blank lines.
    pub fn flatten(&self) -> String {
        std::iter::once(self.parent.as_str())
            .chain(self.children.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Convert a page's block tree, splitting child pages out.
pub fn page_to_markdown(blocks: &[Block]) -> MarkdownPage {
    let children = blocks
        .iter()
        .filter_map(|block| match &block.kind {
            BlockKind::ChildPage { child_page } => {
                let body = blocks_to_markdown(&block.children);
                let heading = format!("# {}", child_page.title.trim());
                Some(if body.is_empty() {
                    heading
                } else {
                    format!("{}\n\n{}", heading, body)
                })
            }
            _ => None,
        })
        .collect();

    MarkdownPage {
        parent: blocks_to_markdown(blocks),
        children,
    }
}

/// Convert a run of sibling blocks to Markdown.
///
/// Consecutive list items are joined by single newlines so they form one
/// list; everything else is separated by a blank line.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut previous_was_list = false;
    let mut number = 0;

    for block in blocks {
        let is_list = is_list_item(&block.kind);
        number = match block.kind {
            BlockKind::NumberedListItem { .. } => number + 1,
            _ => 0,
        };

        let markdown = block_to_markdown(block, number);
        if markdown.is_empty() {
            continue;
        }

        if !out.is_empty() {
            out.push_str(if previous_was_list && is_list { "\n" } else { "\n\n" });
        }
        out.push_str(&markdown);
        previous_was_list = is_list;
    }

    out
}

fn is_list_item(kind: &BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::BulletedListItem { .. }
            | BlockKind::NumberedListItem { .. }
            | BlockKind::ToDo { .. }
    )
}

fn block_to_markdown(block: &Block, number: usize) -> String {
    match &block.kind {
        BlockKind::Paragraph { paragraph } => {
            with_children(rich_text_to_markdown(&paragraph.rich_text), block)
        }
        BlockKind::Heading1 { heading_1: text } => heading(1, &text.rich_text, block),
        BlockKind::Heading2 { heading_2: text } => heading(2, &text.rich_text, block),
        BlockKind::Heading3 { heading_3: text } => heading(3, &text.rich_text, block),
        BlockKind::BulletedListItem { bulleted_list_item } => {
            list_item("- ", &rich_text_to_markdown(&bulleted_list_item.rich_text), block)
        }
        BlockKind::NumberedListItem { numbered_list_item } => list_item(
            &format!("{}. ", number),
            &rich_text_to_markdown(&numbered_list_item.rich_text),
            block,
        ),
        BlockKind::ToDo { to_do } => {
            let marker = if to_do.checked { "- [x] " } else { "- [ ] " };
            list_item(marker, &rich_text_to_markdown(&to_do.rich_text), block)
        }
        BlockKind::Toggle { toggle } => {
            let summary = escape_html(rich_text_plain(&toggle.rich_text).trim());
            let body = blocks_to_markdown(&block.children);
            if body.is_empty() {
                format!("<details><summary>{}</summary>\n\n</details>", summary)
            } else {
                format!(
                    "<details><summary>{}</summary>\n\n{}\n\n</details>",
                    summary, body
                )
            }
        }
        BlockKind::Quote { quote } => {
            let text = with_children(rich_text_to_markdown(&quote.rich_text), block);
            quote_lines(&text)
        }
        BlockKind::Callout { callout } => {
            let text = rich_text_to_markdown(&callout.rich_text);
            let text = match &callout.icon {
                Some(Icon::Emoji { emoji }) => format!("{} {}", emoji, text),
                _ => text,
            };
            quote_lines(&with_children(text, block))
        }
        BlockKind::Code { code } => {
            let language = match code.language.as_str() {
                "plain text" => "",
                other => other,
            };
            format!("```{}\n{}\n```", language, rich_text_plain(&code.rich_text))
        }
        BlockKind::Divider => "---".to_string(),
        BlockKind::Image { image } => format!(
            "![{}]({})",
            rich_text_plain(&image.caption).trim(),
            image.source.url()
        ),
        BlockKind::Video { video } => video_html(video.source.url()),
        BlockKind::File { file: media } | BlockKind::Pdf { pdf: media } => {
            file_html(&media.source)
        }
        BlockKind::Embed { embed } => embed_html(&embed.url),
        BlockKind::Bookmark { bookmark: link } | BlockKind::LinkPreview { link_preview: link } => {
            if link.url.is_empty() {
                return String::new();
            }
            let caption = rich_text_plain(&link.caption);
            let label = match caption.trim() {
                "" => link.url.as_str(),
                caption => caption,
            };
            format!("[{}]({})", label, link.url)
        }
        BlockKind::Equation { equation } => {
            format!("```latex\n{}\n```", equation.expression.trim())
        }
        BlockKind::Table { .. } => table(&block.children),
        BlockKind::ColumnList | BlockKind::Column | BlockKind::SyncedBlock => {
            blocks_to_markdown(&block.children)
        }
        // Rendered separately by `page_to_markdown`; table rows by `table`
        BlockKind::ChildPage { .. } | BlockKind::TableRow { .. } => String::new(),
        BlockKind::Unsupported => {
            debug!(block_id = %block.id, "Skipping unsupported block");
            String::new()
        }
    }
}

fn heading(level: usize, text: &[RichText], block: &Block) -> String {
    let line = format!("{} {}", "#".repeat(level), rich_text_to_markdown(text));
    with_children(line, block)
}

/// Append the block's children after it, separated by a blank line.
fn with_children(text: String, block: &Block) -> String {
    let children = blocks_to_markdown(&block.children);
    match (text.is_empty(), children.is_empty()) {
        (_, true) => text,
        (true, false) => children,
        (false, false) => format!("{}\n\n{}", text, children),
    }
}

/// A list item with its children indented under the marker.
fn list_item(marker: &str, text: &str, block: &Block) -> String {
    let mut out = format!("{}{}", marker, text);
    let children = blocks_to_markdown(&block.children);
    if !children.is_empty() {
        out.push('\n');
        out.push_str(&indent(&children, marker.len()));
    }
    out
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote_lines(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn table(rows: &[Block]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .filter_map(|row| match &row.kind {
            BlockKind::TableRow { table_row } => Some(
                table_row
                    .cells
                    .iter()
                    .map(|cell| table_cell(cell))
                    .collect(),
            ),
            _ => None,
        })
        .collect();

    let Some(width) = rows.iter().map(Vec::len).max() else {
        return String::new();
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        let mut cells = row.clone();
        cells.resize(width, String::new());
        lines.push(format!("| {} |", cells.join(" | ")));
        if i == 0 {
            lines.push(format!("|{}|", vec![" --- "; width].join("|")));
        }
    }
    lines.join("\n")
}

fn table_cell(text: &[RichText]) -> String {
    rich_text_to_markdown(text)
        .replace('|', "\\|")
        .replace('\n', "<br>")
}

/// Render rich text spans as inline Markdown.
pub fn rich_text_to_markdown(text: &[RichText]) -> String {
    text.iter().map(annotate).collect()
}

fn annotate(text: &RichText) -> String {
    let content = text.plain_text.as_str();
    if text.is_equation() {
        return format!("${}$", content.trim());
    }

    let core = content.trim();
    if core.is_empty() {
        return content.to_string();
    }
    let start = content.len() - content.trim_start().len();
    let lead = &content[..start];
    let trail = &content[start + core.len()..];

    let annotations = &text.annotations;
    let mut out = core.to_string();
    if annotations.code {
        out = format!("`{}`", out);
    }
    if annotations.bold {
        out = format!("**{}**", out);
    }
    if annotations.italic {
        out = format!("_{}_", out);
    }
    if annotations.strikethrough {
        out = format!("~~{}~~", out);
    }
    if annotations.underline {
        out = format!("<u>{}</u>", out);
    }
    if let Some(href) = &text.href {
        out = format!("[{}]({})", out, href);
    }

    format!("{}{}{}", lead, out, trail)
}

fn embed_html(url: &str) -> String {
    format!(
        concat!(
            "<div class=\"notion-embed\">\n",
            "<iframe src=\"{}\" frameborder=\"0\" ",
            "sandbox=\"allow-scripts allow-popups allow-forms allow-same-origin\" ",
            "allowfullscreen loading=\"lazy\" class=\"w-full min-h-[500px]\"></iframe>\n",
            "</div>"
        ),
        escape_html(url)
    )
}

fn video_html(url: &str) -> String {
    format!(
        "<div class=\"notion-video\">\n<video src=\"{}\" controls class=\"w-full\"></video>\n</div>",
        escape_html(url)
    )
}

fn file_html(file: &FileObject) -> String {
    let url = file.url();
    format!(
        concat!(
            "<div class=\"notion-file\">\n",
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" ",
            "class=\"flex items-center gap-2 p-4 border rounded hover:bg-gray-50\">",
            "<span>{}</span></a>\n",
            "</div>"
        ),
        escape_html(url),
        escape_html(&file_name(url))
    )
}

/// Last path segment of a URL, without query or fragment.
fn file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "file".to_string(),
    }
}
