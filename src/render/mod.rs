//! Rendering layer for converting parsed Markdown to HTML.

pub mod html;
pub mod sanitize;

pub use html::{render_html, HtmlConfig};
pub use sanitize::{is_safe_url, sanitize_html};

use crate::ast::Document;
use crate::error::Result;
use crate::parser::parse_blocks;

/// Render a Markdown string (without front matter) to an HTML fragment.
pub fn markdown_to_html(markdown: &str, config: &HtmlConfig) -> Result<String> {
    let document = Document {
        blocks: parse_blocks(markdown)?,
        ..Default::default()
    };
    render_html(&document, config)
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
