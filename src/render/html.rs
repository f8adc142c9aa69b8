//! HTML renderer for parsed Markdown documents.

use std::collections::HashMap;

use crate::ast::{Alignment, Block, Document, Inline, ListItem};
use crate::error::Result;
use crate::render::{escape_html, is_safe_url, sanitize_html};

/// Configuration for HTML rendering.
#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// Escape raw HTML (except a small allow-list) and drop unsafe URLs.
    pub sanitize: bool,
    /// Give every heading a slug `id`.
    pub heading_ids: bool,
    /// Prepend a self-link anchor to every heading (requires `heading_ids`).
    pub autolink_headings: bool,
    /// CSS class prefix for generated elements.
    pub class_prefix: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            sanitize: true,
            heading_ids: true,
            autolink_headings: true,
            class_prefix: "post-".to_string(),
        }
    }
}

impl HtmlConfig {
    /// Settings for trusted content that may carry raw HTML (Notion exports).
    pub fn trusted() -> Self {
        Self {
            sanitize: false,
            ..Self::default()
        }
    }
}

/// Render a parsed document to an HTML fragment.
pub fn render_html(doc: &Document, config: &HtmlConfig) -> Result<String> {
    let mut renderer = HtmlRenderer::new(config);
    renderer.render_blocks(&doc.blocks)?;
    Ok(renderer.output)
}

struct HtmlRenderer<'a> {
    config: &'a HtmlConfig,
    output: String,
    slugs: HashMap<String, usize>,
}

impl<'a> HtmlRenderer<'a> {
    fn new(config: &'a HtmlConfig) -> Self {
        Self {
            config,
            output: String::new(),
            slugs: HashMap::new(),
        }
    }

    fn render_blocks(&mut self, blocks: &[Block]) -> Result<()> {
        for block in blocks {
            self.render_block(block)?;
        }
        Ok(())
    }

    fn render_block(&mut self, block: &Block) -> Result<()> {
        match block {
            Block::Paragraph(inlines) => {
                self.output.push_str("<p>");
                self.render_inlines(inlines)?;
                self.output.push_str("</p>\n");
            }
            Block::Heading { level, content } => {
                self.render_heading(*level, content)?;
            }
            Block::CodeBlock { language, content } => {
                self.output.push_str("<pre><code");
                if let Some(lang) = language {
                    self.output
                        .push_str(&format!(r#" class="language-{}""#, escape_html(lang)));
                }
                self.output.push('>');
                self.output.push_str(&escape_html(content));
                if !content.is_empty() {
                    self.output.push('\n');
                }
                self.output.push_str("</code></pre>\n");
            }
            Block::ThematicBreak => {
                self.output.push_str("<hr>\n");
            }
            Block::BlockQuote(blocks) => {
                self.output.push_str("<blockquote>\n");
                self.render_blocks(blocks)?;
                self.output.push_str("</blockquote>\n");
            }
            Block::List {
                ordered,
                start,
                items,
            } => {
                self.render_list(*ordered, *start, items)?;
            }
            Block::HtmlBlock(html) => {
                if self.config.sanitize {
                    self.output.push_str(&sanitize_html(html));
                } else {
                    self.output.push_str(html);
                }
                self.output.push('\n');
            }
            Block::Table {
                headers,
                alignments,
                rows,
            } => {
                self.render_table(headers, alignments, rows)?;
            }
        }

        Ok(())
    }

    fn render_heading(&mut self, level: u8, content: &[Inline]) -> Result<()> {
        let tag = format!("h{}", level);
        self.output.push('<');
        self.output.push_str(&tag);

        if self.config.heading_ids {
            let id = self.unique_slug(&Inline::plain_text(content));
            self.output.push_str(&format!(r#" id="{}">"#, escape_html(&id)));
            if self.config.autolink_headings {
                self.output.push_str(&format!(
                    r##"<a class="{}anchor" href="#{}" aria-hidden="true" tabindex="-1"></a>"##,
                    escape_html(&self.config.class_prefix),
                    escape_html(&id)
                ));
            }
        } else {
            self.output.push('>');
        }

        self.render_inlines(content)?;

        self.output.push_str("</");
        self.output.push_str(&tag);
        self.output.push_str(">\n");
        Ok(())
    }

    /// GitHub-style heading slug, suffixed `-1`, `-2`... on repeats.
    fn unique_slug(&mut self, text: &str) -> String {
        let base = heading_slug(text);
        let count = self.slugs.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        if slug != base {
            self.slugs.entry(slug.clone()).or_insert(1);
        }
        slug
    }

    fn render_list(&mut self, ordered: bool, start: Option<u32>, items: &[ListItem]) -> Result<()> {
        if ordered {
            self.output.push_str("<ol");
            if let Some(start) = start {
                if start != 1 {
                    self.output.push_str(&format!(r#" start="{}""#, start));
                }
            }
            self.output.push_str(">\n");
        } else {
            self.output.push_str("<ul>\n");
        }

        for item in items {
            self.output.push_str("<li>");
            if let Some(checked) = item.checked {
                let checkbox = if checked {
                    r#"<input type="checkbox" checked disabled> "#
                } else {
                    r#"<input type="checkbox" disabled> "#
                };
                self.output.push_str(checkbox);
            }
            for (i, block) in item.content.iter().enumerate() {
                // Tight items render their leading paragraph inline
                if i == 0 {
                    if let Block::Paragraph(inlines) = block {
                        self.render_inlines(inlines)?;
                        if item.content.len() > 1 {
                            self.output.push('\n');
                        }
                        continue;
                    }
                }
                self.render_block(block)?;
            }
            self.output.push_str("</li>\n");
        }

        if ordered {
            self.output.push_str("</ol>\n");
        } else {
            self.output.push_str("</ul>\n");
        }
        Ok(())
    }

    fn render_table(
        &mut self,
        headers: &[Vec<Inline>],
        alignments: &[Alignment],
        rows: &[Vec<Vec<Inline>>],
    ) -> Result<()> {
        self.output.push_str("<table>\n");

        self.output.push_str("<thead>\n<tr>\n");
        for (i, cell) in headers.iter().enumerate() {
            let style = alignment_style(alignments.get(i).copied().unwrap_or_default());
            self.output.push_str(&format!("<th{}>", style));
            self.render_inlines(cell)?;
            self.output.push_str("</th>\n");
        }
        self.output.push_str("</tr>\n</thead>\n");

        if !rows.is_empty() {
            self.output.push_str("<tbody>\n");
            for row in rows {
                self.output.push_str("<tr>\n");
                for (i, cell) in row.iter().enumerate() {
                    let style = alignment_style(alignments.get(i).copied().unwrap_or_default());
                    self.output.push_str(&format!("<td{}>", style));
                    self.render_inlines(cell)?;
                    self.output.push_str("</td>\n");
                }
                self.output.push_str("</tr>\n");
            }
            self.output.push_str("</tbody>\n");
        }

        self.output.push_str("</table>\n");
        Ok(())
    }

    fn render_inlines(&mut self, inlines: &[Inline]) -> Result<()> {
        for inline in inlines {
            self.render_inline(inline)?;
        }
        Ok(())
    }

    fn render_inline(&mut self, inline: &Inline) -> Result<()> {
        match inline {
            Inline::Text(text) => {
                self.output.push_str(&escape_html(text));
            }
            Inline::Emphasis(inlines) => {
                self.output.push_str("<em>");
                self.render_inlines(inlines)?;
                self.output.push_str("</em>");
            }
            Inline::Strong(inlines) => {
                self.output.push_str("<strong>");
                self.render_inlines(inlines)?;
                self.output.push_str("</strong>");
            }
            Inline::Strikethrough(inlines) => {
                self.output.push_str("<del>");
                self.render_inlines(inlines)?;
                self.output.push_str("</del>");
            }
            Inline::Code(code) => {
                self.output.push_str("<code>");
                self.output.push_str(&escape_html(code));
                self.output.push_str("</code>");
            }
            Inline::Link {
                url,
                title,
                content,
            } => {
                self.output.push_str("<a");
                if !self.config.sanitize || is_safe_url(url) {
                    self.output
                        .push_str(&format!(r#" href="{}""#, escape_html(url)));
                }
                if let Some(title) = title {
                    self.output
                        .push_str(&format!(r#" title="{}""#, escape_html(title)));
                }
                self.output.push('>');
                self.render_inlines(content)?;
                self.output.push_str("</a>");
            }
            Inline::Image { url, alt, title } => {
                self.output.push_str("<img");
                if !self.config.sanitize || is_safe_url(url) {
                    self.output
                        .push_str(&format!(r#" src="{}""#, escape_html(url)));
                }
                self.output
                    .push_str(&format!(r#" alt="{}""#, escape_html(alt)));
                if let Some(title) = title {
                    self.output
                        .push_str(&format!(r#" title="{}""#, escape_html(title)));
                }
                self.output.push('>');
            }
            Inline::SoftBreak => {
                self.output.push('\n');
            }
            Inline::HardBreak => {
                self.output.push_str("<br>\n");
            }
            Inline::RawHtml(html) => {
                if self.config.sanitize {
                    self.output.push_str(&sanitize_html(html));
                } else {
                    self.output.push_str(html);
                }
            }
        }

        Ok(())
    }
}

/// Slug a heading the way GitHub does: lowercase, punctuation dropped,
/// spaces turned into hyphens.
pub fn heading_slug(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

fn alignment_style(align: Alignment) -> &'static str {
    match align {
        Alignment::None => "",
        Alignment::Left => r#" style="text-align: left""#,
        Alignment::Center => r#" style="text-align: center""#,
        Alignment::Right => r#" style="text-align: right""#,
    }
}
