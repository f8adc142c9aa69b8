//! # notion-blog
//!
//! A static blog generator. Posts come from a Notion database or from local
//! Markdown files and are published as HTML pages, JSON API files, a sitemap
//! and `robots.txt`.
//!
//! ## Pipeline
//!
//! For Notion, every published page goes through:
//!
//! 1. **Blocks**: the page's block tree is fetched recursively from the API
//! 2. **Markdown**: blocks are converted to Markdown, including Notion-only
//!    blocks (toggles, callouts, embeds, videos, files)
//! 3. **Normalization**: invisible characters are stripped and broken tables
//!    are repaired so the Markdown parser understands them
//! 4. **HTML**: the Markdown is rendered with heading anchors
//! 5. **Mapping**: page properties become a [`BlogPost`]
//!
//! Local posts skip the first three steps: front matter supplies the
//! metadata and the body is rendered with sanitization enabled.
//!
//! ## Quick Start
//!
//! ```rust
//! use notion_blog::render;
//!
//! let html = render("---\ntitle: Hola\n---\n# Hola *mundo*").unwrap();
//! assert!(html.contains("<em>mundo</em>"));
//! ```
//!
//! ## Configuration
//!
//! Settings are read from `blog.toml` and overridden by the environment:
//!
//! ```text
//! source = "notion"
//!
//! [site]
//! url = "https://carlosquinza.es"
//!
//! [notion]
//! cache_ttl_secs = 3600
//!
//! [build]
//! output_dir = "dist"
//! ```
//!
//! `NOTION_API_KEY` and `NOTION_DATABASE_ID` are required for the Notion
//! source. See [`config`] for every variable.
//!
//! ## Output
//!
//! - `index.html`, `blog/index.html`, `blog/{slug}/index.html`
//! - `blog/category/{category}/index.html`
//! - `api/blog/index.json`, `api/blog/category/{category}.json`
//! - `sitemap.xml`, `robots.txt`

pub mod ast;
pub mod blog;
pub mod config;
pub mod error;
pub mod notion;
pub mod parser;
pub mod render;
pub mod site;

// Convenience re-exports
pub use ast::{Block, Document, FrontMatter, Inline};
pub use blog::{BlogPost, BlogRepository, ConfiguredSource, ContentSource, GridState};
pub use config::SiteConfig;
pub use error::{Error, NotionError, ParseError, Result};
pub use parser::{parse, parse_front_matter};
pub use render::{markdown_to_html, render_html, HtmlConfig};
pub use site::{build_robots_txt, build_sitemap, SiteBuilder};

/// Parse and render a Markdown document (front matter is dropped) to
/// sanitized HTML in one step.
///
/// # Example
///
/// ```rust
/// use notion_blog::render;
///
/// let html = render("# Hello *world*").unwrap();
/// assert!(html.contains("<h1"));
/// ```
pub fn render(input: &str) -> Result<String> {
    let doc = parse(input)?;
    render_html(&doc, &HtmlConfig::default())
}
