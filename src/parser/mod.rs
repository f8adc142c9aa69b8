//! Markdown parser with YAML/TOML front matter.

mod block;
mod inline;
mod lexer;

pub use block::parse_blocks;
pub(crate) use block::{is_table_delimiter, split_table_cells};
pub use inline::parse_inlines;

use crate::ast::{Document, FrontMatter};
use crate::error::{ParseError, Result};
use serde::Deserialize;

/// Parse a complete document from source text.
pub fn parse(input: &str) -> Result<Document> {
    let (front_matter, content) = parse_front_matter(input)?;
    let blocks = parse_blocks(content)?;

    Ok(Document {
        front_matter,
        blocks,
    })
}

/// Split off front matter: TOML delimited by `+++` or YAML delimited by `---`.
///
/// Documents without front matter get [`FrontMatter::default`] and the whole
/// input back.
pub fn parse_front_matter(input: &str) -> Result<(FrontMatter, &str)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let trimmed = input.trim_start_matches(['\n', '\r']);

    let delimiter = if opens_with(trimmed, "+++") {
        "+++"
    } else if opens_with(trimmed, "---") {
        "---"
    } else {
        return Ok((FrontMatter::default(), input));
    };

    let after_open = &trimmed[3..];
    let (raw, content) = split_closing(after_open, delimiter).ok_or_else(|| {
        ParseError::FrontMatter(format!("Unclosed front matter (missing closing {delimiter})"))
    })?;

    let raw = if delimiter == "+++" {
        parse_toml(raw)?
    } else {
        parse_yaml(raw)?
    };

    Ok((raw.into_front_matter(), content))
}

/// The delimiter must stand alone on the first line.
fn opens_with(input: &str, delimiter: &str) -> bool {
    input
        .lines()
        .next()
        .is_some_and(|first| first.trim_end() == delimiter)
}

/// Find the closing delimiter line; returns (front matter, rest of document).
fn split_closing<'a>(after_open: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if offset > 0 && line.trim_end() == delimiter {
            let body = &after_open[..offset];
            let rest = &after_open[offset + line.len()..];
            return Some((body, rest.trim_start_matches(['\n', '\r'])));
        }
        offset += line.len();
    }
    None
}

/// Raw front matter structure for deserialization.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawFrontMatter {
    title: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    date: Option<String>,
    #[serde(alias = "coverImage", alias = "cover")]
    cover_image: Option<String>,
    tags: Option<Tags>,
    published: Option<bool>,
    draft: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tags {
    List(Vec<String>),
    Single(String),
}

impl RawFrontMatter {
    fn into_front_matter(self) -> FrontMatter {
        let tags = match self.tags {
            Some(Tags::List(tags)) => tags,
            Some(Tags::Single(tags)) => tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            None => Vec::new(),
        };

        let published = match (self.published, self.draft) {
            (Some(published), _) => published,
            (None, Some(draft)) => !draft,
            (None, None) => true,
        };

        FrontMatter {
            title: non_empty(self.title),
            slug: non_empty(self.slug),
            description: non_empty(self.description),
            date: non_empty(self.date),
            cover_image: non_empty(self.cover_image),
            tags,
            published,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_yaml(raw: &str) -> Result<RawFrontMatter> {
    if raw.trim().is_empty() {
        return Ok(RawFrontMatter::default());
    }
    serde_yaml::from_str(raw)
        .map_err(|e| ParseError::FrontMatter(format!("Invalid YAML: {}", e)).into())
}

fn parse_toml(raw: &str) -> Result<RawFrontMatter> {
    let mut table: toml::Table = toml::from_str(raw)
        .map_err(|e| ParseError::FrontMatter(format!("Invalid TOML: {}", e)))?;

    // TOML dates are typed values; the model keeps them as written
    if let Some(toml::Value::Datetime(date)) = table.get("date") {
        let date = date.to_string();
        table.insert("date".into(), toml::Value::String(date));
    }

    toml::Value::Table(table)
        .try_into()
        .map_err(|e| ParseError::FrontMatter(format!("Invalid TOML: {}", e)).into())
}
