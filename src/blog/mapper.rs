//! Mapping of Notion pages and Markdown files onto [`BlogPost`].

use chrono::{SecondsFormat, Utc};

use crate::blog::post::BlogPost;
use crate::blog::slug::generate_slug;
use crate::blog::source::MarkdownFile;
use crate::config::PropertyNames;
use crate::error::Result;
use crate::notion::types::{Page, PropertyValue};
use crate::render::{markdown_to_html, HtmlConfig};

/// Title used when a post has none.
pub const UNTITLED: &str = "(Sin título)";

/// Build a post from a database page and its rendered content.
pub fn map_page_to_post(
    page: &Page,
    content_html: String,
    names: &PropertyNames,
    default_cover: &str,
) -> BlogPost {
    let title = page
        .first_text(&names.title)
        .unwrap_or_else(|| UNTITLED.to_string());

    let slug = page
        .first_text(&names.slug)
        .unwrap_or_else(|| generate_slug(&title));
    let slug = if slug.is_empty() { page.id.clone() } else { slug };

    let description = page.first_text(&names.description).unwrap_or_default();
    let date = page
        .first_text(&names.date)
        .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    let tags = page
        .property(&names.tags)
        .map(PropertyValue::names)
        .unwrap_or_default();
    let cover_image = cover_image(page, &names.cover).unwrap_or_else(|| default_cover.to_string());

    BlogPost {
        id: page.id.clone(),
        title,
        slug,
        description,
        date,
        cover_image,
        tags,
        content: content_html,
        published: true,
    }
}

/// Cover URL: preferred file properties, then any files property with
/// content, then the page cover.
pub fn cover_image<S: AsRef<str>>(page: &Page, preferred: &[S]) -> Option<String> {
    let from_preferred = preferred
        .iter()
        .filter_map(|name| page.property(name.as_ref()))
        .find_map(PropertyValue::first_file);

    from_preferred
        .or_else(|| page.property_values().find_map(PropertyValue::first_file))
        .or(page.cover.as_ref())
        .map(|file| file.url().to_string())
        .filter(|url| !url.is_empty())
}

/// Build a post from a local Markdown file, rendering with sanitizing on.
pub fn map_markdown_to_post(file: &MarkdownFile) -> Result<BlogPost> {
    let fm = &file.front_matter;

    let title = fm.title.clone().unwrap_or_else(|| UNTITLED.to_string());
    let slug = fm
        .slug
        .clone()
        .unwrap_or_else(|| generate_slug(&title));
    let slug = if slug.is_empty() {
        generate_slug(&file.file_stem())
    } else {
        slug
    };
    let date = fm
        .date
        .clone()
        .unwrap_or_else(|| Utc::now().date_naive().format("%Y-%m-%d").to_string());

    let content = markdown_to_html(&file.content, &HtmlConfig::default())?;

    Ok(BlogPost {
        id: slug.clone(),
        title,
        slug,
        description: fm.description.clone().unwrap_or_default(),
        date,
        cover_image: fm.cover_image.clone().unwrap_or_default(),
        tags: fm.tags.clone(),
        content,
        published: fm.published,
    })
}
