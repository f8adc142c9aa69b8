//! Category filtering for the post grid.
//!
//! The selected category travels in the `?category=` query parameter, so a
//! filtered grid is shareable and survives reloads.

use std::collections::BTreeSet;

use reqwest::Url;

use crate::blog::post::BlogPost;

const BLOG_PATH: &str = "/blog";

/// Sorted, de-duplicated tags across all posts.
pub fn categories(posts: &[BlogPost]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|post| post.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Posts tagged with `category`; an empty category selects everything.
pub fn filter_posts<'a>(posts: &'a [BlogPost], category: &str) -> Vec<&'a BlogPost> {
    posts
        .iter()
        .filter(|post| category.is_empty() || post.has_tag(category))
        .collect()
}

/// Link to the grid filtered by `category`.
pub fn category_url(category: &str) -> String {
    if category.is_empty() {
        return BLOG_PATH.to_string();
    }
    let query: String = Url::parse_with_params("http://localhost/", &[("category", category)])
        .ok()
        .and_then(|url| url.query().map(str::to_string))
        .unwrap_or_default();
    format!("{}?{}", BLOG_PATH, query)
}

/// Path of a post page; the slug is percent-encoded as a single segment.
pub fn post_url(slug: &str) -> String {
    let fallback = || format!("{}/{}", BLOG_PATH, slug);
    let Ok(mut url) = Url::parse(&format!("http://localhost{}", BLOG_PATH)) else {
        return fallback();
    };
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.push(slug);
        }
        Err(()) => return fallback(),
    }
    url.path().to_string()
}

/// Filter state of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    pub categories: Vec<String>,
    /// Selected category; `None` shows every post.
    pub selected: Option<String>,
}

impl GridState {
    pub fn new(posts: &[BlogPost]) -> Self {
        Self {
            categories: categories(posts),
            selected: None,
        }
    }

    /// State for a query string such as `category=rust` or `?category=rust`.
    ///
    /// Unknown categories are ignored and leave the grid unfiltered.
    pub fn from_query(posts: &[BlogPost], query: &str) -> Self {
        let mut state = Self::new(posts);
        if let Some(category) = query_param(query, "category") {
            state.select(&category);
        }
        state
    }

    /// Select a known category, or clear the filter with `""`.
    pub fn select(&mut self, category: &str) -> bool {
        if category.is_empty() {
            self.selected = None;
            true
        } else if self.categories.iter().any(|c| c == category) {
            self.selected = Some(category.to_string());
            true
        } else {
            false
        }
    }

    pub fn is_selected(&self, category: &str) -> bool {
        match &self.selected {
            Some(selected) => selected == category,
            None => category.is_empty(),
        }
    }

    pub fn visible<'a>(&self, posts: &'a [BlogPost]) -> Vec<&'a BlogPost> {
        filter_posts(posts, self.selected.as_deref().unwrap_or_default())
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    let query = query.trim_start_matches('?');
    let url = Url::parse(&format!("http://localhost/?{}", query)).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
