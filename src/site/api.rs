//! JSON payloads of the blog API.

use serde_json::json;

use crate::blog::{filter_posts, BlogPost};
use crate::error::Result;

/// Message returned when posts cannot be loaded.
pub const FETCH_ERROR: &str = "Error fetching blog posts";

/// Posts tagged with `category` (all posts when empty) as a JSON array.
pub fn posts_json(posts: &[BlogPost], category: &str) -> Result<String> {
    Ok(serde_json::to_string(&filter_posts(posts, category))?)
}

/// `{"error": message}`
pub fn error_json(message: &str) -> String {
    json!({ "error": message }).to_string()
}
