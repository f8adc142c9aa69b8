//! Blog domain: the post model, content sources and category filtering.

pub mod grid;
pub mod mapper;
pub mod post;
pub mod repository;
pub mod slug;
pub mod source;

pub use grid::{categories, category_url, filter_posts, post_url, GridState};
pub use mapper::{map_markdown_to_post, map_page_to_post};
pub use post::{parse_date, BlogPost};
pub use repository::BlogRepository;
pub use slug::generate_slug;
pub use source::{ConfiguredSource, ContentSource, LocalSource, MarkdownFile, NotionSource};
