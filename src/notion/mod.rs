//! Notion API access and conversion of Notion content to Markdown.

pub mod blocks;
pub mod cache;
pub mod client;
pub mod database;
pub mod markdown;
pub mod normalize;
pub mod pages;
pub mod types;

pub use blocks::{fetch_all_blocks, fetch_all_blocks_lenient};
pub use cache::NotionCache;
pub use client::{ClientOptions, NotionClient};
pub use database::{published_posts_query, query_database};
pub use markdown::{blocks_to_markdown, page_to_markdown, rich_text_to_markdown, MarkdownPage};
pub use normalize::{normalize_notion_markdown, MdInput};
pub use pages::{page_with_blocks, retrieve_page};
pub use types::{Block, BlockKind, FileObject, Page, PaginatedList, PropertyValue, RichText};
