//! Site output: pages, JSON API files, sitemap and robots.txt.

pub mod api;
pub mod builder;
pub mod robots;
pub mod sitemap;
pub mod templates;

pub use api::{error_json, posts_json, FETCH_ERROR};
pub use builder::{BuildReport, SiteBuilder};
pub use robots::build_robots_txt;
pub use sitemap::{build_sitemap, sitemap_entries, ChangeFreq, SitemapEntry};
pub use templates::{category_buttons, format_date, CategoryButton, Templates};
