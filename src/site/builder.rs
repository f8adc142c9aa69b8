//! Static site output.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::blog::{generate_slug, BlogPost, GridState};
use crate::config::SiteConfig;
use crate::error::Result;
use crate::site::api::posts_json;
use crate::site::robots::build_robots_txt;
use crate::site::sitemap::build_sitemap;
use crate::site::templates::Templates;

/// What a build wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// HTML pages written.
    pub pages: usize,
    pub posts: usize,
    pub categories: usize,
}

/// Writes the site for a set of posts into the configured output directory.
#[derive(Debug)]
pub struct SiteBuilder {
    config: SiteConfig,
    posts: Vec<BlogPost>,
    templates: Templates,
}

impl SiteBuilder {
    pub fn new(config: SiteConfig, posts: Vec<BlogPost>) -> Self {
        let templates = Templates::from_config(&config);
        Self {
            config,
            posts: unique_posts(posts),
            templates,
        }
    }

    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.build.output_dir
    }

    pub fn build(&self, now: DateTime<Utc>) -> Result<BuildReport> {
        let out = self.output_dir();
        let mut report = BuildReport::default();

        write_file(&out.join("index.html"), &self.templates.render_index(&self.posts)?)?;
        report.pages += 1;

        let grid = GridState::new(&self.posts);
        write_file(
            &out.join("blog").join("index.html"),
            &self.templates.render_blog(&self.posts, &grid)?,
        )?;
        write_file(
            &out.join("api").join("blog").join("index.json"),
            &posts_json(&self.posts, "")?,
        )?;
        report.pages += 1;

        let mut category_slugs = HashSet::new();
        for category in &grid.categories {
            let slug = generate_slug(category);
            if slug.is_empty() || !category_slugs.insert(slug.clone()) {
                warn!(category = %category, "Skipping category without a unique slug");
                continue;
            }

            let mut state = grid.clone();
            state.select(category);
            write_file(
                &out.join("blog").join("category").join(&slug).join("index.html"),
                &self.templates.render_blog(&self.posts, &state)?,
            )?;
            write_file(
                &out.join("api").join("blog").join("category").join(format!("{}.json", slug)),
                &posts_json(&self.posts, category)?,
            )?;
            report.pages += 1;
            report.categories += 1;
        }

        for post in &self.posts {
            debug!(slug = %post.slug, "Writing post");
            write_file(
                &out.join("blog").join(&post.slug).join("index.html"),
                &self.templates.render_post(post)?,
            )?;
            report.pages += 1;
            report.posts += 1;
        }

        write_file(
            &out.join("sitemap.xml"),
            &build_sitemap(&self.config.site.url, &self.posts, now),
        )?;
        write_file(
            &out.join("robots.txt"),
            &build_robots_txt(&self.config.site.url, now),
        )?;

        info!(
            dir = %out.display(),
            pages = report.pages,
            posts = report.posts,
            categories = report.categories,
            "Site built"
        );
        Ok(report)
    }
}

/// Drop posts whose slug is empty or already taken; the first post wins.
fn unique_posts(posts: Vec<BlogPost>) -> Vec<BlogPost> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|post| {
            if post.slug.is_empty() || post.slug.contains('/') || post.slug.starts_with('.') {
                warn!(id = %post.id, slug = %post.slug, "Skipping post with an unusable slug");
                false
            } else if !seen.insert(post.slug.clone()) {
                warn!(id = %post.id, slug = %post.slug, "Skipping post with a duplicate slug");
                false
            } else {
                true
            }
        })
        .collect()
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Location of a post page relative to the output directory.
pub fn post_path(slug: &str) -> PathBuf {
    Path::new("blog").join(slug).join("index.html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(id: &str, slug: &str, tags: &[&str]) -> BlogPost {
        BlogPost {
            id: id.into(),
            title: format!("Post {}", id),
            slug: slug.into(),
            description: String::new(),
            date: "2024-01-01".into(),
            cover_image: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            content: format!("<p>{}</p>", id),
            published: true,
        }
    }

    #[test]
    fn test_unique_posts_first_wins() {
        let posts = unique_posts(vec![
            post("1", "hola", &[]),
            post("2", "hola", &[]),
            post("3", "", &[]),
            post("4", "../x", &[]),
            post("5", "adios", &[]),
        ]);
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);
    }

    #[test]
    fn test_build_writes_site() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.build.output_dir = dir.path().to_path_buf();

        let builder = SiteBuilder::new(
            config,
            vec![
                post("1", "hola", &["Gestión ágil"]),
                post("2", "adios", &["rust"]),
                post("3", "hola", &[]),
            ],
        );
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let report = builder.build(now).unwrap();

        assert_eq!(
            report,
            BuildReport {
                pages: 6,
                posts: 2,
                categories: 2,
            }
        );

        let out = dir.path();
        for file in [
            "index.html",
            "blog/index.html",
            "blog/category/gestion-agil/index.html",
            "blog/category/rust/index.html",
            "api/blog/index.json",
            "api/blog/category/rust.json",
            "sitemap.xml",
            "robots.txt",
        ] {
            assert!(out.join(file).is_file(), "missing {}", file);
        }

        let hola = fs::read_to_string(out.join(post_path("hola"))).unwrap();
        assert!(hola.contains("<p>1</p>"));

        let sitemap = fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert_eq!(sitemap.matches("<url>").count(), 4);
    }
}
