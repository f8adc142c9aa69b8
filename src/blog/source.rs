//! Content sources producing published posts.

use std::future::Future;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::ast::FrontMatter;
use crate::blog::mapper::{map_markdown_to_post, map_page_to_post, UNTITLED};
use crate::blog::post::BlogPost;
use crate::blog::slug::generate_slug;
use crate::config::{PropertyNames, SiteConfig, SourceKind};
use crate::error::Result;
use crate::notion::{
    fetch_all_blocks_lenient, normalize_notion_markdown, page_to_markdown, published_posts_query,
    query_database, NotionClient, Page,
};
use crate::parser::parse_front_matter;
use crate::render::{markdown_to_html, HtmlConfig};

/// Anything that can list the published posts of the blog.
pub trait ContentSource {
    fn published_posts(&self) -> impl Future<Output = Result<Vec<BlogPost>>> + Send;
}

/// Posts stored as pages of a Notion database.
#[derive(Debug, Clone)]
pub struct NotionSource {
    client: NotionClient,
    database_id: String,
    names: PropertyNames,
    default_cover: String,
    concurrency: usize,
}

impl NotionSource {
    pub fn new(client: NotionClient, database_id: impl Into<String>) -> Self {
        Self {
            client,
            database_id: database_id.into(),
            names: PropertyNames::default(),
            default_cover: String::new(),
            concurrency: 4,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let (_, database_id) = config.notion.credentials()?;
        let client = NotionClient::from_config(&config.notion)?;
        Ok(Self::new(client, database_id)
            .property_names(config.notion.properties.clone())
            .default_cover(config.site.default_cover_image.clone())
            .concurrency(config.notion.concurrency))
    }

    pub fn property_names(mut self, names: PropertyNames) -> Self {
        self.names = names;
        self
    }

    pub fn default_cover(mut self, cover: impl Into<String>) -> Self {
        self.default_cover = cover.into();
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn client(&self) -> &NotionClient {
        &self.client
    }

    /// Blocks → Markdown → normalized Markdown → HTML → post.
    ///
    /// A page whose blocks cannot be fetched is still published, with empty
    /// content.
    async fn render_page(&self, page: &Page) -> Result<BlogPost> {
        let blocks = fetch_all_blocks_lenient(&self.client, &page.id).await;
        let markdown = normalize_notion_markdown(page_to_markdown(&blocks));
        let html = markdown_to_html(&markdown, &HtmlConfig::trusted())?;
        Ok(map_page_to_post(page, html, &self.names, &self.default_cover))
    }
}

impl ContentSource for NotionSource {
    async fn published_posts(&self) -> Result<Vec<BlogPost>> {
        let (filter, sorts) = published_posts_query(&self.names);
        let pages = query_database(&self.client, &self.database_id, Some(&filter), Some(&sorts))
            .await?;

        if pages.is_empty() {
            info!("No published posts found in Notion database");
            return Ok(Vec::new());
        }

        let posts: Vec<BlogPost> = stream::iter(pages)
            .map(|page| async move {
                match self.render_page(&page).await {
                    Ok(post) => Some(post),
                    Err(err) => {
                        warn!(page_id = %page.id, error = %err, "Skipping post that failed to render");
                        None
                    }
                }
            })
            .buffered(self.concurrency)
            .filter_map(|post| async move { post })
            .collect()
            .await;

        info!(count = posts.len(), "Loaded posts from Notion");
        Ok(posts)
    }
}

/// A Markdown file split into front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownFile {
    pub front_matter: FrontMatter,
    pub content: String,
    pub path: PathBuf,
}

impl MarkdownFile {
    /// File name without extension.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Slug the file will be published under.
    pub fn slug(&self) -> String {
        match &self.front_matter.slug {
            Some(slug) => slug.clone(),
            None => generate_slug(self.front_matter.title.as_deref().unwrap_or(UNTITLED)),
        }
    }
}

/// Posts stored as `*.md` files with front matter.
#[derive(Debug, Clone)]
pub struct LocalSource {
    posts_dir: PathBuf,
}

impl LocalSource {
    pub fn new(posts_dir: impl Into<PathBuf>) -> Self {
        Self {
            posts_dir: posts_dir.into(),
        }
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    /// Read every Markdown file in the posts directory, in file name order.
    ///
    /// An unreadable directory yields no posts; unreadable or malformed
    /// files are skipped.
    pub async fn read_all_posts(&self) -> Vec<MarkdownFile> {
        let mut paths = match self.markdown_paths().await {
            Ok(paths) => paths,
            Err(err) => {
                error!(dir = %self.posts_dir.display(), error = %err, "Error reading markdown files");
                return Vec::new();
            }
        };
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match read_post_file(&path).await {
                Ok(file) => files.push(file),
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping markdown file"),
            }
        }
        files
    }

    /// Find a post file by its slug.
    pub async fn read_post_by_slug(&self, slug: &str) -> Option<MarkdownFile> {
        self.read_all_posts()
            .await
            .into_iter()
            .find(|file| file.slug() == slug)
    }

    async fn markdown_paths(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.posts_dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

async fn read_post_file(path: &Path) -> Result<MarkdownFile> {
    let raw = tokio::fs::read_to_string(path).await?;
    let (front_matter, content) = parse_front_matter(&raw)?;
    Ok(MarkdownFile {
        front_matter,
        content: content.to_string(),
        path: path.to_path_buf(),
    })
}

impl ContentSource for LocalSource {
    async fn published_posts(&self) -> Result<Vec<BlogPost>> {
        let mut posts = Vec::new();
        for file in self.read_all_posts().await {
            if !file.front_matter.published {
                debug!(path = %file.path.display(), "Skipping draft");
                continue;
            }
            match map_markdown_to_post(&file) {
                Ok(post) => posts.push(post),
                Err(err) => warn!(path = %file.path.display(), error = %err, "Skipping post"),
            }
        }

        // Newest first; undated posts last
        posts.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));
        info!(count = posts.len(), dir = %self.posts_dir.display(), "Loaded local posts");
        Ok(posts)
    }
}

/// The source selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Notion(NotionSource),
    Local(LocalSource),
}

impl ConfiguredSource {
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        match config.source {
            SourceKind::Notion => Ok(Self::Notion(NotionSource::from_config(config)?)),
            SourceKind::Local => Ok(Self::Local(LocalSource::new(&config.local.posts_dir))),
        }
    }
}

impl ContentSource for ConfiguredSource {
    async fn published_posts(&self) -> Result<Vec<BlogPost>> {
        match self {
            ConfiguredSource::Notion(source) => source.published_posts().await,
            ConfiguredSource::Local(source) => source.published_posts().await,
        }
    }
}
