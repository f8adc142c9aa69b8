//! Site configuration loaded from TOML and the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "blog.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub source: SourceKind,
    pub notion: NotionSection,
    pub local: LocalSection,
    pub build: BuildSection,
}

/// Public site metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Absolute base URL without a trailing slash.
    pub url: String,
    pub name: String,
    pub description: String,
    /// Cover used when a post has none.
    pub default_cover_image: String,
    pub language: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            url: "https://carlosquinza.es".to_string(),
            name: "Carlos Quinza".to_string(),
            description: "Escribo sobre tecnología, desarrollo de software, liderazgo y productividad."
                .to_string(),
            default_cover_image: "/assets/first_img.png".to_string(),
            language: "es".to_string(),
        }
    }
}

/// Where posts come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Notion,
    Local,
}

impl std::str::FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "notion" => Ok(SourceKind::Notion),
            "local" => Ok(SourceKind::Local),
            other => Err(Error::Config(format!(
                "Unknown source '{}' (expected 'notion' or 'local')",
                other
            ))),
        }
    }
}

/// Notion API access settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotionSection {
    pub api_key: Option<String>,
    pub database_id: Option<String>,
    pub base_url: String,
    pub api_version: String,
    pub cache_ttl_secs: u64,
    pub max_retries: usize,
    /// Pages rendered at the same time.
    pub concurrency: usize,
    pub properties: PropertyNames,
}

impl Default for NotionSection {
    fn default() -> Self {
        Self {
            api_key: None,
            database_id: None,
            base_url: "https://api.notion.com".to_string(),
            api_version: "2022-06-28".to_string(),
            cache_ttl_secs: 3600,
            max_retries: 3,
            concurrency: 4,
            properties: PropertyNames::default(),
        }
    }
}

impl NotionSection {
    /// The API key and database id, both required to talk to Notion.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let api_key = non_blank(self.api_key.as_deref()).ok_or_else(|| {
            Error::Config("NOTION_API_KEY environment variable is required".to_string())
        })?;
        let database_id = non_blank(self.database_id.as_deref()).ok_or_else(|| {
            Error::Config("NOTION_DATABASE_ID environment variable is required".to_string())
        })?;
        Ok((api_key, database_id))
    }
}

/// Database columns backing each post field. Lists are tried in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    pub title: Vec<String>,
    pub slug: Vec<String>,
    pub description: Vec<String>,
    pub date: Vec<String>,
    pub tags: String,
    pub status: String,
    pub published_status: String,
    pub cover: Vec<String>,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            title: strings(&["Titulo", "Name"]),
            slug: strings(&["Slug"]),
            description: strings(&["Description", "Resumen"]),
            date: strings(&["Published Date", "Fecha"]),
            tags: "Tags".to_string(),
            status: "Estado".to_string(),
            published_status: "Publicado".to_string(),
            cover: strings(&["CoverImage", "Cover", "Cover Image", "Imagen"]),
        }
    }
}

/// Local Markdown source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalSection {
    pub posts_dir: PathBuf,
}

impl Default for LocalSection {
    fn default() -> Self {
        Self {
            posts_dir: PathBuf::from("content/posts"),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub output_dir: PathBuf,
    /// Directory whose templates replace the built-in ones by name.
    pub templates_dir: Option<PathBuf>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            templates_dir: None,
        }
    }
}

impl SiteConfig {
    /// Parse a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let mut config: SiteConfig =
            toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.normalize();
        Ok(config)
    }

    /// Load from `path` (or `blog.toml` when present), then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Override settings from `NOTION_API_KEY`, `NOTION_DATABASE_ID` and
    /// `SITE_URL`.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("NOTION_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.notion.api_key = Some(key);
        }
        if let Some(id) = var("NOTION_DATABASE_ID").filter(|v| !v.trim().is_empty()) {
            self.notion.database_id = Some(id);
        }
        if let Some(url) = var("SITE_URL").filter(|v| !v.trim().is_empty()) {
            self.site.url = url;
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        let trimmed = self.site.url.trim().trim_end_matches('/').to_string();
        self.site.url = trimmed;
        if self.notion.concurrency == 0 {
            self.notion.concurrency = 1;
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
