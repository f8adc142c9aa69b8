use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use notion_blog::blog::{BlogRepository, ConfiguredSource};
use notion_blog::config::{SiteConfig, SourceKind};
use notion_blog::site::{
    build_robots_txt, build_sitemap, error_json, posts_json, SiteBuilder, FETCH_ERROR,
};
use notion_blog::BlogPost;

#[derive(Parser, Debug)]
#[command(
    name = "notion-blog",
    about = "Build a blog from a Notion database or local Markdown files",
    version
)]
struct Opts {
    /// Configuration file (defaults to ./blog.toml when present)
    #[arg(long, short, global = true, env = "BLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the complete site into the output directory
    Build {
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,

        /// Post source: notion or local
        #[arg(long)]
        source: Option<SourceKind>,
    },
    /// Print published posts as JSON
    Posts {
        /// Only posts tagged with this category
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Print sitemap.xml
    Sitemap,
    /// Print robots.txt
    Robots,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default = if verbose {
        "notion_blog=debug"
    } else {
        "notion_blog=info"
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_tracing(opts.verbose);

    let mut config = SiteConfig::load(opts.config.as_deref()).context("loading configuration")?;

    match opts.command {
        Command::Build { out, source } => {
            if let Some(out) = out {
                config.build.output_dir = out;
            }
            if let Some(source) = source {
                config.source = source;
            }
            let posts = load_posts(&config).await?;
            let report = SiteBuilder::new(config, posts)
                .build(Utc::now())
                .context("writing site")?;
            info!(pages = report.pages, posts = report.posts, "Build finished");
        }
        Command::Posts { category } => match load_posts(&config).await {
            Ok(posts) => println!("{}", posts_json(&posts, &category)?),
            Err(err) => {
                println!("{}", error_json(FETCH_ERROR));
                return Err(err);
            }
        },
        Command::Sitemap => {
            let posts = load_posts(&config).await?;
            println!("{}", build_sitemap(&config.site.url, &posts, Utc::now()));
        }
        Command::Robots => {
            print!("{}", build_robots_txt(&config.site.url, Utc::now()));
        }
    }
    Ok(())
}

async fn load_posts(config: &SiteConfig) -> anyhow::Result<Vec<BlogPost>> {
    let source = ConfiguredSource::from_config(config).context("configuring post source")?;
    let repo = BlogRepository::new(source);
    match repo.all_posts().await {
        Ok(posts) => Ok(posts.to_vec()),
        Err(err) => {
            error!(error = %err, "Error fetching blog posts");
            Err(anyhow::Error::new(err).context(FETCH_ERROR))
        }
    }
}
