use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use notion_blog::blog::{BlogRepository, ConfiguredSource};
use notion_blog::config::{SiteConfig, SourceKind};
use notion_blog::site::{BuildReport, SiteBuilder};

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap_or_else(|e| panic!("{}: {}", name, e))
}

#[tokio::test]
async fn test_local_posts_build_a_complete_site() {
    let posts_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();

    write(
        posts_dir.path(),
        "2024-liderazgo.md",
        "---\ntitle: Liderar equipos\ndate: 2024-03-10\ntags: [Liderazgo]\ndescription: Notas\n---\n\n## Primer paso\n\nEscuchar.\n",
    );
    write(
        posts_dir.path(),
        "2024-rust.md",
        "---\ntitle: Rust en producción\ndate: 2024-06-01\ntags: [Rust, Desarrollo]\ncoverImage: /img/rust.png\n---\n\n```rust\nfn main() {}\n```\n\n<script>alert(1)</script>\n",
    );
    write(
        posts_dir.path(),
        "borrador.md",
        "---\ntitle: Borrador\npublished: false\n---\nNada",
    );

    let config = SiteConfig::from_toml(&format!(
        r#"
source = "local"

[site]
url = "https://blog.test/"

[local]
posts_dir = "{}"

[build]
output_dir = "{}"
"#,
        posts_dir.path().display(),
        out_dir.path().display()
    ))
    .unwrap();
    assert_eq!(config.source, SourceKind::Local);

    let repo = BlogRepository::new(ConfiguredSource::from_config(&config).unwrap());
    let posts = repo.all_posts().await.unwrap().to_vec();
    let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["rust-en-produccion", "liderar-equipos"]);

    let now = Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap();
    let report = SiteBuilder::new(config, posts).build(now).unwrap();
    assert_eq!(
        report,
        BuildReport {
            pages: 7,
            posts: 2,
            categories: 3,
        }
    );

    let out = out_dir.path();
    let post = read(out, "blog/rust-en-produccion/index.html");
    assert!(post.contains("<h1>Rust en producción</h1>"));
    assert!(post.contains("language-rust"));
    assert!(post.contains("src=\"/img/rust.png\""));
    assert!(!post.contains("<script>alert"));
    assert!(post.contains("1 de junio de 2024"));

    let grid = read(out, "blog/category/liderazgo/index.html");
    assert!(grid.contains("href=\"/blog/liderar-equipos\""));
    assert!(!grid.contains("href=\"/blog/rust-en-produccion\""));

    let api: serde_json::Value = serde_json::from_str(&read(out, "api/blog/category/rust.json")).unwrap();
    assert_eq!(api[0]["slug"], "rust-en-produccion");
    assert_eq!(api.as_array().unwrap().len(), 1);

    let sitemap = read(out, "sitemap.xml");
    assert!(sitemap.contains("<loc>https://blog.test/blog/liderar-equipos</loc>"));
    assert!(sitemap.contains("<lastmod>2024-03-10T00:00:00.000Z</lastmod>"));

    let robots = read(out, "robots.txt");
    assert!(robots.starts_with("# Robots.txt para blog.test\n"));
    assert!(robots.contains("Sitemap: https://blog.test/sitemap.xml\n"));

    assert!(!out.join("blog/borrador").exists());
}
