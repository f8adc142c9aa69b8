//! `sitemap.xml` generation.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::blog::{post_url, BlogPost};

/// How often a page is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub lastmod: Option<DateTime<Utc>>,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

impl SitemapEntry {
    fn write_xml(&self, out: &mut String) {
        out.push_str("  <url>\n");
        out.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&self.url)));
        if let Some(lastmod) = self.lastmod {
            out.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                lastmod.to_rfc3339_opts(SecondsFormat::Millis, true)
            ));
        }
        out.push_str(&format!("    <changefreq>{}</changefreq>\n", self.changefreq));
        out.push_str(&format!("    <priority>{:.1}</priority>\n", self.priority));
        out.push_str("  </url>\n");
    }
}

/// Entries for the home page, the blog index and every post.
pub fn sitemap_entries(site_url: &str, posts: &[BlogPost], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let site_url = site_url.trim_end_matches('/');
    let mut entries = vec![
        SitemapEntry {
            url: site_url.to_string(),
            lastmod: Some(now),
            changefreq: ChangeFreq::Weekly,
            priority: 1.0,
        },
        SitemapEntry {
            url: format!("{}/blog", site_url),
            lastmod: Some(now),
            changefreq: ChangeFreq::Daily,
            priority: 0.9,
        },
    ];

    entries.extend(posts.iter().map(|post| SitemapEntry {
        url: format!("{}{}", site_url, post_url(&post.slug)),
        lastmod: post.parsed_date(),
        changefreq: ChangeFreq::Monthly,
        priority: 0.8,
    }));

    entries
}

/// Render the complete sitemap document.
pub fn build_sitemap(site_url: &str, posts: &[BlogPost], now: DateTime<Utc>) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for entry in sitemap_entries(site_url, posts, now) {
        entry.write_xml(&mut xml);
    }
    xml.push_str("</urlset>");
    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn post(slug: &str, date: &str) -> BlogPost {
        BlogPost {
            id: slug.into(),
            title: slug.into(),
            slug: slug.into(),
            description: String::new(),
            date: date.into(),
            cover_image: String::new(),
            tags: Vec::new(),
            content: String::new(),
            published: true,
        }
    }

    #[test]
    fn test_build_sitemap() {
        let now = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        let posts = vec![post("hola-mundo", "2024-05-01"), post("sin-fecha", "pronto")];
        let xml = build_sitemap("https://carlosquinza.es/", &posts, now);

        assert_eq!(
            xml,
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
                "  <url>\n",
                "    <loc>https://carlosquinza.es</loc>\n",
                "    <lastmod>2025-02-03T04:05:06.000Z</lastmod>\n",
                "    <changefreq>weekly</changefreq>\n",
                "    <priority>1.0</priority>\n",
                "  </url>\n",
                "  <url>\n",
                "    <loc>https://carlosquinza.es/blog</loc>\n",
                "    <lastmod>2025-02-03T04:05:06.000Z</lastmod>\n",
                "    <changefreq>daily</changefreq>\n",
                "    <priority>0.9</priority>\n",
                "  </url>\n",
                "  <url>\n",
                "    <loc>https://carlosquinza.es/blog/hola-mundo</loc>\n",
                "    <lastmod>2024-05-01T00:00:00.000Z</lastmod>\n",
                "    <changefreq>monthly</changefreq>\n",
                "    <priority>0.8</priority>\n",
                "  </url>\n",
                "  <url>\n",
                "    <loc>https://carlosquinza.es/blog/sin-fecha</loc>\n",
                "    <changefreq>monthly</changefreq>\n",
                "    <priority>0.8</priority>\n",
                "  </url>\n",
                "</urlset>",
            )
        );
    }

    #[test]
    fn test_loc_is_escaped() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let xml = build_sitemap("https://x.test", &[post("a&b", "2024-01-01")], now);
        assert!(xml.contains("<loc>https://x.test/blog/a&amp;b</loc>"));
    }

    #[test]
    fn test_loc_encodes_slug() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let xml = build_sitemap("https://x.test", &[post("mi post", "2024-01-01")], now);
        assert!(xml.contains("<loc>https://x.test/blog/mi%20post</loc>"));
    }
}
