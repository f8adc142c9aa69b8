//! `robots.txt` generation.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;

/// Paths no crawler should index.
const DISALLOWED: &[&str] = &["/_astro/", "/api/", "/.well-known/"];

/// Crawlers with their own rules and the crawl delay they get.
const FRIENDLY_BOTS: &[(&str, u32)] = &[("Googlebot", 0), ("Bingbot", 1), ("Slurp", 1)];

const BLOCKED_BOTS: &[&str] = &["AhrefsBot", "MJ12bot", "DotBot"];

/// Render `robots.txt` for the site at `site_url`.
pub fn build_robots_txt(site_url: &str, now: DateTime<Utc>) -> String {
    let site_url = site_url.trim_end_matches('/');
    let host = Url::parse(site_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| site_url.to_string());

    let mut out = String::new();
    out.push_str(&format!("# Robots.txt para {}\n", host));
    out.push_str(&format!(
        "# Generado automáticamente - {}\n\n",
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));

    out.push_str("# Permitir a todos los crawlers\nUser-agent: *\nAllow: /\n\n");

    out.push_str("# Bloquear acceso a directorios privados\n");
    for path in DISALLOWED {
        out.push_str(&format!("Disallow: {}\n", path));
    }

    out.push_str(&format!("\n# Sitemap location\nSitemap: {}/sitemap.xml\n\n", site_url));
    out.push_str("# Crawl-delay para reducir carga del servidor\nCrawl-delay: 1\n\n");

    out.push_str("# Instrucciones específicas para bots importantes\n");
    for (bot, delay) in FRIENDLY_BOTS {
        out.push_str(&format!("User-agent: {}\nAllow: /\nCrawl-delay: {}\n\n", bot, delay));
    }

    out.push_str("# Bloquear bots no deseados\n");
    let blocked: Vec<String> = BLOCKED_BOTS
        .iter()
        .map(|bot| format!("User-agent: {}\nDisallow: /\n", bot))
        .collect();
    out.push_str(&blocked.join("\n"));
    out
}
