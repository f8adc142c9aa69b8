//! The display model shared by templates, the grid and the JSON API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rendered blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    /// Date as provided by the source: `YYYY-MM-DD` or RFC 3339.
    pub date: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    /// Rendered HTML.
    pub content: String,
    pub published: bool,
}

impl BlogPost {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The post date as a UTC instant; bare dates are taken at midnight.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }
}

/// Parse RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` and bare dates.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(date: &str) -> BlogPost {
        BlogPost {
            id: "1".into(),
            title: "Hola".into(),
            slug: "hola".into(),
            description: String::new(),
            date: date.into(),
            cover_image: "/img.png".into(),
            tags: vec!["rust".into()],
            content: "<p>x</p>".into(),
            published: true,
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(post("2024-01-02")).unwrap();
        assert_eq!(json["coverImage"], "/img.png");
        assert!(json.get("cover_image").is_none());
    }

    #[test]
    fn test_parsed_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(post("2024-01-02").parsed_date(), Some(midnight));
        assert_eq!(
            post("2024-01-02T10:30:00.000+02:00").parsed_date(),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 8, 30, 0).unwrap())
        );
        assert_eq!(
            post("2024-01-02T00:00:00").parsed_date(),
            Some(midnight)
        );
        assert_eq!(post("mañana").parsed_date(), None);
    }

    #[test]
    fn test_has_tag() {
        assert!(post("").has_tag("rust"));
        assert!(!post("").has_tag("Rust"));
    }
}
