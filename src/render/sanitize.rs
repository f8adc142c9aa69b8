//! Allow-list sanitizing for raw HTML and URLs found in Markdown.

use super::escape_html;

/// Tags that survive sanitizing; attributes are always dropped.
const ALLOWED_TAGS: &[&str] = &[
    "b", "br", "del", "details", "em", "i", "ins", "kbd", "mark", "strong", "sub", "summary",
    "sup", "u",
];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Tags removed together with everything up to their closing tag.
const STRIPPED_TAGS: &[&str] = &["script", "style"];

/// Keep attribute-free allow-listed tags and drop every other tag and
/// comment. Text between tags is kept and escaped, except inside `script`
/// and `style`.
pub fn sanitize_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    let mut stripping: Option<String> = None;

    while let Some(start) = rest.find('<') {
        if stripping.is_none() {
            out.push_str(&escape_html(&rest[..start]));
        }
        let candidate = &rest[start..];

        if let Some(after) = candidate.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }

        match parse_tag(candidate) {
            Some((closing, name, len)) => {
                let self_closing = candidate[..len].ends_with("/>");
                rest = &candidate[len..];
                if let Some(open) = &stripping {
                    if closing && *open == name {
                        stripping = None;
                    }
                } else if ALLOWED_TAGS.contains(&name.as_str()) {
                    if name == "br" {
                        out.push_str("<br>");
                    } else if closing {
                        out.push_str(&format!("</{}>", name));
                    } else {
                        out.push_str(&format!("<{}>", name));
                    }
                } else if !closing && !self_closing && STRIPPED_TAGS.contains(&name.as_str()) {
                    stripping = Some(name);
                }
            }
            None => {
                if stripping.is_none() {
                    out.push_str("&lt;");
                }
                rest = &candidate[1..];
            }
        }
    }

    if stripping.is_none() {
        out.push_str(&escape_html(rest));
    }
    out
}

/// Parse `<name ...>` or `</name>`; returns (closing, lowercase name, byte length).
fn parse_tag(input: &str) -> Option<(bool, String, usize)> {
    let body = input.strip_prefix('<')?;
    let (closing, body) = match body.strip_prefix('/') {
        Some(after) => (true, after),
        None => (false, body),
    };
    let name: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if name.is_empty() {
        return None;
    }
    let end = input.find('>')?;
    if input[1..end].contains('<') {
        return None;
    }
    Some((closing, name.to_ascii_lowercase(), end + 1))
}

/// Whether a link or image target is safe to emit.
///
/// Relative URLs and fragments are allowed, absolute URLs only with an
/// http(s), mailto or tel scheme.
pub fn is_safe_url(url: &str) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();

    let scheme_end = cleaned.find(':');
    let path_start = cleaned.find(['/', '?', '#']);

    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => {
            let scheme = cleaned[..colon].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        (None, _) => true,
    }
}
