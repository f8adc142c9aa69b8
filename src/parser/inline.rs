//! Inline-level parsing for Markdown.

use crate::ast::Inline;
use crate::error::Result;
use crate::parser::lexer::{autolink, emphasis, inline_code, strong, Token};

/// Parse inline content from a string.
pub fn parse_inlines(input: &str) -> Result<Vec<Inline>> {
    let mut inlines = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() {
        if remaining.starts_with('\n') {
            push_line_break(&mut inlines);
            remaining = remaining[1..].trim_start_matches([' ', '\t']);
            continue;
        }

        if let Some((inline, rest)) = try_parse_inline(remaining)? {
            push_inline(&mut inlines, inline);
            remaining = rest;
            continue;
        }

        let (text, rest) = consume_text(remaining);
        if text.is_empty() {
            // Special character that did not open anything: keep it literally
            let c = remaining.chars().next().unwrap_or_default();
            push_inline(&mut inlines, Inline::Text(c.to_string()));
            remaining = &remaining[c.len_utf8()..];
        } else {
            push_inline(&mut inlines, Inline::Text(text.to_string()));
            remaining = rest;
        }
    }

    // Trailing whitespace before the end of a paragraph is not content
    if let Some(Inline::Text(last)) = inlines.last_mut() {
        let trimmed = last.trim_end().len();
        last.truncate(trimmed);
        if last.is_empty() {
            inlines.pop();
        }
    }

    Ok(inlines)
}

/// Append an inline, merging adjacent text nodes.
fn push_inline(inlines: &mut Vec<Inline>, inline: Inline) {
    if let Inline::Text(text) = &inline {
        if text.is_empty() {
            return;
        }
        if let Some(Inline::Text(last)) = inlines.last_mut() {
            last.push_str(text);
            return;
        }
    }
    inlines.push(inline);
}

/// Two trailing spaces make a hard break, anything else a soft one.
fn push_line_break(inlines: &mut Vec<Inline>) {
    let mut hard = false;
    if let Some(Inline::Text(last)) = inlines.last_mut() {
        hard = last.ends_with("  ");
        let trimmed = last.trim_end_matches([' ', '\t']).len();
        last.truncate(trimmed);
        if last.is_empty() {
            inlines.pop();
        }
    }
    inlines.push(if hard { Inline::HardBreak } else { Inline::SoftBreak });
}

fn try_parse_inline(input: &str) -> Result<Option<(Inline, &str)>> {
    // Order matters - try more specific patterns first

    // Backslash escapes and backslash hard breaks
    if let Some(after) = input.strip_prefix('\\') {
        if let Some(rest) = after.strip_prefix('\n') {
            return Ok(Some((Inline::HardBreak, rest.trim_start_matches([' ', '\t']))));
        }
        if let Some(c) = after.chars().next() {
            if c.is_ascii_punctuation() {
                return Ok(Some((Inline::Text(c.to_string()), &after[1..])));
            }
        }
        return Ok(None);
    }

    // Strong (**...** or __...__)
    if input.starts_with("**") || input.starts_with("__") {
        if let Ok((rest, Token::Strong(content))) = strong(input) {
            if is_flanked(content) {
                let inner = parse_inlines(content)?;
                return Ok(Some((Inline::Strong(inner), rest)));
            }
        }
    }

    // Emphasis (*...* or _..._)
    if input.starts_with('*') || input.starts_with('_') {
        if let Ok((rest, Token::Emphasis(content))) = emphasis(input) {
            if is_flanked(content) {
                let inner = parse_inlines(content)?;
                return Ok(Some((Inline::Emphasis(inner), rest)));
            }
        }
    }

    // Strikethrough (~~...~~)
    if let Some(after) = input.strip_prefix("~~") {
        if let Some(end) = after.find("~~") {
            let content = &after[..end];
            if is_flanked(content) {
                let inner = parse_inlines(content)?;
                return Ok(Some((Inline::Strikethrough(inner), &after[end + 2..])));
            }
        }
    }

    // Inline code (`...` or ``...``)
    if input.starts_with('`') {
        return Ok(try_parse_code_span(input));
    }

    // Image (![alt](url "title"))
    if input.starts_with("![") {
        if let Some((inline, rest)) = try_parse_image(input)? {
            return Ok(Some((inline, rest)));
        }
    }

    // Link ([text](url "title"))
    if input.starts_with('[') {
        if let Some((inline, rest)) = try_parse_link(input)? {
            return Ok(Some((inline, rest)));
        }
    }

    // Autolink (<https://...>) before raw HTML
    if input.starts_with('<') {
        if let Ok((rest, Token::Autolink(url))) = autolink(input) {
            let text = url.strip_prefix("mailto:").unwrap_or(url);
            return Ok(Some((
                Inline::Link {
                    url: url.to_string(),
                    title: None,
                    content: vec![Inline::Text(text.to_string())],
                },
                rest,
            )));
        }
        if let Some((inline, rest)) = try_parse_raw_html(input) {
            return Ok(Some((inline, rest)));
        }
    }

    Ok(None)
}

/// Delimited content must not be empty or padded with whitespace.
fn is_flanked(content: &str) -> bool {
    !content.is_empty()
        && !content.starts_with(char::is_whitespace)
        && !content.ends_with(char::is_whitespace)
}

fn try_parse_code_span(input: &str) -> Option<(Inline, &str)> {
    let ticks = input.len() - input.trim_start_matches('`').len();
    if ticks == 1 {
        return match inline_code(input) {
            Ok((rest, Token::InlineCode(content))) => Some((Inline::Code(content.to_string()), rest)),
            _ => None,
        };
    }

    let fence = &input[..ticks];
    let body = &input[ticks..];
    let mut search = 0;
    while let Some(pos) = body[search..].find(fence) {
        let start = search + pos;
        let run = body[start..].len() - body[start..].trim_start_matches('`').len();
        if run == ticks {
            let mut content = &body[..start];
            if content.len() >= 2 && content.starts_with(' ') && content.ends_with(' ') {
                content = &content[1..content.len() - 1];
            }
            return Some((Inline::Code(content.to_string()), &body[start + ticks..]));
        }
        search = start + run;
    }
    None
}

fn try_parse_link(input: &str) -> Result<Option<(Inline, &str)>> {
    let Some((text, after_text)) = split_bracketed(input) else {
        return Ok(None);
    };
    let Some((url_part, rest)) = split_parenthesized(after_text) else {
        return Ok(None);
    };

    let (url, title) = parse_url_and_title(url_part);
    let content = parse_inlines(text)?;

    Ok(Some((
        Inline::Link {
            url: url.to_string(),
            title: title.map(String::from),
            content,
        },
        rest,
    )))
}

fn try_parse_image(input: &str) -> Result<Option<(Inline, &str)>> {
    let Some((alt, after_alt)) = split_bracketed(&input[1..]) else {
        return Ok(None);
    };
    let Some((url_part, rest)) = split_parenthesized(after_alt) else {
        return Ok(None);
    };

    let (url, title) = parse_url_and_title(url_part);
    let alt = Inline::plain_text(&parse_inlines(alt)?);

    Ok(Some((
        Inline::Image {
            url: url.to_string(),
            alt,
            title: title.map(String::from),
        },
        rest,
    )))
}

/// Split `[text]rest`, honouring nested brackets and escapes.
fn split_bracketed(input: &str) -> Option<(&str, &str)> {
    if !input.starts_with('[') {
        return None;
    }
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&input[1..i], &input[i + 1..]));
                }
            }
            '\n' if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

/// Split `(target)rest`, honouring nested parentheses.
fn split_parenthesized(input: &str) -> Option<(&str, &str)> {
    if !input.starts_with('(') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&input[1..i], &input[i + 1..]));
                }
            }
            '\n' => return None,
            _ => {}
        }
    }
    None
}

fn parse_url_and_title(input: &str) -> (&str, Option<&str>) {
    let input = input.trim();

    if let Some(inner) = input.strip_prefix('<') {
        if let Some(end) = inner.find('>') {
            let title = unquote(inner[end + 1..].trim());
            return (&inner[..end], title);
        }
    }

    match input.split_once(char::is_whitespace) {
        Some((url, rest)) => (url, unquote(rest.trim())),
        None => (input, None),
    }
}

fn unquote(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return Some(&s[1..s.len() - 1]);
        }
    }
    None
}

fn try_parse_raw_html(input: &str) -> Option<(Inline, &str)> {
    if let Some(after) = input.strip_prefix("<!--") {
        let end = after.find("-->")?;
        let len = 4 + end + 3;
        return Some((Inline::RawHtml(input[..len].to_string()), &input[len..]));
    }

    let close = input.find('>')?;
    let tag_content = &input[1..close];
    let name = tag_content.strip_prefix('/').unwrap_or(tag_content);
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) || tag_content.contains('<') {
        return None;
    }

    Some((Inline::RawHtml(input[..=close].to_string()), &input[close + 1..]))
}

fn consume_text(input: &str) -> (&str, &str) {
    // Special characters that might start inline elements
    const SPECIAL: &[char] = &['*', '_', '`', '[', '!', '<', '~', '\\', '\n'];

    let mut prev: Option<char> = None;
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if SPECIAL.contains(&c) {
            let next = chars.peek().map(|&(_, n)| n);
            let opens = match c {
                // Intraword underscores stay literal (snake_case)
                '_' => !prev.is_some_and(char::is_alphanumeric),
                '~' => next == Some('~'),
                '!' => next == Some('['),
                _ => true,
            };
            if opens {
                return (&input[..i], &input[i..]);
            }
        }
        prev = Some(c);
    }

    (input, "")
}
