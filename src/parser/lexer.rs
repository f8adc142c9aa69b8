//! Lexer for tokenizing Markdown source.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1, take_while_m_n},
    character::complete::{char, not_line_ending, space0, space1},
    combinator::{eof, map, peek, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    // Block-level tokens
    Heading(u8, &'a str), // Level, content
    FencedCodeStart(&'a str, &'a str), // Fence, language
    ThematicBreak,
    ListItemMarker(ListMarker),

    // Inline tokens
    Emphasis(&'a str),
    Strong(&'a str),
    InlineCode(&'a str),
    Autolink(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListMarker {
    Unordered,
    Ordered(u32),
    Checkbox(bool),
}

/// Parse a heading (ATX style: # Heading).
pub fn heading(input: &str) -> IResult<&str, Token> {
    let (input, hashes) = take_while_m_n(1, 6, |c| c == '#')(input)?;
    let (input, _) = alt((space1, eof))(input)?;
    let (input, content) = not_line_ending(input)?;
    Ok((input, Token::Heading(hashes.len() as u8, strip_closing_hashes(content))))
}

/// Drop an optional closing sequence (`## Title ##`), keeping `C#`.
fn strip_closing_hashes(content: &str) -> &str {
    let trimmed = content.trim_end();
    let without = trimmed.trim_end_matches('#');
    if without.len() == trimmed.len() {
        return trimmed;
    }
    if without.is_empty() {
        return "";
    }
    if without.ends_with(' ') || without.ends_with('\t') {
        without.trim_end()
    } else {
        trimmed
    }
}

/// Parse a thematic break (---, ***, ___).
pub fn thematic_break(input: &str) -> IResult<&str, Token> {
    let (input, _) = alt((
        recognize(tuple((tag("---"), many0(char('-'))))),
        recognize(tuple((tag("***"), many0(char('*'))))),
        recognize(tuple((tag("___"), many0(char('_'))))),
    ))(input)?;
    let (input, _) = terminated(space0, eof)(input)?;
    Ok((input, Token::ThematicBreak))
}

/// Parse a fenced code block start.
pub fn fenced_code_start(input: &str) -> IResult<&str, Token> {
    let (input, fence) = alt((
        recognize(pair(tag("```"), take_while(|c| c == '`'))),
        recognize(pair(tag("~~~"), take_while(|c| c == '~'))),
    ))(input)?;
    let (input, _) = space0(input)?;
    let (input, lang) = take_while(|c: char| !c.is_whitespace() && c != '`')(input)?;
    let (input, _) = not_line_ending(input)?;
    Ok((input, Token::FencedCodeStart(fence, lang)))
}

/// Parse a list item marker.
pub fn list_item_marker(input: &str) -> IResult<&str, Token> {
    alt((
        // Checkbox
        map(
            tuple((
                alt((char('-'), char('*'), char('+'))),
                space1,
                char('['),
                alt((value(true, char('x')), value(true, char('X')), value(false, char(' ')))),
                char(']'),
                alt((space1, eof)),
            )),
            |(_, _, _, checked, _, _)| Token::ListItemMarker(ListMarker::Checkbox(checked)),
        ),
        // Unordered
        map(
            pair(alt((char('-'), char('*'), char('+'))), alt((space1, eof))),
            |_| Token::ListItemMarker(ListMarker::Unordered),
        ),
        // Ordered
        map(
            tuple((
                take_while_m_n(1, 9, |c: char| c.is_ascii_digit()),
                alt((char('.'), char(')'))),
                alt((space1, eof)),
            )),
            |(num, _, _): (&str, _, _)| {
                Token::ListItemMarker(ListMarker::Ordered(num.parse().unwrap_or(1)))
            },
        ),
    ))(input)
}

/// Parse an autolink (`<https://example.com>`).
pub fn autolink(input: &str) -> IResult<&str, Token> {
    let (rest, url) = delimited(
        char('<'),
        recognize(tuple((
            alt((tag("https://"), tag("http://"), tag("mailto:"))),
            take_while1(|c: char| c != '>' && c != '<' && !c.is_whitespace()),
        ))),
        char('>'),
    )(input)?;
    Ok((rest, Token::Autolink(url)))
}

/// Parse inline code (`code`).
pub fn inline_code(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('`')(input)?;
    let (input, _) = peek(nom::combinator::not(char('`')))(input)?;
    let (input, content) = take_until("`")(input)?;
    let (input, _) = char('`')(input)?;
    Ok((input, Token::InlineCode(content)))
}

/// Parse emphasis (*text* or _text_).
pub fn emphasis(input: &str) -> IResult<&str, Token> {
    alt((
        delimited(
            pair(char('*'), peek(nom::combinator::not(char('*')))),
            map(take_until("*"), Token::Emphasis),
            char('*'),
        ),
        delimited(
            pair(char('_'), peek(nom::combinator::not(char('_')))),
            map(until_closing_underscore, Token::Emphasis),
            char('_'),
        ),
    ))(input)
}

/// Content up to the closing `_`. An underscore followed by a letter or digit
/// is intraword (`snake_case`) and cannot close.
fn until_closing_underscore(input: &str) -> IResult<&str, &str> {
    let mut search = 0;
    while let Some(pos) = input[search..].find('_') {
        let at = search + pos;
        let next = input[at + 1..].chars().next();
        if !next.is_some_and(char::is_alphanumeric) {
            return Ok((&input[at..], &input[..at]));
        }
        search = at + 1;
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::TakeUntil,
    )))
}

/// Parse strong (**text** or __text__).
pub fn strong(input: &str) -> IResult<&str, Token> {
    alt((
        delimited(tag("**"), map(take_until("**"), Token::Strong), tag("**")),
        delimited(tag("__"), map(take_until("__"), Token::Strong), tag("__")),
    ))(input)
}

/// Parse a block quote marker, returning the quoted remainder.
pub fn block_quote_marker(input: &str) -> IResult<&str, &str> {
    preceded(pair(char('>'), nom::combinator::opt(char(' '))), nom::combinator::rest)(input)
}
