//! Lexical scanning of raw wikitext.
//!
//! Stateless functions over a flat text buffer: locating comment bounds,
//! recognizing tag tokens with their parameters, and matching template braces.
//! The container layer in [`crate::contents`] builds page-wide element lists
//! from these primitives.

use crate::types::Span;
use crate::utils::text::{char_at, char_before, skip_backward};
use serde::Serialize;

pub const COMMENT_OPEN: &str = "<!--";
pub const COMMENT_CLOSE: &str = "-->";

/// Tags whose content is not parsed as wikitext
pub const UNPARSED_TAGS: &[&str] = &["nowiki", "pre", "math", "chem", "ce", "score", "source", "syntaxhighlight"];

/// HTML elements that never take an end tag
pub const VOID_TAGS: &[&str] = &["br", "hr", "wbr", "img"];

const TYPOGRAPHIC_QUOTES: &[char] = &['“', '”', '„', '‟', '«', '»', '‘', '’', '‚', '″'];

/// Guard against pathological brace nesting
const MAX_NESTING: usize = 256;

pub fn is_typographic_quote(c: char) -> bool {
    TYPOGRAPHIC_QUOTES.contains(&c)
}

pub fn is_quote(c: char) -> bool {
    c == '"' || c == '\'' || is_typographic_quote(c)
}

// ============================================================================
// Comments
// ============================================================================

/// End of the comment opened at `begin`.
///
/// Returns the exclusive end offset and whether a closing `-->` was found.
/// An unterminated comment extends to the end of the text.
pub fn comment_end(text: &str, begin: usize) -> (usize, bool) {
    let search_from = begin + COMMENT_OPEN.len();
    match text.get(search_from..).and_then(|rest| rest.find(COMMENT_CLOSE)) {
        Some(offset) => (search_from + offset + COMMENT_CLOSE.len(), true),
        None => (text.len(), false),
    }
}

/// Locate every comment in the text, in order.
pub fn scan_comments(text: &str) -> Vec<(Span, bool)> {
    let mut comments = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text.get(pos..).and_then(|rest| rest.find(COMMENT_OPEN)) {
        let begin = pos + offset;
        let (end, terminated) = comment_end(text, begin);
        comments.push((Span::new(begin, end), terminated));
        pos = end;
    }
    comments
}

// ============================================================================
// Tags
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Unquoted,
    Single,
    Double,
    Typographic,
}

/// A `name=value` attribute inside a tag token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParameter {
    pub name: String,
    /// Span of the value without its quotes; `None` for a bare attribute or an empty `name=`
    pub value: Option<Span>,
    pub quote: QuoteStyle,
    pub unbalanced_quotes: bool,
}

impl TagParameter {
    pub fn value_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.value.map(|span| span.slice(text))
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Start,
    End,
    SelfClosing,
}

/// A single `<name ...>`, `</name>` or `<name ... />` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    /// Lowercase tag name
    pub name: String,
    pub span: Span,
    pub kind: TokenKind,
    pub parameters: Vec<TagParameter>,
}

impl TagToken {
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

fn skip_ascii_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

/// First `>` or `<` at or after `from`, or the end of the text
fn tag_limit(text: &str, from: usize) -> usize {
    text.get(from..)
        .and_then(|rest| rest.find(['>', '<']))
        .map_or(text.len(), |offset| from + offset)
}

/// Recognize a tag token starting exactly at `index`.
///
/// Returns `None` when the text at `index` is not a well-delimited tag token:
/// no letter after `<` (or `</`), or no `>` before the next `<`.
pub fn parse_tag_at(text: &str, index: usize) -> Option<TagToken> {
    let bytes = text.as_bytes();
    if bytes.get(index) != Some(&b'<') {
        return None;
    }
    let mut pos = index + 1;
    let closing = bytes.get(pos) == Some(&b'/');
    if closing {
        pos += 1;
    }

    let name_begin = pos;
    if !bytes.get(pos).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    while bytes.get(pos).copied().is_some_and(is_tag_name_byte) {
        pos += 1;
    }
    let name = text[name_begin..pos].to_ascii_lowercase();
    match bytes.get(pos) {
        Some(b) if b.is_ascii_whitespace() || *b == b'/' || *b == b'>' => {}
        _ => return None,
    }

    let mut parameters = Vec::new();
    loop {
        pos = skip_ascii_whitespace(bytes, pos);
        match *bytes.get(pos)? {
            b'>' => {
                let kind = if closing { TokenKind::End } else { TokenKind::Start };
                return Some(TagToken {
                    name,
                    span: Span::new(index, pos + 1),
                    kind,
                    parameters,
                });
            }
            b'/' => {
                let after = skip_ascii_whitespace(bytes, pos + 1);
                if bytes.get(after) == Some(&b'>') {
                    let kind = if closing { TokenKind::End } else { TokenKind::SelfClosing };
                    return Some(TagToken {
                        name,
                        span: Span::new(index, after + 1),
                        kind,
                        parameters,
                    });
                }
                pos += 1;
            }
            b'<' => return None,
            _ => {
                let (parameter, next) = parse_parameter(text, pos)?;
                parameters.push(parameter);
                pos = next;
            }
        }
    }
}

fn parse_parameter(text: &str, mut pos: usize) -> Option<(TagParameter, usize)> {
    let bytes = text.as_bytes();
    let name_begin = pos;
    while let Some(c) = char_at(text, pos)
        && !(c.is_ascii_whitespace() || matches!(c, '=' | '>' | '/' | '<'))
    {
        pos += c.len_utf8();
    }
    let name = text[name_begin..pos].to_string();

    let after_name = skip_ascii_whitespace(bytes, pos);
    if bytes.get(after_name) != Some(&b'=') {
        return Some((
            TagParameter {
                name,
                value: None,
                quote: QuoteStyle::Unquoted,
                unbalanced_quotes: false,
            },
            pos,
        ));
    }

    pos = skip_ascii_whitespace(bytes, after_name + 1);
    let first = char_at(text, pos)?;
    match first {
        '>' | '<' => Some((
            TagParameter {
                name,
                value: None,
                quote: QuoteStyle::Unquoted,
                unbalanced_quotes: false,
            },
            pos,
        )),
        c if is_quote(c) => {
            let value_begin = pos + c.len_utf8();
            let limit = tag_limit(text, value_begin);
            let quote = match c {
                '"' => QuoteStyle::Double,
                '\'' => QuoteStyle::Single,
                _ => QuoteStyle::Typographic,
            };
            let window = &text[value_begin..limit];
            let close = match quote {
                QuoteStyle::Typographic => window.find(is_typographic_quote),
                _ => window.find(c),
            };
            if let Some(offset) = close {
                let value_end = value_begin + offset;
                let closing_len = char_at(text, value_end).map_or(1, char::len_utf8);
                return Some((
                    TagParameter {
                        name,
                        value: Some(Span::new(value_begin, value_end)),
                        quote,
                        unbalanced_quotes: false,
                    },
                    value_end + closing_len,
                ));
            }

            // No closing quote before the end of the tag
            let mut value_end = skip_backward(text, limit, value_begin, |c| c.is_ascii_whitespace());
            if value_end > value_begin && char_before(text, value_end) == Some('/') && limit < text.len() {
                value_end = skip_backward(text, value_end - 1, value_begin, |c| c.is_ascii_whitespace());
            }
            Some((
                TagParameter {
                    name,
                    value: Some(Span::new(value_begin, value_end)),
                    quote,
                    unbalanced_quotes: true,
                },
                value_end,
            ))
        }
        _ => {
            let value_begin = pos;
            while let Some(c) = char_at(text, pos) {
                if c.is_ascii_whitespace() || c == '>' || c == '<' {
                    break;
                }
                if c == '/' && bytes.get(skip_ascii_whitespace(bytes, pos + 1)) == Some(&b'>') {
                    break;
                }
                pos += c.len_utf8();
            }
            let value = Span::new(value_begin, pos);
            let unbalanced_quotes = value.slice(text).contains(is_quote);
            Some((
                TagParameter {
                    name,
                    value: (!value.is_empty()).then_some(value),
                    quote: QuoteStyle::Unquoted,
                    unbalanced_quotes,
                },
                pos,
            ))
        }
    }
}

/// Next token (start, end or self-closing) of tag `name` at or after `from`.
///
/// Names compare case-insensitively.
pub fn find_next_tag(text: &str, name: &str, from: usize) -> Option<TagToken> {
    find_next_tag_with(text, name, from, false)
}

/// Next token of tag `name` at or after `from`, comparing the name as
/// written in the text when `case_sensitive` is set.
pub fn find_next_tag_with(text: &str, name: &str, from: usize, case_sensitive: bool) -> Option<TagToken> {
    let mut pos = from;
    while let Some(offset) = text.get(pos..).and_then(|rest| rest.find('<')) {
        let index = pos + offset;
        if let Some(token) = parse_tag_at(text, index)
            && token.is_named(name)
            && (!case_sensitive || source_name(text, &token) == name)
        {
            return Some(token);
        }
        pos = index + 1;
    }
    None
}

/// Tag name of `token` as written in `text`
fn source_name<'a>(text: &'a str, token: &TagToken) -> &'a str {
    let begin = token.span.begin + if token.kind == TokenKind::End { 2 } else { 1 };
    &text[begin..begin + token.name.len()]
}

/// Next end token `</name>` at or after `from`.
pub fn find_next_end_tag(text: &str, name: &str, from: usize) -> Option<TagToken> {
    let mut pos = from;
    while let Some(token) = find_next_tag(text, name, pos) {
        if token.kind == TokenKind::End {
            return Some(token);
        }
        pos = token.span.end;
    }
    None
}

/// Every tag token in the text, skipping those inside comments.
pub fn scan_tag_tokens(text: &str) -> Vec<TagToken> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text.get(pos..).and_then(|rest| rest.find('<')) {
        let index = pos + offset;
        if text[index..].starts_with(COMMENT_OPEN) {
            pos = comment_end(text, index).0;
            continue;
        }
        match parse_tag_at(text, index) {
            Some(token) => {
                pos = token.span.end;
                tokens.push(token);
            }
            None => pos = index + 1,
        }
    }
    tokens
}

// ============================================================================
// Templates
// ============================================================================

/// A `|`-separated segment of a template invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSegment {
    /// From after the `|` up to the next separator or the closing braces
    pub span: Span,
    /// First top-level `=` inside the segment
    pub equal_sign: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateToken {
    /// From the opening `{{` to after the closing `}}`
    pub span: Span,
    /// Raw name segment, untrimmed
    pub name: Span,
    pub parameters: Vec<TemplateSegment>,
}

/// Match the template invocation opening at `begin`.
///
/// Nested templates, parameter placeholders (`{{{1}}}`), links, comments and
/// unparsed tags are skipped as units, so separators inside them do not split
/// the outer template. Returns `None` when the braces never close.
pub fn parse_template_at(text: &str, begin: usize) -> Option<TemplateToken> {
    parse_template_nested(text, begin, 0)
}

fn parse_template_nested(text: &str, begin: usize, depth: usize) -> Option<TemplateToken> {
    let rest = text.get(begin..)?;
    if depth > MAX_NESTING || !rest.starts_with("{{") || rest.starts_with("{{{") {
        return None;
    }

    let mut pos = begin + 2;
    let mut segment_begin = pos;
    let mut equal_sign = None;
    let mut name: Option<Span> = None;
    let mut parameters = Vec::new();

    loop {
        let rest = text.get(pos..)?;
        if rest.is_empty() {
            return None;
        }
        if let Some(next) = skip_nested(text, pos, depth)? {
            pos = next;
            continue;
        }
        if rest.starts_with("}}") {
            close_segment(&mut name, &mut parameters, Span::new(segment_begin, pos), equal_sign);
            break;
        }
        let c = rest.chars().next()?;
        if c == '|' {
            close_segment(&mut name, &mut parameters, Span::new(segment_begin, pos), equal_sign);
            segment_begin = pos + 1;
            equal_sign = None;
        } else if c == '=' && name.is_some() && equal_sign.is_none() {
            equal_sign = Some(pos);
        }
        pos += c.len_utf8();
    }

    let name = name?;
    if name.slice(text).trim().is_empty() {
        return None;
    }
    Some(TemplateToken {
        span: Span::new(begin, pos + 2),
        name,
        parameters,
    })
}

fn close_segment(name: &mut Option<Span>, parameters: &mut Vec<TemplateSegment>, span: Span, equal_sign: Option<usize>) {
    if name.is_none() {
        *name = Some(span);
    } else {
        parameters.push(TemplateSegment { span, equal_sign });
    }
}

/// Skip a construct that hides separators from the enclosing template.
///
/// `Ok(Some(end))` when a unit was skipped, `Ok(None)` when nothing applies at
/// `pos`, and the outer `None` when an unterminated unit makes the enclosing
/// template unmatched.
fn skip_nested(text: &str, pos: usize, depth: usize) -> Option<Option<usize>> {
    let rest = &text[pos..];
    if rest.starts_with(COMMENT_OPEN) {
        let (end, terminated) = comment_end(text, pos);
        return terminated.then_some(Some(end));
    }
    if rest.starts_with("{{{") {
        return Some(Some(skip_placeholder(text, pos, depth + 1).unwrap_or(pos + 1)));
    }
    if rest.starts_with("{{") {
        return parse_template_nested(text, pos, depth + 1).map(|t| Some(t.span.end));
    }
    if rest.starts_with("[[") {
        return Some(Some(skip_link(text, pos, depth + 1).unwrap_or(pos + 2)));
    }
    if rest.starts_with('<')
        && let Some(token) = parse_tag_at(text, pos)
    {
        if token.kind == TokenKind::Start
            && UNPARSED_TAGS.contains(&token.name.as_str())
            && let Some(end_token) = find_next_end_tag(text, &token.name, token.span.end)
        {
            return Some(Some(end_token.span.end));
        }
        return Some(Some(token.span.end));
    }
    Some(None)
}

/// Skip a `{{{name|default}}}` placeholder starting at `pos`.
fn skip_placeholder(text: &str, pos: usize, depth: usize) -> Option<usize> {
    if depth > MAX_NESTING {
        return None;
    }
    let mut p = pos + 3;
    loop {
        let rest = text.get(p..)?;
        if rest.is_empty() {
            return None;
        }
        if rest.starts_with("}}}") {
            return Some(p + 3);
        }
        match skip_nested(text, p, depth) {
            Some(Some(next)) => p = next,
            Some(None) => p += rest.chars().next().map_or(1, char::len_utf8),
            // An unmatched nested template is literal text here
            None => p += 2,
        }
    }
}

/// Skip a `[[...]]` link starting at `pos`.
///
/// A bare `}}` inside the link means the link is broken, so it is not skipped.
fn skip_link(text: &str, pos: usize, depth: usize) -> Option<usize> {
    if depth > MAX_NESTING {
        return None;
    }
    let mut p = pos + 2;
    loop {
        let rest = text.get(p..)?;
        if rest.is_empty() || rest.starts_with("}}") {
            return None;
        }
        if rest.starts_with("]]") {
            return Some(p + 2);
        }
        match skip_nested(text, p, depth) {
            Some(Some(next)) => p = next,
            Some(None) => p += rest.chars().next().map_or(1, char::len_utf8),
            None => return None,
        }
    }
}
