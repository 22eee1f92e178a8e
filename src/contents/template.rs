use super::{Comment, Container, ContentElement, Tag};
use crate::page::normalize_title;
use crate::scanner::{self, TemplateToken};
use crate::types::Span;

/// A `|`-separated parameter of a template invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParameter {
    name: String,
    positional: bool,
    span: Span,
    value: Span,
}

impl TemplateParameter {
    /// Explicit name, or the computed position (`"1"`, `"2"`, ...) for unnamed parameters
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// Whole segment after the `|`
    pub fn span(&self) -> Span {
        self.span
    }

    /// Value text range, untrimmed
    pub fn value(&self) -> Span {
        self.value
    }

    /// Absolute offset where the value starts
    pub fn value_offset(&self) -> usize {
        self.value.begin
    }

    pub fn value_text<'a>(&self, text: &'a str) -> &'a str {
        self.value.slice(text)
    }
}

/// A `{{name|...}}` template invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    span: Span,
    name: String,
    parameters: Vec<TemplateParameter>,
}

impl Template {
    fn from_token(text: &str, token: TemplateToken) -> Self {
        let mut position = 0;
        let parameters = token
            .parameters
            .into_iter()
            .map(|segment| match segment.equal_sign {
                Some(equal) => TemplateParameter {
                    name: text[segment.span.begin..equal].trim().to_string(),
                    positional: false,
                    span: segment.span,
                    value: Span::new(equal + 1, segment.span.end),
                },
                None => {
                    position += 1;
                    TemplateParameter {
                        name: position.to_string(),
                        positional: true,
                        span: segment.span,
                        value: segment.span,
                    }
                }
            })
            .collect();

        Self {
            span: token.span,
            name: strip_comments(token.name.slice(text)).trim().to_string(),
            parameters,
        }
    }

    /// Name as written, trimmed and without comments
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compare names the way page titles compare
    pub fn is_named(&self, name: &str) -> bool {
        normalize_title(&self.name) == normalize_title(name)
    }

    pub fn parameters(&self) -> &[TemplateParameter] {
        &self.parameters
    }

    /// Parameter by name; the last occurrence wins
    pub fn parameter(&self, name: &str) -> Option<&TemplateParameter> {
        self.parameters.iter().rev().find(|p| p.name == name)
    }

    /// Find every template invocation of `text`.
    ///
    /// Invocations starting inside a comment or inside an unparsed tag such as
    /// `<nowiki>` are ignored.
    pub fn analyze(text: &str, comments: &Container<Comment>, tags: &Container<Tag>) -> Container<Template> {
        let mut templates = Vec::new();
        let mut pos = 0;
        while let Some(offset) = text.get(pos..).and_then(|rest| rest.find("{{")) {
            let begin = pos + offset;
            if let Some(comment) = comments.enclosing(begin) {
                pos = comment.span().end;
                continue;
            }
            let unparsed = scanner::UNPARSED_TAGS
                .iter()
                .filter_map(|name| {
                    tags.enclosing_of_kind(name, begin, |t| t.inner().is_some_and(|inner| inner.contains(begin)))
                })
                .max_by_key(|tag| tag.span().begin);
            if let Some(tag) = unparsed {
                pos = tag.span().end;
                continue;
            }
            if text[begin..].starts_with("{{{") {
                pos = begin + 3;
                continue;
            }
            if let Some(token) = scanner::parse_template_at(text, begin) {
                templates.push(Template::from_token(text, token));
            }
            pos = begin + 2;
        }
        Container::new(templates)
    }
}

impl ContentElement for Template {
    fn span(&self) -> Span {
        self.span
    }

    fn kind(&self) -> &str {
        "template"
    }
}

fn strip_comments(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pos = 0;
    for (span, _) in scanner::scan_comments(text) {
        result.push_str(&text[pos..span.begin]);
        pos = span.end;
    }
    result.push_str(&text[pos..]);
    result
}
