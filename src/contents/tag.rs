use super::{Container, ContentElement};
use crate::scanner::{self, TagParameter, TagToken, TokenKind};
use crate::types::Span;
use std::collections::HashMap;

/// How a tag's tokens were matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCompleteness {
    /// `<name ...>...</name>`
    Full { end_tag: Span },
    /// `<name ... />`, or a void element such as `<br>`
    SelfClosing,
    /// Opening tag without a matching end tag
    Unclosed,
    /// End tag without a matching opening tag
    OrphanEnd,
}

/// A tag element: one token, or a matched start/end pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    /// The opening token, or the lone end token of an orphan
    token: Span,
    completeness: TagCompleteness,
    parameters: Vec<TagParameter>,
}

impl Tag {
    fn from_token(token: TagToken, completeness: TagCompleteness) -> Self {
        Self {
            name: token.name,
            token: token.span,
            completeness,
            parameters: token.parameters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn completeness(&self) -> TagCompleteness {
        self.completeness
    }

    pub fn is_full(&self) -> bool {
        matches!(self.completeness, TagCompleteness::Full { .. })
    }

    pub fn is_self_closing(&self) -> bool {
        self.completeness == TagCompleteness::SelfClosing
    }

    /// Span of the opening token; `None` for an orphan end tag
    pub fn begin_tag(&self) -> Option<Span> {
        match self.completeness {
            TagCompleteness::OrphanEnd => None,
            _ => Some(self.token),
        }
    }

    /// Span of the end token, if the tag has one
    pub fn end_tag(&self) -> Option<Span> {
        match self.completeness {
            TagCompleteness::Full { end_tag } => Some(end_tag),
            TagCompleteness::OrphanEnd => Some(self.token),
            _ => None,
        }
    }

    /// Content between the opening and end tokens of a full tag
    pub fn inner(&self) -> Option<Span> {
        match self.completeness {
            TagCompleteness::Full { end_tag } => Some(Span::new(self.token.end, end_tag.begin)),
            _ => None,
        }
    }

    /// Spans of the tokens making up this tag
    pub fn tokens(&self) -> impl Iterator<Item = Span> + '_ {
        std::iter::once(self.token).chain(match self.completeness {
            TagCompleteness::Full { end_tag } => Some(end_tag),
            _ => None,
        })
    }

    pub fn parameters(&self) -> &[TagParameter] {
        &self.parameters
    }

    /// Parameter by case-insensitive name
    pub fn parameter(&self, name: &str) -> Option<&TagParameter> {
        self.parameters.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Pair every tag token of `text` into tag elements.
    pub fn analyze(text: &str) -> Container<Tag> {
        let mut tags: Vec<Tag> = Vec::new();
        let mut pending: HashMap<String, Vec<usize>> = HashMap::new();

        for token in scanner::scan_tag_tokens(text) {
            let void = scanner::VOID_TAGS.contains(&token.name.as_str());
            match token.kind {
                TokenKind::SelfClosing => tags.push(Tag::from_token(token, TagCompleteness::SelfClosing)),
                TokenKind::Start if void => tags.push(Tag::from_token(token, TagCompleteness::SelfClosing)),
                TokenKind::Start => {
                    pending.entry(token.name.clone()).or_default().push(tags.len());
                    tags.push(Tag::from_token(token, TagCompleteness::Unclosed));
                }
                TokenKind::End => {
                    let opening = if void {
                        None
                    } else {
                        pending.get_mut(&token.name).and_then(Vec::pop)
                    };
                    match opening {
                        Some(index) => tags[index].completeness = TagCompleteness::Full { end_tag: token.span },
                        None => tags.push(Tag::from_token(token, TagCompleteness::OrphanEnd)),
                    }
                }
            }
        }

        Container::new(tags)
    }
}

impl ContentElement for Tag {
    fn span(&self) -> Span {
        match self.completeness {
            TagCompleteness::Full { end_tag } => Span::new(self.token.begin, end_tag.end),
            _ => self.token,
        }
    }

    fn kind(&self) -> &str {
        &self.name
    }
}
