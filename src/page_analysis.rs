//! Per-page analysis façade shared by every rule.

use crate::contents::{Comment, Container, ContentElement, Tag, Template};
use crate::page::Page;
use crate::types::Span;
use crate::utils::text;
use std::sync::OnceLock;

/// A page and its text, with element containers computed on demand.
///
/// Comments are located at construction because every other container
/// depends on them. Tags and templates are scanned on first access and cached
/// for the lifetime of the analysis.
pub struct PageAnalysis<'a> {
    page: &'a Page,
    contents: &'a str,
    line_offsets: Vec<usize>,
    comments: Container<Comment>,
    tags: OnceLock<Container<Tag>>,
    /// Every tag token with the index of its tag, sorted by start
    tag_tokens: OnceLock<Vec<(Span, usize)>>,
    templates: OnceLock<Container<Template>>,
}

impl<'a> PageAnalysis<'a> {
    pub fn new(page: &'a Page, contents: &'a str) -> Self {
        Self {
            page,
            contents,
            line_offsets: text::line_offsets(contents),
            comments: Comment::analyze(contents),
            tags: OnceLock::new(),
            tag_tokens: OnceLock::new(),
            templates: OnceLock::new(),
        }
    }

    pub fn page(&self) -> &'a Page {
        self.page
    }

    pub fn contents(&self) -> &'a str {
        self.contents
    }

    pub fn comments(&self) -> &Container<Comment> {
        &self.comments
    }

    /// Get tags - computed lazily on first access
    pub fn tags(&self) -> &Container<Tag> {
        self.tags.get_or_init(|| Tag::analyze(self.contents))
    }

    /// Get templates - computed lazily on first access
    pub fn templates(&self) -> &Container<Template> {
        self.templates
            .get_or_init(|| Template::analyze(self.contents, &self.comments, self.tags()))
    }

    fn tag_tokens(&self) -> &[(Span, usize)] {
        self.tag_tokens.get_or_init(|| {
            let mut tokens: Vec<(Span, usize)> = self
                .tags()
                .iter()
                .enumerate()
                .flat_map(|(index, tag)| tag.tokens().map(move |span| (span, index)))
                .collect();
            tokens.sort_by_key(|(span, _)| span.begin);
            tokens
        })
    }

    /// Tags with the given name, in order
    pub fn tags_named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Tag> + 's {
        self.tags().iter().filter(move |tag| tag.is_named(name))
    }

    /// Templates with the given name, in order
    pub fn templates_named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Template> + 's {
        self.templates().iter().filter(move |template| template.is_named(name))
    }

    /// Comment containing `index`, if any
    pub fn is_in_comment(&self, index: usize) -> Option<&Comment> {
        self.comments.enclosing(index)
    }

    /// Tag one of whose tokens contains `index`.
    ///
    /// Only the `<...>` tokens count, not the content between a start and an
    /// end tag.
    pub fn is_in_tag(&self, index: usize) -> Option<&Tag> {
        let tokens = self.tag_tokens();
        let candidate = tokens.partition_point(|(span, _)| span.begin <= index).checked_sub(1)?;
        let (span, tag_index) = tokens[candidate];
        if span.contains(index) {
            self.tags().elements().get(tag_index)
        } else {
            None
        }
    }

    /// Innermost full tag named `name` whose complete span contains `index`
    pub fn surrounding_tag(&self, name: &str, index: usize) -> Option<&Tag> {
        self.tags()
            .enclosing_of_kind(&name.to_ascii_lowercase(), index, Tag::is_full)
    }

    /// Innermost template containing `index`
    pub fn surrounding_template(&self, index: usize) -> Option<&Template> {
        self.templates().enclosing(index)
    }

    /// Map a byte offset to a 1-indexed (line, column)
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        text::offset_to_line_col(self.contents, &self.line_offsets, offset)
    }

    /// Text covered by an element
    pub fn text_of(&self, element: &impl ContentElement) -> &'a str {
        element.span().slice(self.contents)
    }
}
