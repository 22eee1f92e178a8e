use super::{Container, ContentElement};
use crate::scanner;
use crate::types::Span;

/// An HTML comment `<!-- ... -->`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    span: Span,
    terminated: bool,
}

impl Comment {
    pub fn new(span: Span, terminated: bool) -> Self {
        Self { span, terminated }
    }

    /// False when the comment runs to the end of the page without `-->`
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Text between the delimiters
    pub fn inner_text<'a>(&self, text: &'a str) -> &'a str {
        let begin = (self.span.begin + scanner::COMMENT_OPEN.len()).min(self.span.end);
        let end = if self.terminated {
            self.span.end - scanner::COMMENT_CLOSE.len()
        } else {
            self.span.end
        };
        &text[begin..end.max(begin)]
    }

    /// Locate every comment of `text`
    pub fn analyze(text: &str) -> Container<Comment> {
        let comments = scanner::scan_comments(text)
            .into_iter()
            .map(|(span, terminated)| Comment::new(span, terminated))
            .collect();
        Container::new(comments)
    }
}

impl ContentElement for Comment {
    fn span(&self) -> Span {
        self.span
    }

    fn kind(&self) -> &str {
        "comment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_are_disjoint() {
        let text = "<!-- a <!-- b --> c -->";
        let comments = Comment::analyze(text);
        assert_eq!(comments.len(), 1);
        let comment = comments.elements()[0];
        assert_eq!(comment.span().end, 17);
        assert_eq!(comment.inner_text(text), " a <!-- b ");
    }

    #[test]
    fn test_unterminated_comment() {
        let text = "x <!-- open";
        let comments = Comment::analyze(text);
        let comment = comments.elements()[0];
        assert!(!comment.is_terminated());
        assert_eq!(comment.span(), Span::new(2, text.len()));
        assert_eq!(comment.inner_text(text), " open");
    }
}
