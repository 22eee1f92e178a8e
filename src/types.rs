//! Shared value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range `[begin, end)` over a page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end, "span begin {begin} after end {end}");
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Whether `index` lies inside the span (`begin <= index < end`)
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.begin <= index && index < self.end
    }

    /// Whether `other` lies entirely inside this span
    pub fn contains_span(&self, other: &Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// Whether the two spans share at least one position
    pub fn overlaps(&self, other: &Span) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    /// Whether the spans overlap without one containing the other
    pub fn crosses(&self, other: &Span) -> bool {
        self.overlaps(other) && !self.contains_span(other) && !other.contains_span(self)
    }

    /// Translate a span relative to some offset into an absolute one
    pub fn shifted(&self, offset: usize) -> Span {
        Span::new(self.begin + offset, self.end + offset)
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.begin..self.end]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.begin, self.end)
    }
}
