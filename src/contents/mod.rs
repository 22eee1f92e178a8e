//! Ordered, non-crossing collections of page elements.
//!
//! A [`Container`] holds elements of one type sorted by start offset. Elements
//! of the same kind never cross: any two are either disjoint or one contains
//! the other. Construction drops the later-starting element of a crossing pair.

mod comment;
mod tag;
mod template;

pub use comment::Comment;
pub use tag::{Tag, TagCompleteness};
pub use template::{Template, TemplateParameter};

use crate::types::Span;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Anything a [`Container`] can hold.
pub trait ContentElement {
    fn span(&self) -> Span;

    /// Elements sharing a kind must not cross
    fn kind(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container<T> {
    elements: Vec<T>,
    /// Innermost earlier element containing each element, of any kind
    parents: Vec<Option<usize>>,
    /// Innermost enclosing element of the same kind
    kind_parents: Vec<Option<usize>>,
    /// Element indices per kind, in container order
    by_kind: HashMap<String, Vec<usize>>,
}

impl<T> Default for Container<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            parents: Vec::new(),
            kind_parents: Vec::new(),
            by_kind: HashMap::new(),
        }
    }
}

impl<T: ContentElement> Container<T> {
    /// Sort `elements` by start (outermost first on ties) and drop crossing ones.
    pub fn new(mut elements: Vec<T>) -> Self {
        elements.sort_by_key(|e| {
            let span = e.span();
            (span.begin, Reverse(span.end))
        });

        let mut open: HashMap<String, Vec<usize>> = HashMap::new();
        let mut kept: Vec<T> = Vec::with_capacity(elements.len());
        let mut parents = Vec::with_capacity(elements.len());
        let mut kind_parents = Vec::with_capacity(elements.len());
        let mut by_kind: HashMap<String, Vec<usize>> = HashMap::new();
        for element in elements {
            let span = element.span();
            let stack = open.entry(element.kind().to_string()).or_default();
            while stack.last().is_some_and(|&top| kept[top].span().end <= span.begin) {
                stack.pop();
            }
            if let Some(&top) = stack.last()
                && span.end > kept[top].span().end
            {
                log::debug!(
                    "Dropping {} element at {} crossing the one at {}",
                    element.kind(),
                    span,
                    kept[top].span()
                );
                continue;
            }

            let index = kept.len();
            kind_parents.push(stack.last().copied());
            stack.push(index);

            let mut parent = index.checked_sub(1);
            while let Some(candidate) = parent
                && !kept[candidate].span().contains_span(&span)
            {
                parent = parents[candidate];
            }
            parents.push(parent);

            by_kind.entry(element.kind().to_string()).or_default().push(index);
            kept.push(element);
        }
        Self {
            elements: kept,
            parents,
            kind_parents,
            by_kind,
        }
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements starting at or before `index`
    fn started_by(&self, index: usize) -> usize {
        self.elements.partition_point(|e| e.span().begin <= index)
    }

    /// Innermost element whose span contains `index`.
    ///
    /// Among containing elements this is the one with the largest start
    /// offset. Walks containment parents from the last element starting at or
    /// before `index`, so the cost is bounded by the nesting depth.
    pub fn enclosing(&self, index: usize) -> Option<&T> {
        let mut candidate = self.started_by(index).checked_sub(1);
        while let Some(current) = candidate {
            if self.elements[current].span().contains(index) {
                return Some(&self.elements[current]);
            }
            candidate = self.parents[current];
        }
        None
    }

    /// Element at `index`, the innermost one when several contain it
    pub fn element_at(&self, index: usize) -> Option<&T> {
        self.enclosing(index)
    }

    /// Innermost element of `kind` containing `index` that also satisfies `pred`.
    ///
    /// Elements of one kind never cross, so the candidates form a single
    /// chain of same-kind ancestors.
    pub fn enclosing_of_kind(&self, kind: &str, index: usize, pred: impl Fn(&T) -> bool) -> Option<&T> {
        let indices = self.by_kind.get(kind)?;
        let started = indices.partition_point(|&i| self.elements[i].span().begin <= index);
        let mut candidate = started.checked_sub(1).map(|position| indices[position]);
        while let Some(current) = candidate {
            let element = &self.elements[current];
            if element.span().contains(index) && pred(element) {
                return Some(element);
            }
            candidate = self.kind_parents[current];
        }
        None
    }

    /// Whether any element contains `index`
    pub fn is_at(&self, index: usize) -> bool {
        self.enclosing(index).is_some()
    }

    /// First element starting at or after `index`
    pub fn next_after(&self, index: usize) -> Option<&T> {
        let first = self.elements.partition_point(|e| e.span().begin < index);
        self.elements.get(first)
    }
}

impl<'a, T> IntoIterator for &'a Container<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
