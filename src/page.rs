//! Page identity and title comparison.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static TITLE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_]+").unwrap());

/// Canonical form of a page title.
///
/// Applies NFC normalization, treats underscores and whitespace runs as a
/// single space, trims, and upper-cases the first character.
pub fn normalize_title(raw: &str) -> String {
    let composed: String = raw.nfc().collect();
    let collapsed = TITLE_SEPARATORS.replace_all(&composed, " ");
    let trimmed = collapsed.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether two titles name the same page
pub fn are_same_title(a: &str, b: &str) -> bool {
    normalize_title(a) == normalize_title(b)
}

/// A wiki page under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_id: Option<u64>,
}

impl Page {
    pub fn new(title: &str) -> Self {
        Self {
            title: normalize_title(title),
            page_id: None,
        }
    }

    pub fn with_page_id(mut self, page_id: u64) -> Self {
        self.page_id = Some(page_id);
        self
    }

    /// Normalized title
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page_id(&self) -> Option<u64> {
        self.page_id
    }

    pub fn is_same_page(&self, other: &Page) -> bool {
        self.title == other.title
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.title == normalize_title(title)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  foo_bar   baz "), "Foo bar baz");
        assert_eq!(normalize_title("éclair"), "Éclair");
        assert_eq!(normalize_title(""), "");
        // decomposed e + combining acute composes to U+00E9
        assert_eq!(normalize_title("Caf\u{65}\u{301}"), "Caf\u{e9}");
    }

    #[test]
    fn test_same_title() {
        assert!(are_same_title("Main_Page", "main Page"));
        assert!(!are_same_title("Main_Page", "main page"));
        assert!(!are_same_title("Main Page", "Main Pages"));
        let page = Page::new("help_desk").with_page_id(42);
        assert_eq!(page.title(), "Help desk");
        assert_eq!(page.page_id(), Some(42));
        assert!(page.has_title("help desk"));
        assert!(!page.has_title("Help Desk"));
        assert!(page.is_same_page(&Page::new("Help desk")));
    }
}
