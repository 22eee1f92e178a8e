//! Descriptive and scheduling data attached to each rule.

use crate::config::{PropertySource, split_property_list};
use crate::page::normalize_title;
use crate::priority::Priority;
use serde::Serialize;
use std::collections::BTreeSet;

pub const PROPERTY_HEAD: &str = "head";
pub const PROPERTY_DESC: &str = "desc";
pub const PROPERTY_LINK: &str = "link";
pub const PROPERTY_WHITELIST: &str = "whitelist";
pub const PROPERTY_WHITELIST_PAGE: &str = "whitelistpage";

/// Metadata resolved from configuration before a rule is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleMetadata {
    number: u32,
    priority: Priority,
    short_description: Option<String>,
    long_description: Option<String>,
    link: Option<String>,
    white_list: Option<BTreeSet<String>>,
    white_list_page: Option<String>,
}

impl RuleMetadata {
    pub fn new(number: u32, priority: Priority) -> Self {
        Self {
            number,
            priority,
            ..Self::default()
        }
    }

    /// Resolve every property of error `number` from `source`.
    ///
    /// The white list is read from the wiki scope only.
    pub fn resolve(source: &dyn PropertySource, number: u32) -> Self {
        let property = |key: &str| source.get_property(number, key, true, true, false);
        let white_list = source
            .get_property(number, PROPERTY_WHITELIST, true, false, false)
            .map(|value| split_property_list(&value).iter().map(|t| normalize_title(t)).collect());

        Self {
            number,
            priority: Priority::resolve(source, number),
            short_description: property(PROPERTY_HEAD),
            long_description: property(PROPERTY_DESC),
            link: property(PROPERTY_LINK),
            white_list,
            white_list_page: source.get_property(number, PROPERTY_WHITELIST_PAGE, true, false, false),
        }
    }

    pub fn with_short_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = Some(description.into());
        self
    }

    pub fn with_white_list<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.white_list = Some(titles.into_iter().map(|t| normalize_title(t.as_ref())).collect());
        self
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn short_description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }

    pub fn long_description(&self) -> Option<&str> {
        self.long_description.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn white_list_page(&self) -> Option<&str> {
        self.white_list_page.as_deref()
    }

    pub fn has_white_list(&self) -> bool {
        self.white_list.is_some()
    }

    /// Whether `title` is exempt from reporting
    pub fn is_in_white_list(&self, title: &str) -> bool {
        self.white_list
            .as_ref()
            .is_some_and(|list| list.contains(&normalize_title(title)))
    }
}
