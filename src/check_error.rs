//!
//! Error numbers with their list of pages, as published by the check-wiki
//! project, and the contract for reporting a page as fixed.

use crate::config::{PropertySource, parse_rule_number};
use crate::page::{Page, are_same_title};
use crate::priority::Priority;
use crate::rule::Rule;
use crate::rules;
use serde::Serialize;
use std::fmt;

/// Parameters of a "mark as fixed" request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixRequest {
    pub id: u32,
    #[serde(rename = "pageid")]
    pub page_id: u64,
    pub project: String,
    pub view: &'static str,
}

impl FixRequest {
    pub fn new(number: u32, page_id: u64, wiki: &str) -> Self {
        Self {
            id: number,
            page_id,
            project: format!("{wiki}wiki"),
            view: "only",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Invalid error number '{0}'")]
    InvalidNumber(String),

    #[error("Page {0} has no page id")]
    MissingPageId(String),

    #[error("Unable to mark error {number} fixed on {page}: {message}")]
    Transport { number: u32, page: String, message: String },
}

/// Reports fixed pages back to the error-tracking service.
pub trait FixSubmitter: Send + Sync {
    fn submit_fix(&self, request: &FixRequest) -> Result<(), SubmitError>;

    /// Wiki code used to build the project name
    fn wiki(&self) -> &str;
}

/// Mark error `error_number` fixed for `page`.
///
/// Every failure (unparsable number, missing page id, transport error) is
/// logged and reported as `false`.
pub fn mark_fixed(submitter: &dyn FixSubmitter, page: &Page, error_number: &str) -> bool {
    match try_mark_fixed(submitter, page, error_number) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{e}");
            false
        }
    }
}

fn try_mark_fixed(submitter: &dyn FixSubmitter, page: &Page, error_number: &str) -> Result<(), SubmitError> {
    let number = parse_rule_number(error_number).ok_or_else(|| SubmitError::InvalidNumber(error_number.to_string()))?;
    let page_id = page
        .page_id()
        .ok_or_else(|| SubmitError::MissingPageId(page.title().to_string()))?;
    submitter.submit_fix(&FixRequest::new(number, page_id, submitter.wiki()))
}

/// Titles listed between the `<pre>` and `</pre>` lines of a page listing.
///
/// HTML-escaped quotes are decoded.
pub fn parse_page_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .skip_while(|line| !line.ends_with("<pre>"))
        .skip(1)
        .take_while(|line| !line.starts_with("</pre>"))
        .map(|line| line.replace("&#039;", "'").replace("&quot;", "\""))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// An error number, its rule if one is implemented, and the pages reported for it.
#[derive(Clone)]
pub struct CheckError {
    number: u32,
    priority: Priority,
    rule: Option<Box<dyn Rule>>,
    pages: Vec<Page>,
}

impl CheckError {
    /// Create the error `number`; `None` when its priority is not active.
    pub fn new(source: &dyn PropertySource, number: u32) -> Option<Self> {
        let priority = Priority::resolve(source, number);
        if !priority.is_active() {
            log::debug!("Error {number} is not active: {}", priority.label());
            return None;
        }
        let rule = rules::instantiate(source, number);
        if rule.is_none() {
            log::debug!("Error {number} is not yet available");
        }
        Some(Self {
            number,
            priority,
            rule,
            pages: Vec::new(),
        })
    }

    /// Create the error `number` with the pages of a listing.
    ///
    /// Numbers without a published list keep an empty page list.
    pub fn with_listing(source: &dyn PropertySource, number: u32, listing: &str) -> Option<Self> {
        let mut error = Self::new(source, number)?;
        if !rules::has_list(number) {
            log::debug!("Error {number} has no page list, ignoring listing");
            return Some(error);
        }
        for title in parse_page_list(listing) {
            error.add_page(Page::new(&title));
        }
        Some(error)
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Rule implementing this error, if any
    pub fn rule(&self) -> Option<&dyn Rule> {
        self.rule.as_deref()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Add a page unless one with the same title is already listed
    pub fn add_page(&mut self, page: Page) {
        if !self.pages.iter().any(|p| p.is_same_page(&page)) {
            self.pages.push(page);
        }
    }

    /// Remove every page with the same title
    pub fn remove(&mut self, page: &Page) {
        self.pages.retain(|p| !are_same_title(p.title(), page.title()));
    }

    /// Remove `page` from the list and report it fixed
    pub fn fix(&mut self, page: &Page, submitter: &dyn FixSubmitter) -> bool {
        self.remove(page);
        mark_fixed(submitter, page, &self.number.to_string())
    }
}

/// Add or replace error `number` in `errors`; inactive numbers are left out.
pub fn add_check_error(errors: &mut Vec<CheckError>, source: &dyn PropertySource, number: u32, listing: Option<&str>) {
    let error = match listing {
        Some(listing) => CheckError::with_listing(source, number, listing),
        None => CheckError::new(source, number),
    };
    let Some(error) = error else {
        return;
    };
    errors.retain(|existing| existing.number != number);
    errors.push(error);
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = self
            .rule
            .as_ref()
            .map_or("Error unknown from wikilint", |rule| rule.short_description());
        write!(
            f,
            "Error n°{} ({} - {}) - {}",
            self.number,
            self.pages.len(),
            self.priority,
            description
        )
    }
}

impl fmt::Debug for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckError")
            .field("number", &self.number)
            .field("priority", &self.priority)
            .field("available", &self.rule.is_some())
            .field("pages", &self.pages)
            .finish()
    }
}
