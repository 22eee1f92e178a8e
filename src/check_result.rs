//! Detection results produced by rules.

use crate::priority::Priority;
use crate::types::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    #[default]
    Error,
    Warning,
    /// Reported for information, the text is acceptable
    Correct,
}

/// A candidate text for the reported span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub text: String,
    pub label: String,
    /// Safe to apply without human review
    pub automatic: bool,
}

/// One detected problem: a span of the page and its replacement candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckErrorResult {
    rule: u32,
    begin: usize,
    end: usize,
    level: ErrorLevel,
    replacements: Vec<Replacement>,
}

impl CheckErrorResult {
    pub fn new(rule: u32, begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end);
        Self {
            rule,
            begin,
            end,
            level: ErrorLevel::Error,
            replacements: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: ErrorLevel) -> Self {
        self.level = level;
        self
    }

    /// Add a candidate labelled with its own text. Duplicate texts are ignored.
    pub fn add_replacement(&mut self, text: impl Into<String>, automatic: bool) {
        let text = text.into();
        let label = if text.is_empty() {
            "Delete".to_string()
        } else {
            text.clone()
        };
        self.add_replacement_with_label(text, label, automatic);
    }

    pub fn add_replacement_with_label(&mut self, text: impl Into<String>, label: impl Into<String>, automatic: bool) {
        let text = text.into();
        if self.replacements.iter().any(|r| r.text == text) {
            return;
        }
        self.replacements.push(Replacement {
            text,
            label: label.into(),
            automatic,
        });
    }

    pub fn rule(&self) -> u32 {
        self.rule
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Span {
        Span::new(self.begin, self.end)
    }

    pub fn level(&self) -> ErrorLevel {
        self.level
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    pub fn has_automatic_replacement(&self) -> bool {
        self.replacements.iter().any(|r| r.automatic)
    }

    /// First candidate marked automatic
    pub fn automatic_replacement(&self) -> Option<&Replacement> {
        self.replacements.iter().find(|r| r.automatic)
    }
}

/// Apply one replacement per result, as chosen by `select`.
///
/// Results are applied in order of position; a result overlapping an
/// already-applied one is skipped.
pub fn apply_replacements<'r>(
    contents: &str,
    results: &'r [CheckErrorResult],
    select: impl Fn(&'r CheckErrorResult) -> Option<&'r Replacement>,
) -> String {
    let mut ordered: Vec<&CheckErrorResult> = results.iter().collect();
    ordered.sort_by_key(|r| (r.begin, r.end));

    let mut fixed = String::with_capacity(contents.len());
    let mut last = 0;
    for result in ordered {
        if result.begin < last {
            log::debug!(
                "Skipping overlapping replacement at {} for rule {}",
                result.span(),
                result.rule
            );
            continue;
        }
        let Some(replacement) = select(result) else {
            continue;
        };
        fixed.push_str(&contents[last..result.begin]);
        fixed.push_str(&replacement.text);
        last = result.end;
    }
    fixed.push_str(&contents[last..]);
    fixed
}

/// Outcome of running one rule over one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckErrorPage {
    pub rule: u32,
    pub rule_name: String,
    pub description: String,
    pub priority: Priority,
    pub page: String,
    pub error_found: bool,
    pub results: Vec<CheckErrorResult>,
}

impl CheckErrorPage {
    pub fn error_count(&self) -> usize {
        self.results.len()
    }

    pub fn has_automatic_fix(&self) -> bool {
        self.results.iter().any(CheckErrorResult::has_automatic_replacement)
    }
}

impl fmt::Display for CheckErrorPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} ({}) - ",
            self.page, self.rule_name, self.description, self.priority
        )?;
        match self.results.len() {
            0 if self.error_found => f.write_str("error found"),
            0 => f.write_str("no error"),
            1 => f.write_str("1 error"),
            n => write!(f, "{n} errors"),
        }
    }
}
