//!
//! The contract every check-wiki rule implements.
//!
//! A rule is identified by its error number, carries metadata resolved from
//! configuration, detects problems on a [`PageAnalysis`], and may offer an
//! automatic fix, a stricter bot fix, and named whole-page fixes.

use crate::check_result::{CheckErrorResult, apply_replacements};
use crate::config::PropertySource;
use crate::metadata::RuleMetadata;
use crate::page_analysis::PageAnalysis;
use crate::priority::Priority;
use dyn_clone::DynClone;
use std::any::Any;

/// Global fix applying every automatic replacement of the page
pub const FIX_ALL_AUTOMATICALLY: &str = "Fix all automatically";

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("{rule} has no global fix named '{name}'")]
    UnknownFix { rule: String, name: String },
}

pub type FixResult = Result<String, RuleError>;

/// A configuration property a rule reads, as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleParameter {
    pub name: &'static str,
    pub description: &'static str,
    /// The rule works without it
    pub optional: bool,
    /// Takes a list of values
    pub multiple: bool,
}

impl RuleParameter {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            optional: false,
            multiple: false,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub const fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

pub trait Rule: DynClone + Send + Sync {
    fn number(&self) -> u32;

    /// Short identifier such as `CW104`
    fn name(&self) -> &'static str;

    /// Built-in description, used when configuration gives none
    fn description(&self) -> &'static str;

    fn metadata(&self) -> &RuleMetadata;

    /// Detect problems on the page.
    ///
    /// Returns whether at least one problem exists. When `errors` is `None`
    /// the rule may stop at the first detection. With `only_automatic`, only
    /// problems carrying an automatic replacement are collected.
    fn analyze(&self, analysis: &PageAnalysis, errors: Option<&mut Vec<CheckErrorResult>>, only_automatic: bool)
    -> bool;

    fn priority(&self) -> Priority {
        self.metadata().priority()
    }

    /// Configured short description, or the built-in one
    fn short_description(&self) -> &str {
        self.metadata().short_description().unwrap_or(self.description())
    }

    fn is_in_white_list(&self, title: &str) -> bool {
        self.metadata().is_in_white_list(title)
    }

    /// Apply the first automatic replacement of every detection
    fn automatic_fix(&self, analysis: &PageAnalysis) -> String {
        fix_using_automatic_replacement(self, analysis, |_| true)
    }

    /// Fix applied in unattended bot runs
    fn bot_fix(&self, analysis: &PageAnalysis) -> String {
        self.automatic_fix(analysis)
    }

    /// Rule-specific properties read from configuration
    fn parameters(&self) -> &'static [RuleParameter] {
        &[]
    }

    /// Whether check-wiki publishes a page list for this error
    fn has_list(&self) -> bool {
        crate::rules::has_list(self.number())
    }

    /// Names of the whole-page fixes this rule offers
    fn global_fixes(&self) -> &'static [&'static str] {
        &[]
    }

    /// Run the global fix called `fix_name`
    fn fix(&self, fix_name: &str, analysis: &PageAnalysis) -> FixResult {
        if self.global_fixes().contains(&fix_name) {
            Ok(self.automatic_fix(analysis))
        } else {
            Err(RuleError::UnknownFix {
                rule: self.name().to_string(),
                name: fix_name.to_string(),
            })
        }
    }

    fn as_any(&self) -> &dyn Any;

    /// Build the rule from its resolved metadata and rule-specific properties
    fn from_config(source: &dyn PropertySource, metadata: RuleMetadata) -> Box<dyn Rule>
    where
        Self: Sized;
}

dyn_clone::clone_trait_object!(Rule);

/// Collect automatic detections and apply the first automatic replacement of
/// each one `accept` keeps.
pub fn fix_using_automatic_replacement<R: Rule + ?Sized>(
    rule: &R,
    analysis: &PageAnalysis,
    accept: impl Fn(&CheckErrorResult) -> bool,
) -> String {
    let mut errors = Vec::new();
    if !rule.analyze(analysis, Some(&mut errors), true) || errors.is_empty() {
        return analysis.contents().to_string();
    }
    log::debug!(
        "{} applying automatic fixes on {} ({} detections)",
        rule.name(),
        analysis.page().title(),
        errors.len()
    );
    apply_replacements(analysis.contents(), &errors, |result| {
        if accept(result) {
            result.automatic_replacement()
        } else {
            None
        }
    })
}
