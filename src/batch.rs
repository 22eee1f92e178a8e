//!
//! Unattended fixing of many pages.
//!
//! Each page is fixed rule by rule until the text stops changing, with a
//! fresh [`PageAnalysis`] after every modification. The fixed text is then
//! analyzed again and pages that still have errors are set aside for manual
//! review.

use crate::analyze_errors;
use crate::check_result::CheckErrorPage;
use crate::page::Page;
use crate::page_analysis::PageAnalysis;
use crate::rule::Rule;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which fix a rule contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixMode {
    /// Every automatic replacement
    #[default]
    Automatic,
    /// The stricter bot fix
    Bot,
}

/// Shared stop request, checked between pages.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct PageInput {
    pub page: Page,
    pub contents: String,
}

impl PageInput {
    pub fn new(page: Page, contents: impl Into<String>) -> Self {
        Self {
            page,
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageFixOutcome {
    pub page: Page,
    pub original: String,
    pub fixed: String,
    /// Names of the rules that changed the text, in first-change order
    pub applied_rules: Vec<String>,
    /// Errors still reported on the fixed text
    pub remaining: Vec<CheckErrorPage>,
    pub iterations: usize,
    /// The last pass left the text unchanged
    pub converged: bool,
}

impl PageFixOutcome {
    pub fn is_modified(&self) -> bool {
        self.original != self.fixed
    }

    pub fn needs_manual_review(&self) -> bool {
        !self.remaining.is_empty() || !self.converged
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Outcomes of the processed pages, in input order
    pub pages: Vec<PageFixOutcome>,
    /// Titles of pages that still need a human
    pub needs_manual_review: BTreeSet<String>,
    /// Cancellation stopped the run before every page was processed
    pub cancelled: bool,
}

pub struct AutomaticFixer {
    rules: Vec<Box<dyn Rule>>,
    mode: FixMode,
    max_iterations: usize,
}

impl AutomaticFixer {
    pub fn new(rules: Vec<Box<dyn Rule>>, mode: FixMode, max_iterations: usize) -> Self {
        Self {
            rules,
            mode,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    fn fix_with(&self, rule: &dyn Rule, analysis: &PageAnalysis) -> String {
        match self.mode {
            FixMode::Automatic => rule.automatic_fix(analysis),
            FixMode::Bot => rule.bot_fix(analysis),
        }
    }

    /// Fix one page until its text is stable or the iteration bound is hit.
    ///
    /// White lists are not consulted while fixing, only by the final analysis.
    pub fn fix_page(&self, page: &Page, contents: &str) -> PageFixOutcome {
        let mut current = contents.to_string();
        let mut applied_rules: Vec<String> = Vec::new();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            let mut changed = false;
            for rule in &self.rules {
                let fixed = {
                    let analysis = PageAnalysis::new(page, &current);
                    self.fix_with(rule.as_ref(), &analysis)
                };
                if fixed != current {
                    log::debug!("{} modified {} (pass {iterations})", rule.name(), page.title());
                    if !applied_rules.iter().any(|name| name == rule.name()) {
                        applied_rules.push(rule.name().to_string());
                    }
                    current = fixed;
                    changed = true;
                }
            }
            if !changed {
                converged = true;
                break;
            }
        }
        if !converged {
            log::debug!(
                "{} still changing after {} passes",
                page.title(),
                self.max_iterations
            );
        }

        let remaining = {
            let analysis = PageAnalysis::new(page, &current);
            analyze_errors(&analysis, &self.rules, false)
        };

        PageFixOutcome {
            page: page.clone(),
            original: contents.to_string(),
            fixed: current,
            applied_rules,
            remaining,
            iterations,
            converged,
        }
    }

    fn fix_unless_cancelled(&self, input: &PageInput, cancel: &CancellationFlag) -> Option<PageFixOutcome> {
        if cancel.is_cancelled() {
            return None;
        }
        Some(self.fix_page(&input.page, &input.contents))
    }

    /// Fix every page, stopping early once `cancel` is set.
    pub fn run(&self, inputs: &[PageInput], cancel: &CancellationFlag) -> BatchOutcome {
        #[cfg(feature = "parallel")]
        let pages: Vec<PageFixOutcome> = inputs
            .par_iter()
            .filter_map(|input| self.fix_unless_cancelled(input, cancel))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let pages: Vec<PageFixOutcome> = inputs
            .iter()
            .map_while(|input| self.fix_unless_cancelled(input, cancel))
            .collect();

        let needs_manual_review = pages
            .iter()
            .filter(|outcome| outcome.needs_manual_review())
            .map(|outcome| outcome.page.title().to_string())
            .collect();
        let cancelled = pages.len() < inputs.len();
        if cancelled {
            log::debug!("Batch cancelled after {} of {} pages", pages.len(), inputs.len());
        }

        BatchOutcome {
            pages,
            needs_manual_review,
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RuleMetadata;
    use crate::priority::Priority;
    use crate::rules::{CW059Config, CW059TemplateValueBreak, CW104RefNameQuotes};
    use pretty_assertions::assert_eq;

    fn fixer(mode: FixMode) -> AutomaticFixer {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(CW059TemplateValueBreak::new(
                RuleMetadata::new(CW059TemplateValueBreak::NUMBER, Priority::High),
                CW059Config::default(),
            )),
            Box::new(CW104RefNameQuotes::new(RuleMetadata::new(
                CW104RefNameQuotes::NUMBER,
                Priority::High,
            ))),
        ];
        AutomaticFixer::new(rules, mode, 10)
    }

    #[test]
    fn test_fix_page_applies_both_rules() {
        let page = Page::new("Example");
        let contents = "{{Infobox|a=text<br>\n}}<ref name>x</ref>";
        let outcome = fixer(FixMode::Automatic).fix_page(&page, contents);
        assert_eq!(outcome.fixed, "{{Infobox|a=text\n}}<ref>x</ref>");
        assert_eq!(outcome.applied_rules, vec!["CW059", "CW104"]);
        assert!(outcome.converged);
        assert!(outcome.remaining.is_empty());
        assert!(outcome.is_modified());
    }

    #[test]
    fn test_bot_mode_needs_known_name() {
        let page = Page::new("Example");
        let unknown = "<ref name=\"abc>x</ref>";
        let outcome = fixer(FixMode::Bot).fix_page(&page, unknown);
        assert_eq!(outcome.fixed, unknown);
        assert!(outcome.needs_manual_review());

        let known = "<ref name=\"abc\">x</ref><ref name=\"abc>y</ref>";
        let outcome = fixer(FixMode::Bot).fix_page(&page, known);
        assert_eq!(outcome.fixed, "<ref name=\"abc\">x</ref><ref name=\"abc\">y</ref>");
        assert!(!outcome.needs_manual_review());
    }

    #[test]
    fn test_run_collects_manual_review() {
        let inputs = vec![
            PageInput::new(Page::new("Clean"), "<ref name>x</ref>"),
            PageInput::new(Page::new("Manual"), "<ref name=abc\">x</ref>"),
        ];
        let outcome = fixer(FixMode::Automatic).run(&inputs, &CancellationFlag::new());
        assert!(!outcome.cancelled);
        assert_eq!(outcome.pages.len(), 2);
        assert_eq!(outcome.pages[0].fixed, "<ref>x</ref>");
        assert_eq!(
            outcome.needs_manual_review.into_iter().collect::<Vec<_>>(),
            vec!["Manual".to_string()]
        );
    }

    #[test]
    fn test_run_cancelled() {
        let inputs = vec![PageInput::new(Page::new("A"), "<ref name>x</ref>")];
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let outcome = fixer(FixMode::Automatic).run(&inputs, &cancel);
        assert!(outcome.cancelled);
        assert!(outcome.pages.is_empty());
    }
}
