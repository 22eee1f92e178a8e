pub mod batch;
pub mod check_error;
pub mod check_result;
pub mod config;
pub mod contents;
pub mod exit_codes;
pub mod metadata;
pub mod page;
pub mod page_analysis;
pub mod priority;
pub mod rule;
pub mod rules;
pub mod scanner;
pub mod types;
pub mod utils;

pub use crate::check_result::{CheckErrorPage, CheckErrorResult, ErrorLevel, Replacement};
pub use crate::page::Page;
pub use crate::page_analysis::PageAnalysis;
pub use crate::priority::Priority;
pub use rules::*;

use crate::rule::Rule;
use std::time::Instant;

/// Analyze `contents` as the text of `page` with every rule.
///
/// Returns one entry per rule that found at least one problem.
pub fn analyze_page(page: &Page, contents: &str, rules: &[Box<dyn Rule>]) -> Vec<CheckErrorPage> {
    let analysis = PageAnalysis::new(page, contents);
    analyze_errors(&analysis, rules, false)
}

/// Run every rule on an existing analysis.
///
/// Rules whose white list contains the page are skipped.
pub fn analyze_errors(analysis: &PageAnalysis, rules: &[Box<dyn Rule>], only_automatic: bool) -> Vec<CheckErrorPage> {
    let mut pages = Vec::new();
    if analysis.contents().is_empty() {
        return pages;
    }

    let title = analysis.page().title();
    let profile_rules = std::env::var("WIKILINT_PROFILE_RULES").is_ok();

    for rule in rules {
        if rule.is_in_white_list(title) {
            log::debug!("Skipping {} on {title}: page is white-listed", rule.name());
            continue;
        }

        let rule_start = Instant::now();
        let error_page = analyze_error(rule.as_ref(), analysis, only_automatic);
        let rule_duration = rule_start.elapsed();
        if profile_rules {
            eprintln!("[RULE] {:6} {:?}", rule.name(), rule_duration);
        }
        if rule_duration.as_millis() > 500 {
            log::debug!("Rule {} took {:?} on {title}", rule.name(), rule_duration);
        }

        if error_page.error_found {
            pages.push(error_page);
        }
    }

    pages
}

/// Run a single rule on an analysis and collect its detections
pub fn analyze_error(rule: &dyn Rule, analysis: &PageAnalysis, only_automatic: bool) -> CheckErrorPage {
    let mut results = Vec::new();
    let error_found = rule.analyze(analysis, Some(&mut results), only_automatic);
    CheckErrorPage {
        rule: rule.number(),
        rule_name: rule.name().to_string(),
        description: rule.short_description().to_string(),
        priority: rule.priority(),
        page: analysis.page().title().to_string(),
        error_found,
        results,
    }
}
