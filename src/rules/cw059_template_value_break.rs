//!
//! Rule CW059: template parameter value ending with a line break.
//!
//! A `<br>` that is the last thing in a template parameter value (only
//! whitespace and comments may follow it) adds nothing but stray spacing.

use crate::check_result::{CheckErrorResult, ErrorLevel};
use crate::config::{PropertySource, split_property_list};
use crate::metadata::RuleMetadata;
use crate::page::are_same_title;
use crate::page_analysis::PageAnalysis;
use crate::priority::Priority;
use crate::rule::{FIX_ALL_AUTOMATICALLY, Rule, RuleParameter};
use crate::scanner::{self, TagToken};

pub const PROPERTY_IGNORE_TEMPLATES: &str = "ignore-templates";

const PARAMETERS: &[RuleParameter] = &[RuleParameter::new(
    PROPERTY_IGNORE_TEMPLATES,
    "Templates whose parameters are not checked",
)
.optional()
.multiple()];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CW059Config {
    /// Templates whose parameters are never checked
    pub ignore_templates: Vec<String>,
}

impl CW059Config {
    pub fn from_source(source: &dyn PropertySource) -> Self {
        let ignore_templates = source
            .get_property(CW059TemplateValueBreak::NUMBER, PROPERTY_IGNORE_TEMPLATES, true, true, false)
            .map(|value| split_property_list(&value))
            .unwrap_or_default();
        Self { ignore_templates }
    }
}

#[derive(Debug, Clone)]
pub struct CW059TemplateValueBreak {
    metadata: RuleMetadata,
    config: CW059Config,
}

impl Default for CW059TemplateValueBreak {
    fn default() -> Self {
        Self::new(
            RuleMetadata::new(Self::NUMBER, Priority::Unknown),
            CW059Config::default(),
        )
    }
}

impl CW059TemplateValueBreak {
    pub const NUMBER: u32 = 59;

    pub fn new(metadata: RuleMetadata, config: CW059Config) -> Self {
        Self { metadata, config }
    }

    pub fn config(&self) -> &CW059Config {
        &self.config
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.config
            .ignore_templates
            .iter()
            .any(|ignored| are_same_title(ignored, name))
    }
}

/// Last break token of `value` that is not inside a comment
fn last_break(value: &str, in_comment: impl Fn(usize) -> bool) -> Option<TagToken> {
    let mut last = None;
    let mut pos = 0;
    while let Some(token) = scanner::find_next_tag(value, "br", pos) {
        pos = token.span.end;
        if !in_comment(token.span.begin) {
            last = Some(token);
        }
    }
    last
}

/// Whether only whitespace and terminated comments follow `from`
fn only_blank_after(value: &str, from: usize) -> bool {
    let mut rest = &value[from..];
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return true;
        }
        if !rest.starts_with(scanner::COMMENT_OPEN) {
            return false;
        }
        match rest[scanner::COMMENT_OPEN.len()..].find(scanner::COMMENT_CLOSE) {
            Some(offset) => {
                rest = &rest[scanner::COMMENT_OPEN.len() + offset + scanner::COMMENT_CLOSE.len()..];
            }
            None => return false,
        }
    }
}

impl Rule for CW059TemplateValueBreak {
    fn number(&self) -> u32 {
        Self::NUMBER
    }

    fn name(&self) -> &'static str {
        "CW059"
    }

    fn description(&self) -> &'static str {
        "Template value ends with a line break"
    }

    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn analyze(
        &self,
        analysis: &PageAnalysis,
        mut errors: Option<&mut Vec<CheckErrorResult>>,
        only_automatic: bool,
    ) -> bool {
        let contents = analysis.contents();
        let mut found = false;

        for template in analysis.templates() {
            if self.is_ignored(template.name()) {
                continue;
            }
            for parameter in template.parameters() {
                let value = parameter.value_text(contents);
                let offset = parameter.value_offset();
                let Some(token) = last_break(value, |index| analysis.is_in_comment(offset + index).is_some()) else {
                    continue;
                };
                if !only_blank_after(value, token.span.end) {
                    continue;
                }

                // Only a bare break is safe to drop unattended
                let automatic = token.parameters.is_empty();
                if only_automatic && !automatic {
                    continue;
                }
                let span = token.span.shifted(offset);
                let level = if automatic { ErrorLevel::Error } else { ErrorLevel::Warning };
                let mut result = CheckErrorResult::new(Self::NUMBER, span.begin, span.end).with_level(level);
                result.add_replacement_with_label("", "Delete", automatic);

                match errors.as_deref_mut() {
                    None => return true,
                    Some(errors) => {
                        found = true;
                        errors.push(result);
                    }
                }
            }
        }

        found
    }

    fn parameters(&self) -> &'static [RuleParameter] {
        PARAMETERS
    }

    fn global_fixes(&self) -> &'static [&'static str] {
        &[FIX_ALL_AUTOMATICALLY]
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn from_config(source: &dyn PropertySource, metadata: RuleMetadata) -> Box<dyn Rule>
    where
        Self: Sized,
    {
        Box::new(Self::new(metadata, CW059Config::from_source(source)))
    }
}
