mod cw059_template_value_break;
mod cw104_ref_name_quotes;

pub use cw059_template_value_break::{CW059Config, CW059TemplateValueBreak};
pub use cw104_ref_name_quotes::CW104RefNameQuotes;

use crate::config::{Config, PropertySource};
use crate::metadata::RuleMetadata;
use crate::priority::Priority;
use crate::rule::Rule;

/// Highest error number for which check-wiki publishes a page list
pub const MAX_ERROR_NUMBER_WITH_LIST: u32 = 500;

/// Whether check-wiki publishes a page list for error `number`
pub fn has_list(number: u32) -> bool {
    number <= MAX_ERROR_NUMBER_WITH_LIST
}

pub type RuleCtor = fn(&dyn PropertySource, RuleMetadata) -> Box<dyn Rule>;

/// Error numbers with an implementation, in ascending order
const RULES: &[(u32, RuleCtor)] = &[
    (CW059TemplateValueBreak::NUMBER, CW059TemplateValueBreak::from_config),
    (CW104RefNameQuotes::NUMBER, CW104RefNameQuotes::from_config),
];

/// Numbers of every implemented rule
pub fn available_numbers() -> impl Iterator<Item = u32> {
    RULES.iter().map(|(number, _)| *number)
}

pub fn constructor_for(number: u32) -> Option<RuleCtor> {
    RULES
        .binary_search_by_key(&number, |(n, _)| *n)
        .ok()
        .map(|index| RULES[index].1)
}

/// Build rule `number`, resolving its metadata first.
///
/// Returns `None` when no implementation exists for the number.
pub fn instantiate(source: &dyn PropertySource, number: u32) -> Option<Box<dyn Rule>> {
    let ctor = constructor_for(number)?;
    Some(ctor(source, RuleMetadata::resolve(source, number)))
}

/// Returns all rule instances regardless of priority, for listing
pub fn all_rules(source: &dyn PropertySource) -> Vec<Box<dyn Rule>> {
    RULES
        .iter()
        .map(|(number, ctor)| ctor(source, RuleMetadata::resolve(source, *number)))
        .collect()
}

/// Load the rules for `numbers` whose priority is active.
///
/// Inactive numbers and numbers without an implementation are skipped.
pub fn load_rules(source: &dyn PropertySource, numbers: impl IntoIterator<Item = u32>) -> Vec<Box<dyn Rule>> {
    let mut rules = Vec::new();
    for number in numbers {
        let metadata = RuleMetadata::resolve(source, number);
        if !metadata.priority().is_active() {
            log::debug!(
                "Skipping error {number}: {}",
                metadata.priority().label()
            );
            continue;
        }
        let Some(ctor) = constructor_for(number) else {
            log::debug!("Skipping error {number}: not yet available");
            continue;
        };
        rules.push(ctor(source, metadata));
    }
    rules
}

/// Active rules of every implemented number, filtered by the enable/disable lists
pub fn configured_rules(config: &Config) -> Vec<Box<dyn Rule>> {
    let rules = load_rules(config, available_numbers());
    filter_rules(&rules, config)
}

/// Configured rules shown to interactive users, leaving out bot-only ones
pub fn interactive_rules(config: &Config) -> Vec<Box<dyn Rule>> {
    configured_rules(config)
        .into_iter()
        .filter(|rule| {
            let bot_only = rule.priority() == Priority::BotOnly;
            if bot_only {
                log::debug!("Skipping {} for interactive use: bot only", rule.name());
            }
            !bot_only
        })
        .collect()
}

pub fn filter_rules(rules: &[Box<dyn Rule>], config: &Config) -> Vec<Box<dyn Rule>> {
    rules
        .iter()
        .filter(|rule| config.is_rule_enabled(rule.number()))
        .map(|rule| dyn_clone::clone_box(&**rule))
        .collect()
}
