//!
//! Rule CW104: unbalanced quotes in a reference name.
//!
//! Every `<` opening something that reads as `<ref name` is examined unless it
//! starts a well-formed ref tag, sits in a comment, or sits inside a tag whose
//! content is not wikitext. The reported span runs up to the next `>`
//! (included), `<` or newline (both excluded).

use crate::check_result::CheckErrorResult;
use crate::config::PropertySource;
use crate::contents::{ContentElement, Tag};
use crate::metadata::RuleMetadata;
use crate::page_analysis::PageAnalysis;
use crate::priority::Priority;
use crate::rule::{FIX_ALL_AUTOMATICALLY, Rule, fix_using_automatic_replacement};
use crate::utils::text::{char_at, char_before, skip_backward, skip_forward};
use std::collections::HashSet;

/// Tags whose content is never checked
const EXCLUDED_TAGS: &[&str] = &[
    "code",
    "math",
    "ce",
    "chem",
    "nowiki",
    "pre",
    "score",
    "source",
    "syntaxhighlight",
];

const NAME_OPENING: &[char] = &[' ', '"', '\'', '”'];
const NAME_CLOSING: &[char] = &[' ', '"', '\'', '”', '»'];
const VALUE_TRAILING: &[char] = &[' ', '\u{a0}', '/', '"', '″', '“', '”', '„', '’', '»'];
const VALUE_LEADING: &[char] = &['=', ' ', '\u{a0}', '"', '″', '“', '”', '„', '‘', '’', '»'];

#[derive(Debug, Clone)]
pub struct CW104RefNameQuotes {
    metadata: RuleMetadata,
}

impl Default for CW104RefNameQuotes {
    fn default() -> Self {
        Self::new(RuleMetadata::new(Self::NUMBER, Priority::Unknown))
    }
}

impl CW104RefNameQuotes {
    pub const NUMBER: u32 = 104;

    pub fn new(metadata: RuleMetadata) -> Self {
        Self { metadata }
    }

    fn should_report(&self, analysis: &PageAnalysis, index: usize) -> bool {
        // Tags parsed correctly are fine, except ref tags with malformed parameters
        if let Some(tag) = analysis.is_in_tag(index)
            && tag.span().begin == index
            && (!tag.is_named("ref") || is_well_formed(tag))
        {
            return false;
        }
        if analysis.is_in_comment(index).is_some() {
            return false;
        }
        !EXCLUDED_TAGS
            .iter()
            .any(|name| analysis.surrounding_tag(name, index).is_some())
    }

    /// Build the detection for the `<ref name` at `begin`, whose `name` ends at `name_end`.
    fn check_error(&self, contents: &str, begin: usize, name_end: usize) -> CheckErrorResult {
        let full_end = span_end(contents, name_end);
        let mut result = CheckErrorResult::new(Self::NUMBER, begin, full_end);

        let mut equal_sign = name_end;
        while equal_sign < full_end && contents.as_bytes()[equal_sign] == b' ' {
            equal_sign += 1;
        }
        let equal_sign = (char_at(contents, equal_sign) == Some('=')).then_some(equal_sign);

        if char_before(contents, full_end) != Some('>') {
            return result;
        }
        let last = full_end - 1;
        let prefix = &contents[begin..name_end];

        // Malformed end: name followed only by quotes, slashes and spaces
        let mut tmp = equal_sign.map_or(name_end, |e| e + 1);
        tmp = skip_forward(contents, tmp, last, |c| c == '=');
        tmp = skip_forward(contents, tmp, last, |c| NAME_OPENING.contains(&c));
        let start_name = tmp;
        tmp = skip_forward(contents, tmp, last, |c| c.is_alphanumeric() || " -_,.".contains(c));
        let mut end_name = tmp;
        while end_name > start_name && contents.as_bytes()[end_name - 1] == b' ' {
            end_name -= 1;
        }
        tmp = skip_forward(contents, tmp, last, |c| NAME_CLOSING.contains(&c));
        let slashes = skip_forward(contents, tmp, last, |c| c == '/');
        let closing = slashes > tmp;
        tmp = skip_forward(contents, slashes, last, |c| c == ' ' || c == '"');

        if tmp == last {
            if end_name > start_name {
                let name = &contents[start_name..end_name];
                let automatic = equal_sign.is_some_and(|e| char_at(contents, e + 1) == Some('"'))
                    && name.chars().all(char::is_alphanumeric);
                result.add_replacement(named_ref(prefix, name, closing), automatic);
            } else {
                let original = &contents[begin..full_end];
                let automatic = matches!(original, "<ref name>" | "<ref name=>" | "<ref name >");
                result.add_replacement("<ref>", automatic);
            }
            return result;
        }

        // Malformed name: walk back from the `>` to recover the value
        let Some(equal_sign) = equal_sign else {
            return result;
        };
        let mut tmp = last;
        while tmp > equal_sign && contents.as_bytes()[tmp - 1] == b' ' {
            tmp -= 1;
        }
        let mut closing = false;
        if tmp > equal_sign && contents.as_bytes()[tmp - 1] == b'/' {
            closing = true;
            tmp -= 1;
        }
        tmp = skip_backward(contents, tmp, equal_sign, |c| VALUE_TRAILING.contains(&c));
        let end_value = tmp;
        tmp = skip_backward(contents, tmp, equal_sign, |c| !matches!(c, '=' | '"' | '\n'));
        if tmp == equal_sign + 1 {
            let start_value = skip_forward(contents, equal_sign, end_value, |c| VALUE_LEADING.contains(&c));
            let value = &contents[start_value..end_value];
            result.add_replacement(named_ref(prefix, value, closing), false);
        }
        result
    }

    /// Whether a bot may apply this detection without review.
    ///
    /// Removing an empty name is always safe; a recovered name must already
    /// be used by a well-formed ref elsewhere on the page.
    fn is_unambiguous(result: &CheckErrorResult, known_names: &HashSet<&str>) -> bool {
        match result.automatic_replacement() {
            Some(replacement) if replacement.text == "<ref>" => true,
            Some(replacement) => recovered_name(&replacement.text).is_some_and(|name| known_names.contains(name)),
            None => false,
        }
    }
}

impl Rule for CW104RefNameQuotes {
    fn number(&self) -> u32 {
        Self::NUMBER
    }

    fn name(&self) -> &'static str {
        "CW104"
    }

    fn description(&self) -> &'static str {
        "Unbalanced quotes in ref name"
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

        for (index, _) in contents.match_indices('<') {
            let Some(name_end) = match_ref_name(contents, index) else {
                continue;
            };
            if !self.should_report(analysis, index) {
                continue;
            }
            let result = self.check_error(contents, index, name_end);
            if only_automatic && !result.has_automatic_replacement() {
                continue;
            }
            match errors.as_deref_mut() {
                None => return true,
                Some(errors) => {
                    found = true;
                    errors.push(result);
                }
            }
        }

        found
    }

    fn bot_fix(&self, analysis: &PageAnalysis) -> String {
        let contents = analysis.contents();
        let known_names: HashSet<&str> = analysis
            .tags_named("ref")
            .filter(|tag| is_well_formed(tag))
            .filter_map(|tag| tag.parameter("name")?.value_text(contents))
            .map(str::trim)
            .collect();
        fix_using_automatic_replacement(self, analysis, |result| Self::is_unambiguous(result, &known_names))
    }

    fn global_fixes(&self) -> &'static [&'static str] {
        &[FIX_ALL_AUTOMATICALLY]
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn from_config(_source: &dyn PropertySource, metadata: RuleMetadata) -> Box<dyn Rule>
    where
        Self: Sized,
    {
        Box::new(Self::new(metadata))
    }
}

/// A ref tag is well formed when every parameter has a value and the name is balanced
fn is_well_formed(tag: &Tag) -> bool {
    tag.parameter("name").is_none_or(|name| !name.unbalanced_quotes)
        && tag.parameters().iter().all(|parameter| parameter.has_value())
}

/// Match `<`, optional whitespace, `ref`, whitespace, `name` at `begin`.
///
/// Returns the offset right after `name`.
fn match_ref_name(contents: &str, begin: usize) -> Option<usize> {
    let mut index = skip_forward(contents, begin + 1, contents.len(), char::is_whitespace);
    if !contents[index..].starts_with("ref") {
        return None;
    }
    index += 3;
    if !char_at(contents, index).is_some_and(char::is_whitespace) {
        return None;
    }
    index = skip_forward(contents, index, contents.len(), char::is_whitespace);
    if !contents[index..].starts_with("name") {
        return None;
    }
    Some(index + 4)
}

/// End of the reported span: after the next `>`, or at the next `<`.
///
/// A newline or the end of the text before either leaves the span ending
/// right after `name`.
fn span_end(contents: &str, name_end: usize) -> usize {
    match contents[name_end..].find(['\n', '<', '>']) {
        Some(offset) => match contents.as_bytes()[name_end + offset] {
            b'>' => name_end + offset + 1,
            b'<' => name_end + offset,
            _ => name_end,
        },
        None => name_end,
    }
}

fn named_ref(prefix: &str, name: &str, closing: bool) -> String {
    format!("{prefix}=\"{name}\"{}>", if closing { " /" } else { "" })
}

/// Name inside a replacement built by [`named_ref`]
fn recovered_name(replacement: &str) -> Option<&str> {
    let (_, rest) = replacement.split_once("=\"")?;
    let (name, _) = rest.rsplit_once('"')?;
    Some(name)
}
