use proptest::prelude::*;
use wikilint_lib::check_result::CheckErrorResult;
use wikilint_lib::page::Page;
use wikilint_lib::page_analysis::PageAnalysis;
use wikilint_lib::rule::Rule;
use wikilint_lib::rules::{CW059TemplateValueBreak, CW104RefNameQuotes};
use wikilint_lib::types::Span;

const FRAGMENTS: &[&str] = &[
    "Some text. ",
    "\n",
    "<ref name>x</ref>",
    "<ref name=\"abc>y</ref>",
    "<ref name=\"abc/>",
    "<ref name=\"q\">z</ref>",
    "<ref name=abc\">w</ref>",
    "<ref name='single' />",
    "<!-- <ref name> -->",
    "<nowiki><ref name></nowiki>",
    "{{T|a=x<br>}}",
    "{{T|a=x<br/>\n|b=y}}",
    "{{T|a=x<br /><br>}}",
    "{{T|a=x<br clear=\"all\">}}",
    "{{A|b={{B|c=y<br>}}<br>}}",
    "{{T|a=x<br><!-- note -->}}",
    "{{T|a=<br>text}}",
];

fn wikitext() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..12).prop_map(|fragments| fragments.concat())
}

fn check(rule: &dyn Rule, contents: &str, only_automatic: bool) -> Vec<CheckErrorResult> {
    let page = Page::new("Prop");
    let analysis = PageAnalysis::new(&page, contents);
    let mut errors = Vec::new();
    rule.analyze(&analysis, Some(&mut errors), only_automatic);
    errors
}

/// Where each applied replacement lands in the fixed text
fn replaced_spans(results: &[CheckErrorResult]) -> Vec<Span> {
    let mut ordered: Vec<&CheckErrorResult> = results.iter().collect();
    ordered.sort_by_key(|r| (r.begin(), r.end()));

    let mut spans = Vec::new();
    let mut last = 0;
    let mut shift: isize = 0;
    for result in ordered {
        if result.begin() < last {
            continue;
        }
        let Some(replacement) = result.automatic_replacement() else {
            continue;
        };
        let begin = (result.begin() as isize + shift) as usize;
        spans.push(Span::new(begin, begin + replacement.text.len()));
        shift += replacement.text.len() as isize - (result.end() - result.begin()) as isize;
        last = result.end();
    }
    spans
}

/// Apply the automatic fix and return the fixed text with the spans it rewrote
fn fix(rule: &dyn Rule, contents: &str) -> (String, Vec<Span>) {
    let page = Page::new("Prop");
    let analysis = PageAnalysis::new(&page, contents);
    let fixed = rule.automatic_fix(&analysis);
    (fixed, replaced_spans(&check(rule, contents, true)))
}

proptest! {
    #[test]
    fn ref_name_fix_is_not_reported_again(text in wikitext()) {
        let rule = CW104RefNameQuotes::default();
        let (fixed, spans) = fix(&rule, &text);
        let remaining = check(&rule, &fixed, false);
        for result in &remaining {
            prop_assert!(!spans.contains(&result.span()), "{} reported again in {:?}", result.span(), fixed);
        }
        prop_assert!(check(&rule, &fixed, true).is_empty(), "automatic fix left work in {:?}", fixed);
    }

    #[test]
    fn template_break_fix_is_not_reported_again(text in wikitext()) {
        let rule = CW059TemplateValueBreak::default();
        let (fixed, spans) = fix(&rule, &text);
        for result in check(&rule, &fixed, false) {
            prop_assert!(!spans.contains(&result.span()), "{} reported again in {:?}", result.span(), fixed);
        }
        prop_assert!(fixed.len() <= text.len());
    }
}
