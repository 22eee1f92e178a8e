use wikilint_lib::check_result::{CheckErrorResult, apply_replacements};
use wikilint_lib::page::Page;
use wikilint_lib::page_analysis::PageAnalysis;
use wikilint_lib::rule::{FIX_ALL_AUTOMATICALLY, Rule, RuleError};
use wikilint_lib::rules::CW104RefNameQuotes;

fn check(contents: &str, only_automatic: bool) -> Vec<CheckErrorResult> {
    let page = Page::new("Test");
    let analysis = PageAnalysis::new(&page, contents);
    let mut errors = Vec::new();
    let found = CW104RefNameQuotes::default().analyze(&analysis, Some(&mut errors), only_automatic);
    assert_eq!(found, !errors.is_empty());
    errors
}

#[test]
fn test_unquoted_name_is_valid() {
    assert!(check("<ref name=test>x</ref>", false).is_empty());
}

#[test]
fn test_balanced_quotes_are_valid() {
    assert!(check("<ref name=\"Smith2020\">x</ref>", false).is_empty());
    assert!(check("<ref name='Smith2020' />", false).is_empty());
}

#[test]
fn test_name_without_value() {
    let errors = check("<ref name>", false);
    assert_eq!(errors.len(), 1);
    assert_eq!((errors[0].begin(), errors[0].end()), (0, 10));
    let replacement = errors[0].automatic_replacement().unwrap();
    assert_eq!(replacement.text, "<ref>");
}

#[test]
fn test_missing_closing_quote() {
    let errors = check("<ref name=\"abc>", false);
    assert_eq!(errors.len(), 1);
    let replacement = errors[0].automatic_replacement().unwrap();
    assert_eq!(replacement.text, "<ref name=\"abc\">");
}

#[test]
fn test_missing_closing_quote_self_closing() {
    let errors = check("text <ref name=\"abc/> more", false);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].begin(), 5);
    let replacement = errors[0].automatic_replacement().unwrap();
    assert_eq!(replacement.text, "<ref name=\"abc\" />");
}

#[test]
fn test_missing_opening_quote_is_not_automatic() {
    let errors = check("<ref name=abc\">x</ref>", false);
    assert_eq!(errors.len(), 1);
    assert!(!errors[0].has_automatic_replacement());
    assert_eq!(errors[0].replacements()[0].text, "<ref name=\"abc\">");
    assert!(check("<ref name=abc\">x</ref>", true).is_empty());
}

#[test]
fn test_malformed_name_has_no_automatic_replacement() {
    let errors = check("<ref name=\"a\"b\">x</ref>", false);
    assert_eq!(errors.len(), 1);
    assert!(!errors[0].has_automatic_replacement());
}

#[test]
fn test_ignored_contexts() {
    assert!(check("<!-- <ref name> -->", false).is_empty());
    assert!(check("<nowiki><ref name></nowiki>", false).is_empty());
    assert!(check("<pre><ref name=\"a></pre>", false).is_empty());
    assert!(check("<references/>", false).is_empty());
}

#[test]
fn test_detection_without_sink() {
    let page = Page::new("Test");
    let analysis = PageAnalysis::new(&page, "a <ref name> b <ref name=\"c>");
    assert!(CW104RefNameQuotes::default().analyze(&analysis, None, false));
}

#[test]
fn test_automatic_fix_is_stable() {
    let contents = "A<ref name>x</ref> B<ref name=\"abc>y</ref>";
    let errors = check(contents, true);
    assert_eq!(errors.len(), 2);
    let fixed = apply_replacements(contents, &errors, CheckErrorResult::automatic_replacement);
    assert_eq!(fixed, "A<ref>x</ref> B<ref name=\"abc\">y</ref>");

    let remaining = check(&fixed, false);
    assert!(remaining.iter().all(|r| errors.iter().all(|e| e.span() != r.span())));
    assert!(remaining.is_empty());
}

#[test]
fn test_global_fix() {
    let page = Page::new("Test");
    let analysis = PageAnalysis::new(&page, "<ref name>x</ref>");
    let rule = CW104RefNameQuotes::default();
    assert_eq!(rule.global_fixes(), &[FIX_ALL_AUTOMATICALLY]);
    assert!(rule.parameters().is_empty());
    assert_eq!(rule.fix(FIX_ALL_AUTOMATICALLY, &analysis).unwrap(), "<ref>x</ref>");
    assert!(matches!(
        rule.fix("Something else", &analysis),
        Err(RuleError::UnknownFix { .. })
    ));
}

#[test]
fn test_bot_fix_requires_known_name() {
    let page = Page::new("Test");
    let rule = CW104RefNameQuotes::default();

    let contents = "<ref name=\"abc>x</ref> <ref name>y</ref>";
    let analysis = PageAnalysis::new(&page, contents);
    assert_eq!(rule.bot_fix(&analysis), "<ref name=\"abc>x</ref> <ref>y</ref>");

    let contents = "<ref name=\"abc\">x</ref> <ref name=\"abc>y</ref>";
    let analysis = PageAnalysis::new(&page, contents);
    assert_eq!(rule.bot_fix(&analysis), "<ref name=\"abc\">x</ref> <ref name=\"abc\">y</ref>");
}
