use wikilint_lib::check_result::{CheckErrorResult, ErrorLevel, apply_replacements};
use wikilint_lib::config::Config;
use wikilint_lib::page::Page;
use wikilint_lib::page_analysis::PageAnalysis;
use wikilint_lib::rule::Rule;
use wikilint_lib::rules::{self, CW059TemplateValueBreak};

fn check_with(rule: &dyn Rule, contents: &str, only_automatic: bool) -> Vec<CheckErrorResult> {
    let page = Page::new("Test");
    let analysis = PageAnalysis::new(&page, contents);
    let mut errors = Vec::new();
    rule.analyze(&analysis, Some(&mut errors), only_automatic);
    errors
}

fn check(contents: &str) -> Vec<CheckErrorResult> {
    check_with(&CW059TemplateValueBreak::default(), contents, false)
}

#[test]
fn test_break_at_end_of_value() {
    let contents = "{{Infobox|caption=text<br>\n|name=x}}";
    let errors = check(contents);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].span().slice(contents), "<br>");
    let replacement = errors[0].automatic_replacement().unwrap();
    assert_eq!(replacement.text, "");
    assert_eq!(replacement.label, "Delete");
}

#[test]
fn test_break_followed_by_comment() {
    let contents = "{{T|a=x<br /> <!-- note -->}}";
    let errors = check(contents);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].span().slice(contents), "<br />");
}

#[test]
fn test_positional_value() {
    let contents = "{{T|first<br/>|second}}";
    let errors = check(contents);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].span().slice(contents), "<br/>");
}

#[test]
fn test_break_inside_value_is_fine() {
    assert!(check("{{T|a=x<br>y}}").is_empty());
    assert!(check("{{T|a=x<!-- <br> -->}}").is_empty());
    assert!(check("{{T|a=x}} text<br>").is_empty());
}

#[test]
fn test_break_with_attributes_is_manual() {
    let contents = "{{T|a=x<br style=\"clear:both\">}}";
    let errors = check(contents);
    assert_eq!(errors.len(), 1);
    assert!(!errors[0].has_automatic_replacement());
    assert_eq!(errors[0].level(), ErrorLevel::Warning);
    assert!(check_with(&CW059TemplateValueBreak::default(), contents, true).is_empty());

    let errors = check("{{T|a=x<br/>}}");
    assert_eq!(errors[0].level(), ErrorLevel::Error);
}

#[test]
fn test_declares_ignore_templates_parameter() {
    let rule = CW059TemplateValueBreak::default();
    let parameters = rule.parameters();
    assert_eq!(parameters.len(), 1);
    assert_eq!(parameters[0].name, "ignore-templates");
    assert!(parameters[0].optional);
    assert!(parameters[0].multiple);
    assert!(rule.has_list());
}

#[test]
fn test_ignored_templates() {
    let config = Config::from_toml_str(
        r#"
[general.CW059]
prio = 2
ignore-templates = ["Clear_left"]
"#,
    )
    .unwrap();
    let rule = rules::instantiate(&config, CW059TemplateValueBreak::NUMBER).unwrap();
    assert!(check_with(rule.as_ref(), "{{clear left|a=x<br>}}", false).is_empty());
    assert_eq!(check_with(rule.as_ref(), "{{Other|a=x<br>}}", false).len(), 1);
}

#[test]
fn test_automatic_fix_is_stable() {
    let contents = "{{A|a=x<br>\n|b={{B|c=y<br/>}}<br>}}";
    let errors = check(contents);
    assert_eq!(errors.len(), 3);
    let fixed = apply_replacements(contents, &errors, CheckErrorResult::automatic_replacement);
    assert_eq!(fixed, "{{A|a=x\n|b={{B|c=y}}}}");
    assert!(check(&fixed).is_empty());
}
