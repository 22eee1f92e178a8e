use std::fs;
use tempfile::tempdir;
use wikilint_lib::config::{Config, ConfigError, PropertySource, create_default_config};
use wikilint_lib::metadata::RuleMetadata;
use wikilint_lib::priority::Priority;
use wikilint_lib::rules;

#[test]
fn test_load_config_file() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let config_path = temp_dir.path().join("wikilint.toml");
    let config_content = r#"
[global]
wiki = "fr"
disable = ["CW059"]
max-fix-iterations = 3

[general.CW104]
prio = 3

[wiki.cw104]
prio = 1
head = "Guillemets dans un nom de ref"
whitelist = ["Page_une", "Page deux"]
"#;
    fs::write(&config_path, config_content).expect("Failed to write test config file");

    let config = Config::load(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.global.wiki.as_deref(), Some("fr"));
    assert_eq!(config.global.max_fix_iterations, 3);
    assert!(!config.is_rule_enabled(59));

    let metadata = RuleMetadata::resolve(&config, 104);
    assert_eq!(metadata.priority(), Priority::High);
    assert_eq!(metadata.short_description(), Some("Guillemets dans un nom de ref"));
    assert!(metadata.is_in_white_list("Page une"));
    assert!(metadata.is_in_white_list("page_deux"));
    assert!(!metadata.is_in_white_list("Page trois"));

    let names: Vec<_> = rules::configured_rules(&config).iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["CW104"]);
}

#[test]
fn test_missing_config_file() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("absent.toml");
    let err = Config::load(Some(missing.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ConfigError::IoError { .. }));
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "[general.CW104\nprio = 1").unwrap();
    let err = Config::load(Some(path.to_str().unwrap())).unwrap_err();
    match err {
        ConfigError::ParseError(message) => assert!(message.contains("broken.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_create_default_config() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("wikilint.toml");
    let path = path.to_str().unwrap();

    create_default_config(path).unwrap();
    let config = Config::load(Some(path)).unwrap();
    assert_eq!(config, Config::builtin());
    assert_eq!(config.get_property(104, "prio", true, true, false).as_deref(), Some("2"));

    assert!(matches!(
        create_default_config(path),
        Err(ConfigError::FileExists { .. })
    ));
}

#[test]
fn test_bot_only_priority() {
    let config = Config::from_toml_str(
        r#"
[wiki.CW104]
prio = 0
bot = true
[general.CW059]
prio = 0
"#,
    )
    .unwrap();
    assert_eq!(Priority::resolve(&config, 104), Priority::BotOnly);
    assert_eq!(Priority::resolve(&config, 59), Priority::Deactivated);
    let names: Vec<_> = rules::configured_rules(&config).iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["CW104"]);
}
