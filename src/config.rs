//!
//! This module defines the configuration structures and loading logic for wikilint.
//! Rule properties live in two scopes, per-wiki and general, and are read through
//! the [`PropertySource`] lookup shared by the priority resolver and the rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// File names searched in the working directory when no path is given
pub const CONFIG_FILE_NAMES: &[&str] = &[".wikilint.toml", "wikilint.toml"];

const DEFAULT_MAX_FIX_ITERATIONS: usize = 10;

/// Content of a fresh configuration file, also the built-in configuration
const DEFAULT_CONFIG: &str = r#"# wikilint configuration file

[global]
# Wiki the [wiki.*] sections describe
# wiki = "en"

# Error numbers to run exclusively (empty runs every active error)
# enable = ["CW059", "CW104"]

# Error numbers to skip
# disable = []

# Upper bound on fix passes per page
max-fix-iterations = 10

# General properties, used when the wiki does not set a value
[general.CW059]
prio = 2

[general.CW104]
prio = 2

# Per-wiki properties
# [wiki.CW104]
# prio = 1
# head = "Unbalanced quotes in ref name"
# whitelist = ["Some page"]
# bot = true
"#;

/// Lookup of per-error configuration properties.
///
/// Values are trimmed. Blank values count as missing unless `accept_empty`
/// is set, in which case the next scope is not consulted.
pub trait PropertySource: Send + Sync {
    fn get_property(&self, number: u32, key: &str, use_wiki: bool, use_general: bool, accept_empty: bool)
    -> Option<String>;
}

/// Configuration key of error `number`, e.g. `CW059`
pub fn rule_key(number: u32) -> String {
    format!("CW{number:03}")
}

/// Error number from `59`, `cw59` or `CW059`
pub fn parse_rule_number(name: &str) -> Option<u32> {
    let name = name.trim();
    let digits = if name.len() > 2 && name[..2].eq_ignore_ascii_case("cw") {
        &name[2..]
    } else {
        name
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Normalizes configuration keys (rule names, option names).
///
/// Rule names become `CWnnn`; other keys become lowercase kebab-case.
pub fn normalize_key(key: &str) -> String {
    match parse_rule_number(key) {
        Some(number) => rule_key(number),
        None => key.replace('_', "-").to_ascii_lowercase(),
    }
}

/// Split a multi-line property into its non-blank, trimmed lines
pub fn split_property_list(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Represents a rule-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RuleConfig {
    /// Configuration values for the rule
    #[serde(flatten)]
    pub values: BTreeMap<String, toml::Value>,
}

impl RuleConfig {
    fn lookup(&self, key: &str) -> Option<&toml::Value> {
        let variants = [key.to_string(), normalize_key(key), key.replace('-', "_")];
        variants.iter().find_map(|variant| self.values.get(variant))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Wiki code the per-wiki scope belongs to
    #[serde(default)]
    pub wiki: Option<String>,

    /// Error numbers or names to run exclusively
    #[serde(default)]
    pub enable: Vec<String>,

    /// Error numbers or names to skip
    #[serde(default)]
    pub disable: Vec<String>,

    /// Upper bound on fix passes per page
    #[serde(default = "default_max_fix_iterations")]
    pub max_fix_iterations: usize,
}

fn default_max_fix_iterations() -> usize {
    DEFAULT_MAX_FIX_ITERATIONS
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            wiki: None,
            enable: Vec::new(),
            disable: Vec::new(),
            max_fix_iterations: DEFAULT_MAX_FIX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,

    /// Per-wiki rule properties, keyed by `CWnnn`
    #[serde(default)]
    pub wiki: BTreeMap<String, RuleConfig>,

    /// General rule properties, keyed by `CWnnn`
    #[serde(default)]
    pub general: BTreeMap<String, RuleConfig>,
}

impl Config {
    /// Parse a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {e}")))?;
        config.wiki = normalize_rule_keys(std::mem::take(&mut config.wiki));
        config.general = normalize_rule_keys(std::mem::take(&mut config.general));
        Ok(config)
    }

    /// Configuration used when no file is found: every implemented error active
    pub fn builtin() -> Self {
        Self::from_toml_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load the configuration at `config_path`, or discover one in the working directory.
    ///
    /// Falls back to [`Config::builtin`] when nothing is found.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_file(path);
        }
        for name in CONFIG_FILE_NAMES {
            if Path::new(name).is_file() {
                log::debug!("[wikilint-config] Found config file: {name}");
                return Self::load_file(name);
            }
        }
        log::debug!("[wikilint-config] No config file found, using defaults");
        Ok(Self::builtin())
    }

    fn load_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            source,
            path: path.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError(msg) => ConfigError::ParseError(format!("{path}: {msg}")),
            other => other,
        })
    }

    /// Whether the enable/disable lists let error `number` run.
    ///
    /// `disable = ["all"]` leaves only the explicitly enabled numbers.
    pub fn is_rule_enabled(&self, number: u32) -> bool {
        let matches = |names: &[String]| names.iter().any(|name| parse_rule_number(name) == Some(number));
        if self.global.disable.iter().any(|name| name.eq_ignore_ascii_case("all")) {
            return matches(&self.global.enable);
        }
        if !self.global.enable.is_empty() && !matches(&self.global.enable) {
            return false;
        }
        !matches(&self.global.disable)
    }

    fn scope_value(scope: &BTreeMap<String, RuleConfig>, number: u32, key: &str) -> Option<String> {
        let value = scope.get(&rule_key(number))?.lookup(key)?;
        let converted = property_to_string(value);
        if converted.is_none() {
            log::warn!("Ignoring unsupported value for property '{key}' of error {number}");
        }
        converted
    }
}

impl PropertySource for Config {
    fn get_property(
        &self,
        number: u32,
        key: &str,
        use_wiki: bool,
        use_general: bool,
        accept_empty: bool,
    ) -> Option<String> {
        let scopes = [(use_wiki, &self.wiki), (use_general, &self.general)];
        for (enabled, scope) in scopes {
            if !enabled {
                continue;
            }
            if let Some(value) = Self::scope_value(scope, number, key) {
                let value = value.trim();
                if accept_empty || !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
        None
    }
}

fn normalize_rule_keys(scope: BTreeMap<String, RuleConfig>) -> BTreeMap<String, RuleConfig> {
    scope.into_iter().map(|(name, rule)| (normalize_key(&name), rule)).collect()
}

/// String form of a property: arrays are joined by newlines
fn property_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(items) => {
            let lines: Option<Vec<String>> = items.iter().map(property_to_string).collect();
            lines.map(|lines| lines.join("\n"))
        }
        toml::Value::Table(_) => None,
    }
}

/// Create a default configuration file at `path`
pub fn create_default_config(path: &str) -> Result<(), ConfigError> {
    if Path::new(path).exists() {
        return Err(ConfigError::FileExists { path: path.to_string() });
    }

    fs::write(path, DEFAULT_CONFIG).map_err(|source| ConfigError::IoError {
        source,
        path: path.to_string(),
    })
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the configuration file
    #[error("Failed to access config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Configuration file already exists
    #[error("Configuration file already exists at {path}")]
    FileExists { path: String },
}
