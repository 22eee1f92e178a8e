//! Error priorities.

use crate::config::PropertySource;
use serde::Serialize;
use std::fmt;

pub const PROPERTY_PRIORITY: &str = "prio";
pub const PROPERTY_BOT: &str = "bot";

/// How urgently an error number should be handled on a wiki.
///
/// Ordering follows the numeric values, so sorting by priority puts
/// unknown and deactivated numbers first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[default]
    Unknown = -1,
    Deactivated = 0,
    High = 1,
    Middle = 2,
    Low = 3,
    BotOnly = 4,
}

impl Priority {
    pub fn value(self) -> i32 {
        self as i32
    }

    /// Priority for a raw configured value; out-of-range values are unknown
    pub fn from_value(value: i32) -> Self {
        match value {
            0 => Self::Deactivated,
            1 => Self::High,
            2 => Self::Middle,
            3 => Self::Low,
            4 => Self::BotOnly,
            _ => Self::Unknown,
        }
    }

    /// Whether errors of this priority are analyzed at all
    pub fn is_active(self) -> bool {
        matches!(self, Self::High | Self::Middle | Self::Low | Self::BotOnly)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Deactivated => "Deactivated",
            Self::Low => "Low priority",
            Self::Middle => "Middle priority",
            Self::High => "Top priority",
            Self::BotOnly => "For Bot",
            Self::Unknown => "Priority unknown",
        }
    }

    /// Resolve the priority of error `number`.
    ///
    /// The wiki-scope `prio` property wins; the general scope is consulted
    /// only when the wiki value is missing, not an integer, or `-1`. Other
    /// out-of-range wiki values stay unknown and inactive. A deactivated
    /// error whose `bot` property is `true` becomes bot-only.
    pub fn resolve(source: &dyn PropertySource, number: u32) -> Self {
        let lookup = |use_wiki: bool, use_general: bool| {
            source
                .get_property(number, PROPERTY_PRIORITY, use_wiki, use_general, false)
                .and_then(|value| {
                    let parsed = value.trim().parse::<i32>().ok();
                    if parsed.is_none() {
                        log::warn!("Ignoring non-numeric priority '{value}' for error {number}");
                    }
                    parsed
                })
        };

        let mut priority = match lookup(true, false) {
            Some(value) if value != Self::Unknown.value() => Self::from_value(value),
            _ => lookup(false, true).map_or(Self::Unknown, Self::from_value),
        };
        if priority == Self::Deactivated
            && source
                .get_property(number, PROPERTY_BOT, true, true, false)
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
        {
            priority = Self::BotOnly;
        }
        priority
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config(toml: &str) -> Config {
        Config::from_toml_str(toml).unwrap()
    }

    #[test]
    fn test_wiki_scope_wins() {
        let config = config(
            r#"
[general.CW104]
prio = 2
[wiki.CW104]
prio = 1
"#,
        );
        assert_eq!(Priority::resolve(&config, 104), Priority::High);
    }

    #[test]
    fn test_general_scope_fallback() {
        let config = config(
            r#"
[general.CW104]
prio = 3
[wiki.CW104]
prio = "abc"
"#,
        );
        assert_eq!(Priority::resolve(&config, 104), Priority::Low);
        assert_eq!(Priority::resolve(&config, 59), Priority::Unknown);
    }

    #[test]
    fn test_out_of_range_wiki_value_stays_inactive() {
        let config = config(
            r#"
[general.CW104]
prio = 2
[wiki.CW104]
prio = 5
[general.CW059]
prio = 3
[wiki.CW059]
prio = -1
"#,
        );
        assert_eq!(Priority::resolve(&config, 104), Priority::Unknown);
        assert!(!Priority::resolve(&config, 104).is_active());
        assert_eq!(Priority::resolve(&config, 59), Priority::Low);
    }

    #[test]
    fn test_deactivated_bot_becomes_bot_only() {
        let config = config(
            r#"
[wiki.CW059]
prio = 0
bot = "TRUE"
[wiki.CW104]
prio = 0
"#,
        );
        assert_eq!(Priority::resolve(&config, 59), Priority::BotOnly);
        assert_eq!(Priority::resolve(&config, 104), Priority::Deactivated);
    }

    #[test]
    fn test_activity_and_order() {
        assert!(!Priority::Unknown.is_active());
        assert!(!Priority::Deactivated.is_active());
        assert!(Priority::High.is_active());
        assert!(Priority::BotOnly.is_active());
        assert!(Priority::Unknown < Priority::Deactivated);
        assert!(Priority::High < Priority::BotOnly);
        assert_eq!(Priority::from_value(9), Priority::Unknown);
        assert_eq!(Priority::BotOnly.to_string(), "For Bot");
    }
}
