use serde::Deserialize;

use crate::client::BROKEN;
use crate::tags::TagMask;

/// Window classification entry. Every present pattern must be a substring
/// of the matching window property for the rule to apply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub class: Option<String>,
    pub instance: Option<String>,
    pub title: Option<String>,
    pub tags: TagMask,
    pub is_floating: bool,
    pub is_terminal: bool,
    pub is_centered: bool,
    pub no_swallow: bool,
    pub managed_size: bool,
    /// Monitor number, any monitor when absent.
    pub monitor: Option<usize>,
}

impl Rule {
    pub fn class(class: &str) -> Self {
        Self {
            class: Some(class.to_string()),
            ..Self::default()
        }
    }

    pub fn instance(instance: &str) -> Self {
        Self {
            instance: Some(instance.to_string()),
            ..Self::default()
        }
    }

    pub fn title(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    fn matches(&self, window: &WindowIdentity) -> bool {
        let contains = |pattern: &Option<String>, value: &str| {
            pattern.as_deref().is_none_or(|pattern| value.contains(pattern))
        };
        contains(&self.title, &window.title)
            && contains(&self.class, &window.class)
            && contains(&self.instance, &window.instance)
    }
}

/// What rules are matched against. Missing class or instance read as
/// [`BROKEN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowIdentity {
    pub class: String,
    pub instance: String,
    pub title: String,
}

impl WindowIdentity {
    pub fn new(class: Option<String>, instance: Option<String>, title: &str) -> Self {
        Self {
            class: class.unwrap_or_else(|| BROKEN.to_string()),
            instance: instance.unwrap_or_else(|| BROKEN.to_string()),
            title: title.to_string(),
        }
    }

    pub fn is_steam(&self) -> bool {
        self.class.contains("Steam") || self.class.contains("steam_app_")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub tags: TagMask,
    pub is_floating: bool,
    pub is_terminal: bool,
    pub is_centered: bool,
    pub no_swallow: bool,
    pub managed_size: bool,
    pub is_steam: bool,
    pub monitor: Option<usize>,
    /// A floating rule placed the window on a scratchpad tag, so it opens
    /// centered on its monitor.
    pub center_on_monitor: bool,
}

impl RuleOutcome {
    /// Rule tags limited to `valid`, or `fallback` when none remain.
    pub fn resolve_tags(&self, valid: TagMask, fallback: TagMask) -> TagMask {
        match self.tags & valid {
            0 => fallback,
            tags => tags,
        }
    }
}

/// Runs every rule in order. Scalar attributes of a later match replace
/// earlier ones while tag bits accumulate. A rule's monitor is ignored
/// unless it is below `monitor_count`.
pub fn apply_rules<'a>(
    rules: impl IntoIterator<Item = &'a Rule>,
    window: &WindowIdentity,
    scratch_mask: TagMask,
    monitor_count: usize,
) -> RuleOutcome {
    let mut outcome = RuleOutcome {
        is_steam: window.is_steam(),
        ..RuleOutcome::default()
    };

    for rule in rules.into_iter().filter(|rule| rule.matches(window)) {
        outcome.is_centered = rule.is_centered;
        outcome.is_terminal = rule.is_terminal;
        outcome.is_floating = rule.is_floating;
        outcome.no_swallow = rule.no_swallow;
        outcome.managed_size = rule.managed_size;
        outcome.tags |= rule.tags;
        if rule.tags & scratch_mask != 0 && rule.is_floating {
            outcome.center_on_monitor = true;
        }
        if let Some(monitor) = rule.monitor.filter(|&monitor| monitor < monitor_count) {
            outcome.monitor = Some(monitor);
        }
    }

    outcome
}

/// Rules every configuration carries: the scratchpad terminal floats and
/// the terminal itself can swallow.
pub fn default_rules(terminal_class: &str, scratchpads: &[String], scratch_mask: TagMask) -> Vec<Rule> {
    let mut rules = vec![
        Rule {
            is_terminal: true,
            ..Rule::class(terminal_class)
        },
        Rule {
            no_swallow: true,
            ..Rule::title("Event Tester")
        },
    ];
    let first_scratch = scratch_mask & scratch_mask.wrapping_neg();
    for (index, name) in scratchpads.iter().enumerate() {
        rules.push(Rule {
            tags: first_scratch << index,
            is_floating: true,
            is_terminal: true,
            ..Rule::instance(name)
        });
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRATCH: TagMask = 1 << 9;

    fn window(class: &str, instance: &str, title: &str) -> WindowIdentity {
        WindowIdentity::new(Some(class.into()), Some(instance.into()), title)
    }

    #[test]
    fn test_later_rule_overrides_scalars_and_tags_accumulate() {
        let rules = vec![
            Rule {
                tags: 1 << 1,
                is_floating: true,
                is_centered: true,
                ..Rule::class("Fire")
            },
            Rule {
                tags: 1 << 3,
                ..Rule::instance("navigator")
            },
        ];
        let outcome = apply_rules(&rules, &window("Firefox", "navigator", "x"), SCRATCH, 1);
        assert_eq!(outcome.tags, (1 << 1) | (1 << 3));
        assert!(!outcome.is_floating);
        assert!(!outcome.is_centered);
    }

    #[test]
    fn test_every_pattern_must_match() {
        let rules = vec![Rule {
            tags: 1 << 4,
            instance: Some("other".into()),
            ..Rule::class("Firefox")
        }];
        let outcome = apply_rules(&rules, &window("Firefox", "navigator", "x"), SCRATCH, 1);
        assert_eq!(outcome, RuleOutcome::default());
    }

    #[test]
    fn test_missing_class_reads_as_broken() {
        let identity = WindowIdentity::new(None, None, "title");
        let rules = vec![Rule {
            tags: 1,
            ..Rule::class(BROKEN)
        }];
        assert_eq!(apply_rules(&rules, &identity, SCRATCH, 1).tags, 1);
    }

    #[test]
    fn test_fallback_tags_when_no_valid_bit() {
        let outcome = RuleOutcome {
            tags: 1 << 20,
            ..RuleOutcome::default()
        };
        assert_eq!(outcome.resolve_tags(0x3ff, 1 << 2), 1 << 2);
        let outcome = RuleOutcome {
            tags: 1 << 5,
            ..RuleOutcome::default()
        };
        assert_eq!(outcome.resolve_tags(0x3ff, 1 << 2), 1 << 5);
    }

    #[test]
    fn test_monitor_out_of_range_is_ignored() {
        let rules = vec![
            Rule {
                monitor: Some(1),
                ..Rule::class("mpv")
            },
            Rule {
                monitor: Some(5),
                ..Rule::class("mpv")
            },
        ];
        let outcome = apply_rules(&rules, &window("mpv", "gl", "video"), SCRATCH, 2);
        assert_eq!(outcome.monitor, Some(1));
    }

    #[test]
    fn test_scratchpad_rule_centers_and_floats() {
        let rules = default_rules("St", &["spterm".to_string()], SCRATCH);
        let outcome = apply_rules(&rules, &window("St", "spterm", "zsh"), SCRATCH, 1);
        assert_eq!(outcome.tags, SCRATCH);
        assert!(outcome.is_floating);
        assert!(outcome.is_terminal);
        assert!(outcome.center_on_monitor);
    }

    #[test]
    fn test_steam_detection() {
        let outcome = apply_rules(&Vec::<Rule>::new(), &window("steam_app_42", "game", "Game"), SCRATCH, 1);
        assert!(outcome.is_steam);
        assert!(!apply_rules(&Vec::<Rule>::new(), &window("St", "st", "zsh"), SCRATCH, 1).is_steam);
    }
}
