// autonomy.rs — Autonomy controller.
//
// Independently of the policy engine, the autonomy controller decides
// whether a *category* of proactive behavior is currently permitted.
// `can_act()` checks, in order:
//
// 1. level == off                        → deny everything
// 2. modify-ui and changes are not always → deny (ask-first is a deny here;
//    asking the user is the caller's job)
// 3. category named in avoid_actions     → deny
// 4. otherwise                           → the category's feature flag

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// How proactive the assistant is allowed to be.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AutonomyLevel {
    Off,
    Gentle,
    #[default]
    Helpful,
    Active,
}

impl AutonomyLevel {
    /// Human-readable description for settings screens.
    pub fn description(&self) -> &'static str {
        match self {
            AutonomyLevel::Off => "No proactive help. The assistant only responds when asked.",
            AutonomyLevel::Gentle => {
                "Occasional, low-key suggestions. Nothing happens without your say-so."
            }
            AutonomyLevel::Helpful => {
                "Regular suggestions and small automatic fixes that keep things running smoothly."
            }
            AutonomyLevel::Active => {
                "Anticipates your needs, generates content and adapts the interface proactively."
            }
        }
    }
}

impl fmt::Display for AutonomyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutonomyLevel::Off => write!(f, "off"),
            AutonomyLevel::Gentle => write!(f, "gentle"),
            AutonomyLevel::Helpful => write!(f, "helpful"),
            AutonomyLevel::Active => write!(f, "active"),
        }
    }
}

/// Whether the assistant may change things on the user's behalf.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ChangePermission {
    Never,
    #[default]
    AskFirst,
    Always,
}

/// The four categories of autonomous behavior gated by the controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ActionCategory {
    Suggest,
    AutoHeal,
    Generate,
    ModifyUi,
}

impl ActionCategory {
    pub fn all() -> [ActionCategory; 4] {
        [
            ActionCategory::Suggest,
            ActionCategory::AutoHeal,
            ActionCategory::Generate,
            ActionCategory::ModifyUi,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::Suggest => "suggest",
            ActionCategory::AutoHeal => "auto-heal",
            ActionCategory::Generate => "generate",
            ActionCategory::ModifyUi => "modify-ui",
        }
    }

    /// The name matched against `avoid_actions` ("auto-heal" → "auto heal").
    fn avoid_key(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionCategory {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| GovernanceError::UnknownAction(s.to_string()))
    }
}

/// Per-category feature switches.
///
/// Fields missing from a config file take their value from `Default`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnabledFeatures {
    pub suggestions: bool,
    pub auto_healing: bool,
    pub media_generation: bool,
    pub predictive_ui: bool,
}

impl EnabledFeatures {
    pub fn for_category(&self, category: ActionCategory) -> bool {
        match category {
            ActionCategory::Suggest => self.suggestions,
            ActionCategory::AutoHeal => self.auto_healing,
            ActionCategory::Generate => self.media_generation,
            ActionCategory::ModifyUi => self.predictive_ui,
        }
    }
}

impl Default for EnabledFeatures {
    fn default() -> Self {
        Self {
            suggestions: true,
            auto_healing: true,
            media_generation: true,
            predictive_ui: false,
        }
    }
}

/// User-chosen autonomy preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutonomySettings {
    #[serde(default)]
    pub level: AutonomyLevel,
    #[serde(default)]
    pub can_make_changes: ChangePermission,
    /// Free-text action names the user never wants performed automatically.
    #[serde(default)]
    pub avoid_actions: BTreeSet<String>,
    #[serde(default)]
    pub enabled_features: EnabledFeatures,
}

/// A partial settings update. Present fields replace the current value wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutonomySettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<AutonomyLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_make_changes: Option<ChangePermission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid_actions: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_features: Option<EnabledFeatures>,
}

/// Gate for autonomous behavior categories.
#[derive(Debug, Clone, Default)]
pub struct AutonomyController {
    settings: AutonomySettings,
}

impl AutonomyController {
    pub fn new(settings: AutonomySettings) -> Self {
        Self { settings }
    }

    /// Whether `category` may be performed under the current settings.
    pub fn can_act(&self, category: ActionCategory) -> bool {
        self.refusal(category).is_none()
    }

    /// Why `category` is refused, or `None` if it is permitted.
    pub fn refusal(&self, category: ActionCategory) -> Option<String> {
        let settings = &self.settings;

        if settings.level == AutonomyLevel::Off {
            return Some("autonomy is turned off".to_string());
        }

        if category == ActionCategory::ModifyUi {
            match settings.can_make_changes {
                ChangePermission::Never => {
                    return Some("changes are never permitted".to_string());
                }
                ChangePermission::AskFirst => {
                    return Some("changes require confirmation first".to_string());
                }
                ChangePermission::Always => {}
            }
        }

        let key = category.avoid_key();
        if let Some(entry) = settings
            .avoid_actions
            .iter()
            .find(|entry| entry.to_lowercase().contains(&key))
        {
            return Some(format!("'{}' is on the avoid list ({})", category, entry));
        }

        if !settings.enabled_features.for_category(category) {
            return Some(format!("feature for '{}' is disabled", category));
        }

        None
    }

    /// Shallow-merge `update` into the current settings.
    pub fn update_settings(&mut self, update: AutonomySettingsUpdate) {
        if let Some(level) = update.level {
            self.settings.level = level;
        }
        if let Some(can_make_changes) = update.can_make_changes {
            self.settings.can_make_changes = can_make_changes;
        }
        if let Some(avoid_actions) = update.avoid_actions {
            self.settings.avoid_actions = avoid_actions;
        }
        if let Some(enabled_features) = update.enabled_features {
            self.settings.enabled_features = enabled_features;
        }
        tracing::info!(
            "autonomy settings updated: level={}, avoid_actions={}",
            self.settings.level,
            self.settings.avoid_actions.len()
        );
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> AutonomySettings {
        self.settings.clone()
    }
}

/// Display text for an autonomy level.
pub fn level_description(level: AutonomyLevel) -> &'static str {
    level.description()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_features_on() -> EnabledFeatures {
        EnabledFeatures {
            suggestions: true,
            auto_healing: true,
            media_generation: true,
            predictive_ui: true,
        }
    }

    fn controller(level: AutonomyLevel, changes: ChangePermission) -> AutonomyController {
        AutonomyController::new(AutonomySettings {
            level,
            can_make_changes: changes,
            avoid_actions: BTreeSet::new(),
            enabled_features: all_features_on(),
        })
    }

    #[test]
    fn off_denies_every_category() {
        let c = controller(AutonomyLevel::Off, ChangePermission::Always);
        for category in ActionCategory::all() {
            assert!(!c.can_act(category), "{} allowed while off", category);
        }
    }

    #[test]
    fn modify_ui_requires_always() {
        for changes in [ChangePermission::Never, ChangePermission::AskFirst] {
            let c = controller(AutonomyLevel::Active, changes);
            assert!(!c.can_act(ActionCategory::ModifyUi));
            // Other categories are unaffected.
            assert!(c.can_act(ActionCategory::Suggest));
        }
        let c = controller(AutonomyLevel::Active, ChangePermission::Always);
        assert!(c.can_act(ActionCategory::ModifyUi));
    }

    #[test]
    fn avoid_list_matches_case_insensitive_substring() {
        let mut c = controller(AutonomyLevel::Helpful, ChangePermission::Always);
        c.update_settings(AutonomySettingsUpdate {
            avoid_actions: Some(BTreeSet::from(["Never AUTO HEAL my notes".to_string()])),
            ..Default::default()
        });
        assert!(!c.can_act(ActionCategory::AutoHeal));
        assert!(c.can_act(ActionCategory::Suggest));
        assert!(c
            .refusal(ActionCategory::AutoHeal)
            .unwrap()
            .contains("avoid list"));
    }

    #[test]
    fn avoid_list_uses_spaced_name() {
        let mut c = controller(AutonomyLevel::Helpful, ChangePermission::Always);
        // The hyphenated form is not what gets matched.
        c.update_settings(AutonomySettingsUpdate {
            avoid_actions: Some(BTreeSet::from(["modify-ui".to_string()])),
            ..Default::default()
        });
        assert!(c.can_act(ActionCategory::ModifyUi));

        c.update_settings(AutonomySettingsUpdate {
            avoid_actions: Some(BTreeSet::from(["don't modify ui".to_string()])),
            ..Default::default()
        });
        assert!(!c.can_act(ActionCategory::ModifyUi));
    }

    #[test]
    fn feature_flags_gate_each_category() {
        let mut c = controller(AutonomyLevel::Active, ChangePermission::Always);
        for category in ActionCategory::all() {
            let mut features = all_features_on();
            match category {
                ActionCategory::Suggest => features.suggestions = false,
                ActionCategory::AutoHeal => features.auto_healing = false,
                ActionCategory::Generate => features.media_generation = false,
                ActionCategory::ModifyUi => features.predictive_ui = false,
            }
            c.update_settings(AutonomySettingsUpdate {
                enabled_features: Some(features),
                ..Default::default()
            });
            assert!(!c.can_act(category));
            for other in ActionCategory::all().into_iter().filter(|o| *o != category) {
                assert!(
                    c.can_act(other),
                    "{} denied when only {} disabled",
                    other,
                    category
                );
            }
        }
    }

    #[test]
    fn update_is_shallow_merge() {
        let mut c = AutonomyController::default();
        c.update_settings(AutonomySettingsUpdate {
            level: Some(AutonomyLevel::Gentle),
            ..Default::default()
        });
        let settings = c.settings();
        assert_eq!(settings.level, AutonomyLevel::Gentle);
        assert_eq!(settings.can_make_changes, ChangePermission::AskFirst);
        assert_eq!(settings.enabled_features, EnabledFeatures::default());

        // enabled_features is replaced as a whole, not merged field by field.
        c.update_settings(AutonomySettingsUpdate {
            enabled_features: Some(EnabledFeatures {
                suggestions: false,
                auto_healing: false,
                media_generation: false,
                predictive_ui: true,
            }),
            ..Default::default()
        });
        let features = c.settings().enabled_features;
        assert!(!features.suggestions);
        assert!(features.predictive_ui);
        assert_eq!(c.settings().level, AutonomyLevel::Gentle);
    }

    #[test]
    fn settings_returns_a_copy() {
        let c = AutonomyController::default();
        let mut copy = c.settings();
        copy.level = AutonomyLevel::Off;
        copy.avoid_actions.insert("suggest".to_string());
        assert_eq!(c.settings(), AutonomySettings::default());
        assert!(c.can_act(ActionCategory::Suggest));
    }

    #[test]
    fn default_settings() {
        let c = AutonomyController::default();
        assert!(c.can_act(ActionCategory::Suggest));
        assert!(c.can_act(ActionCategory::AutoHeal));
        assert!(c.can_act(ActionCategory::Generate));
        assert!(!c.can_act(ActionCategory::ModifyUi));
    }

    #[test]
    fn category_parsing() {
        assert_eq!(
            "auto-heal".parse::<ActionCategory>().unwrap(),
            ActionCategory::AutoHeal
        );
        match "teleport".parse::<ActionCategory>() {
            Err(GovernanceError::UnknownAction(name)) => assert_eq!(name, "teleport"),
            other => panic!("expected UnknownAction, got {:?}", other),
        }
    }

    #[test]
    fn level_descriptions_are_distinct() {
        let levels = [
            AutonomyLevel::Off,
            AutonomyLevel::Gentle,
            AutonomyLevel::Helpful,
            AutonomyLevel::Active,
        ];
        let descriptions: BTreeSet<&str> = levels.iter().map(|l| level_description(*l)).collect();
        assert_eq!(descriptions.len(), 4);
    }

    #[test]
    fn settings_serialize_with_kebab_case_values() {
        let settings = AutonomySettings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["level"], "helpful");
        assert_eq!(json["can_make_changes"], "ask-first");
    }
}
