//! Governance configuration.
//!
//! The application layer stores the selected profile and the user's autonomy
//! preferences; this module reads them from a `governance.toml` (or YAML) file
//! and builds the gates from them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::autonomy::{AutonomyController, AutonomySettings};
use crate::engine::PolicyEngine;
use crate::error::GovernanceError;
use crate::gate::Governance;
use crate::profile::PolicyProfile;

/// Top-level governance configuration.
///
/// ```toml
/// [policy]
/// profile = "enterprise_strict"
///
/// [autonomy]
/// level = "gentle"
/// can_make_changes = "never"
/// avoid_actions = ["auto heal"]
///
/// [autonomy.enabled_features]
/// media_generation = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GovernanceConfig {
    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub autonomy: AutonomySettings,
}

/// Policy engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Profile identifier. Unknown names fall back to "personal_standard".
    #[serde(default = "default_profile")]
    pub profile: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
        }
    }
}

fn default_profile() -> String {
    PolicyProfile::default().as_str().to_string()
}

impl PolicyConfig {
    pub fn profile(&self) -> PolicyProfile {
        PolicyProfile::parse_or_default(&self.profile)
    }
}

impl GovernanceConfig {
    /// Load config from a file. `.yaml`/`.yml` files are read as YAML, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path).map_err(|source| GovernanceError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// Try to load config, returning defaults if the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("ignoring governance config {}: {}", path.display(), e);
                } else {
                    tracing::debug!("no governance config at {}, using defaults", path.display());
                }
                Self::default()
            }
        }
    }

    /// Build the combined gate described by this config.
    pub fn into_governance(self) -> Governance {
        let profile = self.policy.profile();
        tracing::info!(
            "governance configured: profile={}, autonomy={}",
            profile,
            self.autonomy.level
        );
        Governance::new(
            PolicyEngine::new(profile),
            AutonomyController::new(self.autonomy),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autonomy::{ActionCategory, AutonomyLevel, ChangePermission, EnabledFeatures};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parse_full_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("governance.toml");
        fs::write(
            &path,
            r#"
[policy]
profile = "enterprise_strict"

[autonomy]
level = "gentle"
can_make_changes = "never"
avoid_actions = ["auto heal"]

[autonomy.enabled_features]
media_generation = false
"#,
        )
        .unwrap();

        let config = GovernanceConfig::load(&path).unwrap();
        assert_eq!(config.policy.profile(), PolicyProfile::EnterpriseStrict);
        assert_eq!(config.autonomy.level, AutonomyLevel::Gentle);
        assert_eq!(config.autonomy.can_make_changes, ChangePermission::Never);
        assert!(config.autonomy.avoid_actions.contains("auto heal"));
        // Unspecified feature flags keep their defaults.
        assert_eq!(
            config.autonomy.enabled_features,
            EnabledFeatures {
                media_generation: false,
                ..EnabledFeatures::default()
            }
        );
    }

    #[test]
    fn parse_yaml_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("governance.yaml");
        fs::write(
            &path,
            r#"
policy:
  profile: open_collaborative
autonomy:
  level: active
  can_make_changes: always
"#,
        )
        .unwrap();

        let config = GovernanceConfig::load(&path).unwrap();
        assert_eq!(config.policy.profile(), PolicyProfile::OpenCollaborative);
        assert_eq!(config.autonomy.can_make_changes, ChangePermission::Always);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("governance.toml");
        fs::write(&path, "").unwrap();
        assert_eq!(
            GovernanceConfig::load(&path).unwrap(),
            GovernanceConfig::default()
        );
    }

    #[test]
    fn unknown_profile_falls_back() {
        let config: GovernanceConfig = toml::from_str("[policy]\nprofile = \"ultra\"\n").unwrap();
        assert_eq!(config.policy.profile(), PolicyProfile::PersonalStandard);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        match GovernanceConfig::load(&dir.path().join("absent.toml")) {
            Err(GovernanceError::Io { path, .. }) => assert!(path.ends_with("absent.toml")),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("governance.toml");
        fs::write(&path, "[autonomy]\nlevel = \"reckless\"\n").unwrap();
        assert!(matches!(
            GovernanceConfig::load(&path),
            Err(GovernanceError::TomlParse(_))
        ));
        assert_eq!(
            GovernanceConfig::load_or_default(&path),
            GovernanceConfig::default()
        );
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempdir().unwrap();
        let config = GovernanceConfig::load_or_default(&dir.path().join("nope.toml"));
        assert_eq!(config, GovernanceConfig::default());
    }

    #[test]
    fn into_governance_applies_settings() {
        let config: GovernanceConfig = toml::from_str(
            "[policy]\nprofile = \"enterprise_strict\"\n[autonomy]\nlevel = \"off\"\n",
        )
        .unwrap();
        let gov = config.into_governance();
        assert_eq!(gov.engine.active_profile(), PolicyProfile::EnterpriseStrict);
        assert!(!gov.autonomy.can_act(ActionCategory::Suggest));
    }
}
