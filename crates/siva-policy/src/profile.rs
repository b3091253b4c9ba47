// profile.rs — Built-in policy profiles.
//
// A profile is a named governance posture that resolves to an ordered list
// of rules. The stricter and looser profiles compose by inclusion: they list
// their own rules first, then the full personal_standard set.
//
// Rule order only affects which reason `is_allowed()` reports when several
// blocking rules fire, never whether blocking happens.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::rule::{Condition, ConditionOperator, Rule, RuleAction};

/// Governance posture selected by the application layer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PolicyProfile {
    #[default]
    PersonalStandard,
    EnterpriseStrict,
    OpenCollaborative,
}

impl PolicyProfile {
    pub fn all() -> [PolicyProfile; 3] {
        [
            PolicyProfile::PersonalStandard,
            PolicyProfile::EnterpriseStrict,
            PolicyProfile::OpenCollaborative,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyProfile::PersonalStandard => "personal_standard",
            PolicyProfile::EnterpriseStrict => "enterprise_strict",
            PolicyProfile::OpenCollaborative => "open_collaborative",
        }
    }

    /// Parse a profile identifier. Returns `None` for unrecognized names.
    pub fn parse(name: &str) -> Option<PolicyProfile> {
        Self::all().into_iter().find(|p| p.as_str() == name.trim())
    }

    /// Parse a profile identifier, falling back to `personal_standard`.
    pub fn parse_or_default(name: &str) -> PolicyProfile {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(
                "unknown policy profile '{}', falling back to {}",
                name,
                PolicyProfile::default()
            );
            PolicyProfile::default()
        })
    }
}

impl fmt::Display for PolicyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the ordered rule list for a profile.
pub fn rules_for_profile(profile: PolicyProfile) -> Vec<Rule> {
    match profile {
        PolicyProfile::PersonalStandard => personal_standard_rules(),
        PolicyProfile::EnterpriseStrict => {
            let mut rules = enterprise_strict_rules();
            rules.extend(personal_standard_rules());
            rules
        }
        PolicyProfile::OpenCollaborative => {
            let mut rules = open_collaborative_rules();
            rules.extend(personal_standard_rules());
            rules
        }
    }
}

/// Resolve rules for a profile given by name. Unknown names get `personal_standard`.
pub fn rules_for_profile_name(name: &str) -> Vec<Rule> {
    rules_for_profile(PolicyProfile::parse_or_default(name))
}

fn rule(
    id: &str,
    name: &str,
    description: &str,
    action: RuleAction,
    conditions: Vec<Condition>,
) -> Rule {
    Rule {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        enabled: true,
        action,
        conditions,
    }
}

fn personal_standard_rules() -> Vec<Rule> {
    vec![
        rule(
            "prevent-data-deletion",
            "Prevent Data Deletion",
            "Flag any attempt to delete user data",
            RuleAction::Warn,
            vec![Condition::new(
                "action",
                ConditionOperator::Equals,
                "delete",
            )],
        ),
        rule(
            "protect-sensitive-data",
            "Protect Sensitive Data",
            "Never share data marked sensitive outside the workspace",
            RuleAction::Block,
            vec![
                Condition::new("data.sensitive", ConditionOperator::Equals, true),
                Condition::new("action", ConditionOperator::Equals, "share-external"),
            ],
        ),
        rule(
            "confirm-unapproved-changes",
            "Confirm Unapproved Changes",
            "Flag changes that need approval but have not been approved",
            RuleAction::Warn,
            vec![
                Condition::new("requiresApproval", ConditionOperator::Equals, true),
                Condition::new("approved", ConditionOperator::NotEquals, true),
            ],
        ),
    ]
}

fn enterprise_strict_rules() -> Vec<Rule> {
    vec![
        rule(
            "prevent-external-sharing",
            "Prevent External Sharing",
            "Block sharing of any content outside the organization",
            RuleAction::Block,
            vec![Condition::new(
                "action",
                ConditionOperator::Equals,
                "share-external",
            )],
        ),
        rule(
            "require-audit-trail",
            "Require Audit Trail",
            "Exports are only permitted while audit logging is enabled",
            RuleAction::Block,
            vec![
                Condition::new(
                    "action",
                    ConditionOperator::In,
                    json!(["export", "bulk-export"]),
                ),
                Condition::new("audit.enabled", ConditionOperator::NotEquals, true),
            ],
        ),
        rule(
            "restrict-confidential-ai-use",
            "Restrict Confidential AI Use",
            "Confidential data may not be used for model training",
            RuleAction::Block,
            vec![
                Condition::new(
                    "data.classification",
                    ConditionOperator::Equals,
                    "confidential",
                ),
                Condition::new("destination", ConditionOperator::Equals, "ai-training"),
            ],
        ),
        rule(
            "limit-bulk-operations",
            "Limit Bulk Operations",
            "Flag operations touching more than 100 items",
            RuleAction::Warn,
            vec![Condition::new(
                "itemCount",
                ConditionOperator::GreaterThan,
                100,
            )],
        ),
    ]
}

fn open_collaborative_rules() -> Vec<Rule> {
    vec![
        rule(
            "allow-external-sharing",
            "Allow External Sharing",
            "Sharing with collaborators outside the workspace is permitted",
            RuleAction::Allow,
            vec![],
        ),
        rule(
            "flag-public-publishing",
            "Flag Public Publishing",
            "Flag content being published with public visibility",
            RuleAction::Warn,
            vec![Condition::new(
                "visibility",
                ConditionOperator::Equals,
                "public",
            )],
        ),
    ]
}
