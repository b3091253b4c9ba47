//! # siva-policy
//!
//! Governance rule engine and autonomy gate for Siva.
//!
//! Callers describe an intended action as a JSON context and ask two
//! independent gates whether it may proceed:
//!
//! - [`PolicyEngine`] evaluates the context against the rules of the active
//!   [`PolicyProfile`] and returns allow/deny with a reason.
//! - [`AutonomyController`] decides whether a category of autonomous
//!   behavior (suggest, auto-heal, generate, modify-ui) is enabled at all.
//!
//! [`Governance`] bundles both; an action proceeds only when both pass.
//!
//! ## Key invariants
//!
//! - **Conditions are violation triggers**: a rule whose conditions all match
//!   is reported as `passed = false` with the rule's action. A rule with no
//!   conditions therefore always violates.
//! - **Only `block` blocks**: `warn` violations are reported but never deny.
//! - **Total evaluation**: unknown operators, missing fields and malformed
//!   contexts never panic. They fail the condition, or deny the action.
//! - **Off means off**: autonomy level `off` refuses every category.

pub mod autonomy;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod profile;
pub mod rule;

pub use autonomy::{
    level_description, ActionCategory, AutonomyController, AutonomyLevel, AutonomySettings,
    AutonomySettingsUpdate, ChangePermission, EnabledFeatures,
};
pub use config::{GovernanceConfig, PolicyConfig};
pub use engine::{AllowDecision, Evaluation, GovernanceState, PolicyEngine};
pub use error::GovernanceError;
pub use gate::{GateDecision, Governance, SharedGovernance};
pub use profile::{rules_for_profile, rules_for_profile_name, PolicyProfile};
pub use rule::{Condition, ConditionOperator, Rule, RuleAction};
