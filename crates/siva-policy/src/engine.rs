// engine.rs — Governance policy engine.
//
// The PolicyEngine holds the active profile and its resolved rule list.
// `evaluate()` checks a context against every enabled rule:
//
// 1. Rule disabled?            → skipped, no evaluation emitted
// 2. Conditions match context? → violation: passed = false, action = rule.action
// 3. Otherwise                 → passed = true, action = allow
//
// Conditions describe what *triggers* a rule, so a rule with no conditions
// is always reported as a violation of its own action. That includes rules
// whose action is `allow`. `is_allowed()` only refuses on a violated `block`
// rule; `warn` and `allow` violations are reported but never flip the decision.
//
// `evaluate()` caches its result in the engine state, so callers sharing one
// engine across threads must serialize access (see `gate::SharedGovernance`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::profile::{rules_for_profile, PolicyProfile};
use crate::rule::{Rule, RuleAction};

/// Reason reported by `is_allowed()` when the context is not an object.
pub const INVALID_CONTEXT_REASON: &str = "Invalid context: expected an object";

/// The outcome of checking one rule against a context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Evaluation {
    pub rule_id: String,
    pub rule_name: String,
    /// True when the rule's conditions did NOT match.
    pub passed: bool,
    /// `allow` when passed, otherwise the rule's declared action.
    pub action: RuleAction,
    /// "Violates rule: <name>" when not passed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Evaluation {
    fn for_rule(rule: &Rule, context: &Value) -> Self {
        if rule.matches(context) {
            Evaluation {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                passed: false,
                action: rule.action,
                reason: Some(format!("Violates rule: {}", rule.name)),
            }
        } else {
            Evaluation {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                passed: true,
                action: RuleAction::Allow,
                reason: None,
            }
        }
    }

    /// A violated rule whose action is `block`.
    pub fn is_blocking(&self) -> bool {
        !self.passed && self.action == RuleAction::Block
    }

    /// A violated rule whose action is `warn`.
    pub fn is_warning(&self) -> bool {
        !self.passed && self.action == RuleAction::Warn
    }
}

/// Everything the engine knows. `PolicyEngine::state()` hands out copies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GovernanceState {
    pub active_profile: PolicyProfile,
    pub rules: Vec<Rule>,
    /// Result of the most recent `evaluate()` call only.
    pub evaluations: Vec<Evaluation>,
    /// When the most recent evaluation ran (`None` before the first one).
    pub last_evaluation: Option<DateTime<Utc>>,
}

/// Allow/deny decision returned by `is_allowed()`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowDecision {
    pub allowed: bool,
    /// Reason of the first blocking violation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Reasons of every `warn` violation. Informational only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AllowDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            warnings: Vec::new(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            warnings: Vec::new(),
        }
    }
}

/// The policy engine — evaluates contexts against the active profile's rules.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    state: GovernanceState,
}

impl PolicyEngine {
    /// Create an engine with the given profile and no evaluation history.
    pub fn new(profile: PolicyProfile) -> Self {
        Self {
            state: GovernanceState {
                active_profile: profile,
                rules: rules_for_profile(profile),
                evaluations: Vec::new(),
                last_evaluation: None,
            },
        }
    }

    /// Evaluate every enabled rule against `context`.
    ///
    /// Overwrites the cached evaluations and timestamp in the engine state.
    pub fn evaluate(&mut self, context: &Value) -> Vec<Evaluation> {
        let evaluations: Vec<Evaluation> = self
            .state
            .rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| Evaluation::for_rule(rule, context))
            .collect();

        tracing::debug!(
            "evaluated {} rules for profile {}: {} violations",
            evaluations.len(),
            self.state.active_profile,
            evaluations.iter().filter(|e| !e.passed).count()
        );

        self.state.evaluations = evaluations.clone();
        self.state.last_evaluation = Some(Utc::now());
        evaluations
    }

    /// Evaluate `context` and decide whether the action may proceed.
    ///
    /// Denied iff an enabled `block` rule is violated; the reported reason
    /// comes from the first such rule in profile order. A context that is not
    /// a JSON object is always denied.
    pub fn is_allowed(&mut self, context: &Value) -> AllowDecision {
        let evaluations = self.evaluate(context);
        let warnings: Vec<String> = evaluations
            .iter()
            .filter(|e| e.is_warning())
            .filter_map(|e| e.reason.clone())
            .collect();

        let mut decision = if !context.is_object() {
            AllowDecision::deny(INVALID_CONTEXT_REASON)
        } else {
            match evaluations.iter().find(|e| e.is_blocking()) {
                Some(blocking) => AllowDecision {
                    allowed: false,
                    reason: blocking.reason.clone(),
                    warnings: Vec::new(),
                },
                None => AllowDecision::allow(),
            }
        };
        decision.warnings = warnings;

        if !decision.allowed {
            tracing::debug!(
                "action denied under {}: {}",
                self.state.active_profile,
                decision.reason.as_deref().unwrap_or("")
            );
        }
        decision
    }

    /// Switch profiles and re-resolve the rule list.
    ///
    /// The previous profile's evaluations stay cached until the next `evaluate()`.
    pub fn set_profile(&mut self, profile: PolicyProfile) {
        tracing::info!(
            "policy profile changed: {} -> {}",
            self.state.active_profile,
            profile
        );
        self.state.active_profile = profile;
        self.state.rules = rules_for_profile(profile);
    }

    /// A copy of the current state. Mutating it has no effect on the engine.
    pub fn state(&self) -> GovernanceState {
        self.state.clone()
    }

    pub fn active_profile(&self) -> PolicyProfile {
        self.state.active_profile
    }

    pub fn rules(&self) -> &[Rule] {
        &self.state.rules
    }

    /// Enable or disable a rule of the active profile by id.
    ///
    /// Returns false if the profile has no rule with that id. The override is
    /// lost on the next `set_profile()`.
    pub fn set_rule_enabled(&mut self, rule_id: &str, enabled: bool) -> bool {
        match self.state.rules.iter_mut().find(|r| r.id == rule_id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(PolicyProfile::default())
    }
}
