// gate.rs — Combined governance gate.
//
// An autonomous action must pass two independent gates: the policy engine
// (is this specific action allowed under the active profile?) and the
// autonomy controller (is this category of behavior enabled at all?).
// `Governance` owns both and is constructed once by the application's
// composition root, then handed to whatever needs it.
//
// `PolicyEngine::evaluate()` writes to its cached state, so a governance
// instance shared between threads must sit behind a lock. `SharedGovernance`
// makes that lock explicit at the call site.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::autonomy::{ActionCategory, AutonomyController};
use crate::engine::PolicyEngine;
use crate::error::GovernanceError;

/// A governance instance shared across threads.
pub type SharedGovernance = Arc<Mutex<Governance>>;

/// Outcome of running both gates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// Both gates passed. `warnings` lists any `warn` rule violations.
    Allow { warnings: Vec<String> },
    /// The policy engine refused the action.
    DenyPolicy { reason: String },
    /// The autonomy controller refused the action category.
    DenyAutonomy { reason: String },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow { .. })
    }
}

/// The policy engine and autonomy controller, owned together.
#[derive(Debug, Clone, Default)]
pub struct Governance {
    pub engine: PolicyEngine,
    pub autonomy: AutonomyController,
}

impl Governance {
    pub fn new(engine: PolicyEngine, autonomy: AutonomyController) -> Self {
        Self { engine, autonomy }
    }

    /// Wrap this instance for sharing between threads.
    pub fn shared(self) -> SharedGovernance {
        Arc::new(Mutex::new(self))
    }

    /// Run both gates for an autonomous action in `category` described by `context`.
    ///
    /// The policy engine always runs (so its cached evaluation reflects this
    /// request). A policy refusal is reported ahead of an autonomy refusal.
    pub fn check(&mut self, context: &Value, category: ActionCategory) -> GateDecision {
        let policy = self.engine.is_allowed(context);
        let autonomy = self.autonomy.refusal(category);

        let decision = if !policy.allowed {
            GateDecision::DenyPolicy {
                reason: policy.reason.unwrap_or_default(),
            }
        } else if let Some(reason) = autonomy {
            GateDecision::DenyAutonomy { reason }
        } else {
            GateDecision::Allow {
                warnings: policy.warnings,
            }
        };

        tracing::debug!("governance check for '{}': {:?}", category, decision);
        decision
    }
}

/// Lock a shared governance instance.
pub fn lock(shared: &SharedGovernance) -> Result<MutexGuard<'_, Governance>, GovernanceError> {
    shared.lock().map_err(|_| GovernanceError::LockPoisoned)
}

/// Run `Governance::check` on a shared instance under its lock.
pub fn check_shared(
    shared: &SharedGovernance,
    context: &Value,
    category: ActionCategory,
) -> Result<GateDecision, GovernanceError> {
    Ok(lock(shared)?.check(context, category))
}
