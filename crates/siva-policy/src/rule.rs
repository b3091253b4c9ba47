// rule.rs — Rule and condition definitions.
//
// A rule is a named set of conditions plus the action applied when the
// conditions are met. Conditions compare one field of the caller-supplied
// context (a JSON value) against a fixed comparison value.
//
// A rule matches when ALL of its conditions hold. A rule with no
// conditions matches every context.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happens when a rule's conditions are met.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Warn,
    Block,
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Allow => write!(f, "allow"),
            RuleAction::Warn => write!(f, "warn"),
            RuleAction::Block => write!(f, "block"),
        }
    }
}

/// Comparison operator used by a [`Condition`].
///
/// Unrecognized operator names deserialize to `Unknown`, which never matches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    In,
    #[serde(other)]
    Unknown,
}

impl ConditionOperator {
    /// Apply the operator to a resolved field value.
    ///
    /// `actual` is `None` when the field path does not exist in the context.
    /// An absent field fails every operator except `NotEquals`.
    pub fn apply(self, actual: Option<&Value>, expected: &Value) -> bool {
        let Some(actual) = actual else {
            return self == ConditionOperator::NotEquals;
        };

        match self {
            ConditionOperator::Equals => values_equal(actual, expected),
            ConditionOperator::NotEquals => !values_equal(actual, expected),
            ConditionOperator::GreaterThan => {
                compare_numbers(actual, expected) == Some(Ordering::Greater)
            }
            ConditionOperator::LessThan => {
                compare_numbers(actual, expected) == Some(Ordering::Less)
            }
            ConditionOperator::Contains => {
                coerce_to_string(actual).contains(&coerce_to_string(expected))
            }
            ConditionOperator::In => expected
                .as_array()
                .is_some_and(|items| items.iter().any(|item| values_equal(actual, item))),
            ConditionOperator::Unknown => false,
        }
    }
}

/// A single field/operator/value comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    /// Dot-delimited path into the context (e.g., "user.plan").
    pub field: String,
    pub operator: ConditionOperator,
    /// Comparison value. Must be an array for `in`.
    pub value: Value,
}

impl Condition {
    pub fn new(field: &str, operator: ConditionOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.into(),
        }
    }

    /// Check this condition against a context.
    pub fn evaluate(&self, context: &Value) -> bool {
        self.operator
            .apply(lookup_field(context, &self.field), &self.value)
    }
}

/// A named governance rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    /// Stable identifier, unchanged across profile versions.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Disabled rules are skipped entirely during evaluation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub action: RuleAction,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    /// True when every condition holds for `context` (vacuously true when empty).
    pub fn matches(&self, context: &Value) -> bool {
        self.conditions.iter().all(|c| c.evaluate(context))
    }
}

/// Resolve a dot-delimited path through nested objects.
///
/// Returns `None` if any segment is missing or an intermediate value is not an object.
pub fn lookup_field<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(context, |current, segment| {
        current.as_object()?.get(segment)
    })
}

/// Structural equality, except numbers compare by value (`1 == 1.0`) at any depth.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_numbers(a, b) == Some(Ordering::Equal),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, l)| match y.get(key) {
                    Some(r) => values_equal(l, r),
                    None => false,
                })
        }
        _ => a == b,
    }
}

/// Integers compare exactly; anything involving a float compares as f64.
fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (a.as_i64(), b.as_i64()) {
        return Some(l.cmp(&r));
    }
    if let (Some(l), Some(r)) = (a.as_u64(), b.as_u64()) {
        return Some(l.cmp(&r));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Render a value the way a loosely-typed host would print it.
///
/// Strings are verbatim, whole floats drop their fraction, arrays join
/// their elements with commas and objects collapse to a fixed placeholder.
fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            (None, None, Some(f)) => format_float(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip form. Magnitudes below 1e-6 or from 1e21 up use
/// exponent notation (`1e-7`, `1e+21`); negative zero prints as `0`.
fn format_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&f.abs()) {
        // f64's Display prints 3.0 as "3".
        return f.to_string();
    }
    let exp = format!("{:e}", f);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => {
            format!("{}e+{}", mantissa, power)
        }
        _ => exp,
    }
}
