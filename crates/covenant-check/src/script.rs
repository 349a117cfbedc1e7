//! Checks described as data.
//!
//! A [`CheckScript`] is a JSON document listing checks to run, either as an
//! ad hoc session against a [`Messenger`] or as the specification of a
//! guarded function:
//!
//! ```json
//! {
//!   "policy": "precondition",
//!   "checks": [
//!     { "param": "d", "check": "equals", "against": 0, "negate": true },
//!     { "enforce": ["total", -1], "check": "moreThan", "against": 0 }
//!   ]
//! }
//! ```
//!
//! `policy` is a loose selector (see [`FailurePolicy::from_selector`]).
//! `enforce` holds the raw argument list of an `enforce` call, so an empty
//! list is a usage error, exactly as calling `enforce` with no arguments.

use covenant_core::{ContractError, UsageError, Value};
use serde::{Deserialize, Deserializer, Serialize};

use crate::assertion::{Assertion, Checks};
use crate::contract::Bindings;
use crate::messenger::{FailurePolicy, Messenger};

/// A sequence of checks plus the failure policy for ad hoc sessions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckScript {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Value>,
    #[serde(default)]
    pub checks: Vec<CheckStep>,
}

/// One check. `param` takes precedence over `enforce` when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Vec<Value>>,
    /// Predicate id, e.g. `"lessThan"`.
    pub check: String,
    /// Absent means no target; an explicit `null` is a `Null` target.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub against: Option<Value>,
    #[serde(default)]
    pub negate: bool,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl CheckScript {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Failure policy picked by the `policy` selector.
    pub fn policy(&self) -> FailurePolicy {
        FailurePolicy::from_selector(self.policy.as_ref().unwrap_or(&Value::Missing))
    }

    /// Runs the checks as an ad hoc session. There are no parameters to
    /// bind, so `param` steps fail with [`UsageError::UnknownParameter`].
    pub fn run(&self, messenger: &Messenger) -> Result<(), ContractError> {
        self.apply(&Bindings::new(messenger, &[], &[]))
    }

    /// Runs the checks as a contract specification over `bindings`,
    /// stopping at the first error.
    pub fn apply(&self, bindings: &Bindings<'_>) -> Result<(), ContractError> {
        for (index, step) in self.checks.iter().enumerate() {
            match (&step.param, &step.enforce) {
                (Some(name), _) => step.check_on(bindings.param(name)?)?,
                (None, Some(args)) => step.check_on(&bindings.enforce_with(args)?)?,
                (None, None) => return Err(UsageError::NoTarget { index }.into()),
            }
        }
        Ok(())
    }
}

impl CheckStep {
    fn check_on(&self, assertion: &Assertion<'_>) -> Result<(), ContractError> {
        if self.negate {
            assertion.not.check_id(&self.check, self.against.clone())
        } else {
            assertion.check_id(&self.check, self.against.clone())
        }
    }
}
