//! Report mediator: records check outcomes and applies a failure policy.
//!
//! A [`Messenger`] lives for exactly one enforcement episode (one guarded
//! call, or one ad hoc session). Assertions hold a shared borrow of it, so
//! recording goes through interior mutability. The type is deliberately not
//! `Sync`; episodes are single-threaded.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::str::FromStr;

use covenant_core::{AssertError, PreconditionError, Report, ReportSnapshot, Value};
use serde::{Deserialize, Serialize};

/// What a [`Messenger`] does when a check fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and keep going; callers poll the counts.
    #[default]
    Collect,
    /// Return [`AssertError::Violation`] on the first failure.
    Assert,
    /// Return [`AssertError::Precondition`] on the first failure.
    Precondition,
}

impl FailurePolicy {
    /// Selector value that picks [`FailurePolicy::Precondition`].
    pub const PRECONDITION_SELECTOR: &'static str = "precondition";

    /// Chooses a policy from a loosely typed selector.
    ///
    /// A falsy selector collects, the string `"precondition"` selects the
    /// precondition policy, and any other truthy selector asserts.
    pub fn from_selector(selector: &Value) -> Self {
        match selector {
            Value::Str(s) if s == Self::PRECONDITION_SELECTOR => FailurePolicy::Precondition,
            other if other.is_truthy() => FailurePolicy::Assert,
            _ => FailurePolicy::Collect,
        }
    }

    /// Whether a failing check returns an error under this policy.
    pub fn raises(self) -> bool {
        !matches!(self, FailurePolicy::Collect)
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailurePolicy::Collect => "collect",
            FailurePolicy::Assert => "assert",
            FailurePolicy::Precondition => "precondition",
        })
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "collect" => Ok(FailurePolicy::Collect),
            "assert" => Ok(FailurePolicy::Assert),
            "precondition" => Ok(FailurePolicy::Precondition),
            _ => Err(format!(
                "invalid failure policy '{}': expected collect, assert or precondition",
                s
            )),
        }
    }
}

/// Ordered store of [`Report`]s for one enforcement episode.
#[derive(Debug, Default)]
pub struct Messenger {
    policy: FailurePolicy,
    reports: RefCell<Vec<Report>>,
    /// Always equals the number of stored reports with `pass == false`.
    failed: Cell<usize>,
}

impl Messenger {
    pub fn new(policy: FailurePolicy) -> Self {
        Messenger {
            policy,
            reports: RefCell::new(Vec::new()),
            failed: Cell::new(0),
        }
    }

    pub fn collecting() -> Self {
        Messenger::new(FailurePolicy::Collect)
    }

    pub fn asserting() -> Self {
        Messenger::new(FailurePolicy::Assert)
    }

    pub fn precondition() -> Self {
        Messenger::new(FailurePolicy::Precondition)
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Records one check outcome.
    ///
    /// The report is appended before any error is returned, so a later
    /// [`replay`](Self::replay) still sees the failing record.
    pub fn report(
        &self,
        id: impl Into<String>,
        pass: bool,
        value: Value,
        against: Option<Value>,
        name: &str,
    ) -> Result<(), AssertError> {
        let report = Report::new(id, pass, value, against, name);
        tracing::trace!(id = %report.id, pass, name = %report.name, "check recorded");

        let error = if pass {
            None
        } else {
            self.failed.set(self.failed.get() + 1);
            match self.policy {
                FailurePolicy::Collect => None,
                FailurePolicy::Assert => Some(AssertError::Violation {
                    message: report.description.clone(),
                }),
                FailurePolicy::Precondition => {
                    Some(PreconditionError::new(report.description.clone()).into())
                }
            }
        };
        self.reports.borrow_mut().push(report);

        match error {
            Some(error) => {
                tracing::debug!(policy = %self.policy, description = %error, "check failed");
                Err(error)
            }
            None => Ok(()),
        }
    }

    /// Visits every report in insertion order with its index.
    ///
    /// Only the reports present when the replay starts are visited; checks
    /// recorded from inside the callback are kept but not replayed.
    pub fn replay<F>(&self, mut callback: F)
    where
        F: FnMut(&Report, usize),
    {
        let len = self.count();
        for index in 0..len {
            let current = self.reports.borrow()[index].clone();
            callback(&current, index);
        }
    }

    pub fn count(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn count_failed(&self) -> usize {
        self.failed.get()
    }

    pub fn count_passed(&self) -> usize {
        self.count() - self.count_failed()
    }

    pub fn is_empty(&self) -> bool {
        self.count() < 1
    }

    pub fn all_passed(&self) -> bool {
        self.count_failed() < 1
    }

    pub fn some_failed(&self) -> bool {
        self.count_failed() > 0
    }

    /// Independent snapshots of every report, in insertion order.
    pub fn as_array(&self) -> Vec<ReportSnapshot> {
        let mut result = Vec::with_capacity(self.count());
        self.replay(|report, _| result.push(report.snapshot()));
        result
    }

    /// Owned copies of every report, including names.
    pub fn reports(&self) -> Vec<Report> {
        self.reports.borrow().clone()
    }
}
