//! Fluent per-value assertions.
//!
//! An [`Assertion`] captures one value and reports every check it runs to a
//! borrowed [`Messenger`]. Its negated counterpart lives at
//! [`Assertion::not`]; a [`Negation`] reports the complement of each
//! predicate under the id `"not <predicate>"` and has no negation of its own.
//!
//! The check methods come from the [`Checks`] trait, which both types
//! implement.
//!
//! Capture is shallow: composites are shared with the caller (see
//! [`Value`]), so a report describes the value as observed at check time.

use covenant_core::{AssertError, Comparator, ContractError, UsageError, Value};

use crate::messenger::Messenger;

/// What an assertion and its negation share.
#[derive(Debug, Clone)]
struct Subject<'m> {
    messenger: &'m Messenger,
    value: Value,
    name: String,
}

/// The check vocabulary, one method per [`Comparator`].
///
/// Each check evaluates the comparator against the captured value, applies
/// the polarity, and reports to the messenger. Under a throwing policy a
/// failing check returns the error and `?` skips the remaining checks.
pub trait Checks {
    fn messenger(&self) -> &Messenger;
    fn value(&self) -> &Value;
    fn name(&self) -> &str;
    fn is_negated(&self) -> bool;

    /// Shared dispatch for every named check.
    fn check(&self, comparator: Comparator, against: Option<Value>) -> Result<(), AssertError> {
        let pass = comparator.test(self.value(), against.as_ref());
        let (id, pass) = if self.is_negated() {
            (format!("not {}", comparator.id()), !pass)
        } else {
            (comparator.id().to_string(), pass)
        };
        self.messenger()
            .report(id, pass, self.value().clone(), against, self.name())
    }

    /// Dispatch by predicate name; unknown names are a usage error.
    fn check_id(&self, id: &str, against: Option<Value>) -> Result<(), ContractError> {
        let comparator = Comparator::from_id(id).ok_or_else(|| UsageError::NoSuchCheck {
            id: id.to_string(),
        })?;
        self.check(comparator, against)?;
        Ok(())
    }

    fn equals(&self, against: impl Into<Value>) -> Result<(), AssertError> {
        self.check(Comparator::Equals, Some(against.into()))
    }

    fn less_than(&self, against: impl Into<Value>) -> Result<(), AssertError> {
        self.check(Comparator::LessThan, Some(against.into()))
    }

    fn more_than(&self, against: impl Into<Value>) -> Result<(), AssertError> {
        self.check(Comparator::MoreThan, Some(against.into()))
    }

    fn exists(&self) -> Result<(), AssertError> {
        self.check(Comparator::Exists, None)
    }

    fn nulled(&self) -> Result<(), AssertError> {
        self.check(Comparator::Nulled, None)
    }

    fn falsy(&self) -> Result<(), AssertError> {
        self.check(Comparator::Falsy, None)
    }

    fn truthy(&self) -> Result<(), AssertError> {
        self.check(Comparator::Truthy, None)
    }
}

/// Checks over one captured value.
#[derive(Debug, Clone)]
pub struct Assertion<'m> {
    subject: Subject<'m>,
    /// The negated view, built once at construction.
    pub not: Negation<'m>,
}

impl<'m> Assertion<'m> {
    pub fn new(messenger: &'m Messenger, value: impl Into<Value>, name: impl Into<String>) -> Self {
        let subject = Subject {
            messenger,
            value: value.into(),
            name: name.into(),
        };
        Assertion {
            not: Negation {
                subject: subject.clone(),
            },
            subject,
        }
    }

    /// An assertion whose reports carry an empty name.
    pub fn unnamed(messenger: &'m Messenger, value: impl Into<Value>) -> Self {
        Assertion::new(messenger, value, "")
    }
}

impl Checks for Assertion<'_> {
    fn messenger(&self) -> &Messenger {
        self.subject.messenger
    }

    fn value(&self) -> &Value {
        &self.subject.value
    }

    fn name(&self) -> &str {
        &self.subject.name
    }

    fn is_negated(&self) -> bool {
        false
    }
}

/// Negated checks over the same value, name and messenger.
#[derive(Debug, Clone)]
pub struct Negation<'m> {
    subject: Subject<'m>,
}

impl Checks for Negation<'_> {
    fn messenger(&self) -> &Messenger {
        self.subject.messenger
    }

    fn value(&self) -> &Value {
        &self.subject.value
    }

    fn name(&self) -> &str {
        &self.subject.name
    }

    fn is_negated(&self) -> bool {
        true
    }
}
