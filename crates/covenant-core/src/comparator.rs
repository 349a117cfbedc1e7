//! The fixed comparator registry.
//!
//! Every assertion exposes one check per [`Comparator`]. The set is closed
//! and read-only; lookups by name go through [`Comparator::from_id`].

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A named predicate over `(value, against)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// Strict equality with `against`.
    #[serde(rename = "equals")]
    Equals,
    /// `value < against` under loose ordering.
    #[serde(rename = "lessThan")]
    LessThan,
    /// `value > against` under loose ordering.
    #[serde(rename = "moreThan")]
    MoreThan,
    /// The value is not [`Value::Missing`].
    #[serde(rename = "exists")]
    Exists,
    /// The value is exactly [`Value::Null`].
    #[serde(rename = "nulled")]
    Nulled,
    #[serde(rename = "falsy")]
    Falsy,
    #[serde(rename = "truthy")]
    Truthy,
}

impl Comparator {
    /// Every registered comparator, in registry order.
    pub const ALL: [Comparator; 7] = [
        Comparator::Equals,
        Comparator::LessThan,
        Comparator::MoreThan,
        Comparator::Exists,
        Comparator::Nulled,
        Comparator::Falsy,
        Comparator::Truthy,
    ];

    /// The predicate name used in reports.
    pub fn id(self) -> &'static str {
        match self {
            Comparator::Equals => "equals",
            Comparator::LessThan => "lessThan",
            Comparator::MoreThan => "moreThan",
            Comparator::Exists => "exists",
            Comparator::Nulled => "nulled",
            Comparator::Falsy => "falsy",
            Comparator::Truthy => "truthy",
        }
    }

    pub fn from_id(id: &str) -> Option<Comparator> {
        Comparator::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Whether the comparator reads `against`.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Comparator::Equals | Comparator::LessThan | Comparator::MoreThan
        )
    }

    /// Evaluates the predicate. Unary comparators ignore `against`; binary
    /// comparators treat an absent `against` as [`Value::Missing`].
    pub fn test(self, value: &Value, against: Option<&Value>) -> bool {
        let against = against.unwrap_or(&Value::Missing);
        match self {
            Comparator::Equals => value.strict_equals(against),
            Comparator::LessThan => value.loose_cmp(against) == Some(Ordering::Less),
            Comparator::MoreThan => value.loose_cmp(against) == Some(Ordering::Greater),
            Comparator::Exists => !value.is_missing(),
            Comparator::Nulled => value.is_null(),
            Comparator::Falsy => !value.is_truthy(),
            Comparator::Truthy => value.is_truthy(),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_lookup() {
        for comparator in Comparator::ALL {
            assert_eq!(Comparator::from_id(comparator.id()), Some(comparator));
        }
        assert_eq!(Comparator::from_id("greaterThan"), None);
        assert_eq!(Comparator::from_id("not equals"), None);
    }

    #[test]
    fn arity() {
        let binary: Vec<_> = Comparator::ALL.into_iter().filter(|c| c.is_binary()).collect();
        assert_eq!(
            binary,
            vec![Comparator::Equals, Comparator::LessThan, Comparator::MoreThan]
        );
    }

    #[test]
    fn binary_comparators() {
        let zero = Value::from(0);
        assert!(Comparator::Equals.test(&Value::from(0), Some(&zero)));
        assert!(!Comparator::Equals.test(&Value::from("0"), Some(&zero)));
        assert!(Comparator::LessThan.test(&Value::from(-1), Some(&zero)));
        assert!(!Comparator::LessThan.test(&Value::from(0), Some(&zero)));
        assert!(Comparator::MoreThan.test(&Value::from(0.5), Some(&zero)));
        assert!(!Comparator::MoreThan.test(&Value::Missing, Some(&zero)));
    }

    #[test]
    fn binary_comparator_without_target_compares_against_missing() {
        assert!(Comparator::Equals.test(&Value::Missing, None));
        assert!(!Comparator::Equals.test(&Value::Null, None));
        assert!(!Comparator::LessThan.test(&Value::from(1), None));
    }

    #[test]
    fn unary_comparators_ignore_target() {
        let target = Value::from(42);
        assert!(Comparator::Exists.test(&Value::Null, Some(&target)));
        assert!(!Comparator::Exists.test(&Value::Missing, None));
        assert!(Comparator::Nulled.test(&Value::Null, None));
        assert!(!Comparator::Nulled.test(&Value::Missing, None));
        assert!(Comparator::Falsy.test(&Value::from(""), Some(&target)));
        assert!(Comparator::Truthy.test(&Value::from("x"), None));
    }

    #[test]
    fn serde_uses_report_ids() {
        let json = serde_json::to_string(&Comparator::LessThan).unwrap();
        assert_eq!(json, "\"lessThan\"");
        let parsed: Comparator = serde_json::from_str("\"moreThan\"").unwrap();
        assert_eq!(parsed, Comparator::MoreThan);
    }
}
