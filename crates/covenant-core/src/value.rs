//! Dynamic value representation for check subjects.
//!
//! [`Value`] is what an assertion captures and what comparators test. It
//! models the loosely typed arguments a guarded function receives, including
//! the [`Value::Missing`] sentinel used when a caller supplied fewer
//! arguments than the function declares.
//!
//! Capture semantics: primitives are held by value, while `Array` and
//! `Object` are held behind an `Rc`, so cloning a value shares the composite
//! rather than copying it. [`Value::strict_equals`] relies on this: two
//! composites are strictly equal only when they are the same allocation.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A runtime value observed by an assertion.
///
/// Note: the derived `PartialEq` is structural and exists for tests and
/// diagnostics. The `equals` comparator uses [`Value::strict_equals`], which
/// compares composites by identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// No value was supplied (an absent argument).
    Missing,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Shared array; clones alias the same elements.
    Array(Rc<Vec<Value>>),
    /// Shared insertion-ordered map; clones alias the same entries.
    Object(Rc<IndexMap<String, Value>>),
}

impl Value {
    /// Builds a fresh `Array` allocation from any iterator of convertible items.
    pub fn array<I, T>(items: I) -> Value
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Builds a fresh `Object` allocation, keeping entry order.
    pub fn object<I, K, T>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Value>,
    {
        Value::Object(Rc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns a human-readable description of the value's kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Missing => "Missing",
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "Str",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
        }
    }

    /// Truthiness: `Missing`, `Null`, `false`, zero, `NaN` and the empty
    /// string are falsy. Every composite is truthy, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Missing | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0 && !x.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Strict equality: same kind and same primitive value, with integers
    /// and floats compared numerically. Composites compare by identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Loose ordering used by `lessThan` and `moreThan`.
    ///
    /// Two strings compare lexicographically. Anything else is converted to a
    /// number first; `None` means the pair is unordered (some side is NaN),
    /// in which case every ordering check fails.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            _ => self.to_number().partial_cmp(&other.to_number()),
        }
    }

    /// Numeric conversion for loose ordering.
    fn to_number(&self) -> f64 {
        match self {
            Value::Missing => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int(n) => *n as f64,
            Value::Float(x) => *x,
            Value::Str(s) => string_to_number(s),
            // Composites have no numeric reading.
            Value::Array(_) | Value::Object(_) => f64::NAN,
        }
    }
}

/// Reads a string as a numeric literal: trimmed decimal with optional sign
/// and exponent, `Infinity` with optional sign, or an unsigned `0x`/`0o`/`0b`
/// integer. Blank strings read as zero; anything else is NaN.
fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => match radix_literal(trimmed) {
            Some(x) => x,
            None if is_decimal_literal(trimmed) => trimmed.parse().unwrap_or(f64::NAN),
            None => f64::NAN,
        },
    }
}

/// `None` when `s` has no radix prefix.
fn radix_literal(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0, |acc: f64, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}

fn is_decimal_literal(s: &str) -> bool {
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let unsigned = |part: &str| -> String {
        part.strip_prefix(&['+', '-'][..]).unwrap_or(part).to_string()
    };

    let body = unsigned(s);
    let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
        Some(at) => (&body[..at], Some(unsigned(&body[at + 1..]))),
        None => (body.as_str(), None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mantissa_ok = !(int.is_empty() && frac.is_empty()) && digits(int) && digits(frac);
    let exponent_ok = exponent.map_or(true, |e| !e.is_empty() && digits(&e));
    mantissa_ok && exponent_ok
}

fn fmt_number(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.is_nan() {
        f.write_str("NaN")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" })
    } else if x == 0.0 {
        // Covers negative zero.
        f.write_str("0")
    } else if x.abs() < 1e-6 || x.abs() >= 1e21 {
        // Exponent form always carries its sign: 1e-7, 1e+21.
        let exp = format!("{x:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                write!(f, "{mantissa}e+{power}")
            }
            _ => f.write_str(&exp),
        }
    } else {
        write!(f, "{x}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => fmt_number(*x, f),
            Value::Str(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !matches!(item, Value::Missing | Value::Null) {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
        }
    }
}

// Conversions from Rust primitives.

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

// Bridge to serde_json. `Missing` has no JSON form and maps to `null`.

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Array(Rc::new(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(map) => Value::Object(Rc::new(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Missing | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(n) => serde_json::Value::from(n),
            Value::Float(x) => serde_json::Number::from_f64(x)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Str(s) => serde_json::Value::String(s),
            Value::Array(items) => serde_json::Value::Array(
                items.iter().cloned().map(serde_json::Value::from).collect(),
            ),
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_host_string_conversion() {
        assert_eq!(Value::Missing.to_string(), "undefined");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(-1).to_string(), "-1");
        assert_eq!(Value::from(5.0).to_string(), "5");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(-0.0).to_string(), "0");
        assert_eq!(Value::from(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::from(0.000001).to_string(), "0.000001");
        assert_eq!(Value::from(0.0000001).to_string(), "1e-7");
        assert_eq!(Value::from(-1.5e-7).to_string(), "-1.5e-7");
        assert_eq!(Value::from(1e20).to_string(), "100000000000000000000");
        assert_eq!(Value::from(1e21).to_string(), "1e+21");
        assert_eq!(Value::from(2.5e22).to_string(), "2.5e+22");
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(
            Value::array(vec![Value::from(1), Value::Null, Value::from("x")]).to_string(),
            "1,,x"
        );
        assert_eq!(Value::object([("a", 1)]).to_string(), "[object Object]");
    }

    #[test]
    fn truthiness() {
        for falsy in [
            Value::Missing,
            Value::Null,
            Value::from(false),
            Value::from(0),
            Value::from(0.0),
            Value::from(f64::NAN),
            Value::from(""),
        ] {
            assert!(!falsy.is_truthy(), "{falsy:?} should be falsy");
        }
        for truthy in [
            Value::from(true),
            Value::from(-3),
            Value::from("0"),
            Value::array(Vec::<Value>::new()),
            Value::object(Vec::<(String, Value)>::new()),
        ] {
            assert!(truthy.is_truthy(), "{truthy:?} should be truthy");
        }
    }

    #[test]
    fn strict_equality_compares_numbers_across_kinds() {
        assert!(Value::from(2).strict_equals(&Value::from(2.0)));
        assert!(!Value::from(2).strict_equals(&Value::from("2")));
        assert!(!Value::from(f64::NAN).strict_equals(&Value::from(f64::NAN)));
        assert!(Value::Missing.strict_equals(&Value::Missing));
        assert!(!Value::Missing.strict_equals(&Value::Null));
    }

    #[test]
    fn strict_equality_is_identity_for_composites() {
        let a = Value::array([1, 2]);
        let alias = a.clone();
        let lookalike = Value::array([1, 2]);
        assert!(a.strict_equals(&alias));
        assert!(!a.strict_equals(&lookalike));
        // Structural equality still holds for the derived PartialEq.
        assert_eq!(a, lookalike);
    }

    #[test]
    fn loose_ordering() {
        assert_eq!(Value::from(1).loose_cmp(&Value::from(2)), Some(Ordering::Less));
        assert_eq!(Value::from("b").loose_cmp(&Value::from("a")), Some(Ordering::Greater));
        assert_eq!(Value::from("10").loose_cmp(&Value::from(9)), Some(Ordering::Greater));
        assert_eq!(Value::Null.loose_cmp(&Value::from(0)), Some(Ordering::Equal));
        assert_eq!(Value::from(true).loose_cmp(&Value::from(0.5)), Some(Ordering::Greater));
        assert_eq!(Value::Missing.loose_cmp(&Value::from(0)), None);
        assert_eq!(Value::from("abc").loose_cmp(&Value::from(1)), None);
    }

    #[test]
    fn strings_read_as_numeric_literals() {
        let cmp = |s: &str, n: f64| Value::from(s).loose_cmp(&Value::from(n));
        assert_eq!(cmp(" 12 ", 3.0), Some(Ordering::Greater));
        assert_eq!(cmp("", 0.0), Some(Ordering::Equal));
        assert_eq!(cmp("-1.5e2", -150.0), Some(Ordering::Equal));
        assert_eq!(cmp(".5", 0.0), Some(Ordering::Greater));
        assert_eq!(cmp("1.", 1.0), Some(Ordering::Equal));
        assert_eq!(cmp("0x10", 15.0), Some(Ordering::Greater));
        assert_eq!(cmp("0b101", 5.0), Some(Ordering::Equal));
        assert_eq!(cmp("0O17", 15.0), Some(Ordering::Equal));
        assert_eq!(cmp("Infinity", f64::MAX), Some(Ordering::Greater));
        assert_eq!(cmp("-Infinity", f64::MIN), Some(Ordering::Less));
        for not_a_number in ["inf", "infinity", "NaN", "nan", "-0x10", "0x", "1_000", "1e", ".", "+-1", "12px"] {
            assert_eq!(cmp(not_a_number, 5.0), None, "{not_a_number:?}");
        }
    }

    #[test]
    fn json_conversion() {
        let json = serde_json::json!({"n": 3, "x": 1.5, "tags": ["a", null], "ok": true});
        let value = Value::from(json.clone());
        match &value {
            Value::Object(map) => {
                assert_eq!(map["n"], Value::Int(3));
                assert_eq!(map["x"], Value::Float(1.5));
                assert_eq!(map["ok"], Value::Bool(true));
            }
            other => panic!("expected object, got {other:?}"),
        }
        assert_eq!(serde_json::Value::from(value), json);
        assert_eq!(serde_json::Value::from(Value::Missing), serde_json::Value::Null);
    }

    proptest::proptest! {
        #[test]
        fn strict_equality_is_symmetric(a in -3i64..3, b in -3.0f64..3.0, s in "[0-3]{0,2}") {
            let values = [Value::Int(a), Value::Float(b), Value::Float(a as f64), Value::Str(s)];
            for x in &values {
                for y in &values {
                    proptest::prop_assert_eq!(x.strict_equals(y), y.strict_equals(x));
                }
            }
        }

        #[test]
        fn ordering_is_antisymmetric(a in -100i64..100, b in -100.0f64..100.0) {
            let (x, y) = (Value::Int(a), Value::Float(b));
            proptest::prop_assert_eq!(x.loose_cmp(&y), y.loose_cmp(&x).map(Ordering::reverse));
        }
    }

    #[test]
    fn deserializes_from_json_text() {
        let value: Value = serde_json::from_str("[1, \"two\"]").unwrap();
        assert_eq!(value, Value::array(vec![Value::from(1), Value::from("two")]));
    }
}
