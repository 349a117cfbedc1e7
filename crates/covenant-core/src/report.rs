//! Check outcome records.
//!
//! A [`Report`] is the immutable record of one evaluated check. Its
//! `description` is derived once at construction and doubles as the message
//! of any error raised for it.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Renders `id(value)` or `id(value, against)`.
///
/// The target is omitted when absent or [`Value::Missing`].
pub fn describe(id: &str, value: &Value, against: Option<&Value>) -> String {
    match against {
        Some(against) if !against.is_missing() => format!("{id}({value}, {against})"),
        _ => format!("{id}({value})"),
    }
}

/// One recorded check outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Predicate name, prefixed with `"not "` for negated checks.
    pub id: String,
    pub pass: bool,
    pub value: Value,
    pub against: Option<Value>,
    /// Parameter or enforce description; empty when unnamed.
    pub name: String,
    /// `name + ": " + describe(id, value, against)`.
    pub description: String,
}

impl Report {
    pub fn new(
        id: impl Into<String>,
        pass: bool,
        value: Value,
        against: Option<Value>,
        name: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let name = name.into();
        let description = format!("{name}: {}", describe(&id, &value, against.as_ref()));
        Report {
            id,
            pass,
            value,
            against,
            name,
            description,
        }
    }

    /// Detached copy without the name field.
    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot {
            id: self.id.clone(),
            pass: self.pass,
            value: self.value.clone(),
            against: self.against.clone(),
            description: self.description.clone(),
        }
    }
}

/// Plain, owned view of a [`Report`] as returned by `Messenger::as_array`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub id: String,
    pub pass: bool,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub against: Option<Value>,
    pub description: String,
}
