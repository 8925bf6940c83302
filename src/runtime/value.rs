//! Dynamically typed values
//!
//! Operands in event content are loosely typed: most are integers, but strings,
//! booleans, nested lists (choice lists, move routes) and objects (audio files,
//! move-route records) all appear. Variables hold the same shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A content operand or variable cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Absent / null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    Str(String),
    /// Nested operand list
    List(Vec<Value>),
    /// Keyed record (audio files, move routes)
    Object(IndexMap<String, Value>),
}

static NULL: Value = Value::Null;

impl Value {
    /// Integer view. Floats floor, bools map to 0/1, numeric strings parse,
    /// everything else is 0.
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            Value::Float(f) if f.is_finite() => f.floor() as i64,
            Value::Bool(b) => *b as i64,
            Value::Str(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Float view
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Float(f) => *f,
            Value::Int(i) => *i as f64,
            Value::Bool(b) => *b as i64 as f64,
            Value::Str(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Truthiness: null, false, 0, NaN and "" are false
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Object(_) => true,
        }
    }

    /// String view, empty for non-strings
    pub fn as_str(&self) -> &str {
        match self {
            Value::Str(s) => s,
            _ => "",
        }
    }

    /// List view, empty for non-lists
    pub fn as_list(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            _ => &[],
        }
    }

    /// Element of a list value, `Null` when missing
    pub fn get(
        &self,
        index: usize,
    ) -> &Value {
        self.as_list().get(index).unwrap_or(&NULL)
    }

    /// Field of an object value, `Null` when missing
    pub fn field(
        &self,
        name: &str,
    ) -> &Value {
        match self {
            Value::Object(map) => map.get(name).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Whether the value is numeric
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Whether the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Normalise a number for storage: floats are floored to integers
    pub fn normalized(self) -> Value {
        match self {
            Value::Float(f) if f.is_finite() => Value::Int(f.floor() as i64),
            Value::Float(_) => Value::Int(0),
            other => other,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_deserialize() {
        let v: Value = serde_json::from_str(r#"["Actor1", 0, true, 1.5, null, {"name": "Cursor1"}]"#)
            .unwrap();
        assert_eq!(v.get(0).as_str(), "Actor1");
        assert_eq!(v.get(1), &Value::Int(0));
        assert!(v.get(2).as_bool());
        assert_eq!(v.get(3).as_int(), 1);
        assert!(v.get(4).is_null());
        assert_eq!(v.get(5).field("name").as_str(), "Cursor1");
        assert!(v.get(99).is_null());
    }

    #[test]
    fn test_normalized_floors() {
        assert_eq!(Value::Float(2.9).normalized(), Value::Int(2));
        assert_eq!(Value::Float(-0.5).normalized(), Value::Int(-1));
        assert_eq!(Value::Float(f64::INFINITY).normalized(), Value::Int(0));
        assert_eq!(Value::from("x").normalized(), Value::from("x"));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.as_bool());
        assert!(!Value::Int(0).as_bool());
        assert!(!Value::from("").as_bool());
        assert!(Value::from("a").as_bool());
        assert!(Value::List(vec![]).as_bool());
    }
}
