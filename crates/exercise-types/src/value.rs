//! Dynamic values and declared parameter types.
//!
//! Submitted code is exercised through a dynamic calling surface: test cases
//! hand the harness plain [`Value`]s, and submission signatures declare
//! [`ParamType`]s. Overload resolution compares the two under a fixed
//! widening rule — an exact type match always beats a widening conversion,
//! and narrowing is never applicable.

use serde::{Deserialize, Serialize};

use crate::typedef::InstanceHandle;

/// A dynamic argument or return value crossing the harness boundary.
#[derive(Debug, Clone)]
pub enum Value {
    /// "No value" — the result of a void method. Never a valid argument.
    Unit,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    /// An instance of a submission-declared type.
    Instance(InstanceHandle),
}

impl Value {
    /// Human-readable label of the value's runtime type, for diagnostics.
    pub fn type_label(&self) -> String {
        match self {
            Value::Unit => "unit".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(_) => "int".into(),
            Value::Long(_) => "long".into(),
            Value::Float(_) => "float".into(),
            Value::Double(_) => "double".into(),
            Value::Str(_) => "string".into(),
            Value::Instance(handle) => handle.type_name().to_string(),
        }
    }

    /// Render the value for an outcome record.
    pub fn render(&self) -> String {
        match self {
            Value::Unit => "unit".into(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Long(n) => n.to_string(),
            Value::Float(x) => x.to_string(),
            Value::Double(x) => x.to_string(),
            Value::Str(s) => format!("\"{s}\""),
            Value::Instance(handle) => format!("instance of '{}'", handle.type_name()),
        }
    }
}

// Instances compare by object identity; primitives by value. Used by test
// assertions, not by overload resolution.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => a.same_object(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<InstanceHandle> for Value {
    fn from(v: InstanceHandle) -> Self {
        Value::Instance(v)
    }
}

/// Declared parameter type of a constructor or method signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    Bool,
    Int,
    Long,
    Float,
    Double,
    Str,
    /// A submission-declared type, by simple name.
    Instance(String),
}

impl ParamType {
    /// Human-readable label, for diagnostics.
    pub fn label(&self) -> String {
        match self {
            ParamType::Bool => "bool".into(),
            ParamType::Int => "int".into(),
            ParamType::Long => "long".into(),
            ParamType::Float => "float".into(),
            ParamType::Double => "double".into(),
            ParamType::Str => "string".into(),
            ParamType::Instance(name) => name.clone(),
        }
    }

    /// Widening-only assignability for non-instance values: an exact match
    /// scores 0, a widening conversion scores 1, anything else is
    /// inapplicable. Narrowing never applies.
    ///
    /// Instance arguments are scored by the resolution scope, which knows
    /// the submission's inheritance chains; this returns `None` for them.
    pub fn primitive_score(&self, arg: &Value) -> Option<u32> {
        match (self, arg) {
            (ParamType::Bool, Value::Bool(_))
            | (ParamType::Int, Value::Int(_))
            | (ParamType::Long, Value::Long(_))
            | (ParamType::Float, Value::Float(_))
            | (ParamType::Double, Value::Double(_))
            | (ParamType::Str, Value::Str(_)) => Some(0),
            // Widening conversions
            (ParamType::Long, Value::Int(_))
            | (ParamType::Float, Value::Int(_))
            | (ParamType::Float, Value::Long(_))
            | (ParamType::Double, Value::Int(_))
            | (ParamType::Double, Value::Long(_))
            | (ParamType::Double, Value::Float(_)) => Some(1),
            _ => None,
        }
    }
}
