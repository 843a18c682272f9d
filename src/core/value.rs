use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::core::{OwnerRef, Result, VoError};
use crate::object::ValueObject;

/// A single field slot inside a value object.
///
/// Plain JSON data covers scalars and plain containers. Nested value objects
/// are kept as live objects so that bulk assignment can merge into them.
#[derive(Debug)]
pub enum FieldValue {
    Plain(Value),
    Object(Box<dyn ValueObject>),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn null() -> Self {
        Self::Plain(Value::Null)
    }

    pub fn object<T: ValueObject>(object: T) -> Self {
        Self::Object(Box::new(object))
    }

    /// JSON form of `T::default()`, or `null` when the default does not encode.
    pub fn default_of<T: Default + Serialize>() -> Self {
        Self::Plain(serde_json::to_value(T::default()).unwrap_or(Value::Null))
    }

    /// Encodes a typed value for field `field` of `type_name`.
    pub fn encode<T: Serialize>(type_name: &'static str, field: &str, value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Plain)
            .map_err(|source| VoError::FieldType {
                type_name,
                field: field.to_string(),
                source,
            })
    }

    /// Recursively expands nested objects and containers into plain JSON.
    pub fn to_plain(&self) -> Value {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Object(object) => Value::Object(object.to_plain_data()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_plain).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_plain()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            Self::Plain(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&(dyn ValueObject + 'static)> {
        match self {
            Self::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut (dyn ValueObject + 'static)> {
        match self {
            Self::Object(object) => Some(object.as_mut()),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Hands every nested object in this value over to `owner`.
    pub(crate) fn adopt(&mut self, owner: OwnerRef) {
        match self {
            Self::Plain(_) => {}
            Self::Object(object) => object.set_owner(owner),
            Self::List(items) => items.iter_mut().for_each(|item| item.adopt(owner)),
            Self::Map(entries) => entries.values_mut().for_each(|item| item.adopt(owner)),
        }
    }

    /// Re-baselines every nested object reachable from this value.
    pub(crate) fn snapshot_nested(&mut self) {
        match self {
            Self::Plain(_) => {}
            Self::Object(object) => object.snapshot_current(),
            Self::List(items) => items.iter_mut().for_each(Self::snapshot_nested),
            Self::Map(entries) => entries.values_mut().for_each(Self::snapshot_nested),
        }
    }
}

impl Clone for FieldValue {
    fn clone(&self) -> Self {
        match self {
            Self::Plain(value) => Self::Plain(value.clone()),
            Self::Object(object) => Self::Object(object.clone_object()),
            Self::List(items) => Self::List(items.clone()),
            Self::Map(entries) => Self::Map(entries.clone()),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.to_plain() == other.to_plain()
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<Box<dyn ValueObject>> for FieldValue {
    fn from(object: Box<dyn ValueObject>) -> Self {
        Self::Object(object)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        Self::List(items)
    }
}

/// Truthiness used by loose comparison.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

fn numeric(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Integers compare exactly; floats only when either side is not an integer.
fn numbers_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    a.as_f64() == b.as_f64()
}

/// Coercing equality: numeric strings equal numbers, booleans compare by
/// truthiness, `null` equals empty/zero values.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(b), other) | (other, Value::Bool(b)) => *b == truthy(other),
        (Value::Null, other) | (other, Value::Null) => match other {
            Value::String(s) => s.is_empty(),
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::Array(items) => items.is_empty(),
            Value::Object(entries) => entries.is_empty(),
            Value::Null | Value::Bool(_) => false,
        },
        (Value::Number(a), Value::Number(b)) => numbers_eq(a, b),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match numeric(s) {
                Some(parsed) => n.as_f64() == Some(parsed),
                None => n.to_string() == *s,
            }
        }
        (Value::String(a), Value::String(b)) => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| loose_eq(x, y)))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loose_eq_coerces_numeric_strings() {
        assert!(loose_eq(&json!(1), &json!("1")));
        assert!(loose_eq(&json!("1.0"), &json!("1")));
        assert!(loose_eq(&json!(2), &json!(2.0)));
        assert!(!loose_eq(&json!(1), &json!("one")));
    }

    #[test]
    fn loose_eq_keeps_integer_precision() {
        assert!(!loose_eq(&json!(9007199254740993_i64), &json!(9007199254740992_i64)));
        assert!(!loose_eq(&json!(u64::MAX), &json!(u64::MAX - 1)));
        assert!(loose_eq(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(loose_eq(&json!(-3), &json!(-3.0)));
    }

    #[test]
    fn loose_eq_uses_truthiness_for_booleans_and_null() {
        assert!(loose_eq(&json!(true), &json!("yes")));
        assert!(loose_eq(&json!(false), &json!("0")));
        assert!(loose_eq(&json!(null), &json!("")));
        assert!(loose_eq(&json!(null), &json!(0)));
        assert!(!loose_eq(&json!(null), &json!("0")));
        assert!(!loose_eq(&json!(null), &json!([1])));
    }

    #[test]
    fn loose_eq_compares_containers_elementwise() {
        assert!(loose_eq(&json!([1, "2"]), &json!(["1", 2])));
        assert!(loose_eq(&json!({"a": "3"}), &json!({"a": 3})));
        assert!(!loose_eq(&json!({"a": 3}), &json!({"b": 3})));
        assert!(!loose_eq(&json!([1]), &json!(1)));
    }

    #[test]
    fn plain_field_values_compare_by_json() {
        let a = FieldValue::Plain(json!({"x": 1}));
        let b = FieldValue::Map(BTreeMap::from([(
            "x".to_string(),
            FieldValue::Plain(json!(1)),
        )]));
        assert_eq!(a, b);
        assert_eq!(FieldValue::default_of::<String>().to_plain(), json!(""));
        assert_eq!(FieldValue::default_of::<Option<i64>>().to_plain(), json!(null));
    }
}
