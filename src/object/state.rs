use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::core::{FieldValue, OwnerRef, Result, VoError};
use crate::reflect::FieldSet;

/// Per-instance storage behind every value object.
///
/// Values are kept in field-set order, so the store can only ever hold
/// declared fields.
#[derive(Debug, Clone)]
pub struct ObjectState {
    field_set: Arc<FieldSet>,
    values: Vec<FieldValue>,
    owner: Option<OwnerRef>,
    column_key: Option<String>,
    baseline: Option<Map<String, Value>>,
}

impl ObjectState {
    /// Creates a store with every field set to `null`.
    pub fn new(field_set: Arc<FieldSet>) -> Self {
        let values = vec![FieldValue::null(); field_set.len()];
        Self {
            field_set,
            values,
            owner: None,
            column_key: None,
            baseline: None,
        }
    }

    /// Creates a store seeded with `(name, value)` defaults. Undeclared names
    /// are ignored; declared names without a default stay `null`.
    pub fn with_defaults<I>(field_set: Arc<FieldSet>, defaults: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, FieldValue)>,
    {
        let mut state = Self::new(field_set);
        for (name, value) in defaults {
            if let Some(slot) = state.get_mut(name) {
                *slot = value;
            }
        }
        state
    }

    pub fn field_set(&self) -> &FieldSet {
        &self.field_set
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.field_set
            .position(name)
            .and_then(|index| self.values.get(index))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.field_set
            .position(name)
            .and_then(|index| self.values.get_mut(index))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.field_set.iter().zip(self.values.iter())
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut FieldValue> + '_ {
        self.values.iter_mut()
    }

    /// Decodes field `name` into `T`.
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let type_name = self.field_set.type_name();
        let value = self.get(name).ok_or_else(|| VoError::UnknownField {
            type_name,
            field: name.to_string(),
        })?;
        serde_json::from_value(value.to_plain()).map_err(|source| VoError::FieldType {
            type_name,
            field: name.to_string(),
            source,
        })
    }

    pub fn owner(&self) -> Option<OwnerRef> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: OwnerRef) {
        self.owner = Some(owner);
    }

    pub fn column_key(&self) -> Option<&str> {
        self.column_key.as_deref()
    }

    pub(crate) fn set_column_key(&mut self, column_key: Option<String>) {
        self.column_key = column_key;
    }

    pub fn baseline(&self) -> Option<&Map<String, Value>> {
        self.baseline.as_ref()
    }

    pub(crate) fn set_baseline(&mut self, baseline: Map<String, Value>) {
        self.baseline = Some(baseline);
    }

    /// Forgets owner, column key and baseline. Used when a prototype is
    /// copied into a new record.
    pub(crate) fn reset_tracking(&mut self) {
        self.owner = None;
        self.column_key = None;
        self.baseline = None;
    }
}
