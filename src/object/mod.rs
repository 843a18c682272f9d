//! Value objects: typed, nestable field containers with dirty tracking.
//!
//! Concrete types are normally declared with [`value_object!`](crate::value_object),
//! which implements [`ValueObject`] and [`ValueObjectType`] and generates
//! typed accessors. Everything that works on the field store itself
//! (assignment, plain-data export, baselines, dirty diffing) is provided here
//! and is available on `dyn ValueObject` as well as on concrete types.

mod state;

pub use state::ObjectState;

use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use tracing::trace;

use crate::core::{FieldValue, OwnerRef, Result, VoError, loose_eq};
use crate::reflect::{FieldDecl, FieldSet};

pub trait ValueObject: Any + fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;
    fn state(&self) -> &ObjectState;
    fn state_mut(&mut self) -> &mut ObjectState;
    fn clone_object(&self) -> Box<dyn ValueObject>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Persistable field names of this object's type.
    fn field_names(&self) -> &FieldSet {
        self.state().field_set()
    }

    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.state().get(name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.state_mut().get_mut(name)
    }

    /// Replaces one declared field. Nested objects in `value` join this
    /// object's owner.
    fn set_field(&mut self, name: &str, mut value: FieldValue) -> Result<()> {
        if let Some(owner) = self.owner() {
            value.adopt(owner);
        }
        let type_name = self.type_name();
        let slot = self
            .state_mut()
            .get_mut(name)
            .ok_or_else(|| VoError::UnknownField {
                type_name,
                field: name.to_string(),
            })?;
        *slot = value;
        Ok(())
    }

    /// Bulk assignment from decoded JSON.
    ///
    /// A nested object receiving a JSON object is merged into; anything else
    /// is replaced. Keys that are not declared fields are ignored.
    fn assign(&mut self, values: &Map<String, Value>) {
        let type_name = self.type_name();
        for (name, incoming) in values {
            let Some(current) = self.state_mut().get_mut(name) else {
                trace!(type_name, field = %name, "ignoring undeclared field");
                continue;
            };
            match (current, incoming) {
                (FieldValue::Object(nested), Value::Object(entries)) => nested.assign(entries),
                (slot, _) => *slot = FieldValue::Plain(incoming.clone()),
            }
        }
    }

    /// Like [`assign`](Self::assign) but accepts any JSON value; payloads that
    /// are not objects are ignored.
    fn assign_json(&mut self, values: &Value) {
        if let Value::Object(entries) = values {
            self.assign(entries);
        }
    }

    fn to_plain_data(&self) -> Map<String, Value> {
        self.state()
            .entries()
            .map(|(name, value)| (name.to_string(), value.to_plain()))
            .collect()
    }

    /// Plain data for the named fields only; undeclared names are skipped.
    fn plain_fields(&self, names: &[&str]) -> Map<String, Value> {
        names
            .iter()
            .filter_map(|name| {
                self.field(name)
                    .map(|value| (name.to_string(), value.to_plain()))
            })
            .collect()
    }

    /// Payload written to storage: every declared field.
    fn data_to_persist(&self) -> Map<String, Value> {
        let declared = self.field_names();
        self.to_plain_data()
            .into_iter()
            .filter(|(name, _)| declared.contains(name))
            .collect()
    }

    /// Stores a copy of `values` as the dirty baseline.
    fn snapshot(&mut self, values: &Map<String, Value>) {
        self.state_mut().set_baseline(values.clone());
    }

    /// Baselines this object and every nested object against their own
    /// current data.
    fn snapshot_current(&mut self) {
        let current = self.to_plain_data();
        self.snapshot(&current);
        for value in self.state_mut().values_mut() {
            value.snapshot_nested();
        }
    }

    fn baseline(&self) -> Option<&Map<String, Value>> {
        self.state().baseline()
    }

    /// Current values of the fields that differ from the baseline.
    ///
    /// `names` restricts the check; `None` means all declared fields. Without
    /// a baseline every requested field is dirty. Comparison is strict JSON
    /// equality, so `1` and `"1"` differ.
    fn dirty_fields(&self, names: Option<&[&str]>) -> Map<String, Value> {
        let baseline = self.baseline();
        self.to_plain_data()
            .into_iter()
            .filter(|(name, _)| names.is_none_or(|wanted| wanted.contains(&name.as_str())))
            .filter(|(name, value)| match baseline {
                None => true,
                Some(old) => old.get(name) != Some(value),
            })
            .collect()
    }

    fn is_dirty(&self) -> bool {
        !self.dirty_fields(None).is_empty()
    }

    /// Checks one field against the baseline.
    ///
    /// `null` counts as absent. A field present on one side only is changed in
    /// both modes; absent on both sides is unchanged. `strict = false` uses
    /// [`loose_eq`].
    fn is_field_changed(&self, name: &str, strict: bool) -> bool {
        let current = self
            .field(name)
            .map(FieldValue::to_plain)
            .filter(|value| !value.is_null());
        let old = self
            .baseline()
            .and_then(|baseline| baseline.get(name))
            .filter(|value| !value.is_null());

        match (current, old) {
            (Some(current), Some(old)) if strict => current != *old,
            (Some(current), Some(old)) => !loose_eq(&current, old),
            (None, None) => false,
            _ => true,
        }
    }

    fn baseline_field(&self, name: &str) -> Result<&Value> {
        self.baseline()
            .and_then(|baseline| baseline.get(name))
            .ok_or_else(|| VoError::Lookup {
                type_name: self.type_name(),
                field: name.to_string(),
            })
    }

    fn owner(&self) -> Option<OwnerRef> {
        self.state().owner()
    }

    /// Sets the owner on this object and on every nested object below it.
    fn set_owner(&mut self, owner: OwnerRef) {
        self.state_mut().set_owner(owner);
        for value in self.state_mut().values_mut() {
            value.adopt(owner);
        }
    }

    fn column_key(&self) -> Option<&str> {
        self.state().column_key()
    }

    fn set_column_key(&mut self, column_key: Option<String>) {
        self.state_mut().set_column_key(column_key);
    }
}

/// Static side of a value-object type.
pub trait ValueObjectType: ValueObject + Clone + Sized {
    const TYPE_NAME: &'static str;

    /// Full field declaration, transient fields included.
    fn declared_fields() -> &'static [FieldDecl];

    /// A fresh instance with every field at its default.
    fn create() -> Self;
}

impl dyn ValueObject {
    pub fn is<T: ValueObject>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: ValueObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: ValueObject>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl Clone for Box<dyn ValueObject> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}

/// Typed view of a nested-object field.
pub fn nested_ref<'a, T: ValueObject>(state: &'a ObjectState, name: &str) -> Option<&'a T> {
    state.get(name)?.as_object()?.downcast_ref::<T>()
}

/// Mutable typed view of a nested-object field.
pub fn nested_mut<'a, T: ValueObject>(state: &'a mut ObjectState, name: &str) -> Option<&'a mut T> {
    state.get_mut(name)?.as_object_mut()?.downcast_mut::<T>()
}
