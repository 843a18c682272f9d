//! Per-record synchronization between value-object slots and JSON columns.
//!
//! A [`Synchronizer`] owns the live value objects of one record. The host
//! record drives it through [`LifecycleEvent`]s (see [`lifecycle`]); the
//! individual steps are public too, for hosts with their own event plumbing.

mod config;
pub mod lifecycle;
mod record;
mod registry;

pub use config::{BaselinePolicy, SyncConfig};
pub use lifecycle::{LifecycleEvent, LifecycleHook, ValueObjectsHost};
pub use record::{ColumnStore, ColumnValue, RecordColumns};
pub use registry::{
    DeclaresValueObjects, SlotDecl, SlotRegistry, SlotRegistryBuilder, registry_for,
};

use serde_json::Value;
use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::core::{OwnerRef, Result, VoError};
use crate::object::ValueObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Constructed; no slot exists yet.
    Uninitialized,
    /// Slots exist and carry a fresh baseline (after init or load).
    Hydrated,
    /// Columns hold serialized payloads; the write has not completed.
    PendingWrite,
    /// A write completed and the objects were exposed again.
    Settled,
}

#[derive(Debug)]
struct Slot {
    name: String,
    column: String,
    object: Box<dyn ValueObject>,
}

#[derive(Debug)]
pub struct Synchronizer {
    owner: OwnerRef,
    registry: Arc<SlotRegistry>,
    config: SyncConfig,
    state: SyncState,
    initialized: bool,
    slots: Vec<Slot>,
    /// Slot name -> JSON text, only for the write boundary in progress.
    pending: Option<HashMap<String, String>>,
}

impl Synchronizer {
    /// Synchronizer for one instance of record type `R`, using `R`'s cached
    /// slot registry.
    pub fn for_record<R: DeclaresValueObjects>() -> Result<Self> {
        Self::for_record_with::<R>(SyncConfig::default())
    }

    pub fn for_record_with<R: DeclaresValueObjects>(config: SyncConfig) -> Result<Self> {
        let registry = registry_for::<R>()?;
        Ok(Self::new(OwnerRef::new(type_name::<R>()), registry, config))
    }

    pub fn new(owner: OwnerRef, registry: Arc<SlotRegistry>, config: SyncConfig) -> Self {
        Self {
            owner,
            registry,
            config,
            state: SyncState::Uninitialized,
            initialized: false,
            slots: Vec::new(),
            pending: None,
        }
    }

    pub fn owner(&self) -> OwnerRef {
        self.owner
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Instantiates one fresh value object per registry entry, owned by this
    /// record. Existing slots are discarded.
    pub fn create_slots(&mut self) {
        self.slots = self.fresh_slots();
        self.pending = None;
        self.state = SyncState::Hydrated;
        debug!(owner = %self.owner, slots = self.slots.len(), "value-object slots created");
    }

    fn fresh_slots(&self) -> Vec<Slot> {
        self.registry
            .slots()
            .iter()
            .map(|decl| {
                let mut object = decl.instantiate();
                object.set_owner(self.owner);
                Slot {
                    name: decl.name().to_string(),
                    column: decl.column_key().to_string(),
                    object,
                }
            })
            .collect()
    }

    /// Rebuilds every slot from its column and re-snapshots it.
    ///
    /// Slots start over from fresh instances: keys missing from the stored
    /// JSON and empty columns end up at their defaults, not at whatever the
    /// slot held before. All columns are decoded before any slot is
    /// replaced, so a malformed payload leaves every slot as it was.
    pub fn hydrate_from_storage(&mut self, record: &dyn RecordColumns) -> Result<()> {
        self.ensure_created("hydrate value objects")?;

        let mut decoded = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            decoded.push(read_column(record, &slot.column)?);
        }

        self.slots = self.fresh_slots();
        for (slot, payload) in self.slots.iter_mut().zip(decoded) {
            match payload {
                Some(payload) => {
                    trace!(slot = %slot.name, column = %slot.column, "hydrating slot");
                    slot.object.assign_json(&payload);
                }
                None => trace!(slot = %slot.name, column = %slot.column, "column empty"),
            }
        }
        self.snapshot_all();
        self.pending = None;
        self.state = SyncState::Hydrated;
        debug!(owner = %self.owner, slots = self.slots.len(), "value objects hydrated");
        Ok(())
    }

    /// Writes a copy of every slot's current data onto its column as
    /// structured data.
    ///
    /// The column is a snapshot, not a live view: later mutations through
    /// [`slot_mut`](Self::slot_mut) or [`slot_as_mut`](Self::slot_as_mut)
    /// show up in the column only at the next write boundary or reload. Read
    /// live values through the slot accessors.
    pub fn expose_objects(&self, record: &mut dyn RecordColumns) -> Result<()> {
        self.ensure_created("expose value objects")?;
        for slot in &self.slots {
            record.set_column(
                &slot.column,
                ColumnValue::Structured(Value::Object(slot.object.to_plain_data())),
            );
        }
        Ok(())
    }

    /// Encodes every slot to JSON text and stores it in its column.
    ///
    /// Payloads are recomputed on every call and kept only until the write
    /// boundary finishes.
    pub fn serialize_for_write(&mut self, record: &mut dyn RecordColumns) -> Result<()> {
        self.ensure_created("serialize value objects")?;
        self.pending = None;

        let mut encoded = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let text = serde_json::to_string(&slot.object.data_to_persist()).map_err(|source| {
                VoError::Encode {
                    column: slot.column.clone(),
                    source,
                }
            })?;
            encoded.push(text);
        }

        let mut pending = HashMap::with_capacity(encoded.len());
        for (slot, text) in self.slots.iter().zip(encoded) {
            trace!(slot = %slot.name, column = %slot.column, bytes = text.len(), "slot serialized");
            record.set_column(&slot.column, ColumnValue::Text(text.clone()));
            pending.insert(slot.name.clone(), text);
        }
        self.pending = Some(pending);
        self.state = SyncState::PendingWrite;
        Ok(())
    }

    /// JSON text produced for `slot` by the write boundary in progress.
    pub fn pending_payload(&self, slot: &str) -> Option<&str> {
        self.pending
            .as_ref()
            .and_then(|pending| pending.get(slot))
            .map(String::as_str)
    }

    /// Closes a write boundary: re-exposes the objects, drops the payload
    /// cache and applies the baseline policy.
    pub fn finish_write(&mut self, record: &mut dyn RecordColumns) -> Result<()> {
        self.expose_objects(record)?;
        self.pending = None;
        if self.config.baseline_policy == BaselinePolicy::RefreshAfterWrite {
            self.snapshot_all();
        }
        self.state = SyncState::Settled;
        debug!(owner = %self.owner, policy = ?self.config.baseline_policy, "write boundary finished");
        Ok(())
    }

    /// Registers each slot's data as its column's old value. Does nothing for
    /// records that were never stored.
    pub fn capture_old_column_snapshots(&self, record: &mut dyn RecordColumns) -> Result<()> {
        self.ensure_created("capture old column values")?;
        if record.is_new_record() || !self.config.capture_old_values {
            return Ok(());
        }
        for slot in &self.slots {
            record.set_old_column(
                &slot.column,
                ColumnValue::Structured(Value::Object(slot.object.to_plain_data())),
            );
        }
        Ok(())
    }

    /// Re-baselines every slot against its current data.
    pub fn snapshot_all(&mut self) {
        for slot in &mut self.slots {
            slot.object.snapshot_current();
        }
    }

    pub fn slot(&self, name: &str) -> Result<&(dyn ValueObject + 'static)> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.object.as_ref())
            .ok_or_else(|| missing_slot(name))
    }

    pub fn slot_mut(&mut self, name: &str) -> Result<&mut (dyn ValueObject + 'static)> {
        self.slots
            .iter_mut()
            .find(|slot| slot.name == name)
            .map(|slot| slot.object.as_mut())
            .ok_or_else(|| missing_slot(name))
    }

    /// Typed access to a slot; a slot of another type is a configuration error.
    pub fn slot_as<T: ValueObject>(&self, name: &str) -> Result<&T> {
        let object = self.slot(name)?;
        object
            .downcast_ref::<T>()
            .ok_or_else(|| wrong_slot_type::<T>(name, object.type_name()))
    }

    pub fn slot_as_mut<T: ValueObject>(&mut self, name: &str) -> Result<&mut T> {
        let object = self.slot_mut(name)?;
        let actual = object.type_name();
        object
            .downcast_mut::<T>()
            .ok_or_else(|| wrong_slot_type::<T>(name, actual))
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.iter().any(|slot| slot.name == name)
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(|slot| slot.name.as_str())
    }

    /// Column backing `slot`, from the registry.
    pub fn column_for(&self, slot: &str) -> Option<&str> {
        self.registry.get(slot).map(SlotDecl::column_key)
    }

    pub fn is_dirty(&self) -> bool {
        self.slots.iter().any(|slot| slot.object.is_dirty())
    }

    pub fn dirty_slots(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|slot| slot.object.is_dirty())
            .map(|slot| slot.name.as_str())
            .collect()
    }

    fn ensure_created(&self, operation: &str) -> Result<()> {
        if self.state == SyncState::Uninitialized {
            return Err(VoError::configuration(format!(
                "Cannot {} for {}: slots have not been created",
                operation, self.owner
            )));
        }
        Ok(())
    }
}

fn read_column(record: &dyn RecordColumns, column: &str) -> Result<Option<Value>> {
    match record.column(column) {
        ColumnValue::Text(text) if !text.is_empty() => serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| VoError::Mapping {
                column: column.to_string(),
                source,
            }),
        ColumnValue::Structured(value) => Ok(Some(value)),
        ColumnValue::Text(_) | ColumnValue::Null => Ok(None),
    }
}

fn missing_slot(name: &str) -> VoError {
    VoError::configuration(format!("Value-object slot '{}' has not been created", name))
}

fn wrong_slot_type<T>(name: &str, actual: &str) -> VoError {
    VoError::configuration(format!(
        "Value-object slot '{}' holds {}, not {}",
        name,
        actual,
        type_name::<T>()
    ))
}
