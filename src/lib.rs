// ============================================================================
// valueobjects
// ============================================================================
//
// Typed value objects stored in JSON text columns of a host record, with a
// per-field baseline for dirty detection.

pub mod core;
pub mod reflect;
pub mod object;
pub mod sync;
pub mod prelude;
mod macros;

#[doc(hidden)]
pub use paste;

// Re-export main types for convenience
pub use crate::core::{FieldValue, OwnerRef, Result, VoError};
pub use crate::object::{ObjectState, ValueObject, ValueObjectType};
pub use crate::reflect::{FieldDecl, FieldSet, fields_of};

// Re-export the record-side API
pub use crate::sync::{
    BaselinePolicy, ColumnStore, ColumnValue, DeclaresValueObjects, LifecycleEvent,
    RecordColumns, SlotDecl, SlotRegistry, SyncConfig, SyncState, Synchronizer,
    ValueObjectsHost, registry_for,
};
