//! Everything a host record usually needs, in one import.
//!
//! ```
//! use valueobjects::prelude::*;
//!
//! value_object! {
//!     pub struct Flags {
//!         beta: bool,
//!     }
//! }
//!
//! let mut flags = Flags::new();
//! flags.snapshot_current();
//! assert!(!flags.is_dirty());
//! flags.set_beta(true).unwrap();
//! assert!(flags.is_field_changed("beta", true));
//! ```

pub use crate::{
    BaselinePolicy, ColumnStore, ColumnValue, DeclaresValueObjects, FieldValue, LifecycleEvent,
    RecordColumns, Result, SlotDecl, SlotRegistry, SyncConfig, Synchronizer, ValueObject,
    ValueObjectType, ValueObjectsHost, VoError, value_object,
};
