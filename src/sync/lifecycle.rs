//! Record lifecycle wiring.
//!
//! Hosts forward their record events to [`Synchronizer::dispatch`], or
//! implement [`ValueObjectsHost`] and call [`ValueObjectsHost::trigger`].

use std::fmt;
use tracing::{debug, trace};

use super::{RecordColumns, Synchronizer};
use crate::core::{Result, VoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The record object was constructed.
    Init,
    /// The record was populated from storage.
    AfterLoad,
    BeforeInsert,
    BeforeUpdate,
    AfterInsert,
    AfterUpdate,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::Init,
        LifecycleEvent::AfterLoad,
        LifecycleEvent::BeforeInsert,
        LifecycleEvent::BeforeUpdate,
        LifecycleEvent::AfterInsert,
        LifecycleEvent::AfterUpdate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Init => "init",
            LifecycleEvent::AfterLoad => "after_load",
            LifecycleEvent::BeforeInsert => "before_insert",
            LifecycleEvent::BeforeUpdate => "before_update",
            LifecycleEvent::AfterInsert => "after_insert",
            LifecycleEvent::AfterUpdate => "after_update",
        }
    }

    pub fn is_before_write(&self) -> bool {
        matches!(
            self,
            LifecycleEvent::BeforeInsert | LifecycleEvent::BeforeUpdate
        )
    }

    pub fn is_after_write(&self) -> bool {
        matches!(self, LifecycleEvent::AfterInsert | LifecycleEvent::AfterUpdate)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type LifecycleHook = fn(&mut Synchronizer, &mut dyn RecordColumns) -> Result<()>;

static HOOKS: [(LifecycleEvent, LifecycleHook); 6] = [
    (LifecycleEvent::Init, Synchronizer::on_init),
    (LifecycleEvent::AfterLoad, Synchronizer::on_after_load),
    (LifecycleEvent::BeforeInsert, Synchronizer::on_before_write),
    (LifecycleEvent::BeforeUpdate, Synchronizer::on_before_write),
    (LifecycleEvent::AfterInsert, Synchronizer::on_after_write),
    (LifecycleEvent::AfterUpdate, Synchronizer::on_after_write),
];

/// Event-to-handler table used by [`Synchronizer::dispatch`].
pub fn hooks() -> &'static [(LifecycleEvent, LifecycleHook)] {
    &HOOKS
}

impl Synchronizer {
    /// Runs every handler bound to `event`.
    pub fn dispatch(&mut self, event: LifecycleEvent, record: &mut dyn RecordColumns) -> Result<()> {
        trace!(owner = %self.owner(), event = %event, "lifecycle event");
        for (bound, hook) in hooks() {
            if *bound == event {
                hook(self, record)?;
            }
        }
        Ok(())
    }

    /// Creates the slots, exposes them and captures their baseline.
    /// A second call on the same synchronizer does nothing.
    pub fn on_init(&mut self, record: &mut dyn RecordColumns) -> Result<()> {
        if self.is_initialized() {
            debug!(owner = %self.owner(), "init already ran, skipping");
            return Ok(());
        }
        self.create_slots();
        self.expose_objects(record)?;
        self.capture_old_column_snapshots(record)?;
        self.snapshot_all();
        self.mark_initialized();
        Ok(())
    }

    pub fn on_after_load(&mut self, record: &mut dyn RecordColumns) -> Result<()> {
        if !self.is_initialized() {
            return Err(VoError::configuration(format!(
                "after_load reached {} before init",
                self.owner()
            )));
        }
        self.hydrate_from_storage(record)?;
        self.expose_objects(record)?;
        self.capture_old_column_snapshots(record)
    }

    pub fn on_before_write(&mut self, record: &mut dyn RecordColumns) -> Result<()> {
        self.serialize_for_write(record)
    }

    pub fn on_after_write(&mut self, record: &mut dyn RecordColumns) -> Result<()> {
        self.finish_write(record)
    }
}

/// A record that embeds a [`Synchronizer`] next to its columns.
///
/// ```
/// use valueobjects::{
///     ColumnStore, DeclaresValueObjects, LifecycleEvent, RecordColumns, Result, SlotDecl,
///     SlotRegistry, Synchronizer, ValueObjectsHost, value_object,
/// };
///
/// value_object! {
///     pub struct Settings {
///         theme: String,
///     }
/// }
///
/// struct User {
///     columns: ColumnStore,
///     value_objects: Synchronizer,
/// }
///
/// impl DeclaresValueObjects for User {
///     fn value_objects() -> Result<SlotRegistry> {
///         SlotRegistry::builder()
///             .slot(SlotDecl::of::<Settings>("settings"))
///             .build()
///     }
/// }
///
/// impl ValueObjectsHost for User {
///     fn value_object_parts(&mut self) -> (&mut dyn RecordColumns, &mut Synchronizer) {
///         (&mut self.columns, &mut self.value_objects)
///     }
/// }
///
/// let mut user = User {
///     columns: ColumnStore::new_record(),
///     value_objects: Synchronizer::for_record::<User>().unwrap(),
/// };
/// user.trigger(LifecycleEvent::Init).unwrap();
/// user.value_objects
///     .slot_as_mut::<Settings>("settings")
///     .unwrap()
///     .set_theme("dark".to_string())
///     .unwrap();
/// user.trigger(LifecycleEvent::BeforeInsert).unwrap();
/// assert_eq!(user.columns.column("settings").as_text(), Some(r#"{"theme":"dark"}"#));
/// ```
pub trait ValueObjectsHost {
    /// Disjoint borrows of the record's columns and its synchronizer.
    fn value_object_parts(&mut self) -> (&mut dyn RecordColumns, &mut Synchronizer);

    fn trigger(&mut self, event: LifecycleEvent) -> Result<()> {
        let (columns, value_objects) = self.value_object_parts();
        value_objects.dispatch(event, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_has_a_handler() {
        for event in LifecycleEvent::ALL {
            assert_eq!(
                hooks().iter().filter(|(bound, _)| *bound == event).count(),
                1,
                "{event}"
            );
        }
    }

    #[test]
    fn write_events_are_classified() {
        assert!(LifecycleEvent::BeforeUpdate.is_before_write());
        assert!(LifecycleEvent::AfterInsert.is_after_write());
        assert!(!LifecycleEvent::Init.is_before_write());
        assert!(!LifecycleEvent::AfterLoad.is_after_write());
        assert_eq!(LifecycleEvent::AfterLoad.to_string(), "after_load");
    }
}
