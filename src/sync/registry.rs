use lazy_static::lazy_static;
use std::any::{TypeId, type_name};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::core::{Result, VoError};
use crate::object::{ValueObject, ValueObjectType};

type SlotFactory = Arc<dyn Fn() -> Box<dyn ValueObject> + Send + Sync>;

/// Declaration of one value-object slot on a record type.
#[derive(Clone)]
pub struct SlotDecl {
    name: String,
    column: Option<String>,
    object_type: &'static str,
    factory: SlotFactory,
}

impl SlotDecl {
    /// Slot holding a fresh `T` per record.
    pub fn of<T: ValueObjectType>(name: impl Into<String>) -> Self {
        Self::factory(name, T::create)
    }

    /// Slot holding a copy of `prototype` per record. The prototype itself is
    /// never handed out.
    pub fn prototype<T: ValueObjectType>(name: impl Into<String>, prototype: T) -> Self {
        Self::factory(name, move || prototype.clone())
    }

    /// Slot built by `factory` for every record.
    pub fn factory<T, F>(name: impl Into<String>, factory: F) -> Self
    where
        T: ValueObjectType,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            column: None,
            object_type: T::TYPE_NAME,
            factory: Arc::new(move || Box::new(factory()) as Box<dyn ValueObject>),
        }
    }

    /// Stores the slot in `column` instead of the column named after the slot.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit column override, if any.
    pub fn column_override(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Column the slot is read from and written to.
    pub fn column_key(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    pub fn object_type(&self) -> &'static str {
        self.object_type
    }

    pub(crate) fn instantiate(&self) -> Box<dyn ValueObject> {
        let mut object = (self.factory)();
        object.state_mut().reset_tracking();
        object.set_column_key(self.column.clone());
        object
    }
}

impl fmt::Debug for SlotDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDecl")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("object_type", &self.object_type)
            .finish_non_exhaustive()
    }
}

/// Validated, ordered set of slot declarations for one record type.
#[derive(Debug, Clone, Default)]
pub struct SlotRegistry {
    slots: Vec<SlotDecl>,
}

impl SlotRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> SlotRegistryBuilder {
        SlotRegistryBuilder::default()
    }

    pub fn slots(&self) -> &[SlotDecl] {
        &self.slots
    }

    pub fn get(&self, name: &str) -> Option<&SlotDecl> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SlotRegistryBuilder {
    slots: Vec<SlotDecl>,
}

impl SlotRegistryBuilder {
    pub fn slot(mut self, decl: SlotDecl) -> Self {
        self.slots.push(decl);
        self
    }

    /// Rejects empty names, repeated slot names and two slots sharing a column.
    pub fn build(self) -> Result<SlotRegistry> {
        validate_slots(&self.slots)?;
        Ok(SlotRegistry { slots: self.slots })
    }
}

fn validate_slots(slots: &[SlotDecl]) -> Result<()> {
    let mut names = HashSet::new();
    let mut columns = HashSet::new();
    for slot in slots {
        if slot.name.is_empty() {
            return Err(VoError::configuration(format!(
                "Slot of type {} has an empty name",
                slot.object_type
            )));
        }
        if !names.insert(slot.name.as_str()) {
            return Err(VoError::configuration(format!(
                "Slot '{}' is declared more than once",
                slot.name
            )));
        }
        if !columns.insert(slot.column_key()) {
            return Err(VoError::configuration(format!(
                "Column '{}' is mapped by more than one slot",
                slot.column_key()
            )));
        }
    }
    Ok(())
}

/// Record types that carry value-object slots.
pub trait DeclaresValueObjects: 'static {
    /// Slot declarations of this record type. Called once per process;
    /// the result is cached.
    fn value_objects() -> Result<SlotRegistry> {
        Ok(SlotRegistry::empty())
    }
}

lazy_static! {
    static ref SLOT_REGISTRIES: RwLock<HashMap<TypeId, Arc<SlotRegistry>>> =
        RwLock::new(HashMap::new());
}

/// Cached slot registry of record type `R`.
///
/// A failing declaration is not cached; every call reports it again.
pub fn registry_for<R: DeclaresValueObjects>() -> Result<Arc<SlotRegistry>> {
    let type_id = TypeId::of::<R>();
    if let Some(found) = SLOT_REGISTRIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
    {
        return Ok(Arc::clone(found));
    }

    let computed = Arc::new(R::value_objects()?);
    let mut registries = SLOT_REGISTRIES
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let entry = registries.entry(type_id).or_insert_with(|| {
        debug!(
            record_type = type_name::<R>(),
            slots = computed.len(),
            "slot registry cached"
        );
        Arc::clone(&computed)
    });
    Ok(Arc::clone(entry))
}
