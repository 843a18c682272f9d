use lazy_static::lazy_static;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::object::ValueObjectType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPersistence {
    Persisted,
    /// Lives on the Rust struct only; never stored, never diffed.
    Transient,
}

/// One entry of a value-object type's static field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub persistence: FieldPersistence,
}

impl FieldDecl {
    pub const fn persisted(name: &'static str) -> Self {
        Self {
            name,
            persistence: FieldPersistence::Persisted,
        }
    }

    pub const fn transient(name: &'static str) -> Self {
        Self {
            name,
            persistence: FieldPersistence::Transient,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.persistence == FieldPersistence::Persisted
    }
}

/// Ordered set of persistable field names for one value-object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    type_name: &'static str,
    names: Vec<&'static str>,
}

impl FieldSet {
    /// Builds the set from a declaration, dropping transient entries and
    /// repeated names (first declaration wins).
    pub fn from_decls(type_name: &'static str, decls: &[FieldDecl]) -> Self {
        let mut names: Vec<&'static str> = Vec::with_capacity(decls.len());
        for decl in decls.iter().filter(|decl| decl.is_persisted()) {
            if !names.contains(&decl.name) {
                names.push(decl.name);
            }
        }
        Self { type_name, names }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| *candidate == name)
    }
}

lazy_static! {
    static ref FIELD_SETS: RwLock<HashMap<TypeId, Arc<FieldSet>>> = RwLock::new(HashMap::new());
}

/// Returns the cached field set of `T`, computing it on first use.
pub fn fields_of<T: ValueObjectType>() -> Arc<FieldSet> {
    field_set_for(TypeId::of::<T>(), T::TYPE_NAME, T::declared_fields)
}

/// Cache lookup keyed by `type_id`.
///
/// The set is built completely before it is published. When two threads race
/// on the same type, the first published entry wins and both get it.
pub fn field_set_for(
    type_id: TypeId,
    type_name: &'static str,
    declare: fn() -> &'static [FieldDecl],
) -> Arc<FieldSet> {
    if let Some(found) = FIELD_SETS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
    {
        return Arc::clone(found);
    }

    let computed = Arc::new(FieldSet::from_decls(type_name, declare()));
    let mut sets = FIELD_SETS.write().unwrap_or_else(PoisonError::into_inner);
    let entry = sets.entry(type_id).or_insert_with(|| {
        debug!(type_name, fields = computed.len(), "field set cached");
        Arc::clone(&computed)
    });
    Arc::clone(entry)
}

/// Number of value-object types whose field sets have been computed.
pub fn cached_field_set_count() -> usize {
    FIELD_SETS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    fn marker_fields() -> &'static [FieldDecl] {
        const FIELDS: &[FieldDecl] = &[
            FieldDecl::persisted("title"),
            FieldDecl::transient("cache"),
            FieldDecl::persisted("rank"),
            FieldDecl::persisted("title"),
        ];
        FIELDS
    }

    #[test]
    fn transient_and_repeated_fields_are_dropped() {
        let set = FieldSet::from_decls("Marker", marker_fields());
        assert_eq!(set.names(), &["title", "rank"]);
        assert_eq!(set.position("rank"), Some(1));
        assert!(!set.contains("cache"));
    }

    #[test]
    fn cache_returns_the_same_instance() {
        let first = field_set_for(TypeId::of::<Marker>(), "Marker", marker_fields);
        let second = field_set_for(TypeId::of::<Marker>(), "Marker", marker_fields);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cached_field_set_count() >= 1);
    }

    #[test]
    fn empty_declarations_are_valid() {
        let set = FieldSet::from_decls("Empty", &[]);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
