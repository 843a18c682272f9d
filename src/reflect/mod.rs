//! Field discovery for value-object types.
//!
//! Each value-object type declares its fields statically. The declaration is
//! turned into a [`FieldSet`] the first time the type is used and cached per
//! `TypeId` for the rest of the process.

mod field_set;

pub use field_set::{
    FieldDecl, FieldPersistence, FieldSet, cached_field_set_count, field_set_for, fields_of,
};
