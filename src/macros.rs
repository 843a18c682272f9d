//! Declaration macros for value-object types.
//!
//! `value_object!` generates the struct, its `ValueObject`/`ValueObjectType`
//! impls and typed accessors. Field-level attributes are interpreted by the
//! helpers in `attr_helpers.rs`.

#[path = "macros/attr_helpers.rs"]
mod attr_helpers;
#[path = "macros/value_object.rs"]
mod value_object;
