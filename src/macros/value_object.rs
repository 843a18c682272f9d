/// Declares a value-object type.
///
/// Persisted fields live in the object's field store and get a typed getter
/// (`name()`) and setter (`set_name(..)`). Fields marked `#[nested]` hold
/// another value-object type and get `name()`, `name_mut()` and
/// `set_name(..)` returning the nested object. The optional `transient`
/// block declares plain struct fields that are never stored or diffed.
///
/// The macro derives `Debug` and `Clone`; do not derive them again.
///
/// ```
/// use valueobjects::{ValueObject, value_object};
///
/// value_object! {
///     pub struct Address {
///         city: String,
///         zip: String,
///     }
/// }
///
/// value_object! {
///     pub struct Profile {
///         name: String,
///         age: i64,
///         #[nested]
///         address: Address,
///     }
///     transient {
///         display_cache: Option<String>,
///     }
/// }
///
/// let mut profile = Profile::new();
/// profile.set_name("Ann".to_string()).unwrap();
/// profile.assign_json(&serde_json::json!({"address": {"city": "Oslo"}}));
/// assert_eq!(profile.name().unwrap(), "Ann");
/// assert_eq!(profile.address().unwrap().city().unwrap(), "Oslo");
/// assert_eq!(profile.field_names().names(), &["name", "age", "address"]);
/// ```
#[macro_export]
macro_rules! value_object {
    (
        @impl
        [$(#[$meta:meta])*]
        $vis:vis $name:ident
        [$($(#[$($field_meta:tt)*])* $field:ident : $field_ty:ty),*]
        [$($(#[$t_meta:meta])* $t_field:ident : $t_ty:ty),*]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            __state: $crate::object::ObjectState,
            $(
                $(#[$t_meta])*
                pub $t_field: $t_ty,
            )*
        }

        impl $name {
            /// Creates an instance with every field at its default.
            pub fn new() -> Self {
                <Self as $crate::object::ValueObjectType>::create()
            }

            $(
                $crate::__vo_field_accessors!(($(#[$($field_meta)*])*) $field : $field_ty);
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::object::ValueObject for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            fn state(&self) -> &$crate::object::ObjectState {
                &self.__state
            }

            fn state_mut(&mut self) -> &mut $crate::object::ObjectState {
                &mut self.__state
            }

            fn clone_object(&self) -> Box<dyn $crate::object::ValueObject> {
                Box::new(self.clone())
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }
        }

        impl $crate::object::ValueObjectType for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn declared_fields() -> &'static [$crate::reflect::FieldDecl] {
                const FIELDS: &[$crate::reflect::FieldDecl] = &[
                    $( $crate::reflect::FieldDecl::persisted(stringify!($field)), )*
                    $( $crate::reflect::FieldDecl::transient(stringify!($t_field)), )*
                ];
                FIELDS
            }

            fn create() -> Self {
                let defaults: Vec<(&'static str, $crate::FieldValue)> = vec![
                    $(
                        (
                            stringify!($field),
                            $crate::__vo_field_default!(($(#[$($field_meta)*])*) $field_ty),
                        ),
                    )*
                ];
                Self {
                    __state: $crate::object::ObjectState::with_defaults(
                        $crate::reflect::fields_of::<Self>(),
                        defaults,
                    ),
                    $( $t_field: Default::default(), )*
                }
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$($field_meta:tt)*])* $field:ident : $field_ty:ty),* $(,)?
        }
        transient {
            $($(#[$t_meta:meta])* $t_field:ident : $t_ty:ty),* $(,)?
        }
    ) => {
        $crate::value_object!(
            @impl
            [$(#[$meta])*]
            $vis $name
            [$($(#[$($field_meta)*])* $field : $field_ty),*]
            [$($(#[$t_meta])* $t_field : $t_ty),*]
        );
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$($field_meta:tt)*])* $field:ident : $field_ty:ty),* $(,)?
        }
    ) => {
        $crate::value_object!(
            @impl
            [$(#[$meta])*]
            $vis $name
            [$($(#[$($field_meta)*])* $field : $field_ty),*]
            []
        );
    };
}
