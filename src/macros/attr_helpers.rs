#[macro_export]
#[doc(hidden)]
macro_rules! __vo_field_default {
    ((#[nested] $($_rest:tt)*) $field_ty:ty) => {
        $crate::FieldValue::Object(Box::new(
            <$field_ty as $crate::object::ValueObjectType>::create(),
        ))
    };
    ((#[ $($_other:tt)* ] $($rest:tt)*) $field_ty:ty) => {
        $crate::__vo_field_default!(($($rest)*) $field_ty)
    };
    (() $field_ty:ty) => {
        $crate::FieldValue::default_of::<$field_ty>()
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __vo_field_accessors {
    ((#[nested] $($_rest:tt)*) $field:ident : $field_ty:ty) => {
        $crate::paste::paste! {
            /// Nested value object stored in this field, if it still holds one.
            pub fn $field(&self) -> Option<&$field_ty> {
                $crate::object::nested_ref::<$field_ty>(
                    <Self as $crate::object::ValueObject>::state(self),
                    stringify!($field),
                )
            }

            pub fn [<$field _mut>](&mut self) -> Option<&mut $field_ty> {
                $crate::object::nested_mut::<$field_ty>(
                    <Self as $crate::object::ValueObject>::state_mut(self),
                    stringify!($field),
                )
            }

            /// Replaces the nested object; it joins this object's owner.
            pub fn [<set_ $field>](&mut self, value: $field_ty) -> $crate::Result<()> {
                <Self as $crate::object::ValueObject>::set_field(
                    self,
                    stringify!($field),
                    $crate::FieldValue::object(value),
                )
            }
        }
    };
    ((#[ $($_other:tt)* ] $($rest:tt)*) $field:ident : $field_ty:ty) => {
        $crate::__vo_field_accessors!(($($rest)*) $field : $field_ty);
    };
    (() $field:ident : $field_ty:ty) => {
        $crate::paste::paste! {
            /// Decodes the stored JSON into the declared type.
            pub fn $field(&self) -> $crate::Result<$field_ty> {
                <Self as $crate::object::ValueObject>::state(self)
                    .decode::<$field_ty>(stringify!($field))
            }

            pub fn [<set_ $field>](&mut self, value: $field_ty) -> $crate::Result<()> {
                let encoded = $crate::FieldValue::encode(
                    <Self as $crate::object::ValueObjectType>::TYPE_NAME,
                    stringify!($field),
                    &value,
                )?;
                <Self as $crate::object::ValueObject>::set_field(self, stringify!($field), encoded)
            }
        }
    };
}
