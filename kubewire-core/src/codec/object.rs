use super::{Decoder, Encoder};
use crate::{
    error::{DecodeError, EncodeError},
    value::{Map, Value},
};

/// One row of an object's static field table.
///
/// Produced by [`wire_object!`](crate::wire_object); the function pointers read and
/// write exactly one struct field under its wire key.
pub struct Field<T> {
    /// The key used on the wire
    pub key: &'static str,
    /// Decode a non-null value into the field's slot
    pub decode: fn(&mut T, Value, &mut Decoder) -> Result<(), DecodeError>,
    /// Encode the slot, or `None` when it is unset
    pub encode: fn(&T, &mut Encoder) -> Result<Option<Value>, EncodeError>,
}

/// A wire object backed by a static field table.
pub trait Object: Default + 'static {
    /// Type name used in error messages
    const NAME: &'static str;

    /// The declared fields in wire order
    fn fields() -> &'static [Field<Self>];

    /// Keys that matched no declared field, for extensible types
    fn unknown_fields(&self) -> Option<&Map<String, Value>> {
        None
    }

    /// Mutable access to the unknown-field slot, for extensible types
    fn unknown_fields_mut(&mut self) -> Option<&mut Map<String, Value>> {
        None
    }
}

/// Decode a JSON object through `T`'s field table.
pub fn decode_object<T: Object>(value: Value, de: &mut Decoder) -> Result<T, DecodeError> {
    let map = match value {
        Value::Object(map) => map,
        other => return Err(de.type_mismatch(T::NAME, &other)),
    };
    de.nested(|de| {
        let mut object = T::default();
        let fields = T::fields();
        for (key, value) in map {
            match fields.iter().find(|field| field.key == key) {
                Some(_) if value.is_null() => {}
                Some(field) => (field.decode)(&mut object, value, de)?,
                None => match object.unknown_fields_mut() {
                    Some(unknown) => {
                        unknown.insert(key, value);
                    }
                    None => tracing::trace!(object = T::NAME, %key, "dropping unknown field"),
                },
            }
        }
        Ok(object)
    })
}

/// Encode the populated fields of `object`, followed by any preserved unknown keys.
pub fn encode_object<T: Object>(object: &T, en: &mut Encoder) -> Result<Value, EncodeError> {
    let mut map = Map::new();
    for field in T::fields() {
        if let Some(value) = (field.encode)(object, en)? {
            map.insert(field.key.to_owned(), value);
        }
    }
    if let Some(unknown) = object.unknown_fields() {
        for (key, value) in unknown {
            if !map.contains_key(key) {
                map.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(Value::Object(map))
}

/// Declare a wire object.
///
/// Every field is written as `name: Type = "wireKey"` and becomes a `pub Option<Type>`
/// slot. A trailing `..name` adds a map that keeps keys with no declared field, making
/// the type extensible.
///
/// ```
/// kubewire_core::wire_object! {
///     /// Partial schema node
///     #[derive(Clone, Debug, Default, PartialEq)]
///     pub struct Node {
///         /// Schema reference
///         reference: String = "$ref",
///         /// Allow arbitrary fields below this node
///         preserve: bool = "x-kubernetes-preserve-unknown-fields",
///         ..extra
///     }
/// }
///
/// let node: Node = kubewire_core::codec::from_str(r#"{"$ref": "a", "x-other": 1}"#).unwrap();
/// assert_eq!(node.reference.as_deref(), Some("a"));
/// assert!(node.extra.contains_key("x-other"));
/// ```
#[macro_export]
macro_rules! wire_object {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty = $key:literal
            ),* $(,)?
            $(.. $extra:ident $(,)?)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: ::std::option::Option<$ty>,
            )*
            $(
                /// Keys without a declared field, in input order
                pub $extra: $crate::value::Map<::std::string::String, $crate::value::Value>,
            )?
        }

        impl $crate::codec::Object for $name {
            const NAME: &'static str = stringify!($name);

            fn fields() -> &'static [$crate::codec::Field<Self>] {
                const FIELDS: &[$crate::codec::Field<$name>] = &[
                    $(
                        $crate::codec::Field {
                            key: $key,
                            decode: |object, value, de| {
                                object.$field = ::std::option::Option::Some(de.field($key, value)?);
                                ::std::result::Result::Ok(())
                            },
                            encode: |object, en| match &object.$field {
                                ::std::option::Option::Some(value) => {
                                    en.field($key, value).map(::std::option::Option::Some)
                                }
                                ::std::option::Option::None => ::std::result::Result::Ok(::std::option::Option::None),
                            },
                        },
                    )*
                ];
                FIELDS
            }

            $(
                fn unknown_fields(
                    &self,
                ) -> ::std::option::Option<&$crate::value::Map<::std::string::String, $crate::value::Value>> {
                    ::std::option::Option::Some(&self.$extra)
                }

                fn unknown_fields_mut(
                    &mut self,
                ) -> ::std::option::Option<&mut $crate::value::Map<::std::string::String, $crate::value::Value>> {
                    ::std::option::Option::Some(&mut self.$extra)
                }
            )?
        }

        impl $crate::codec::Decode for $name {
            fn decode(
                value: $crate::value::Value,
                de: &mut $crate::codec::Decoder,
            ) -> ::std::result::Result<Self, $crate::DecodeError> {
                $crate::codec::decode_object(value, de)
            }
        }

        impl $crate::codec::Encode for $name {
            fn encode(
                &self,
                en: &mut $crate::codec::Encoder,
            ) -> ::std::result::Result<$crate::value::Value, $crate::EncodeError> {
                $crate::codec::encode_object(self, en)
            }
        }
    };
}
