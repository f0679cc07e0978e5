//! Declarative description of PI Web API records.
//!
//! # Design
//! Every PI record has the same shape: a flat set of independently optional
//! fields, each with a PascalCase wire name, omitted from the JSON when
//! absent. `pi_object!` takes `field: Type => "WireName"` triples and emits
//! the record with that serde contract plus a `PiObject` impl listing the
//! wire names, so the contract is written down once instead of per type.

use std::fmt;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A PI Web API record generated by `pi_object!`.
pub trait PiObject: Serialize + DeserializeOwned + Default + Clone + fmt::Debug {
    /// PI schema name of the record, e.g. `PIElement`.
    const TYPE_NAME: &'static str;

    /// Wire names of every field, in declaration order.
    const WIRE_FIELDS: &'static [&'static str];

    /// Whether `name` is one of this record's top-level wire fields.
    /// PI Web API treats field names case-insensitively.
    fn has_wire_field(name: &str) -> bool {
        Self::WIRE_FIELDS
            .iter()
            .any(|field| field.eq_ignore_ascii_case(name))
    }
}

/// Reads a field that is present on the wire.
///
/// A present `null` becomes `Some` when `T` can hold it (`serde_json::Value`)
/// and `None` otherwise, so servers that send `"Description": null` still
/// parse. A missing field never reaches here; `default` keeps it `None`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::deserialize(Value::Null).ok());
    }
    T::deserialize(value).map(Some).map_err(serde::de::Error::custom)
}

macro_rules! pi_object {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty => $wire:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(
                    rename = $wire,
                    default,
                    skip_serializing_if = "Option::is_none",
                    deserialize_with = "crate::schema::present"
                )]
                pub $field: Option<$ty>,
            )*
        }

        impl $crate::schema::PiObject for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const WIRE_FIELDS: &'static [&'static str] = &[$($wire),*];
        }
    };
}

pub(crate) use pi_object;
