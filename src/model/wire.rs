//! Serde adapters that read and write enumerations through their mapping
//! tables.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

fn from_table<'de, D, T>(deserializer: D, what: &str, lookup: fn(&str) -> Option<T>) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    lookup(&raw).ok_or_else(|| D::Error::custom(format!("unknown {what} '{raw}'")))
}

fn unrepresentable<S: Serializer>(what: &str, value: impl std::fmt::Display) -> Result<S::Ok, S::Error> {
    Err(serde::ser::Error::custom(format!("{what} {value} has no spelling in this SPDX version")))
}

macro_rules! table_adapter {
    ($module:ident, $ty:ty, $what:literal, $from:ident, |$v:ident| $to:expr) => {
        pub mod $module {
            use super::*;
            use crate::model::entities::*;

            pub fn serialize<S: Serializer>($v: &$ty, serializer: S) -> Result<S::Ok, S::Error> {
                match $to {
                    Some(name) => serializer.serialize_str(name),
                    None => unrepresentable::<S>($what, $v),
                }
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$ty, D::Error> {
                from_table(deserializer, $what, <$ty>::$from)
            }
        }
    };
}

table_adapter!(spdx22_algorithm, ChecksumAlgorithm, "checksum algorithm", from_spdx22, |v| Some(v.spdx22_name()));
table_adapter!(spdx30_algorithm, ChecksumAlgorithm, "hash algorithm", from_spdx30, |v| Some(v.spdx30_name()));
table_adapter!(spdx22_relationship_type, RelationshipType, "relationship type", from_spdx22, |v| v.spdx22_name());
table_adapter!(spdx30_relationship_type, RelationshipType, "relationship type", from_spdx30, |v| v.spdx30_name());
table_adapter!(reference_category, ReferenceCategory, "reference category", parse, |v| Some(v.as_str()));
