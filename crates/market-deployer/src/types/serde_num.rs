//! Serde adapters for on-chain integers carried in JSON.
//!
//! Values wider than 53 bits are written as strings in wizard output; small
//! ones sometimes appear as bare JSON numbers. Both are accepted, but a value
//! never passes through `f64`.

use alloy::primitives::{Signed, U256};
use serde::{de, Deserialize, Deserializer, Serializer};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum IntRepr {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

pub mod u256 {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match IntRepr::deserialize(deserializer)? {
            IntRepr::Text(s) => U256::from_str(s.trim()).map_err(de::Error::custom),
            IntRepr::Unsigned(v) => Ok(U256::from(v)),
            IntRepr::Signed(v) => Err(de::Error::custom(format!("{v} is negative"))),
        }
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}

pub mod signed {
    use super::*;

    pub fn deserialize<'de, D, const BITS: usize, const LIMBS: usize>(
        deserializer: D,
    ) -> Result<Signed<BITS, LIMBS>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match IntRepr::deserialize(deserializer)? {
            IntRepr::Text(s) => s.trim().to_string(),
            IntRepr::Unsigned(v) => v.to_string(),
            IntRepr::Signed(v) => v.to_string(),
        };
        Signed::from_dec_str(&text).map_err(|e| de::Error::custom(format!("'{text}': {e}")))
    }

    pub fn serialize<S, const BITS: usize, const LIMBS: usize>(
        value: &Signed<BITS, LIMBS>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }
}
