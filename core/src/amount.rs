// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Serde helpers for arbitrary precision amounts
//!
//! Amounts serialise as decimal strings and deserialise from either strings
//! or JSON integers, for use with `#[serde(with = "ledger_ton_core::amount")]`.

use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Str(String),
    Num(u64),
}

pub fn serialize<S: Serializer>(v: &BigUint, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&v.to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigUint, D::Error> {
    match Repr::deserialize(d)? {
        Repr::Str(s) => s.parse::<BigUint>().map_err(de::Error::custom),
        Repr::Num(n) => Ok(BigUint::from(n)),
    }
}

/// Helpers for optional amounts
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Option<BigUint>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(v) => s.serialize_some(&v.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BigUint>, D::Error> {
        match Option::<Repr>::deserialize(d)? {
            Some(Repr::Str(s)) => s.parse::<BigUint>().map(Some).map_err(de::Error::custom),
            Some(Repr::Num(n)) => Ok(Some(BigUint::from(n))),
            None => Ok(None),
        }
    }
}
