//! Serde helper distinguishing an absent field from an explicit `null`.
//!
//! Use with `#[serde(default, deserialize_with = "nullable::deserialize")]` on an
//! `Option<Option<T>>`: absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Unwraps the inner value of a patch, returning `None` for absent or `null`.
pub fn inner<T: Clone>(patch: &Option<Option<T>>) -> Option<T> {
    patch.clone().flatten()
}
