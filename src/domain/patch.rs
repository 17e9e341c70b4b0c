//! Sparse updates: a field is either left alone or replaced.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One attribute of a partial update.
///
/// A missing JSON key and an explicit `null` both decode to `Absent`.
/// Fields using it need `#[serde(default)]` so that a missing key is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Present(v),
            None => Patch::Absent,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Absent => serializer.serialize_none(),
            Patch::Present(v) => v.serialize(serializer),
        }
    }
}
