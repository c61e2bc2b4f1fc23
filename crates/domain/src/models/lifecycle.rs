//! Soft-delete lifecycle shared by every tenant-owned record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Whether a record is live or has been soft-deleted.
///
/// Persisted as a nullable `deleted_at` column and serialized the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordState {
    #[default]
    Active,
    SoftDeleted {
        at: DateTime<Utc>,
    },
}

impl RecordState {
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            Some(at) => RecordState::SoftDeleted { at },
            None => RecordState::Active,
        }
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            RecordState::Active => None,
            RecordState::SoftDeleted { at } => Some(*at),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RecordState::Active)
    }
}

impl Serialize for RecordState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.deleted_at().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer).map(RecordState::from_deleted_at)
    }
}

/// A record owned by exactly one tenant.
pub trait TenantOwned {
    fn id(&self) -> Uuid;
    fn tenant_id(&self) -> Uuid;
    fn state(&self) -> RecordState;

    fn is_live(&self) -> bool {
        self.state().is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_deleted_at() {
        assert_eq!(RecordState::from_deleted_at(None), RecordState::Active);
        let now = Utc::now();
        let state = RecordState::from_deleted_at(Some(now));
        assert_eq!(state, RecordState::SoftDeleted { at: now });
        assert_eq!(state.deleted_at(), Some(now));
        assert!(!state.is_active());
    }

    #[test]
    fn test_serializes_as_nullable_timestamp() {
        assert_eq!(serde_json::to_string(&RecordState::Active).unwrap(), "null");

        let now = Utc::now();
        let json = serde_json::to_value(RecordState::SoftDeleted { at: now }).unwrap();
        let back: RecordState = serde_json::from_value(json).unwrap();
        assert_eq!(back.deleted_at().map(|t| t.timestamp()), Some(now.timestamp()));
    }
}
