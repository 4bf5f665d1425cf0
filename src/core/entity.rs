//! Entity trait and soft-delete state shared by all persisted domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Soft-delete state of an entity.
///
/// Deletion is modeled as an explicit tagged state rather than a bare
/// nullable timestamp, so domain code matches on `Deletion::Deleted`
/// instead of probing an `Option`. At the serialization boundary (JSON,
/// database rows) it collapses to a nullable `deleted_at` timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<DateTime<Utc>>", into = "Option<DateTime<Utc>>")]
pub enum Deletion {
    /// The entity is live
    Active,
    /// The entity was soft-deleted at the given instant
    Deleted { at: DateTime<Utc> },
}

impl Deletion {
    /// Mark deleted now
    pub fn now() -> Self {
        Deletion::Deleted { at: Utc::now() }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Deletion::Deleted { .. })
    }

    /// The deletion instant, if any
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Deletion::Active => None,
            Deletion::Deleted { at } => Some(*at),
        }
    }
}

impl Default for Deletion {
    fn default() -> Self {
        Deletion::Active
    }
}

impl From<Option<DateTime<Utc>>> for Deletion {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        match value {
            None => Deletion::Active,
            Some(at) => Deletion::Deleted { at },
        }
    }
}

impl From<Deletion> for Option<DateTime<Utc>> {
    fn from(value: Deletion) -> Self {
        value.deleted_at()
    }
}

/// Base trait for all persisted entities.
///
/// Every entity has:
/// - id: unique identifier
/// - created_at / updated_at: timestamps managed by the domain type
/// - deletion: soft-delete state
///
/// Repositories filter out deleted entities at the query boundary; callers
/// never re-check `deleted_at` by hand.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The singular resource name used in error payloads (e.g., "order")
    fn resource_name() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Get the soft-delete state
    fn deletion(&self) -> &Deletion;

    /// Check if the entity has been soft-deleted
    fn is_deleted(&self) -> bool {
        self.deletion().is_deleted()
    }
}
