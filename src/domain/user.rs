//! User entity
//!
//! Only the fields order processing needs: orders are owned by a user, and
//! creation requires that the user exists and is active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::{Deletion, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deleted_at", default)]
    pub deletion: Deletion,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            deletion: Deletion::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active && !self.is_deleted()
    }
}

impl Entity for User {
    fn resource_name() -> &'static str {
        "user"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn deletion(&self) -> &Deletion {
        &self.deletion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_active() {
        let user = User::new("Ana", "ana@example.com");
        assert!(user.is_active());
    }

    #[test]
    fn test_inactive_or_deleted_user_is_not_active() {
        let mut user = User::new("Ana", "ana@example.com");
        user.status = UserStatus::Inactive;
        assert!(!user.is_active());

        let mut user = User::new("Bia", "bia@example.com");
        user.deletion = Deletion::now();
        assert!(!user.is_active());
    }
}
