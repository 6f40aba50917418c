//! In-memory directory adapter.
//!
//! Deterministic and test-friendly. Listing methods return users sorted by
//! id so recipient computation stays stable across runs.

use crate::traits::UserDirectory;
use crate::{DirectoryError, DirectoryResult};
use approval_types::{Department, Role, User, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory user directory.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with a user population.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let directory = Self::new();
        for user in users {
            directory.upsert(user);
        }
        directory
    }

    /// Insert or replace a user record.
    pub fn upsert(&self, user: User) {
        if let Ok(mut guard) = self.users.write() {
            guard.insert(user.id.clone(), user);
        }
    }

    /// Remove a user record.
    pub fn remove(&self, id: &UserId) {
        if let Ok(mut guard) = self.users.write() {
            guard.remove(id);
        }
    }

    fn collect_sorted(&self, pred: impl Fn(&User) -> bool) -> DirectoryResult<Vec<User>> {
        let guard = self
            .users
            .read()
            .map_err(|_| DirectoryError::Backend("users lock poisoned".to_string()))?;
        let mut users: Vec<User> = guard.values().filter(|u| pred(u)).cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn get_user(&self, id: &UserId) -> DirectoryResult<Option<User>> {
        let guard = self
            .users
            .read()
            .map_err(|_| DirectoryError::Backend("users lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn users_in_department(
        &self,
        department: Department,
        role: Role,
    ) -> DirectoryResult<Vec<User>> {
        self.collect_sorted(|u| u.department == department && u.role == role)
    }

    async fn users_with_role(&self, role: Role) -> DirectoryResult<Vec<User>> {
        self.collect_sorted(|u| u.role == role)
    }
}
