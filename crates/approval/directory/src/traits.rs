use crate::DirectoryResult;
use approval_types::{Department, Role, User, UserId};
use async_trait::async_trait;

/// Read contract over the externally owned user population.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up one user. `Ok(None)` for unknown ids; callers fail closed.
    async fn get_user(&self, id: &UserId) -> DirectoryResult<Option<User>>;

    /// All users holding `role` within `department`.
    async fn users_in_department(
        &self,
        department: Department,
        role: Role,
    ) -> DirectoryResult<Vec<User>>;

    /// All users holding `role` across departments.
    async fn users_with_role(&self, role: Role) -> DirectoryResult<Vec<User>>;
}
