use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::Account;
use crate::roles::Role;

/// Errors from the account store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row exists but its role no longer matches what the caller
    /// observed. Raised by the compare-and-set mutations.
    #[error("target role changed during operation")]
    Conflict,

    #[error("account not found")]
    NotFound,

    #[error("account store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence seam for accounts.
///
/// Role mutations are compare-and-set: the caller passes the role it
/// observed during validation and the write only applies if the stored
/// role still matches. Two racing conflicting mutations therefore resolve
/// to exactly one winner; the loser sees [`StoreError::Conflict`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Account>, StoreError>;

    /// All accounts whose college id matches `college_id`
    /// case-insensitively.
    async fn find_by_college(&self, college_id: &str) -> Result<Vec<Account>, StoreError>;

    async fn insert(&self, account: &Account) -> Result<(), StoreError>;

    /// Set the account's role to `new_role` iff its stored role still
    /// equals `expected`. Returns the updated account.
    async fn update_role(
        &self,
        id: Uuid,
        expected: Role,
        new_role: Role,
    ) -> Result<Account, StoreError>;

    /// Permanently remove the account iff its stored role still equals
    /// `expected`. Membership cascade cleanup is the collaborating
    /// layer's concern.
    async fn delete(&self, id: Uuid, expected: Role) -> Result<(), StoreError>;
}
