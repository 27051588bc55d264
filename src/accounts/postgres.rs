use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use super::store::{AccountStore, StoreError};
use super::Account;
use crate::roles::Role;

const ACCOUNT_COLUMNS: &str =
    "id, email, full_name, role, college_id, bio, interests, hashed_password, created_at";

/// Postgres-backed account store.
///
/// Role mutations are a single conditional `UPDATE ... WHERE id = $_ AND
/// role = $_`, so the compare-and-set happens inside the database and two
/// racing mutations cannot both apply.
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape; `role` is stored as text and parsed on the way out.
#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    full_name: String,
    role: String,
    college_id: Option<String>,
    bio: String,
    interests: Vec<String>,
    hashed_password: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).map_err(|e| {
            tracing::error!("Corrupt role value for account {}: {}", row.id, e);
            StoreError::Unavailable(format!("unreadable role for account {}", row.id))
        })?;
        Ok(Account {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role,
            college_id: row.college_id,
            bio: row.bio,
            interests: row.interests,
            hashed_password: row.hashed_password,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at");
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Account::try_from).collect()
    }

    async fn find_by_college(&self, college_id: &str) -> Result<Vec<Account>, StoreError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE lower(college_id) = lower($1) ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(college_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Account::try_from).collect()
    }

    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO accounts \
             (id, email, full_name, role, college_id, bio, interests, hashed_password, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.full_name)
        .bind(account.role.as_str())
        .bind(&account.college_id)
        .bind(&account.bio)
        .bind(&account.interests)
        .bind(&account.hashed_password)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_role(
        &self,
        id: Uuid,
        expected: Role,
        new_role: Role,
    ) -> Result<Account, StoreError> {
        let sql = format!(
            "UPDATE accounts SET role = $1 WHERE id = $2 AND role = $3 \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(new_role.as_str())
            .bind(id)
            .bind(expected.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Account::try_from(row),
            // The conditional update matched nothing: either the account is
            // gone or its role moved under us.
            None => Err(self.classify_miss(id).await?),
        }
    }

    async fn delete(&self, id: Uuid, expected: Role) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1 AND role = $2")
            .bind(id)
            .bind(expected.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.classify_miss(id).await?);
        }
        Ok(())
    }
}

impl PgAccountStore {
    /// Distinguish "row gone" from "role changed" after a conditional
    /// mutation matched nothing.
    async fn classify_miss(&self, id: Uuid) -> Result<StoreError, StoreError> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT 1::bigint FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(if exists.is_some() {
            StoreError::Conflict
        } else {
            StoreError::NotFound
        })
    }
}
