use tracing::info;

use super::store::{AccountStore, StoreError};
use super::Account;
use crate::auth::hash_password;
use crate::roles::Role;

/// Idempotently ensure the protected main_admin account exists.
///
/// `main_admin` is unassignable through the promotion path, so it has to be
/// seeded here. If the email is already registered with a lesser role, the
/// existing account is lifted to main_admin (the one mutation that bypasses
/// the promotion engine). The main admin carries no college affiliation.
pub async fn ensure_main_admin(
    store: &dyn AccountStore,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<(), StoreError> {
    if let Some(existing) = store.find_by_email(email).await? {
        if existing.role != Role::MainAdmin {
            store
                .update_role(existing.id, existing.role, Role::MainAdmin)
                .await?;
            info!("Lifted existing account {} to main_admin", email);
        }
        return Ok(());
    }

    let mut admin = Account::register(email, full_name, hash_password(password));
    admin.role = Role::MainAdmin;
    admin.college_id = None;
    admin.bio = "Main System Administrator".to_string();
    store.insert(&admin).await?;
    info!("Seeded main_admin account {}", email);
    Ok(())
}
