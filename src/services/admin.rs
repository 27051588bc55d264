//! Promotion/demotion engine, account deletion guard, and the advisory
//! manageable-users view.
//!
//! Every operation takes the acting account explicitly and re-reads the
//! target from the store before validating, then mutates conditionally on
//! the observed role (compare-and-set). When two conflicting mutations race
//! on one target, exactly one wins and the loser gets [`AdminError::Conflict`].

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::guard;
use crate::accounts::store::{AccountStore, StoreError};
use crate::accounts::{Account, AccountSummary};
use crate::roles::Role;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("user not found")]
    NotFound,

    /// The target is the main_admin account, which is immune to promotion,
    /// demotion, and deletion by anyone.
    #[error("protected account, cannot be modified")]
    ProtectedAccount,

    /// main_admin is unassignable; it is seeded out-of-band.
    #[error("cannot assign protected role")]
    ProtectedRole,

    #[error("cannot act on self")]
    SelfAction,

    #[error("forbidden, minimum role required: {minimum}")]
    InsufficientLevel { minimum: Role },

    /// Strict superiority: equal level is also forbidden.
    #[error("cannot act on accounts at or above your own level")]
    NotAboveTarget,

    #[error("not permitted to assign role: {0}")]
    RoleNotPermitted(Role),

    #[error("forbidden, cross-college access")]
    CrossCollege,

    #[error("acting account is missing college information")]
    MissingCollege,

    /// The target's role changed between validation and write.
    #[error("target role changed during operation")]
    Conflict,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AdminError::Conflict,
            StoreError::NotFound => AdminError::NotFound,
            other => AdminError::Store(other),
        }
    }
}

/// Read-only permission view for client display. Carries no enforcement
/// weight.
#[derive(Debug, Serialize)]
pub struct PermissionView {
    pub role: Role,
    pub college_id: Option<String>,
    pub permissions: Vec<&'static str>,
}

/// Per-role account counts within the actor's manageable scope.
#[derive(Debug, Serialize)]
pub struct CollegeStats {
    pub total_users: usize,
    pub students: usize,
    pub faculty: usize,
    pub college_management: usize,
    pub college_admins: usize,
}

pub struct AdminService {
    store: Arc<dyn AccountStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Promote `target_id` to `desired`. Gate: college_management or above.
    pub async fn promote(
        &self,
        actor: &Account,
        target_id: Uuid,
        desired: Role,
    ) -> Result<AccountSummary, AdminError> {
        guard::require_min_role(actor, Role::CollegeManagement)?;

        let target = self.validate_role_change(actor, target_id, desired).await?;

        if !actor.role.can_promote_to(desired) {
            return Err(AdminError::RoleNotPermitted(desired));
        }
        if actor.role != Role::MainAdmin {
            guard::require_same_college(actor, target.college_id.as_deref())?;
        }

        let updated = self.store.update_role(target.id, target.role, desired).await?;
        info!(
            "{} ({}) promoted {} ({}) to {}",
            actor.email, actor.role, updated.email, target.role, desired
        );
        Ok(updated.summary())
    }

    /// Demote `target_id` to `desired`. Gate: college_admin or above - the
    /// asymmetry with promotion's gate is intentional: college_management
    /// may promote subordinates but may not demote them. Demotion is also
    /// not constrained by the promotion rule table, only by level ordering.
    pub async fn demote(
        &self,
        actor: &Account,
        target_id: Uuid,
        desired: Role,
    ) -> Result<AccountSummary, AdminError> {
        guard::require_min_role(actor, Role::CollegeAdmin)?;

        let target = self.validate_role_change(actor, target_id, desired).await?;

        if actor.role != Role::MainAdmin {
            guard::require_same_college(actor, target.college_id.as_deref())?;
        }

        let updated = self.store.update_role(target.id, target.role, desired).await?;
        info!(
            "{} ({}) demoted {} ({}) to {}",
            actor.email, actor.role, updated.email, target.role, desired
        );
        Ok(updated.summary())
    }

    /// Permanently delete `target_id`. Gate: college_admin or above.
    /// Cascade cleanup of club/event membership belongs to the
    /// collaborating persistence layer.
    pub async fn delete_account(
        &self,
        actor: &Account,
        target_id: Uuid,
    ) -> Result<AccountSummary, AdminError> {
        guard::require_min_role(actor, Role::CollegeAdmin)?;

        let target = self
            .store
            .find_by_id(target_id)
            .await?
            .ok_or(AdminError::NotFound)?;

        if target.role == Role::MainAdmin {
            return Err(AdminError::ProtectedAccount);
        }
        if actor.id == target.id {
            return Err(AdminError::SelfAction);
        }
        if !actor.role.outranks(target.role) {
            return Err(AdminError::NotAboveTarget);
        }
        // main_admin deletes across colleges; college_admin only within its
        // own, and both sides must carry an affiliation.
        if actor.role == Role::CollegeAdmin {
            match (&actor.college_id, &target.college_id) {
                (None, _) | (_, None) => return Err(AdminError::MissingCollege),
                (Some(a), Some(t)) if !a.eq_ignore_ascii_case(t) => {
                    return Err(AdminError::CrossCollege)
                }
                _ => {}
            }
        }

        self.store.delete(target.id, target.role).await?;
        info!(
            "{} ({}) deleted account {} ({})",
            actor.email, actor.role, target.email, target.role
        );
        Ok(target.summary())
    }

    /// Accounts the actor may administer. Advisory for UI only: mutating
    /// operations never trust this view and re-check independently.
    /// Faculty and students get an empty set, not an error; the HTTP layer
    /// applies its own minimum-role gate in front of this.
    pub async fn list_manageable_users(
        &self,
        actor: &Account,
    ) -> Result<Vec<AccountSummary>, AdminError> {
        let manageable = actor.role.manageable_roles();
        if manageable.is_empty() {
            return Ok(Vec::new());
        }

        let accounts = self.scoped_accounts(actor).await?;
        Ok(accounts
            .iter()
            .filter(|a| manageable.contains(&a.role))
            .map(Account::summary)
            .collect())
    }

    /// Role and capability tags for client-side display.
    pub fn get_permissions(&self, actor: &Account) -> PermissionView {
        PermissionView {
            role: actor.role,
            college_id: actor.college_id.clone(),
            permissions: actor.role.permissions().to_vec(),
        }
    }

    /// Per-role counts within the actor's scope. Gate: college_management
    /// or above.
    pub async fn college_stats(&self, actor: &Account) -> Result<CollegeStats, AdminError> {
        guard::require_min_role(actor, Role::CollegeManagement)?;

        let accounts = self.scoped_accounts(actor).await?;
        let manageable = actor.role.manageable_roles();
        let count =
            |role: Role| -> usize { accounts.iter().filter(|a| a.role == role).count() };

        Ok(CollegeStats {
            total_users: accounts
                .iter()
                .filter(|a| manageable.contains(&a.role))
                .count(),
            students: count(Role::Student),
            faculty: count(Role::Faculty),
            college_management: if manageable.contains(&Role::CollegeManagement) {
                count(Role::CollegeManagement)
            } else {
                0
            },
            college_admins: if manageable.contains(&Role::CollegeAdmin) {
                count(Role::CollegeAdmin)
            } else {
                0
            },
        })
    }

    /// Shared preconditions for promote and demote, in enforcement order:
    /// existence, protected target, protected desired role, self-action,
    /// strict level superiority.
    async fn validate_role_change(
        &self,
        actor: &Account,
        target_id: Uuid,
        desired: Role,
    ) -> Result<Account, AdminError> {
        let target = self
            .store
            .find_by_id(target_id)
            .await?
            .ok_or(AdminError::NotFound)?;

        if target.role == Role::MainAdmin {
            return Err(AdminError::ProtectedAccount);
        }
        if desired == Role::MainAdmin {
            return Err(AdminError::ProtectedRole);
        }
        if actor.id == target.id {
            return Err(AdminError::SelfAction);
        }
        if !actor.role.outranks(target.role) {
            return Err(AdminError::NotAboveTarget);
        }
        Ok(target)
    }

    /// Everyone for main_admin, the actor's own college otherwise.
    async fn scoped_accounts(&self, actor: &Account) -> Result<Vec<Account>, AdminError> {
        if actor.role == Role::MainAdmin {
            Ok(self.store.find_all().await?)
        } else {
            let college = actor
                .college_id
                .as_deref()
                .ok_or(AdminError::MissingCollege)?;
            Ok(self.store.find_by_college(college).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::memory::MemoryAccountStore;

    fn account(email: &str, role: Role) -> Account {
        let mut account = Account::register(email, "Test User", "hash".into());
        account.role = role;
        account
    }

    async fn service_with(accounts: Vec<Account>) -> AdminService {
        let store = Arc::new(MemoryAccountStore::with_accounts(accounts).await);
        AdminService::new(store)
    }

    #[tokio::test]
    async fn main_admin_promotes_student_to_college_admin() {
        let root = account("root@system.edu", Role::MainAdmin);
        let target = account("kim@mit.edu", Role::Student);
        let target_id = target.id;
        let service = service_with(vec![root.clone(), target]).await;

        let summary = service
            .promote(&root, target_id, Role::CollegeAdmin)
            .await
            .unwrap();
        assert_eq!(summary.role, Role::CollegeAdmin);
    }

    #[tokio::test]
    async fn nobody_promotes_to_main_admin() {
        let root = account("root@system.edu", Role::MainAdmin);
        let target = account("kim@mit.edu", Role::Student);
        let target_id = target.id;
        let service = service_with(vec![root.clone(), target]).await;

        let err = service
            .promote(&root, target_id, Role::MainAdmin)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::ProtectedRole));
    }

    #[tokio::test]
    async fn main_admin_target_is_protected_even_from_main_admin() {
        let root = account("root@system.edu", Role::MainAdmin);
        let other_root = account("root2@system.edu", Role::MainAdmin);
        let other_id = other_root.id;
        let service = service_with(vec![root.clone(), other_root]).await;

        let err = service
            .promote(&root, other_id, Role::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::ProtectedAccount));

        let err = service.delete_account(&root, other_id).await.unwrap_err();
        assert!(matches!(err, AdminError::ProtectedAccount));
    }

    #[tokio::test]
    async fn self_promotion_is_rejected() {
        let dean = account("dean@mit.edu", Role::CollegeAdmin);
        let dean_id = dean.id;
        let service = service_with(vec![dean.clone()]).await;

        let err = service
            .promote(&dean, dean_id, Role::CollegeManagement)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::SelfAction));
    }

    #[tokio::test]
    async fn equal_level_is_forbidden_strictly() {
        let dean = account("dean@mit.edu", Role::CollegeAdmin);
        let peer = account("peer@mit.edu", Role::CollegeAdmin);
        let peer_id = peer.id;
        let service = service_with(vec![dean.clone(), peer]).await;

        assert!(matches!(
            service.promote(&dean, peer_id, Role::Student).await,
            Err(AdminError::NotAboveTarget)
        ));
        assert!(matches!(
            service.demote(&dean, peer_id, Role::Student).await,
            Err(AdminError::NotAboveTarget)
        ));
        assert!(matches!(
            service.delete_account(&dean, peer_id).await,
            Err(AdminError::NotAboveTarget)
        ));
    }

    #[tokio::test]
    async fn cross_college_promotion_is_forbidden() {
        let manager = account("mgr@x.edu", Role::CollegeManagement);
        let target = account("kim@y.edu", Role::Student);
        let target_id = target.id;
        let service = service_with(vec![manager.clone(), target]).await;

        let err = service
            .promote(&manager, target_id, Role::Faculty)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::CrossCollege));
    }

    #[tokio::test]
    async fn college_management_cannot_assign_college_admin() {
        let manager = account("mgr@mit.edu", Role::CollegeManagement);
        let target = account("prof@mit.edu", Role::Faculty);
        let target_id = target.id;
        let service = service_with(vec![manager.clone(), target]).await;

        let err = service
            .promote(&manager, target_id, Role::CollegeAdmin)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdminError::RoleNotPermitted(Role::CollegeAdmin)
        ));
    }

    #[tokio::test]
    async fn promotion_gate_is_college_management() {
        let prof = account("prof@mit.edu", Role::Faculty);
        let target = account("kim@mit.edu", Role::Student);
        let target_id = target.id;
        let service = service_with(vec![prof.clone(), target]).await;

        let err = service
            .promote(&prof, target_id, Role::Faculty)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdminError::InsufficientLevel {
                minimum: Role::CollegeManagement
            }
        ));
    }

    #[tokio::test]
    async fn demotion_gate_is_college_admin() {
        // college_management may promote but not demote.
        let manager = account("mgr@mit.edu", Role::CollegeManagement);
        let target = account("prof@mit.edu", Role::Faculty);
        let target_id = target.id;
        let service = service_with(vec![manager.clone(), target]).await;

        let err = service
            .demote(&manager, target_id, Role::Student)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdminError::InsufficientLevel {
                minimum: Role::CollegeAdmin
            }
        ));
    }

    #[tokio::test]
    async fn demotion_skips_the_promotion_rule_table() {
        // college_admin's promotable set excludes nothing relevant here,
        // but demotion is only constrained by level ordering: the dean may
        // demote a college_management account to student directly.
        let dean = account("dean@mit.edu", Role::CollegeAdmin);
        let target = account("mgr@mit.edu", Role::CollegeManagement);
        let target_id = target.id;
        let service = service_with(vec![dean.clone(), target]).await;

        let summary = service
            .demote(&dean, target_id, Role::Student)
            .await
            .unwrap();
        assert_eq!(summary.role, Role::Student);
    }

    #[tokio::test]
    async fn demote_never_assigns_main_admin() {
        let root = account("root@system.edu", Role::MainAdmin);
        let target = account("dean@mit.edu", Role::CollegeAdmin);
        let target_id = target.id;
        let service = service_with(vec![root.clone(), target]).await;

        let err = service
            .demote(&root, target_id, Role::MainAdmin)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::ProtectedRole));
    }

    #[tokio::test]
    async fn missing_target_reports_not_found() {
        let root = account("root@system.edu", Role::MainAdmin);
        let service = service_with(vec![root.clone()]).await;

        let err = service
            .promote(&root, Uuid::new_v4(), Role::Faculty)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::NotFound));
    }

    #[tokio::test]
    async fn college_admin_deletes_same_college_faculty() {
        let dean = account("dean@mit.edu", Role::CollegeAdmin);
        let target = account("prof@mit.edu", Role::Faculty);
        let target_id = target.id;
        let store = Arc::new(
            MemoryAccountStore::with_accounts(vec![dean.clone(), target]).await,
        );
        let service = AdminService::new(store.clone());

        service.delete_account(&dean, target_id).await.unwrap();
        assert!(store.find_by_id(target_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn college_admin_cannot_delete_across_colleges() {
        let dean = account("dean@mit.edu", Role::CollegeAdmin);
        let target = account("prof@stanford.edu", Role::Faculty);
        let target_id = target.id;
        let service = service_with(vec![dean.clone(), target]).await;

        let err = service.delete_account(&dean, target_id).await.unwrap_err();
        assert!(matches!(err, AdminError::CrossCollege));
    }

    #[tokio::test]
    async fn delete_requires_college_information_for_college_admin() {
        let mut dean = account("dean@mit.edu", Role::CollegeAdmin);
        dean.college_id = None;
        let target = account("kim@mit.edu", Role::Student);
        let target_id = target.id;
        let service = service_with(vec![dean.clone(), target]).await;

        let err = service.delete_account(&dean, target_id).await.unwrap_err();
        assert!(matches!(err, AdminError::MissingCollege));
    }

    #[tokio::test]
    async fn main_admin_deletes_across_colleges() {
        let root = account("root@system.edu", Role::MainAdmin);
        let target = account("prof@anywhere.edu", Role::Faculty);
        let target_id = target.id;
        let service = service_with(vec![root.clone(), target]).await;

        service.delete_account(&root, target_id).await.unwrap();
    }

    #[tokio::test]
    async fn manageable_view_scopes_by_role_and_college() {
        let root = account("root@system.edu", Role::MainAdmin);
        let dean = account("dean@mit.edu", Role::CollegeAdmin);
        let manager = account("mgr@mit.edu", Role::CollegeManagement);
        let prof = account("prof@mit.edu", Role::Faculty);
        let kim = account("kim@mit.edu", Role::Student);
        let outsider = account("zoe@stanford.edu", Role::Student);

        let service = service_with(vec![
            root.clone(),
            dean.clone(),
            manager.clone(),
            prof.clone(),
            kim.clone(),
            outsider.clone(),
        ])
        .await;

        // main_admin sees everyone, including other admins.
        let all = service.list_manageable_users(&root).await.unwrap();
        assert_eq!(all.len(), 6);

        // college_admin: same-college management/faculty/students only.
        let dean_view = service.list_manageable_users(&dean).await.unwrap();
        let emails: Vec<_> = dean_view.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(dean_view.len(), 3);
        assert!(emails.contains(&"mgr@mit.edu"));
        assert!(emails.contains(&"prof@mit.edu"));
        assert!(emails.contains(&"kim@mit.edu"));

        // college_management: same-college faculty/students only.
        let mgr_view = service.list_manageable_users(&manager).await.unwrap();
        assert_eq!(mgr_view.len(), 2);

        // faculty and students see an empty set, not an error.
        assert!(service.list_manageable_users(&prof).await.unwrap().is_empty());
        assert!(service.list_manageable_users(&kim).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn permission_view_reflects_catalog() {
        let manager = account("mgr@mit.edu", Role::CollegeManagement);
        let service = service_with(vec![manager.clone()]).await;

        let view = service.get_permissions(&manager);
        assert_eq!(view.role, Role::CollegeManagement);
        assert_eq!(view.college_id.as_deref(), Some("mit"));
        assert!(view.permissions.contains(&"create_opportunities"));
    }

    #[tokio::test]
    async fn stats_respect_manageable_scope() {
        let dean = account("dean@mit.edu", Role::CollegeAdmin);
        let service = service_with(vec![
            dean.clone(),
            account("mgr@mit.edu", Role::CollegeManagement),
            account("prof@mit.edu", Role::Faculty),
            account("kim@mit.edu", Role::Student),
            account("lee@mit.edu", Role::Student),
            account("zoe@stanford.edu", Role::Student),
        ])
        .await;

        let stats = service.college_stats(&dean).await.unwrap();
        assert_eq!(stats.total_users, 4); // mgr + prof + two students, not the dean
        assert_eq!(stats.students, 2);
        assert_eq!(stats.faculty, 1);
        assert_eq!(stats.college_management, 1);
        assert_eq!(stats.college_admins, 0); // outside the dean's manageable set
    }

    /// Store wrapper that holds every `find_by_id` caller at a barrier, so
    /// two racing operations are guaranteed to validate against the same
    /// observed role before either writes.
    struct RendezvousStore {
        inner: Arc<MemoryAccountStore>,
        barrier: tokio::sync::Barrier,
    }

    #[async_trait::async_trait]
    impl AccountStore for RendezvousStore {
        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
            let found = self.inner.find_by_id(id).await;
            self.barrier.wait().await;
            found
        }
        async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
            self.inner.find_by_email(email).await
        }
        async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
            self.inner.find_all().await
        }
        async fn find_by_college(&self, college_id: &str) -> Result<Vec<Account>, StoreError> {
            self.inner.find_by_college(college_id).await
        }
        async fn insert(&self, account: &Account) -> Result<(), StoreError> {
            self.inner.insert(account).await
        }
        async fn update_role(
            &self,
            id: Uuid,
            expected: Role,
            new_role: Role,
        ) -> Result<Account, StoreError> {
            self.inner.update_role(id, expected, new_role).await
        }
        async fn delete(&self, id: Uuid, expected: Role) -> Result<(), StoreError> {
            self.inner.delete(id, expected).await
        }
    }

    #[tokio::test]
    async fn concurrent_promotions_have_exactly_one_winner() {
        let root = account("root@system.edu", Role::MainAdmin);
        let dean = account("dean@mit.edu", Role::CollegeAdmin);
        let target = account("kim@mit.edu", Role::Student);
        let target_id = target.id;

        let store = Arc::new(
            MemoryAccountStore::with_accounts(vec![root.clone(), dean.clone(), target]).await,
        );
        let racing = Arc::new(RendezvousStore {
            inner: store.clone(),
            barrier: tokio::sync::Barrier::new(2),
        });
        let service = Arc::new(AdminService::new(racing));

        let (a, b) = tokio::join!(
            service.promote(&root, target_id, Role::CollegeManagement),
            service.promote(&dean, target_id, Role::Faculty),
        );

        let winners = [a.is_ok(), b.is_ok()].iter().filter(|w| **w).count();
        assert_eq!(winners, 1, "exactly one promotion must persist");

        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser.unwrap_err(), AdminError::Conflict));

        let persisted = store.find_by_id(target_id).await.unwrap().unwrap();
        assert!(persisted.role == Role::CollegeManagement || persisted.role == Role::Faculty);
    }

    #[tokio::test]
    async fn delete_conflicts_when_role_moves_first() {
        let root = account("root@system.edu", Role::MainAdmin);
        let target = account("prof@mit.edu", Role::Faculty);
        let target_id = target.id;
        let store = Arc::new(
            MemoryAccountStore::with_accounts(vec![root.clone(), target]).await,
        );

        // Stale actor view: role changes after validation would have run.
        store
            .update_role(target_id, Role::Faculty, Role::CollegeManagement)
            .await
            .unwrap();
        let stale = store.find_by_id(target_id).await.unwrap().unwrap();
        store
            .update_role(target_id, Role::CollegeManagement, Role::Student)
            .await
            .unwrap();

        let err = store.delete(target_id, stale.role).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }
}
