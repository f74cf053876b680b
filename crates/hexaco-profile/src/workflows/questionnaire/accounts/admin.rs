use serde::Serialize;
use tracing::{info, warn};

use super::policy::AdminAction;
use super::{AccountService, SessionContext};
use crate::workflows::questionnaire::domain::{Role, UserAccount, UserId};
use crate::workflows::questionnaire::repository::{DocumentStore, StoreError};

/// Result of a privileged mutation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleChange {
    Applied,
    /// The target already had the requested state; nothing was written.
    Unchanged,
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("not allowed to {}", .action.label())]
    AuthorizationDenied { action: AdminAction },
    #[error("no user with id {0}")]
    NotFound(UserId),
    #[error("user {0} is protected from this action")]
    ProtectedAccount(UserId),
    #[error("session identity {0} no longer exists")]
    UnknownActor(UserId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<S: DocumentStore> AccountService<S> {
    pub fn promote_admin(
        &self,
        session: &SessionContext,
        target: &UserId,
    ) -> Result<RoleChange, AdminError> {
        self.change_account(session, AdminAction::PromoteAdmin, target, |account| {
            if account.is_admin() {
                return false;
            }
            account.roles.set_role(Role::Admin);
            true
        })
    }

    pub fn revoke_admin(
        &self,
        session: &SessionContext,
        target: &UserId,
    ) -> Result<RoleChange, AdminError> {
        self.change_account(session, AdminAction::RevokeAdmin, target, |account| {
            if !account.roles.is_admin {
                return false;
            }
            account.roles.set_role(Role::User);
            true
        })
    }

    pub fn promote_master(
        &self,
        session: &SessionContext,
        target: &UserId,
    ) -> Result<RoleChange, AdminError> {
        self.change_account(session, AdminAction::PromoteMaster, target, |account| {
            if account.is_master_admin() {
                return false;
            }
            account.roles.set_role(Role::Master);
            true
        })
    }

    /// Demotes a master to a plain admin.
    pub fn revoke_master(
        &self,
        session: &SessionContext,
        target: &UserId,
    ) -> Result<RoleChange, AdminError> {
        self.change_account(session, AdminAction::RevokeMaster, target, |account| {
            if !account.is_master_admin() {
                return false;
            }
            account.roles.set_role(Role::Admin);
            true
        })
    }

    pub fn set_coordinator_verified(
        &self,
        session: &SessionContext,
        target: &UserId,
        verified: bool,
    ) -> Result<RoleChange, AdminError> {
        self.change_account(session, AdminAction::SetCoordinatorVerified, target, |account| {
            if account.roles.coordinator_verified == verified {
                return false;
            }
            account.roles.coordinator_verified = verified;
            true
        })
    }

    /// Removes the account and its stored profile in one commit.
    pub fn delete_user(
        &self,
        session: &SessionContext,
        target: &UserId,
    ) -> Result<RoleChange, AdminError> {
        let action = AdminAction::DeleteUser;
        self.authorize(session, action)?;

        let previous = self.registry.accounts()?;
        let victim = previous
            .iter()
            .find(|account| &account.id == target)
            .ok_or_else(|| AdminError::NotFound(target.clone()))?;
        if self.policy.protects(action, victim) {
            warn!(actor = %session.user_id, target = %target, action = ?action, "protected target");
            return Err(AdminError::ProtectedAccount(target.clone()));
        }

        let accounts: Vec<UserAccount> = previous
            .iter()
            .filter(|account| &account.id != target)
            .cloned()
            .collect();
        let profiles: Vec<_> = self
            .registry
            .profiles()?
            .into_iter()
            .filter(|profile| &profile.id != target)
            .collect();
        self.registry.commit(&previous, &accounts, &profiles)?;

        if self.registry.current_identity()?.as_ref() == Some(target) {
            self.registry.clear_current_identity()?;
        }
        info!(actor = %session.user_id, target = %target, "deleted user");
        Ok(RoleChange::Applied)
    }

    /// Reopens a completed profile while keeping its answers; allowed for the owner or an admin.
    pub fn clear_completion(
        &self,
        session: &SessionContext,
        target: &UserId,
    ) -> Result<RoleChange, AdminError> {
        if &session.user_id != target {
            self.authorize(session, AdminAction::ClearCompletion)?;
        }

        let mut profiles = self.registry.profiles()?;
        let profile = profiles
            .iter_mut()
            .find(|profile| &profile.id == target)
            .ok_or_else(|| AdminError::NotFound(target.clone()))?;
        if profile.completed_at.take().is_none() {
            return Ok(RoleChange::Unchanged);
        }
        self.registry.save_profiles(&profiles)?;

        info!(actor = %session.user_id, target = %target, "cleared profile completion");
        Ok(RoleChange::Applied)
    }

    /// Fetches the actor fresh from the store and asks the policy; denials are logged.
    pub(crate) fn authorize(
        &self,
        session: &SessionContext,
        action: AdminAction,
    ) -> Result<UserAccount, AdminError> {
        let actor = self
            .registry
            .account(&session.user_id)?
            .ok_or_else(|| AdminError::UnknownActor(session.user_id.clone()))?;
        if !self.policy.permits(&actor, action) {
            warn!(actor = %actor.id, action = ?action, "authorization denied");
            return Err(AdminError::AuthorizationDenied { action });
        }
        Ok(actor)
    }

    fn change_account<F>(
        &self,
        session: &SessionContext,
        action: AdminAction,
        target: &UserId,
        mutate: F,
    ) -> Result<RoleChange, AdminError>
    where
        F: FnOnce(&mut UserAccount) -> bool,
    {
        self.authorize(session, action)?;

        let mut accounts = self.registry.accounts()?;
        let account = accounts
            .iter_mut()
            .find(|account| &account.id == target)
            .ok_or_else(|| AdminError::NotFound(target.clone()))?;
        if self.policy.protects(action, account) {
            warn!(actor = %session.user_id, target = %target, action = ?action, "protected target");
            return Err(AdminError::ProtectedAccount(target.clone()));
        }
        if !mutate(account) {
            return Ok(RoleChange::Unchanged);
        }
        self.registry.save_accounts(&accounts)?;

        info!(actor = %session.user_id, target = %target, action = ?action, "role change applied");
        Ok(RoleChange::Applied)
    }
}
