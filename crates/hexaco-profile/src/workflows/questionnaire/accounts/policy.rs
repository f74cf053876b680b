use serde::Serialize;

use super::super::domain::UserAccount;

/// Privileged mutations and reads gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    ViewDirectory,
    PromoteAdmin,
    RevokeAdmin,
    PromoteMaster,
    RevokeMaster,
    SetCoordinatorVerified,
    DeleteUser,
    ClearCompletion,
}

impl AdminAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ViewDirectory => "view the profile directory",
            Self::PromoteAdmin => "promote to admin",
            Self::RevokeAdmin => "revoke admin",
            Self::PromoteMaster => "promote to master admin",
            Self::RevokeMaster => "revoke master admin",
            Self::SetCoordinatorVerified => "change coordinator verification",
            Self::DeleteUser => "delete a user",
            Self::ClearCompletion => "reopen a completed profile",
        }
    }
}

/// Authorization oracle consulted before every privileged mutation.
pub trait AuthorizationPolicy: Send + Sync {
    /// Whether `actor` may attempt `action` at all.
    fn permits(&self, actor: &UserAccount, action: AdminAction) -> bool;

    /// Whether `target` is shielded from `action` even for a permitted actor.
    fn protects(&self, action: AdminAction, target: &UserAccount) -> bool;
}

/// Tiered rules: admins curate, masters manage roles and deletions.
#[derive(Debug, Clone, Default)]
pub struct RolePolicy {
    primary_master_email: Option<String>,
}

impl RolePolicy {
    pub fn new(primary_master_email: Option<String>) -> Self {
        Self {
            primary_master_email,
        }
    }
}

impl AuthorizationPolicy for RolePolicy {
    fn permits(&self, actor: &UserAccount, action: AdminAction) -> bool {
        match action {
            AdminAction::ViewDirectory
            | AdminAction::PromoteAdmin
            | AdminAction::SetCoordinatorVerified
            | AdminAction::ClearCompletion => actor.is_admin(),
            AdminAction::RevokeAdmin
            | AdminAction::PromoteMaster
            | AdminAction::RevokeMaster
            | AdminAction::DeleteUser => actor.is_master_admin(),
        }
    }

    fn protects(&self, action: AdminAction, target: &UserAccount) -> bool {
        match action {
            AdminAction::RevokeAdmin | AdminAction::DeleteUser => target.is_master_admin(),
            AdminAction::RevokeMaster => {
                self.primary_master_email.as_deref() == Some(target.email.as_str())
            }
            _ => false,
        }
    }
}
