//! Local identities, explicit sessions and the role-gated admin operations.

mod admin;
mod policy;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Role, RoleFlags, UserAccount, UserId};
use super::repository::{DocumentStore, ProfileRegistry, StoreError};
use crate::config::AccessConfig;

pub use admin::{AdminError, RoleChange};
pub use policy::{AdminAction, AuthorizationPolicy, RolePolicy};

static IDENTITY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_sequence() -> u64 {
    IDENTITY_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

fn next_user_id() -> UserId {
    UserId(format!(
        "user-{}-{:04}",
        Utc::now().timestamp_millis(),
        next_sequence()
    ))
}

/// Opaque handle presented by callers to address an active session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    fn issue() -> Self {
        Self(format!(
            "sess-{:x}-{:06}",
            Utc::now().timestamp_millis(),
            next_sequence()
        ))
    }
}

/// An authenticated identity, created by login/registration and ended by logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub token: SessionToken,
    pub user_id: UserId,
    pub email: String,
    pub started_at: DateTime<Utc>,
}

impl SessionContext {
    fn open(account: &UserAccount) -> Self {
        Self {
            token: SessionToken::issue(),
            user_id: account.id.clone(),
            email: account.email.clone(),
            started_at: Utc::now(),
        }
    }
}

/// Error raised by registration, login and session lookups.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("an account already exists for {0}")]
    DuplicateIdentity(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("identity {0} no longer exists")]
    UnknownIdentity(UserId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registration, login and role administration over the document store.
pub struct AccountService<S> {
    registry: ProfileRegistry<S>,
    access: AccessConfig,
    policy: Arc<dyn AuthorizationPolicy>,
}

impl<S: DocumentStore> AccountService<S> {
    pub fn new(store: Arc<S>, access: AccessConfig) -> Self {
        let primary = access.master.as_ref().map(|master| master.email.clone());
        Self::with_policy(store, access, Arc::new(RolePolicy::new(primary)))
    }

    pub fn with_policy(
        store: Arc<S>,
        access: AccessConfig,
        policy: Arc<dyn AuthorizationPolicy>,
    ) -> Self {
        Self {
            registry: ProfileRegistry::new(store),
            access,
            policy,
        }
    }

    pub fn registry(&self) -> &ProfileRegistry<S> {
        &self.registry
    }

    /// Creates an identity and logs it in.
    pub fn register(&self, email: &str, password: &str) -> Result<SessionContext, AccountError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials);
        }

        let mut accounts = self.registry.accounts()?;
        if accounts.iter().any(|account| account.email == email) {
            return Err(AccountError::DuplicateIdentity(email.to_string()));
        }

        let mut roles = RoleFlags::default();
        if self.access.is_bootstrap_admin(email) {
            roles.set_role(Role::Admin);
        }
        let account = UserAccount {
            id: next_user_id(),
            email: email.to_string(),
            password: password.to_string(),
            name: None,
            roles,
        };
        accounts.push(account.clone());
        self.registry.save_accounts(&accounts)?;

        info!(user = %account.id, role = ?account.roles.role(), "registered identity");
        self.open_session(&account)
    }

    /// Checks credentials; configured master credentials create or upgrade the master account.
    pub fn login(&self, email: &str, password: &str) -> Result<SessionContext, AccountError> {
        let email = email.trim();
        let mut accounts = self.registry.accounts()?;

        let is_master_login = self
            .access
            .master
            .as_ref()
            .map(|master| master.email == email && master.password == password)
            .unwrap_or(false);

        if is_master_login {
            let account = match accounts.iter().position(|account| account.email == email) {
                Some(index) => {
                    accounts[index].roles.set_role(Role::Master);
                    accounts[index].clone()
                }
                None => {
                    let mut roles = RoleFlags::default();
                    roles.set_role(Role::Master);
                    let account = UserAccount {
                        id: next_user_id(),
                        email: email.to_string(),
                        password: password.to_string(),
                        name: Some("Admin Master".to_string()),
                        roles,
                    };
                    accounts.push(account.clone());
                    account
                }
            };
            self.registry.save_accounts(&accounts)?;
            info!(user = %account.id, "master admin signed in");
            return self.open_session(&account);
        }

        match accounts
            .into_iter()
            .find(|account| account.email == email && account.password == password)
        {
            Some(account) => {
                info!(user = %account.id, "signed in");
                self.open_session(&account)
            }
            None => Err(AccountError::InvalidCredentials),
        }
    }

    /// Ends the session and clears the stored current identity if it is this one.
    pub fn logout(&self, session: &SessionContext) -> Result<(), AccountError> {
        if self.registry.current_identity()?.as_ref() == Some(&session.user_id) {
            self.registry.clear_current_identity()?;
        }
        info!(user = %session.user_id, "signed out");
        Ok(())
    }

    /// Rebuilds a session from the stored current identity.
    pub fn resume(&self) -> Result<Option<SessionContext>, AccountError> {
        let Some(id) = self.registry.current_identity()? else {
            return Ok(None);
        };
        match self.registry.account(&id)? {
            Some(account) => Ok(Some(SessionContext::open(&account))),
            None => {
                self.registry.clear_current_identity()?;
                Ok(None)
            }
        }
    }

    /// Fresh snapshot of the session's account, including current role flags.
    pub fn account(&self, session: &SessionContext) -> Result<UserAccount, AccountError> {
        self.registry
            .account(&session.user_id)?
            .ok_or_else(|| AccountError::UnknownIdentity(session.user_id.clone()))
    }

    fn open_session(&self, account: &UserAccount) -> Result<SessionContext, AccountError> {
        self.registry.set_current_identity(account)?;
        Ok(SessionContext::open(account))
    }
}
