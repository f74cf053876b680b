use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{StoredProfile, UserAccount, UserId};

pub const USERS_KEY: &str = "hexaco_users";
pub const PROFILES_KEY: &str = "hexaco_profiles";
pub const CURRENT_IDENTITY_KEY: &str = "hexaco_current_user";

/// Whole-document key-value storage; last writer wins.
pub trait DocumentStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &str, document: Value) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid document key '{0}'")]
    InvalidKey(String),
    #[error("document '{key}' is not valid: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct IdentityDocument {
    id: UserId,
    email: String,
}

/// Typed view over the users, profiles and current-identity documents.
pub struct ProfileRegistry<S> {
    store: Arc<S>,
}

impl<S> Clone for ProfileRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DocumentStore> ProfileRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn accounts(&self) -> Result<Vec<UserAccount>, StoreError> {
        self.read_collection(USERS_KEY)
    }

    pub fn account(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.accounts()?.into_iter().find(|account| &account.id == id))
    }

    pub fn save_accounts(&self, accounts: &[UserAccount]) -> Result<(), StoreError> {
        self.write_collection(USERS_KEY, accounts)
    }

    pub fn profiles(&self) -> Result<Vec<StoredProfile>, StoreError> {
        self.read_collection(PROFILES_KEY)
    }

    pub fn profile(&self, id: &UserId) -> Result<Option<StoredProfile>, StoreError> {
        Ok(self.profiles()?.into_iter().find(|profile| &profile.id == id))
    }

    pub fn save_profiles(&self, profiles: &[StoredProfile]) -> Result<(), StoreError> {
        self.write_collection(PROFILES_KEY, profiles)
    }

    /// Replaces the profile with the same id, or appends it.
    pub fn upsert_profile(&self, profile: StoredProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles()?;
        match profiles.iter_mut().find(|existing| existing.id == profile.id) {
            Some(existing) => *existing = profile,
            None => profiles.push(profile),
        }
        self.save_profiles(&profiles)
    }

    /// Writes both collections; if the profile write fails the account
    /// snapshot taken before the change is restored.
    pub fn commit(
        &self,
        previous_accounts: &[UserAccount],
        accounts: &[UserAccount],
        profiles: &[StoredProfile],
    ) -> Result<(), StoreError> {
        self.save_accounts(accounts)?;
        if let Err(err) = self.save_profiles(profiles) {
            if let Err(rollback) = self.save_accounts(previous_accounts) {
                tracing::warn!(error = %rollback, "failed to restore accounts after partial write");
            }
            return Err(err);
        }
        Ok(())
    }

    pub fn current_identity(&self) -> Result<Option<UserId>, StoreError> {
        match self.store.get(CURRENT_IDENTITY_KEY)? {
            Some(document) => {
                let identity: IdentityDocument =
                    serde_json::from_value(document).map_err(|source| StoreError::Corrupt {
                        key: CURRENT_IDENTITY_KEY.to_string(),
                        source,
                    })?;
                Ok(Some(identity.id))
            }
            None => Ok(None),
        }
    }

    pub fn set_current_identity(&self, account: &UserAccount) -> Result<(), StoreError> {
        let document = IdentityDocument {
            id: account.id.clone(),
            email: account.email.clone(),
        };
        self.write_document(CURRENT_IDENTITY_KEY, &document)
    }

    pub fn clear_current_identity(&self) -> Result<(), StoreError> {
        self.store.delete(CURRENT_IDENTITY_KEY)
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.store.get(key)? {
            Some(document) => serde_json::from_value(document).map_err(|source| {
                StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }
            }),
            None => Ok(Vec::new()),
        }
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        self.write_document(key, items)
    }

    fn write_document<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let document = serde_json::to_value(value).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, document)
    }
}
