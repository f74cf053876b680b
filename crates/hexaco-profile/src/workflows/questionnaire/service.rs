use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::accounts::{
    AccountError, AccountService, AdminAction, AdminError, RoleChange, SessionContext,
    SessionToken,
};
use super::catalog::{catalog_view, CatalogView};
use super::directory::{search_profiles, DirectoryEntry, ProfileQuery};
use super::domain::{ApplicantRecord, StoredProfile, UserId};
use super::inventory::{
    questions, DimensionScores, LikertAnchor, Question, ResponseSet, TraitScoringEngine,
    LIKERT_SCALE,
};
use super::repository::{DocumentStore, ProfileRegistry, StoreError};
use super::wizard::{
    check_answer, AdvanceError, EditError, FinishError, StepTransition, ValidationFailure,
    WizardController, WizardView,
};
use crate::config::AccessConfig;

/// One record edit submitted against an active wizard.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WizardEdit {
    SetField { path: String, value: Value },
    Answer {
        #[serde(rename = "questionId")]
        question_id: String,
        value: u8,
    },
    AddExperience,
    RemoveExperience { index: usize },
    AddEducation,
    RemoveEducation { index: usize },
}

/// Account mutations addressable by name from the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    PromoteAdmin,
    RevokeAdmin,
    PromoteMaster,
    RevokeMaster,
    VerifyCoordinator,
    UnverifyCoordinator,
    ClearCompletion,
}

impl AdminCommand {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "promote-admin" => Some(Self::PromoteAdmin),
            "revoke-admin" => Some(Self::RevokeAdmin),
            "promote-master" => Some(Self::PromoteMaster),
            "revoke-master" => Some(Self::RevokeMaster),
            "verify-coordinator" => Some(Self::VerifyCoordinator),
            "unverify-coordinator" => Some(Self::UnverifyCoordinator),
            "clear-completion" => Some(Self::ClearCompletion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub questions: &'static [Question],
    pub scale: &'static [LikertAnchor],
    pub catalog: CatalogView,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvanceOutcome {
    pub transition: StepTransition,
    pub wizard: WizardView,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unknown or expired session")]
    UnknownSession,
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Validation(ValidationFailure),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("already at the results step")]
    AtResults,
    #[error(transparent)]
    Finish(#[from] FinishError),
    #[error("no stored profile for {0}")]
    ProfileNotFound(UserId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AdvanceError> for ServiceError {
    fn from(value: AdvanceError) -> Self {
        match value {
            AdvanceError::Validation(failure) => Self::Validation(failure),
            AdvanceError::AtResults => Self::AtResults,
            AdvanceError::Store(err) => Self::Store(err),
        }
    }
}

type SessionMap = HashMap<SessionToken, SessionContext>;
type WizardMap<S> = HashMap<SessionToken, WizardController<S>>;

/// Facade composing accounts, the scoring engine and per-session wizards.
pub struct QuestionnaireService<S> {
    accounts: AccountService<S>,
    engine: TraitScoringEngine,
    sessions: Mutex<SessionMap>,
    wizards: Mutex<WizardMap<S>>,
}

impl<S> QuestionnaireService<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>, access: AccessConfig) -> Self {
        Self::with_accounts(AccountService::new(store, access))
    }

    pub fn with_accounts(accounts: AccountService<S>) -> Self {
        Self {
            accounts,
            engine: TraitScoringEngine::standard(),
            sessions: Mutex::new(HashMap::new()),
            wizards: Mutex::new(HashMap::new()),
        }
    }

    pub fn accounts(&self) -> &AccountService<S> {
        &self.accounts
    }

    fn registry(&self) -> &ProfileRegistry<S> {
        self.accounts.registry()
    }

    pub fn register(&self, email: &str, password: &str) -> Result<SessionContext, ServiceError> {
        let session = self.accounts.register(email, password)?;
        self.sessions()?.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<SessionContext, ServiceError> {
        let session = self.accounts.login(email, password)?;
        self.sessions()?.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    /// Reopens the stored current identity as a new session, if there is one.
    pub fn resume(&self) -> Result<Option<SessionContext>, ServiceError> {
        let Some(session) = self.accounts.resume()? else {
            return Ok(None);
        };
        self.sessions()?.insert(session.token.clone(), session.clone());
        Ok(Some(session))
    }

    pub fn logout(&self, token: &SessionToken) -> Result<(), ServiceError> {
        let session = self
            .sessions()?
            .remove(token)
            .ok_or(ServiceError::UnknownSession)?;
        self.wizards()?.remove(token);
        self.accounts.logout(&session)?;
        Ok(())
    }

    pub fn session(&self, token: &SessionToken) -> Result<SessionContext, ServiceError> {
        self.sessions()?
            .get(token)
            .cloned()
            .ok_or(ServiceError::UnknownSession)
    }

    pub fn wizard(&self, token: &SessionToken) -> Result<WizardView, ServiceError> {
        self.with_wizard(token, |wizard| Ok(wizard.view()))
    }

    pub fn edit(&self, token: &SessionToken, edit: WizardEdit) -> Result<WizardView, ServiceError> {
        self.with_wizard(token, |wizard| {
            match edit {
                WizardEdit::SetField { path, value } => wizard.edit_field(&path, value)?,
                WizardEdit::Answer { question_id, value } => wizard.answer(&question_id, value)?,
                WizardEdit::AddExperience => {
                    wizard.add_experience();
                }
                WizardEdit::RemoveExperience { index } => {
                    wizard.remove_experience(index)?;
                }
                WizardEdit::AddEducation => {
                    wizard.add_education();
                }
                WizardEdit::RemoveEducation { index } => {
                    wizard.remove_education(index)?;
                }
            }
            Ok(wizard.view())
        })
    }

    pub fn advance(&self, token: &SessionToken) -> Result<AdvanceOutcome, ServiceError> {
        self.with_wizard(token, |wizard| {
            let transition = wizard.advance()?;
            Ok(AdvanceOutcome {
                transition,
                wizard: wizard.view(),
            })
        })
    }

    pub fn retreat(&self, token: &SessionToken) -> Result<AdvanceOutcome, ServiceError> {
        self.with_wizard(token, |wizard| {
            let transition = wizard.retreat();
            Ok(AdvanceOutcome {
                transition,
                wizard: wizard.view(),
            })
        })
    }

    /// Closes the wizard; the next wizard request starts a fresh controller.
    pub fn finish(&self, token: &SessionToken) -> Result<ApplicantRecord, ServiceError> {
        let record = self.with_wizard(token, |wizard| Ok(wizard.finish()?))?;
        self.wizards()?.remove(token);
        Ok(record)
    }

    /// The caller's own stored profile.
    pub fn profile(&self, token: &SessionToken) -> Result<StoredProfile, ServiceError> {
        let session = self.session(token)?;
        self.registry()
            .profile(&session.user_id)?
            .ok_or(ServiceError::ProfileNotFound(session.user_id))
    }

    pub fn directory(
        &self,
        token: &SessionToken,
        query: &ProfileQuery,
    ) -> Result<Vec<DirectoryEntry>, ServiceError> {
        let session = self.session(token)?;
        self.accounts.authorize(&session, AdminAction::ViewDirectory)?;
        let profiles = self.registry().profiles()?;
        let accounts = self.registry().accounts()?;
        Ok(search_profiles(&profiles, &accounts, query))
    }

    pub fn administer(
        &self,
        token: &SessionToken,
        target: &UserId,
        command: AdminCommand,
    ) -> Result<RoleChange, ServiceError> {
        let session = self.session(token)?;
        let change = match command {
            AdminCommand::PromoteAdmin => self.accounts.promote_admin(&session, target)?,
            AdminCommand::RevokeAdmin => self.accounts.revoke_admin(&session, target)?,
            AdminCommand::PromoteMaster => self.accounts.promote_master(&session, target)?,
            AdminCommand::RevokeMaster => self.accounts.revoke_master(&session, target)?,
            AdminCommand::VerifyCoordinator => {
                self.accounts.set_coordinator_verified(&session, target, true)?
            }
            AdminCommand::UnverifyCoordinator => {
                self.accounts.set_coordinator_verified(&session, target, false)?
            }
            AdminCommand::ClearCompletion => {
                let change = self.accounts.clear_completion(&session, target)?;
                self.drop_wizards_for(target)?;
                change
            }
        };
        Ok(change)
    }

    /// Deletes the target and ends every session it holds.
    pub fn delete_user(
        &self,
        token: &SessionToken,
        target: &UserId,
    ) -> Result<RoleChange, ServiceError> {
        let session = self.session(token)?;
        let change = self.accounts.delete_user(&session, target)?;
        self.drop_wizards_for(target)?;
        self.sessions()?.retain(|_, session| &session.user_id != target);
        Ok(change)
    }

    pub fn inventory(&self) -> InventoryView {
        InventoryView {
            questions: questions(),
            scale: &LIKERT_SCALE,
            catalog: catalog_view(),
        }
    }

    /// Scores an arbitrary response set without touching any session.
    pub fn score(&self, responses: &ResponseSet) -> Result<DimensionScores, ServiceError> {
        for (question_id, value) in responses.iter() {
            check_answer(question_id, value)?;
        }
        Ok(self.engine.score(responses))
    }

    fn with_wizard<T, F>(&self, token: &SessionToken, action: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut WizardController<S>) -> Result<T, ServiceError>,
    {
        let session = self.session(token)?;
        let mut wizards = self.wizards()?;
        if !wizards.contains_key(token) {
            let registry = self.registry().clone();
            let controller = WizardController::start(session, registry, self.engine)?;
            wizards.insert(token.clone(), controller);
        }
        let wizard = wizards.get_mut(token).ok_or(ServiceError::UnknownSession)?;
        action(wizard)
    }

    fn drop_wizards_for(&self, user: &UserId) -> Result<(), ServiceError> {
        self.wizards()?
            .retain(|_, wizard| &wizard.session().user_id != user);
        Ok(())
    }

    fn sessions(&self) -> Result<MutexGuard<'_, SessionMap>, ServiceError> {
        self.sessions.lock().map_err(|_| poisoned("sessions"))
    }

    fn wizards(&self) -> Result<MutexGuard<'_, WizardMap<S>>, ServiceError> {
        self.wizards.lock().map_err(|_| poisoned("wizards"))
    }
}

fn poisoned(name: &str) -> ServiceError {
    ServiceError::Store(StoreError::Unavailable(format!("{name} lock poisoned")))
}
