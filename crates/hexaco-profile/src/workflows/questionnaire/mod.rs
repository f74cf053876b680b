//! HEXACO applicant questionnaire: the item bank and scorer, the multi-step
//! wizard that collects an [`ApplicantRecord`], local accounts with role-gated
//! administration, and the HTTP surface over all of it.
//!
//! Persistence goes through the [`DocumentStore`] seam; an in-memory and a
//! directory-backed implementation are provided.

pub mod accounts;
pub mod catalog;
pub mod directory;
pub mod domain;
pub mod inventory;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use accounts::{
    AccountError, AccountService, AdminAction, AdminError, AuthorizationPolicy, RoleChange,
    RolePolicy, SessionContext, SessionToken,
};
pub use directory::{DirectoryEntry, ProfileQuery, RoleBadge};
pub use domain::{
    ApplicantRecord, Curriculum, EducationEntry, EducationLevel, ExperienceEntry, PersonalInfo,
    Role, RoleFlags, StoredProfile, UserAccount, UserId,
};
pub use inventory::{Dimension, DimensionScores, ResponseSet, TraitScoringEngine, ITEM_COUNT};
pub use repository::{DocumentStore, ProfileRegistry, StoreError};
pub use router::{questionnaire_router, SESSION_HEADER};
pub use service::{AdminCommand, QuestionnaireService, ServiceError, WizardEdit};
pub use store::{DirectoryDocumentStore, MemoryDocumentStore};
pub use wizard::{
    AdvanceError, EditError, FinishError, StepTransition, ValidationFailure, WizardController,
    WizardNotice, WizardStep, WizardView,
};
