//! Step-by-step questionnaire session.
//!
//! A [`WizardController`] owns one respondent's working [`ApplicantRecord`]
//! and the position in the fixed step sequence. Leaving the checkpoint step
//! scores the inventory and persists the record; from then on the inventory
//! is locked and skipped in both directions.

mod patch;
mod steps;
mod validation;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::accounts::SessionContext;
use super::catalog::skills_with_sub_skills;
use super::domain::{ApplicantRecord, EducationEntry, ExperienceEntry, StoredProfile};
use super::inventory::TraitScoringEngine;
use super::repository::{DocumentStore, ProfileRegistry, StoreError};

pub use patch::EditError;
pub(crate) use patch::check_answer;
pub use steps::WizardStep;
pub use validation::{validate_step, PersonalField, ValidationFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SessionState {
    step: WizardStep,
    /// Set once a complete response set has been persisted.
    hexaco_locked: bool,
}

/// Informational messages attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardNotice {
    /// The inventory step was skipped because it has already been completed.
    HexacoLocked,
}

impl WizardNotice {
    pub const fn message(self) -> &'static str {
        match self {
            Self::HexacoLocked => {
                "the HEXACO inventory has already been completed and cannot be repeated"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepTransition {
    pub from: WizardStep,
    pub to: WizardStep,
    pub notices: Vec<WizardNotice>,
    /// Whether this transition wrote the scored record to the store.
    pub persisted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AdvanceError {
    #[error(transparent)]
    Validation(ValidationFailure),
    #[error("already at the results step")]
    AtResults,
    #[error("failed to persist the profile: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FinishError {
    #[error(
        "the wizard can only be finished from the results step (currently at {})",
        .step.label()
    )]
    NotAtResults { step: WizardStep },
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureView {
    pub code: &'static str,
    pub message: String,
}

impl From<&ValidationFailure> for FailureView {
    fn from(failure: &ValidationFailure) -> Self {
        Self {
            code: failure.code(),
            message: failure.to_string(),
        }
    }
}

/// Snapshot of a session for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: WizardStep,
    pub step_label: &'static str,
    pub step_index: usize,
    pub step_count: usize,
    pub progress: f64,
    pub hexaco_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<FailureView>,
    pub sub_skill_targets: Vec<String>,
    pub unanswered_questions: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub record: ApplicantRecord,
}

pub struct WizardController<S> {
    session: SessionContext,
    registry: ProfileRegistry<S>,
    engine: TraitScoringEngine,
    record: ApplicantRecord,
    state: SessionState,
    completed_at: Option<DateTime<Utc>>,
    last_failure: Option<ValidationFailure>,
}

impl<S: DocumentStore> WizardController<S> {
    /// Opens a session at the first step, rehydrating any stored record.
    ///
    /// A stored record whose inventory is complete starts locked.
    pub fn start(
        session: SessionContext,
        registry: ProfileRegistry<S>,
        engine: TraitScoringEngine,
    ) -> Result<Self, StoreError> {
        let stored = registry.profile(&session.user_id)?;
        let (mut record, completed_at) = match stored {
            Some(profile) => (profile.form_data, profile.completed_at),
            None => (ApplicantRecord::default(), None),
        };
        if record.personal_info.email.trim().is_empty() {
            record.personal_info.email = session.email.clone();
        }
        let hexaco_locked = record.hexaco_responses.is_complete();

        info!(user = %session.user_id, locked = hexaco_locked, "wizard session started");
        Ok(Self {
            session,
            registry,
            engine,
            record,
            state: SessionState {
                step: WizardStep::PersonalInfo,
                hexaco_locked,
            },
            completed_at,
            last_failure: None,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.step
    }

    pub fn is_hexaco_locked(&self) -> bool {
        self.state.hexaco_locked
    }

    /// Fraction of the sequence reached, counting the current step.
    pub fn progress(&self) -> f64 {
        (self.state.step.index() + 1) as f64 / WizardStep::COUNT as f64
    }

    pub fn last_failure(&self) -> Option<&ValidationFailure> {
        self.last_failure.as_ref()
    }

    pub fn record(&self) -> &ApplicantRecord {
        &self.record
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            step: self.state.step,
            step_label: self.state.step.label(),
            step_index: self.state.step.index(),
            step_count: WizardStep::COUNT,
            progress: self.progress(),
            hexaco_locked: self.state.hexaco_locked,
            last_failure: self.last_failure.as_ref().map(FailureView::from),
            sub_skill_targets: skills_with_sub_skills(&self.record.skills)
                .into_iter()
                .map(str::to_string)
                .collect(),
            unanswered_questions: self.record.hexaco_responses.unanswered(),
            completed_at: self.completed_at,
            record: self.record.clone(),
        }
    }

    /// Validates the current step and moves forward.
    ///
    /// On any error the step, the record and the store are unchanged.
    pub fn advance(&mut self) -> Result<StepTransition, AdvanceError> {
        let from = self.state.step;
        let next = from.next().ok_or(AdvanceError::AtResults)?;

        if let Err(failure) = validate_step(from, &self.record) {
            debug!(
                user = %self.session.user_id,
                step = from.label(),
                code = failure.code(),
                "step validation failed"
            );
            self.last_failure = Some(failure.clone());
            return Err(AdvanceError::Validation(failure));
        }
        self.last_failure = None;

        let persisted = from == WizardStep::CHECKPOINT;
        if persisted {
            self.checkpoint()?;
        }

        let mut notices = Vec::new();
        let to = if next == WizardStep::Hexaco && self.state.hexaco_locked {
            notices.push(WizardNotice::HexacoLocked);
            WizardStep::Curriculum
        } else {
            next
        };
        self.state.step = to;

        info!(
            user = %self.session.user_id,
            from = from.label(),
            to = to.label(),
            "wizard advanced"
        );
        Ok(StepTransition {
            from,
            to,
            notices,
            persisted,
        })
    }

    /// Moves back one step without validation; stays put on the first step.
    pub fn retreat(&mut self) -> StepTransition {
        let from = self.state.step;
        let mut notices = Vec::new();
        let to = match from.previous() {
            Some(WizardStep::Hexaco) if self.state.hexaco_locked => {
                notices.push(WizardNotice::HexacoLocked);
                WizardStep::BehavioralSkills
            }
            Some(previous) => previous,
            None => from,
        };
        self.state.step = to;

        debug!(
            user = %self.session.user_id,
            from = from.label(),
            to = to.label(),
            "wizard retreated"
        );
        StepTransition {
            from,
            to,
            notices,
            persisted: false,
        }
    }

    /// Writes `value` at a dotted record path such as `personalInfo.name`.
    pub fn edit_field(&mut self, path: &str, value: Value) -> Result<(), EditError> {
        let path = patch::FieldPath::parse(path)?;
        if path.touches_responses() {
            self.ensure_unlocked()?;
        }
        self.record = patch::apply(&self.record, &path, value)?;
        Ok(())
    }

    /// Records one Likert answer.
    pub fn answer(&mut self, question_id: &str, value: u8) -> Result<(), EditError> {
        self.ensure_unlocked()?;
        patch::check_answer(question_id, value)?;
        self.record.hexaco_responses.insert(question_id, value);
        Ok(())
    }

    pub fn add_experience(&mut self) -> usize {
        self.record
            .curriculum
            .experiences
            .push(ExperienceEntry::default());
        self.record.curriculum.experiences.len() - 1
    }

    pub fn remove_experience(&mut self, index: usize) -> Result<ExperienceEntry, EditError> {
        let experiences = &mut self.record.curriculum.experiences;
        if index >= experiences.len() {
            return Err(EditError::IndexOutOfRange {
                path: "curriculum.experiences".to_string(),
                index,
            });
        }
        Ok(experiences.remove(index))
    }

    pub fn add_education(&mut self) -> usize {
        self.record
            .curriculum
            .education
            .push(EducationEntry::default());
        self.record.curriculum.education.len() - 1
    }

    pub fn remove_education(&mut self, index: usize) -> Result<EducationEntry, EditError> {
        let education = &mut self.record.curriculum.education;
        if index >= education.len() {
            return Err(EditError::IndexOutOfRange {
                path: "curriculum.education".to_string(),
                index,
            });
        }
        Ok(education.remove(index))
    }

    /// Ends the session; only valid on the results step.
    pub fn finish(&self) -> Result<ApplicantRecord, FinishError> {
        if !self.state.step.is_terminal() {
            return Err(FinishError::NotAtResults {
                step: self.state.step,
            });
        }
        info!(user = %self.session.user_id, "wizard finished");
        Ok(self.record.clone())
    }

    fn ensure_unlocked(&self) -> Result<(), EditError> {
        if self.state.hexaco_locked {
            return Err(EditError::InventoryLocked);
        }
        Ok(())
    }

    /// Scores a copy of the record and stores it; the working record is only
    /// replaced once the write succeeds.
    fn checkpoint(&mut self) -> Result<(), StoreError> {
        let mut scored = self.record.clone();
        scored.hexaco_scores = Some(self.engine.score(&scored.hexaco_responses));
        let completed_at = Utc::now();

        self.registry.upsert_profile(StoredProfile {
            id: self.session.user_id.clone(),
            email: self.session.email.clone(),
            form_data: scored.clone(),
            completed_at: Some(completed_at),
        })?;

        self.state.hexaco_locked = scored.hexaco_responses.is_complete();
        self.record = scored;
        self.completed_at = Some(completed_at);
        info!(user = %self.session.user_id, "profile scored and saved");
        Ok(())
    }
}
