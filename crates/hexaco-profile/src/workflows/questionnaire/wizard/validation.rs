use serde::Serialize;

use super::super::domain::{ApplicantRecord, PersonalInfo};
use super::super::inventory::ITEM_COUNT;
use super::steps::WizardStep;

/// Personal-info fields that must be filled before leaving the first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    Name,
    Whatsapp,
    Email,
    ConfirmEmail,
    State,
}

impl PersonalField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Whatsapp => "whatsapp",
            Self::Email => "email",
            Self::ConfirmEmail => "confirmEmail",
            Self::State => "state",
        }
    }

    fn value(self, info: &PersonalInfo) -> &str {
        match self {
            Self::Name => &info.name,
            Self::Whatsapp => &info.whatsapp,
            Self::Email => &info.email,
            Self::ConfirmEmail => &info.confirm_email,
            Self::State => &info.state,
        }
    }
}

/// Reason a step cannot be left yet. Always recoverable by editing the record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("missing required field: {}", .0.label())]
    MissingRequiredField(PersonalField),
    #[error("emails do not match")]
    EmailMismatch,
    #[error("select at least one knowledge area")]
    NoSkillSelected,
    #[error("select at least one behavioral skill")]
    NoBehavioralSkillSelected,
    #[error("answer every statement ({answered} of {required} answered)")]
    InventoryIncomplete { answered: usize, required: usize },
    #[error("add at least one professional experience")]
    NoExperience,
    #[error("experience {} is missing its {field}", .index + 1)]
    IncompleteExperience { index: usize, field: &'static str },
    #[error("select at least one language")]
    NoLanguage,
    #[error("add at least one education entry")]
    NoEducation,
    #[error("education entry {} is missing its {field}", .index + 1)]
    IncompleteEducation { index: usize, field: &'static str },
    #[error("the reflection question must be answered")]
    MissingReflection,
}

impl ValidationFailure {
    /// Stable machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingRequiredField(_) => "missing_required_field",
            Self::EmailMismatch => "email_mismatch",
            Self::NoSkillSelected => "no_skill_selected",
            Self::NoBehavioralSkillSelected => "no_behavioral_skill_selected",
            Self::InventoryIncomplete { .. } => "inventory_incomplete",
            Self::NoExperience => "no_experience",
            Self::IncompleteExperience { .. } => "incomplete_experience",
            Self::NoLanguage => "no_language",
            Self::NoEducation => "no_education",
            Self::IncompleteEducation { .. } => "incomplete_education",
            Self::MissingReflection => "missing_reflection",
        }
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Runs the predicate guarding the exit of `step`.
pub fn validate_step(step: WizardStep, record: &ApplicantRecord) -> Result<(), ValidationFailure> {
    match step {
        WizardStep::PersonalInfo => validate_personal_info(&record.personal_info),
        WizardStep::Skills => {
            if record.skills.is_empty() {
                Err(ValidationFailure::NoSkillSelected)
            } else {
                Ok(())
            }
        }
        WizardStep::BehavioralSkills => {
            if record.behavioral_skills.is_empty() {
                Err(ValidationFailure::NoBehavioralSkillSelected)
            } else {
                Ok(())
            }
        }
        WizardStep::Hexaco => {
            let missing = record.hexaco_responses.unanswered().len();
            if missing > 0 {
                Err(ValidationFailure::InventoryIncomplete {
                    answered: ITEM_COUNT - missing,
                    required: ITEM_COUNT,
                })
            } else {
                Ok(())
            }
        }
        WizardStep::Curriculum => validate_curriculum(record),
        WizardStep::SubSkills | WizardStep::Results => Ok(()),
    }
}

fn validate_personal_info(info: &PersonalInfo) -> Result<(), ValidationFailure> {
    if !blank(&info.email) && !blank(&info.confirm_email) && info.email != info.confirm_email {
        return Err(ValidationFailure::EmailMismatch);
    }

    for field in [
        PersonalField::Name,
        PersonalField::Whatsapp,
        PersonalField::Email,
        PersonalField::ConfirmEmail,
        PersonalField::State,
    ] {
        if blank(field.value(info)) {
            return Err(ValidationFailure::MissingRequiredField(field));
        }
    }

    Ok(())
}

fn validate_curriculum(record: &ApplicantRecord) -> Result<(), ValidationFailure> {
    let curriculum = &record.curriculum;

    if curriculum.experiences.is_empty() {
        return Err(ValidationFailure::NoExperience);
    }
    for (index, entry) in curriculum.experiences.iter().enumerate() {
        let missing = [
            ("role", &entry.role),
            ("organization", &entry.organization),
            ("duration", &entry.duration),
        ]
        .into_iter()
        .find(|(_, value)| blank(value));
        if let Some((field, _)) = missing {
            return Err(ValidationFailure::IncompleteExperience { index, field });
        }
    }

    if curriculum.languages.is_empty() {
        return Err(ValidationFailure::NoLanguage);
    }

    if curriculum.education.is_empty() {
        return Err(ValidationFailure::NoEducation);
    }
    for (index, entry) in curriculum.education.iter().enumerate() {
        let missing = [("course", &entry.course), ("institution", &entry.institution)]
            .into_iter()
            .find(|(_, value)| blank(value));
        if let Some((field, _)) = missing {
            return Err(ValidationFailure::IncompleteEducation { index, field });
        }
    }

    match record.important_truth.as_deref() {
        Some(answer) if !blank(answer) => Ok(()),
        _ => Err(ValidationFailure::MissingReflection),
    }
}
