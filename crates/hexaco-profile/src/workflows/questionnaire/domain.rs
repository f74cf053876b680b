use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::inventory::{DimensionScores, ResponseSet};

/// Identifier wrapper for registered identities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact and identity details collected on the first step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub whatsapp: String,
    pub email: String,
    pub confirm_email: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub is_coordinator: bool,
    pub did_academy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub role: String,
    pub organization: String,
    pub duration: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    Fundamental,
    HighSchool,
    Technical,
    Undergraduate,
    Postgraduate,
    Masters,
    Doctorate,
}

impl EducationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fundamental => "Fundamental education",
            Self::HighSchool => "High school",
            Self::Technical => "Technical education",
            Self::Undergraduate => "Undergraduate",
            Self::Postgraduate => "Postgraduate",
            Self::Masters => "Master's degree",
            Self::Doctorate => "Doctorate",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub course: String,
    pub institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<EducationLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Curriculum {
    pub experiences: Vec<ExperienceEntry>,
    pub languages: Vec<String>,
    pub portfolio: String,
    pub education: Vec<EducationEntry>,
}

/// Everything one respondent provides across the wizard.
///
/// All sections exist from session start and are filled in progressively;
/// `scores` is derived and only written by the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicantRecord {
    pub personal_info: PersonalInfo,
    pub skills: Vec<String>,
    pub sub_skills: BTreeMap<String, Vec<String>>,
    pub behavioral_skills: Vec<String>,
    pub hexaco_responses: ResponseSet,
    pub curriculum: Curriculum,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important_truth: Option<String>,
    pub is_public_servant: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_service_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hexaco_scores: Option<DimensionScores>,
}

/// Durable copy of a respondent's record plus identity and completion metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub id: UserId,
    pub email: String,
    pub form_data: ApplicantRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StoredProfile {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Role flags attached to an identity.
/// `coordinator_verified` is a badge independent of the admin tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleFlags {
    pub is_admin: bool,
    pub is_master_admin: bool,
    pub coordinator_verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    Master,
}

impl RoleFlags {
    pub fn role(&self) -> Role {
        if self.is_master_admin {
            Role::Master
        } else if self.is_admin {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn set_role(&mut self, role: Role) {
        self.is_master_admin = role == Role::Master;
        self.is_admin = role != Role::User;
    }
}

/// Registered identity with its locally checked credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub roles: RoleFlags,
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl UserAccount {
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin || self.roles.is_master_admin
    }

    pub fn is_master_admin(&self) -> bool {
        self.roles.is_master_admin
    }

    pub fn is_coordinator_verified(&self) -> bool {
        self.roles.coordinator_verified
    }
}

/// Applies the contact mask: digits only, at most 11, `(DD) DDDD-DDDD` or
/// `(DD) DDDDD-DDDD` once long enough.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(11).collect();

    match digits.len() {
        0..=2 => digits,
        3..=6 => format!("({}) {}", &digits[..2], &digits[2..]),
        7..=10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
    }
}
