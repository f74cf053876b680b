use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Role, StoredProfile, UserAccount, UserId};
use super::inventory::DimensionScores;

/// Admin dashboard filters. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileQuery {
    pub search: Option<String>,
    pub skill: Option<String>,
    /// Only meaningful together with `skill`.
    pub sub_skill: Option<String>,
}

impl ProfileQuery {
    fn search(&self) -> Option<String> {
        non_blank(&self.search).map(str::to_lowercase)
    }

    fn matches(&self, profile: &StoredProfile) -> bool {
        let record = &profile.form_data;

        if let Some(needle) = self.search() {
            let info = &record.personal_info;
            let contains = |value: &str| value.to_lowercase().contains(&needle);
            let hit = contains(info.name.as_str())
                || contains(info.state.as_str())
                || contains(info.email.as_str())
                || record.skills.iter().any(|skill| contains(skill.as_str()))
                || record.behavioral_skills.iter().any(|skill| contains(skill.as_str()));
            if !hit {
                return false;
            }
        }

        if let Some(skill) = non_blank(&self.skill) {
            if !record.skills.iter().any(|selected| selected == skill) {
                return false;
            }
            if let Some(sub_skill) = non_blank(&self.sub_skill) {
                let nested = record.sub_skills.get(skill);
                if !nested.map_or(false, |subs| subs.iter().any(|sub| sub == sub_skill)) {
                    return false;
                }
            }
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleBadge {
    Master,
    Admin,
    VerifiedCoordinator,
    None,
}

impl RoleBadge {
    pub fn for_account(account: Option<&UserAccount>) -> Self {
        let Some(account) = account else {
            return Self::None;
        };
        match account.roles.role() {
            Role::Master => Self::Master,
            Role::Admin => Self::Admin,
            Role::User if account.is_coordinator_verified() => Self::VerifiedCoordinator,
            Role::User => Self::None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Master => "Master Admin",
            Self::Admin => "Admin",
            Self::VerifiedCoordinator => "Verified Coordinator",
            Self::None => "User",
        }
    }
}

/// One directory row.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub state: String,
    pub badge: RoleBadge,
    pub coordinator_verified: bool,
    pub skills: Vec<String>,
    pub behavioral_skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<DimensionScores>,
}

/// Filters stored profiles and joins each with its account's role flags.
pub fn search_profiles(
    profiles: &[StoredProfile],
    accounts: &[UserAccount],
    query: &ProfileQuery,
) -> Vec<DirectoryEntry> {
    profiles
        .iter()
        .filter(|profile| query.matches(profile))
        .map(|profile| {
            let account = accounts.iter().find(|account| account.id == profile.id);
            let info = &profile.form_data.personal_info;
            DirectoryEntry {
                id: profile.id.clone(),
                email: profile.email.clone(),
                name: info.name.clone(),
                state: info.state.clone(),
                badge: RoleBadge::for_account(account),
                coordinator_verified: account.map_or(false, UserAccount::is_coordinator_verified),
                skills: profile.form_data.skills.clone(),
                behavioral_skills: profile.form_data.behavioral_skills.clone(),
                completed_at: profile.completed_at,
                scores: profile.form_data.hexaco_scores.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::questionnaire::domain::{ApplicantRecord, RoleFlags};

    fn profile(id: &str, name: &str, skills: &[&str]) -> StoredProfile {
        let mut record = ApplicantRecord::default();
        record.personal_info.name = name.to_string();
        record.personal_info.state = "Bahia".to_string();
        record.skills = skills.iter().map(|skill| skill.to_string()).collect();
        StoredProfile {
            id: UserId(id.to_string()),
            email: format!("{id}@example.com"),
            form_data: record,
            completed_at: None,
        }
    }

    fn account(id: &str, roles: RoleFlags) -> UserAccount {
        UserAccount {
            id: UserId(id.to_string()),
            email: format!("{id}@example.com"),
            password: "secret".to_string(),
            name: None,
            roles,
        }
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let profiles = vec![
            profile("ana", "Ana Lima", &["Technology"]),
            profile("bruno", "Bruno", &["Education"]),
        ];
        let query = ProfileQuery {
            search: Some("TECH".to_string()),
            ..ProfileQuery::default()
        };

        let rows = search_profiles(&profiles, &[], &query);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, UserId("ana".to_string()));

        let by_state = ProfileQuery {
            search: Some("bahia".to_string()),
            ..ProfileQuery::default()
        };
        assert_eq!(search_profiles(&profiles, &[], &by_state).len(), 2);
    }

    #[test]
    fn sub_skill_filter_applies_under_selected_skill() {
        let mut tagged = profile("ana", "Ana", &["Technology"]);
        tagged
            .form_data
            .sub_skills
            .insert("Technology".to_string(), vec!["Data Science".to_string()]);
        let profiles = vec![tagged, profile("caio", "Caio", &["Technology"])];

        let query = ProfileQuery {
            skill: Some("Technology".to_string()),
            sub_skill: Some("Data Science".to_string()),
            ..ProfileQuery::default()
        };
        let rows = search_profiles(&profiles, &[], &query);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Ana");

        let blank = ProfileQuery {
            skill: Some("  ".to_string()),
            sub_skill: Some("Data Science".to_string()),
            ..ProfileQuery::default()
        };
        assert_eq!(search_profiles(&profiles, &[], &blank).len(), 2);
    }

    #[test]
    fn badges_follow_the_highest_role() {
        let master = RoleFlags {
            is_admin: true,
            is_master_admin: true,
            coordinator_verified: true,
        };
        let verified = RoleFlags {
            coordinator_verified: true,
            ..RoleFlags::default()
        };
        assert_eq!(RoleBadge::for_account(Some(&account("m", master))), RoleBadge::Master);
        assert_eq!(
            RoleBadge::for_account(Some(&account("v", verified))),
            RoleBadge::VerifiedCoordinator
        );
        assert_eq!(RoleBadge::for_account(None), RoleBadge::None);
    }
}
