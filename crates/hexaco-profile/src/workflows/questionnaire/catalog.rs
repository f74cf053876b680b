//! Static tag vocabularies offered by the skills, behavioural and curriculum steps.

use serde::Serialize;

pub static MAIN_SKILLS: &[&str] = &[
    "Administration",
    "Communication",
    "Design",
    "Law",
    "Education",
    "Finance",
    "Marketing",
    "Politics",
    "Technology",
    "Video Production",
];

static SUB_SKILLS: &[(&str, &[&str])] = &[
    (
        "Communication",
        &["Copywriting", "Public speaking", "Press relations", "Social media"],
    ),
    (
        "Design",
        &["Branding", "Illustration", "UI/UX", "Motion graphics"],
    ),
    (
        "Marketing",
        &["Paid traffic", "SEO", "Email marketing", "Analytics"],
    ),
    (
        "Technology",
        &["Backend", "Frontend", "Data engineering", "DevOps", "Mobile"],
    ),
    (
        "Video Production",
        &["Editing", "Filming", "Scriptwriting", "Colour grading"],
    ),
];

pub static BEHAVIORAL_SKILLS: &[&str] = &[
    "Leadership",
    "Teamwork",
    "Resilience",
    "Proactivity",
    "Empathy",
    "Organisation",
    "Creativity",
    "Critical thinking",
    "Negotiation",
    "Adaptability",
    "Time management",
    "Conflict resolution",
];

pub static LANGUAGES: &[&str] = &[
    "Portuguese",
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Mandarin",
    "Japanese",
    "Russian",
    "Arabic",
];

/// Sub-skill tags nested under a top-level skill, if that skill has any.
pub fn sub_skills_for(skill: &str) -> Option<&'static [&'static str]> {
    SUB_SKILLS
        .iter()
        .find(|(name, _)| *name == skill)
        .map(|(_, subs)| *subs)
}

/// Selected skills that expose a sub-skill choice, preserving selection order.
pub fn skills_with_sub_skills(selected: &[String]) -> Vec<&str> {
    selected
        .iter()
        .map(String::as_str)
        .filter(|skill| sub_skills_for(skill).is_some())
        .collect()
}

/// Serializable snapshot handed to presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub skills: Vec<SkillEntry>,
    pub behavioral_skills: &'static [&'static str],
    pub languages: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillEntry {
    pub name: &'static str,
    pub sub_skills: &'static [&'static str],
}

pub fn catalog_view() -> CatalogView {
    CatalogView {
        skills: MAIN_SKILLS
            .iter()
            .map(|name| SkillEntry {
                name: *name,
                sub_skills: sub_skills_for(name).unwrap_or(&[]),
            })
            .collect(),
        behavioral_skills: BEHAVIORAL_SKILLS,
        languages: LANGUAGES,
    }
}
