use serde::{Deserialize, Serialize};

/// Ordered questionnaire steps; `Results` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PersonalInfo,
    Skills,
    SubSkills,
    BehavioralSkills,
    Hexaco,
    Curriculum,
    Results,
}

impl WizardStep {
    pub const COUNT: usize = 7;

    /// Advancing past this step scores the inventory and persists the record.
    pub const CHECKPOINT: Self = Self::Curriculum;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::PersonalInfo,
            Self::Skills,
            Self::SubSkills,
            Self::BehavioralSkills,
            Self::Hexaco,
            Self::Curriculum,
            Self::Results,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonalInfo => "Personal Information",
            Self::Skills => "Knowledge Areas",
            Self::SubSkills => "Specific Skills",
            Self::BehavioralSkills => "Behavioral Skills",
            Self::Hexaco => "HEXACO Assessment",
            Self::Curriculum => "Curriculum",
            Self::Results => "Results",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::PersonalInfo => 0,
            Self::Skills => 1,
            Self::SubSkills => 2,
            Self::BehavioralSkills => 3,
            Self::Hexaco => 4,
            Self::Curriculum => 5,
            Self::Results => 6,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ordered().get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Results)
    }
}
