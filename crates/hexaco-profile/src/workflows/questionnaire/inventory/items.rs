use serde::Serialize;

use super::Dimension;

pub const ITEM_COUNT: usize = 24;

/// Immutable inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub text: &'static str,
    pub dimension: Dimension,
    pub reversed: bool,
}

const fn item(
    id: &'static str,
    dimension: Dimension,
    reversed: bool,
    text: &'static str,
) -> Question {
    Question {
        id,
        text,
        dimension,
        reversed,
    }
}

static QUESTIONS: [Question; ITEM_COUNT] = [
    item("E1", Dimension::E, false, "I tend to feel anxious when facing something completely new."),
    item("C4", Dimension::C, true, "I struggle to stay focused on projects that take a long time."),
    item("A1", Dimension::A, false, "I tend to forgive quickly when someone hurts me."),
    item(
        "H2",
        Dimension::H,
        true,
        "I would do anything to get ahead, even if it harmed other people.",
    ),
    item(
        "O2",
        Dimension::O,
        true,
        "I find it boring to learn about subjects that do not apply directly to my daily life.",
    ),
    item("E4", Dimension::E, true, "I rarely worry about anything; it hardly affects me."),
    item("X3", Dimension::X, false, "I feel energised when I am the centre of attention."),
    item("H1", Dimension::H, false, "I would not accept a bribe, even a very large one."),
    item(
        "A4",
        Dimension::A,
        true,
        "If someone offends me, I tend to hold a grudge for a long time.",
    ),
    item("C1", Dimension::C, false, "I usually prepare for my tasks well ahead of time."),
    item(
        "O3",
        Dimension::O,
        false,
        "I enjoy taking part in artistic or cultural activities I have never tried before.",
    ),
    item("E2", Dimension::E, true, "I can stay calm even in very stressful situations."),
    item(
        "O4",
        Dimension::O,
        true,
        "I rarely enjoy reading about philosophical or theoretical concepts.",
    ),
    item(
        "A3",
        Dimension::A,
        false,
        "I usually keep small arguments from turning into big conflicts.",
    ),
    item(
        "H3",
        Dimension::H,
        true,
        "I do not usually feel bad about lying if it gives me an advantage.",
    ),
    item("X4", Dimension::X, true, "I prefer to keep to myself, even among friends."),
    item("C3", Dimension::C, false, "I like to keep my workspace and belongings well organised."),
    item("E3", Dimension::E, false, "Sometimes I feel overwhelmed by my own emotions."),
    item(
        "H4",
        Dimension::H,
        false,
        "I prefer to be completely sincere, even when a small lie would be easy to get away with.",
    ),
    item("A2", Dimension::A, true, "I often criticise people when they make mistakes."),
    item(
        "O1",
        Dimension::O,
        false,
        "I take pleasure in exploring ideas or theories that may seem abstract.",
    ),
    item("X1", Dimension::X, false, "I love being in large groups where I can meet new people."),
    item("C2", Dimension::C, true, "I tend to waste time instead of getting straight to my tasks."),
    item("X2", Dimension::X, false, "I prefer activities that let me be with other people."),
];

/// All items in presentation order.
pub fn questions() -> &'static [Question] {
    &QUESTIONS
}

pub fn question(id: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|question| question.id == id)
}

/// Labelled point on the agreement scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikertAnchor {
    pub value: u8,
    pub label: &'static str,
}

pub static LIKERT_SCALE: [LikertAnchor; 5] = [
    LikertAnchor { value: 1, label: "Strongly disagree" },
    LikertAnchor { value: 2, label: "Partially disagree" },
    LikertAnchor { value: 3, label: "Neutral" },
    LikertAnchor { value: 4, label: "Partially agree" },
    LikertAnchor { value: 5, label: "Strongly agree" },
];
