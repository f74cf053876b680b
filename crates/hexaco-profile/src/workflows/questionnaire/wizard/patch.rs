use serde_json::{Map, Value};

use super::super::domain::{format_phone_number, ApplicantRecord};
use super::super::inventory::{question, LIKERT_MAX, LIKERT_MIN};

const RESPONSES_ROOT: &str = "hexacoResponses";
const SCORES_ROOT: &str = "hexacoScores";
const EDITABLE_ROOTS: &[&str] = &[
    "personalInfo",
    "skills",
    "subSkills",
    "behavioralSkills",
    RESPONSES_ROOT,
    "curriculum",
    "importantTruth",
    "isPublicServant",
    "publicServiceArea",
];

/// Rejected record edit. The record is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("the HEXACO inventory is already complete and cannot be changed")]
    InventoryLocked,
    #[error("'{0}' is computed and cannot be edited")]
    DerivedField(String),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("answer for {question_id} must be between 1 and 5")]
    OutOfRange { question_id: String },
    #[error("index {index} is out of range for '{path}'")]
    IndexOutOfRange { path: String, index: usize },
    #[error("invalid value for '{path}': {reason}")]
    InvalidValue { path: String, reason: String },
}

impl EditError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InventoryLocked => "inventory_locked",
            Self::DerivedField(_) => "derived_field",
            Self::UnknownField(_) => "unknown_field",
            Self::UnknownQuestion(_) => "unknown_question",
            Self::OutOfRange { .. } => "out_of_range",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::InvalidValue { .. } => "invalid_value",
        }
    }
}

/// Parsed dotted path such as `curriculum.experiences.0.duration`.
pub(crate) struct FieldPath<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> FieldPath<'a> {
    pub(crate) fn parse(raw: &'a str) -> Result<Self, EditError> {
        let segments: Vec<&str> = raw.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(EditError::UnknownField(raw.to_string()));
        }
        let root = segments[0];
        if root == SCORES_ROOT {
            return Err(EditError::DerivedField(raw.to_string()));
        }
        if !EDITABLE_ROOTS.contains(&root) {
            return Err(EditError::UnknownField(raw.to_string()));
        }
        Ok(Self { raw, segments })
    }

    pub(crate) fn touches_responses(&self) -> bool {
        self.segments[0] == RESPONSES_ROOT
    }
}

/// Validates a single Likert answer against the item bank.
pub(crate) fn check_answer(question_id: &str, value: u8) -> Result<(), EditError> {
    if question(question_id).is_none() {
        return Err(EditError::UnknownQuestion(question_id.to_string()));
    }
    if !(LIKERT_MIN..=LIKERT_MAX).contains(&value) {
        return Err(EditError::OutOfRange {
            question_id: question_id.to_string(),
        });
    }
    Ok(())
}

fn answer_value(question_id: &str, value: &Value) -> Result<u8, EditError> {
    let number = value
        .as_u64()
        .filter(|number| *number <= u8::MAX as u64)
        .ok_or_else(|| EditError::OutOfRange {
            question_id: question_id.to_string(),
        })?;
    let number = number as u8;
    check_answer(question_id, number)?;
    Ok(number)
}

/// Checks every answer carried by a responses edit before it is merged.
fn check_responses(path: &FieldPath<'_>, value: &Value) -> Result<(), EditError> {
    match path.segments.as_slice() {
        [_] => {
            let answers = value.as_object().ok_or_else(|| EditError::InvalidValue {
                path: path.raw.to_string(),
                reason: "expected an object of question ids to answers".to_string(),
            })?;
            for (question_id, answer) in answers {
                answer_value(question_id, answer)?;
            }
            Ok(())
        }
        [_, question_id] => answer_value(question_id, value).map(|_| ()),
        _ => Err(EditError::UnknownField(path.raw.to_string())),
    }
}

fn normalize(path: &FieldPath<'_>, value: Value) -> Value {
    match (path.segments.as_slice(), value) {
        (["personalInfo", "whatsapp"], Value::String(raw)) => {
            Value::String(format_phone_number(&raw))
        }
        (["personalInfo"], Value::Object(mut section)) => {
            if let Some(Value::String(raw)) = section.get("whatsapp") {
                let masked = format_phone_number(raw);
                section.insert("whatsapp".to_string(), Value::String(masked));
            }
            Value::Object(section)
        }
        (_, value) => value,
    }
}

/// Produces a new record with `value` written at `path`, or an error with no change.
pub(crate) fn apply(
    record: &ApplicantRecord,
    path: &FieldPath<'_>,
    value: Value,
) -> Result<ApplicantRecord, EditError> {
    if path.touches_responses() {
        check_responses(path, &value)?;
    }
    let value = normalize(path, value);

    let mut document = serde_json::to_value(record).map_err(|err| EditError::InvalidValue {
        path: path.raw.to_string(),
        reason: err.to_string(),
    })?;
    write_at(&mut document, path, value.clone())?;

    let updated: ApplicantRecord =
        serde_json::from_value(document).map_err(|err| EditError::InvalidValue {
            path: path.raw.to_string(),
            reason: err.to_string(),
        })?;

    // Unknown nested keys are dropped by deserialization; detect that here.
    let reread = serde_json::to_value(&updated).map_err(|err| EditError::InvalidValue {
        path: path.raw.to_string(),
        reason: err.to_string(),
    })?;
    let stored = read_at(&reread, &path.segments).unwrap_or(&Value::Null);
    if !retains(stored, &value) {
        return Err(EditError::UnknownField(path.raw.to_string()));
    }

    Ok(updated)
}

fn write_at(document: &mut Value, path: &FieldPath<'_>, value: Value) -> Result<(), EditError> {
    let (last, parents) = match path.segments.split_last() {
        Some(split) => split,
        None => return Err(EditError::UnknownField(path.raw.to_string())),
    };

    let mut cursor = document;
    for segment in parents {
        cursor = child_mut(cursor, path, segment)?;
    }

    match cursor {
        Value::Object(map) => {
            map.insert((*last).to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(path, last)?;
            let slot = items
                .get_mut(index)
                .ok_or_else(|| EditError::IndexOutOfRange {
                    path: path.raw.to_string(),
                    index,
                })?;
            *slot = value;
            Ok(())
        }
        _ => Err(EditError::UnknownField(path.raw.to_string())),
    }
}

fn child_mut<'v>(
    cursor: &'v mut Value,
    path: &FieldPath<'_>,
    segment: &str,
) -> Result<&'v mut Value, EditError> {
    match cursor {
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
        Value::Array(items) => {
            let index = parse_index(path, segment)?;
            items.get_mut(index).ok_or_else(|| EditError::IndexOutOfRange {
                path: path.raw.to_string(),
                index,
            })
        }
        _ => Err(EditError::UnknownField(path.raw.to_string())),
    }
}

fn parse_index(path: &FieldPath<'_>, segment: &str) -> Result<usize, EditError> {
    segment
        .parse()
        .map_err(|_| EditError::UnknownField(path.raw.to_string()))
}

/// True when everything `written` asked for survived the round trip.
/// Objects may gain defaulted keys; skipped optional keys read back as null.
fn retains(stored: &Value, written: &Value) -> bool {
    match (stored, written) {
        (Value::Object(stored), Value::Object(written)) => written.iter().all(|(key, value)| {
            retains(stored.get(key).unwrap_or(&Value::Null), value)
        }),
        (Value::Array(stored), Value::Array(written)) => {
            stored.len() == written.len()
                && stored.iter().zip(written).all(|(s, w)| retains(s, w))
        }
        (stored, written) => stored == written,
    }
}

fn read_at<'v>(document: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    segments.iter().try_fold(document, |cursor, segment| match cursor {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
