use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::{AccessConfig, MasterCredentials};
use crate::workflows::questionnaire::accounts::{AccountService, SessionContext};
use crate::workflows::questionnaire::domain::{
    ApplicantRecord, EducationEntry, ExperienceEntry,
};
use crate::workflows::questionnaire::inventory::{questions, ResponseSet, TraitScoringEngine};
use crate::workflows::questionnaire::repository::{
    DocumentStore, ProfileRegistry, StoreError, PROFILES_KEY,
};
use crate::workflows::questionnaire::store::MemoryDocumentStore;
use crate::workflows::questionnaire::wizard::{WizardController, WizardStep};
use crate::workflows::questionnaire::QuestionnaireService;

pub(super) const MASTER_EMAIL: &str = "master@example.com";
pub(super) const MASTER_PASSWORD: &str = "master-pass";

pub(super) fn access() -> AccessConfig {
    AccessConfig {
        master: Some(MasterCredentials {
            email: MASTER_EMAIL.to_string(),
            password: MASTER_PASSWORD.to_string(),
        }),
        bootstrap_admins: vec!["curator@example.com".to_string()],
    }
}

pub(super) fn uniform_responses(value: u8) -> ResponseSet {
    questions()
        .iter()
        .map(|question| (question.id.to_string(), value))
        .collect()
}

pub(super) fn personal_record() -> ApplicantRecord {
    let mut record = ApplicantRecord::default();
    let info = &mut record.personal_info;
    info.name = "Ana Souza".to_string();
    info.whatsapp = "(71) 98765-4321".to_string();
    info.email = "a@b.com".to_string();
    info.confirm_email = "a@b.com".to_string();
    info.state = "Bahia".to_string();
    record
}

pub(super) fn complete_record() -> ApplicantRecord {
    let mut record = personal_record();
    record.skills = vec!["Technology".to_string()];
    record
        .sub_skills
        .insert("Technology".to_string(), vec!["Backend".to_string()]);
    record.behavioral_skills = vec!["Leadership".to_string()];
    record.hexaco_responses = uniform_responses(3);
    record.curriculum.experiences = vec![ExperienceEntry {
        role: "Analyst".to_string(),
        organization: "City Hall".to_string(),
        duration: "2 years".to_string(),
    }];
    record.curriculum.languages = vec!["English".to_string()];
    record.curriculum.education = vec![EducationEntry {
        course: "Economics".to_string(),
        institution: "UFBA".to_string(),
        level: None,
    }];
    record.important_truth = Some("People matter more than plans.".to_string());
    record
}

/// Memory store that counts writes per key.
#[derive(Debug, Default)]
pub(super) struct CountingStore {
    inner: MemoryDocumentStore,
    writes: Mutex<HashMap<String, usize>>,
}

impl CountingStore {
    pub(super) fn writes_to(&self, key: &str) -> usize {
        self.writes
            .lock()
            .expect("writes lock")
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub(super) fn profile_writes(&self) -> usize {
        self.writes_to(PROFILES_KEY)
    }
}

impl DocumentStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, document: Value) -> Result<(), StoreError> {
        *self
            .writes
            .lock()
            .expect("writes lock")
            .entry(key.to_string())
            .or_default() += 1;
        self.inner.set(key, document)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key)
    }
}

/// Reads succeed; writes to `failing_key` are rejected.
#[derive(Debug, Default)]
pub(super) struct RejectingStore {
    pub(super) inner: MemoryDocumentStore,
    pub(super) failing_key: Mutex<Option<String>>,
}

impl RejectingStore {
    pub(super) fn fail_writes_to(&self, key: &str) {
        *self.failing_key.lock().expect("key lock") = Some(key.to_string());
    }
}

impl DocumentStore for RejectingStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, document: Value) -> Result<(), StoreError> {
        if self.failing_key.lock().expect("key lock").as_deref() == Some(key) {
            return Err(StoreError::Unavailable(format!("{key} is read-only")));
        }
        self.inner.set(key, document)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key)
    }
}

/// Store whose every operation fails.
#[derive(Debug, Default)]
pub(super) struct UnavailableStore;

impl DocumentStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn set(&self, _key: &str, _document: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}

pub(super) fn accounts<S: DocumentStore>(store: Arc<S>) -> AccountService<S> {
    AccountService::new(store, access())
}

pub(super) fn start_wizard<S: DocumentStore>(
    store: Arc<S>,
    email: &str,
) -> (AccountService<S>, WizardController<S>) {
    let service = accounts(store);
    let session = service.register(email, "secret").expect("register");
    let wizard = open_wizard(&service, session);
    (service, wizard)
}

pub(super) fn open_wizard<S: DocumentStore>(
    service: &AccountService<S>,
    session: SessionContext,
) -> WizardController<S> {
    let registry: ProfileRegistry<S> = service.registry().clone();
    WizardController::start(session, registry, TraitScoringEngine::standard())
        .expect("start wizard")
}

/// Writes `record` section by section through the edit surface.
pub(super) fn fill<S: DocumentStore>(wizard: &mut WizardController<S>, record: &ApplicantRecord) {
    let document = serde_json::to_value(record).expect("record json");
    let sections = document.as_object().expect("record object");
    for (path, value) in sections {
        if path == "hexacoResponses" && wizard.is_hexaco_locked() {
            continue;
        }
        wizard
            .edit_field(path, value.clone())
            .unwrap_or_else(|err| panic!("edit {path}: {err}"));
    }
}

/// Drives the wizard forward until it sits on `target`.
pub(super) fn advance_to<S: DocumentStore>(wizard: &mut WizardController<S>, target: WizardStep) {
    while wizard.current_step() != target {
        wizard
            .advance()
            .unwrap_or_else(|err| panic!("advance from {:?}: {err}", wizard.current_step()));
    }
}

pub(super) fn memory_service() -> Arc<QuestionnaireService<MemoryDocumentStore>> {
    Arc::new(QuestionnaireService::new(
        Arc::new(MemoryDocumentStore::new()),
        access(),
    ))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
