use std::sync::Arc;

use serde_json::json;

use super::common::*;

use crate::workflows::questionnaire::domain::StoredProfile;
use crate::workflows::questionnaire::inventory::ResponseSet;
use crate::workflows::questionnaire::repository::PROFILES_KEY;
use crate::workflows::questionnaire::store::MemoryDocumentStore;
use crate::workflows::questionnaire::wizard::{
    AdvanceError, EditError, FinishError, PersonalField, ValidationFailure, WizardNotice,
    WizardStep,
};
use crate::workflows::questionnaire::Dimension;

#[test]
fn failed_validation_keeps_the_current_step() {
    let (_, mut wizard) = start_wizard(Arc::new(MemoryDocumentStore::new()), "a@b.com");
    wizard
        .edit_field("personalInfo.confirmEmail", json!("a@b.com"))
        .expect("edit");

    let err = wizard.advance().unwrap_err();

    assert!(matches!(
        err,
        AdvanceError::Validation(ValidationFailure::MissingRequiredField(PersonalField::Name))
    ));
    assert_eq!(wizard.current_step(), WizardStep::PersonalInfo);
    assert_eq!(
        wizard.last_failure(),
        Some(&ValidationFailure::MissingRequiredField(PersonalField::Name))
    );
}

#[test]
fn mismatched_emails_block_the_first_step() {
    let (_, mut wizard) = start_wizard(Arc::new(MemoryDocumentStore::new()), "a@b.com");
    fill(&mut wizard, &personal_record());
    wizard
        .edit_field("personalInfo.confirmEmail", json!("c@d.com"))
        .expect("edit");

    let err = wizard.advance().unwrap_err();

    assert!(matches!(err, AdvanceError::Validation(ValidationFailure::EmailMismatch)));
    assert_eq!(wizard.current_step(), WizardStep::PersonalInfo);
}

#[test]
fn fixing_the_curriculum_scores_and_persists_once() {
    let store = Arc::new(CountingStore::default());
    let (_, mut wizard) = start_wizard(store.clone(), "a@b.com");
    let mut record = complete_record();
    record.curriculum.experiences[0].duration = String::new();
    fill(&mut wizard, &record);
    advance_to(&mut wizard, WizardStep::Curriculum);

    let err = wizard.advance().unwrap_err();
    assert!(matches!(
        err,
        AdvanceError::Validation(ValidationFailure::IncompleteExperience {
            index: 0,
            field: "duration"
        })
    ));
    assert_eq!(wizard.current_step(), WizardStep::Curriculum);
    assert_eq!(store.profile_writes(), 0);
    assert!(wizard.record().hexaco_scores.is_none());

    wizard
        .edit_field("curriculum.experiences.0.duration", json!("3 years"))
        .expect("fix duration");
    let transition = wizard.advance().expect("advance to results");

    assert!(transition.persisted);
    assert_eq!(transition.to, WizardStep::Results);
    assert_eq!(store.profile_writes(), 1);
    let scores = wizard.record().hexaco_scores.as_ref().expect("scores");
    assert_eq!(scores.get(Dimension::H), 50.0);
    assert!(wizard.completed_at().is_some());

    assert!(matches!(wizard.advance(), Err(AdvanceError::AtResults)));
    assert_eq!(store.profile_writes(), 1);
}

#[test]
fn persisted_record_matches_the_scored_session() {
    let store = Arc::new(MemoryDocumentStore::new());
    let (accounts, mut wizard) = start_wizard(store, "a@b.com");
    fill(&mut wizard, &complete_record());
    advance_to(&mut wizard, WizardStep::Results);

    let stored = accounts
        .registry()
        .profile(&wizard.session().user_id)
        .expect("read")
        .expect("stored profile");
    assert_eq!(&stored.form_data, wizard.record());
    assert!(stored.is_completed());
    assert_eq!(stored.email, "a@b.com");
}

#[test]
fn completed_inventory_is_locked_and_skipped() {
    let store = Arc::new(MemoryDocumentStore::new());
    let (accounts, mut wizard) = start_wizard(store, "a@b.com");
    fill(&mut wizard, &complete_record());
    advance_to(&mut wizard, WizardStep::Results);
    assert!(wizard.is_hexaco_locked());

    let before = wizard.record().hexaco_responses.clone();
    assert_eq!(
        wizard.edit_field("hexacoResponses.E1", json!(5)),
        Err(EditError::InventoryLocked)
    );
    assert_eq!(wizard.answer("E1", 5), Err(EditError::InventoryLocked));
    assert_eq!(wizard.record().hexaco_responses, before);

    assert_eq!(wizard.retreat().to, WizardStep::Curriculum);
    let back = wizard.retreat();
    assert_eq!(back.to, WizardStep::BehavioralSkills);
    assert_eq!(back.notices, vec![WizardNotice::HexacoLocked]);

    let forward = wizard.advance().expect("advance");
    assert_eq!(forward.to, WizardStep::Curriculum);
    assert_eq!(forward.notices, vec![WizardNotice::HexacoLocked]);

    // A later session for the same identity starts locked.
    let session = accounts.login("a@b.com", "secret").expect("login");
    let mut reopened = open_wizard(&accounts, session);
    assert!(reopened.is_hexaco_locked());
    assert_eq!(reopened.record().hexaco_responses, before);
    advance_to(&mut reopened, WizardStep::BehavioralSkills);
    assert_eq!(reopened.advance().expect("skip").to, WizardStep::Curriculum);
}

#[test]
fn rehydrated_inventory_with_a_foreign_id_stays_open() {
    let accounts = accounts(Arc::new(MemoryDocumentStore::new()));
    let session = accounts.register("a@b.com", "secret").expect("register");
    let mut record = complete_record();
    let mut responses: ResponseSet = uniform_responses(3)
        .iter()
        .filter(|(id, _)| *id != "E1")
        .map(|(id, value)| (id.to_string(), value))
        .collect();
    responses.insert("Z9", 3);
    record.hexaco_responses = responses;
    accounts
        .registry()
        .upsert_profile(StoredProfile {
            id: session.user_id.clone(),
            email: session.email.clone(),
            form_data: record,
            completed_at: None,
        })
        .expect("seed profile");

    let mut wizard = open_wizard(&accounts, session);
    assert!(!wizard.is_hexaco_locked());
    assert_eq!(wizard.record().hexaco_responses.unanswered(), vec!["E1"]);

    wizard.answer("E1", 4).expect("answer the missing item");
    assert!(wizard.record().hexaco_responses.is_complete());
}

#[test]
fn edits_outside_the_inventory_stay_open_after_locking() {
    let (_, mut wizard) = start_wizard(Arc::new(MemoryDocumentStore::new()), "a@b.com");
    fill(&mut wizard, &complete_record());
    advance_to(&mut wizard, WizardStep::Results);

    wizard
        .edit_field("personalInfo.whatsapp", json!("71987654321"))
        .expect("edit contact");
    assert_eq!(wizard.record().personal_info.whatsapp, "(71) 98765-4321");
    assert!(matches!(
        wizard.edit_field("hexacoScores", json!({})),
        Err(EditError::DerivedField(_))
    ));
}

#[test]
fn store_failure_at_checkpoint_keeps_the_step() {
    let store = Arc::new(RejectingStore::default());
    let (_, mut wizard) = start_wizard(store.clone(), "a@b.com");
    fill(&mut wizard, &complete_record());
    advance_to(&mut wizard, WizardStep::Curriculum);
    store.fail_writes_to(PROFILES_KEY);

    let err = wizard.advance().unwrap_err();

    assert!(matches!(err, AdvanceError::Store(_)));
    assert_eq!(wizard.current_step(), WizardStep::Curriculum);
    assert!(!wizard.is_hexaco_locked());
    assert!(wizard.record().hexaco_scores.is_none());
}

#[test]
fn retreat_needs_no_validation_and_stops_at_the_start() {
    let (_, mut wizard) = start_wizard(Arc::new(MemoryDocumentStore::new()), "a@b.com");
    fill(&mut wizard, &personal_record());
    wizard.advance().expect("personal info");
    assert_eq!(wizard.current_step(), WizardStep::Skills);

    assert_eq!(wizard.retreat().to, WizardStep::PersonalInfo);
    let stay = wizard.retreat();
    assert_eq!(stay.from, WizardStep::PersonalInfo);
    assert_eq!(stay.to, WizardStep::PersonalInfo);
}

#[test]
fn progress_tracks_the_step_index() {
    let (_, mut wizard) = start_wizard(Arc::new(MemoryDocumentStore::new()), "a@b.com");
    assert!((wizard.progress() - 1.0 / 7.0).abs() < f64::EPSILON);

    fill(&mut wizard, &complete_record());
    advance_to(&mut wizard, WizardStep::Results);
    assert!((wizard.progress() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn finish_is_only_available_on_results() {
    let (_, mut wizard) = start_wizard(Arc::new(MemoryDocumentStore::new()), "a@b.com");
    assert_eq!(
        wizard.finish().unwrap_err(),
        FinishError::NotAtResults {
            step: WizardStep::PersonalInfo
        }
    );

    fill(&mut wizard, &complete_record());
    advance_to(&mut wizard, WizardStep::Results);
    let record = wizard.finish().expect("finish");
    assert!(record.hexaco_scores.is_some());
}

#[test]
fn list_helpers_add_and_remove_entries() {
    let (_, mut wizard) = start_wizard(Arc::new(MemoryDocumentStore::new()), "a@b.com");

    assert_eq!(wizard.add_experience(), 0);
    assert_eq!(wizard.add_experience(), 1);
    wizard
        .edit_field("curriculum.experiences.1.role", json!("Mentor"))
        .expect("edit");
    let removed = wizard.remove_experience(1).expect("remove");
    assert_eq!(removed.role, "Mentor");
    assert_eq!(wizard.record().curriculum.experiences.len(), 1);
    assert!(matches!(
        wizard.remove_experience(4),
        Err(EditError::IndexOutOfRange { index: 4, .. })
    ));

    assert_eq!(wizard.add_education(), 0);
    wizard.remove_education(0).expect("remove education");
    assert!(wizard.record().curriculum.education.is_empty());
}

#[test]
fn session_email_prefills_a_new_record() {
    let (_, wizard) = start_wizard(Arc::new(MemoryDocumentStore::new()), "fresh@example.com");

    assert_eq!(wizard.record().personal_info.email, "fresh@example.com");
    assert!(!wizard.is_hexaco_locked());
    assert_eq!(wizard.current_step(), WizardStep::PersonalInfo);
}
