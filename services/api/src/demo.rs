use chrono::SecondsFormat;
use clap::Args;
use hexaco_profile::config::{AccessConfig, MasterCredentials};
use hexaco_profile::error::AppError;
use hexaco_profile::workflows::questionnaire::inventory::questions;
use hexaco_profile::workflows::questionnaire::{
    AdminCommand, DimensionScores, MemoryDocumentStore, ProfileQuery, QuestionnaireService,
    ResponseSet, SessionToken, ServiceError, WizardEdit,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON object mapping question ids (E1, C4, ...) to answers 1-5
    pub(crate) responses: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Email used for the scripted respondent
    #[arg(long, default_value = "respondent@example.com")]
    pub(crate) email: String,
    /// Likert value given to every inventory statement
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub(crate) answer: u8,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.responses)?;
    let responses: ResponseSet = serde_json::from_str(&raw)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;

    let service = QuestionnaireService::new(
        Arc::new(MemoryDocumentStore::new()),
        AccessConfig::default(),
    );
    let scores = service.score(&responses)?;

    println!(
        "HEXACO scores ({} of {} statements answered)",
        responses.len(),
        questions().len()
    );
    render_scores(&scores);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { email, answer } = args;
    let access = AccessConfig {
        master: Some(MasterCredentials {
            email: "master@example.com".to_string(),
            password: "demo-master".to_string(),
        }),
        bootstrap_admins: Vec::new(),
    };
    let service = QuestionnaireService::new(Arc::new(MemoryDocumentStore::new()), access);

    println!("HEXACO questionnaire demo");
    let session = service.register(&email, "demo-password")?;
    println!("Registered {} as {}", session.email, session.user_id);
    let token = session.token.clone();

    let view = service.wizard(&token)?;
    println!(
        "Wizard opened at '{}' (step {} of {})",
        view.step_label,
        view.step_index + 1,
        view.step_count
    );

    // Leaving the first step with a missing name is refused.
    set(&service, &token, "personalInfo.confirmEmail", json!(email))?;
    if let Err(ServiceError::Validation(failure)) = service.advance(&token) {
        println!("  Advance refused: {failure}");
    }

    set(
        &service,
        &token,
        "personalInfo",
        json!({
            "name": "Demo Respondent",
            "whatsapp": "11987654321",
            "email": email,
            "confirmEmail": email,
            "state": "Minas Gerais",
        }),
    )?;
    set(&service, &token, "skills", json!(["Technology", "Education"]))?;
    set(&service, &token, "subSkills.Technology", json!(["Backend"]))?;
    set(&service, &token, "behavioralSkills", json!(["Teamwork", "Resilience"]))?;
    for question in questions() {
        service.edit(
            &token,
            WizardEdit::Answer {
                question_id: question.id.to_string(),
                value: answer,
            },
        )?;
    }
    service.edit(&token, WizardEdit::AddExperience)?;
    set(
        &service,
        &token,
        "curriculum.experiences.0",
        json!({ "role": "Volunteer", "organization": "Community Library", "duration": "1 year" }),
    )?;
    set(&service, &token, "curriculum.languages", json!(["English"]))?;
    service.edit(&token, WizardEdit::AddEducation)?;
    set(
        &service,
        &token,
        "curriculum.education.0",
        json!({ "course": "Pedagogy", "institution": "UFMG", "level": "undergraduate" }),
    )?;
    set(&service, &token, "importantTruth", json!("Listening is most of the work."))?;

    loop {
        match service.advance(&token) {
            Ok(outcome) => {
                let transition = outcome.transition;
                println!(
                    "  {} -> {}{}",
                    transition.from.label(),
                    transition.to.label(),
                    if transition.persisted { " (scored and saved)" } else { "" }
                );
                for notice in transition.notices {
                    println!("    note: {}", notice.message());
                }
            }
            Err(ServiceError::AtResults) => break,
            Err(err) => return Err(err.into()),
        }
    }

    let profile = service.profile(&token)?;
    println!("\nStored profile for {}", profile.form_data.personal_info.name);
    println!("  Contact: {}", profile.form_data.personal_info.whatsapp);
    if let Some(completed_at) = profile.completed_at {
        println!(
            "  Completed at: {}",
            completed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }
    if let Some(scores) = profile.form_data.hexaco_scores.as_ref() {
        render_scores(scores);
    }
    service.finish(&token)?;

    let master = service.login("master@example.com", "demo-master")?;
    let change = service.administer(
        &master.token,
        &session.user_id,
        AdminCommand::VerifyCoordinator,
    )?;
    println!("\nMaster verified the respondent as coordinator: {change:?}");
    let rows = service.directory(&master.token, &ProfileQuery::default())?;
    println!("Directory ({} profile(s))", rows.len());
    for row in rows {
        println!("  {} <{}> [{}]", row.name, row.email, row.badge.label());
    }

    Ok(())
}

fn set(
    service: &QuestionnaireService<MemoryDocumentStore>,
    token: &SessionToken,
    path: &str,
    value: Value,
) -> Result<(), ServiceError> {
    service.edit(
        token,
        WizardEdit::SetField {
            path: path.to_string(),
            value,
        },
    )?;
    Ok(())
}

fn render_scores(scores: &DimensionScores) {
    for (dimension, score) in scores.iter() {
        let marker = if scores.is_answered(dimension) { "" } else { " (no answers)" };
        println!(
            "  {} {:<22} {:>5.1}{}",
            dimension.code(),
            dimension.label(),
            score,
            marker
        );
    }
}
