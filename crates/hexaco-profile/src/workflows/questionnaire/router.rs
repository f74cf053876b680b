use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::accounts::{AccountError, AdminError, SessionToken};
use super::directory::ProfileQuery;
use super::domain::UserId;
use super::inventory::ResponseSet;
use super::repository::DocumentStore;
use super::service::{AdminCommand, QuestionnaireService, ServiceError, WizardEdit};

pub const SESSION_HEADER: &str = "x-session-token";

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Router builder exposing the questionnaire endpoints.
pub fn questionnaire_router<S>(service: Arc<QuestionnaireService<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/api/v1/accounts", post(register_handler::<S>))
        .route(
            "/api/v1/sessions",
            get(resume_handler::<S>)
                .post(login_handler::<S>)
                .delete(logout_handler::<S>),
        )
        .route("/api/v1/wizard", get(wizard_handler::<S>))
        .route("/api/v1/wizard/fields", patch(edit_handler::<S>))
        .route("/api/v1/wizard/advance", post(advance_handler::<S>))
        .route("/api/v1/wizard/retreat", post(retreat_handler::<S>))
        .route("/api/v1/wizard/finish", post(finish_handler::<S>))
        .route("/api/v1/profile", get(profile_handler::<S>))
        .route("/api/v1/admin/profiles", get(directory_handler::<S>))
        .route(
            "/api/v1/admin/users/:user_id/:action",
            post(admin_action_handler::<S>),
        )
        .route("/api/v1/admin/users/:user_id", delete(delete_user_handler::<S>))
        .route("/api/v1/inventory", get(inventory_handler::<S>))
        .route("/api/v1/inventory/score", post(score_handler::<S>))
        .with_state(service)
}

fn session_token(headers: &HeaderMap) -> Result<SessionToken, Response> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| SessionToken(value.to_string()))
        .ok_or_else(|| error_response(ServiceError::UnknownSession))
}

fn status_for(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::UnknownSession => StatusCode::UNAUTHORIZED,
        ServiceError::Account(AccountError::MissingCredentials) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Account(AccountError::DuplicateIdentity(_)) => StatusCode::CONFLICT,
        ServiceError::Account(AccountError::InvalidCredentials)
        | ServiceError::Account(AccountError::UnknownIdentity(_)) => StatusCode::UNAUTHORIZED,
        ServiceError::Admin(AdminError::AuthorizationDenied { .. })
        | ServiceError::Admin(AdminError::ProtectedAccount(_)) => StatusCode::FORBIDDEN,
        ServiceError::Admin(AdminError::UnknownActor(_)) => StatusCode::UNAUTHORIZED,
        ServiceError::Admin(AdminError::NotFound(_)) | ServiceError::ProfileNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ServiceError::Validation(_) | ServiceError::Edit(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::AtResults | ServiceError::Finish(_) => StatusCode::CONFLICT,
        ServiceError::Account(AccountError::Store(_))
        | ServiceError::Admin(AdminError::Store(_))
        | ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_code(error: &ServiceError) -> &'static str {
    match error {
        ServiceError::Validation(failure) => failure.code(),
        ServiceError::Edit(edit) => edit.code(),
        ServiceError::UnknownSession => "unknown_session",
        ServiceError::Account(AccountError::MissingCredentials) => "missing_credentials",
        ServiceError::Account(AccountError::DuplicateIdentity(_)) => "duplicate_identity",
        ServiceError::Account(AccountError::InvalidCredentials) => "invalid_credentials",
        ServiceError::Account(AccountError::UnknownIdentity(_))
        | ServiceError::Admin(AdminError::UnknownActor(_)) => "unknown_identity",
        ServiceError::Admin(AdminError::AuthorizationDenied { .. }) => "authorization_denied",
        ServiceError::Admin(AdminError::ProtectedAccount(_)) => "protected_account",
        ServiceError::Admin(AdminError::NotFound(_)) | ServiceError::ProfileNotFound(_) => {
            "not_found"
        }
        ServiceError::AtResults => "at_results",
        ServiceError::Finish(_) => "not_at_results",
        ServiceError::Account(AccountError::Store(_))
        | ServiceError::Admin(AdminError::Store(_))
        | ServiceError::Store(_) => "store_error",
    }
}

pub(crate) fn error_response(error: ServiceError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "questionnaire request failed");
    }
    let payload = json!({
        "code": error_code(&error),
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    axum::Json(credentials): axum::Json<Credentials>,
) -> Response
where
    S: DocumentStore + 'static,
{
    respond(
        StatusCode::CREATED,
        service.register(&credentials.email, &credentials.password),
    )
}

pub(crate) async fn login_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    axum::Json(credentials): axum::Json<Credentials>,
) -> Response
where
    S: DocumentStore + 'static,
{
    respond(
        StatusCode::OK,
        service.login(&credentials.email, &credentials.password),
    )
}

/// Reopens the stored current identity; 204 when nobody is signed in.
pub(crate) async fn resume_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match service.resume() {
        Ok(Some(session)) => (StatusCode::OK, axum::Json(session)).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn logout_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
{
    let token = match session_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    match service.logout(&token) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn wizard_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
{
    match session_token(&headers) {
        Ok(token) => respond(StatusCode::OK, service.wizard(&token)),
        Err(response) => response,
    }
}

pub(crate) async fn edit_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
    axum::Json(edit): axum::Json<WizardEdit>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match session_token(&headers) {
        Ok(token) => respond(StatusCode::OK, service.edit(&token, edit)),
        Err(response) => response,
    }
}

pub(crate) async fn advance_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
{
    match session_token(&headers) {
        Ok(token) => respond(StatusCode::OK, service.advance(&token)),
        Err(response) => response,
    }
}

pub(crate) async fn retreat_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
{
    match session_token(&headers) {
        Ok(token) => respond(StatusCode::OK, service.retreat(&token)),
        Err(response) => response,
    }
}

pub(crate) async fn finish_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
{
    match session_token(&headers) {
        Ok(token) => respond(StatusCode::OK, service.finish(&token)),
        Err(response) => response,
    }
}

pub(crate) async fn profile_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
{
    match session_token(&headers) {
        Ok(token) => respond(StatusCode::OK, service.profile(&token)),
        Err(response) => response,
    }
}

pub(crate) async fn directory_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
    Query(query): Query<ProfileQuery>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match session_token(&headers) {
        Ok(token) => respond(StatusCode::OK, service.directory(&token, &query)),
        Err(response) => response,
    }
}

pub(crate) async fn admin_action_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
    Path((user_id, action)): Path<(String, String)>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let token = match session_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let Some(command) = AdminCommand::parse(&action) else {
        let payload = json!({
            "code": "unknown_action",
            "error": format!("unknown admin action '{action}'"),
        });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };
    let target = UserId(user_id);
    match service.administer(&token, &target, command) {
        Ok(change) => {
            let payload = json!({
                "user_id": target.0,
                "outcome": change,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_user_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let token = match session_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let target = UserId(user_id);
    match service.delete_user(&token, &target) {
        Ok(change) => {
            let payload = json!({
                "user_id": target.0,
                "outcome": change,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn inventory_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
) -> Response
where
    S: DocumentStore + 'static,
{
    (StatusCode::OK, axum::Json(service.inventory())).into_response()
}

pub(crate) async fn score_handler<S>(
    State(service): State<Arc<QuestionnaireService<S>>>,
    axum::Json(responses): axum::Json<ResponseSet>,
) -> Response
where
    S: DocumentStore + 'static,
{
    respond(StatusCode::OK, service.score(&responses))
}
