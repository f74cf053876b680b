use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;

use crate::workflows::questionnaire::router::{register_handler, Credentials, SESSION_HEADER};
use crate::workflows::questionnaire::{questionnaire_router, QuestionnaireService};

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(SESSION_HEADER, token);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request(method, uri, token, body))
        .await
        .unwrap();
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return (status, Value::Null);
    }
    (status, read_json_body(response).await)
}

async fn sign_up(router: &Router, email: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/v1/accounts",
        None,
        Some(json!({ "email": email, "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().expect("token").to_string()
}

async fn set_field(router: &Router, token: &str, path: &str, value: Value) -> (StatusCode, Value) {
    send(
        router,
        Method::PATCH,
        "/api/v1/wizard/fields",
        Some(token),
        Some(json!({ "op": "set_field", "path": path, "value": value })),
    )
    .await
}

#[tokio::test]
async fn registration_conflicts_on_duplicate_email() {
    let router = questionnaire_router(memory_service());
    sign_up(&router, "a@b.com").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/accounts",
        None,
        Some(json!({ "email": "a@b.com", "password": "again" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate_identity");
}

#[tokio::test]
async fn register_handler_returns_internal_error_when_store_is_down() {
    let service = Arc::new(QuestionnaireService::new(Arc::new(UnavailableStore), access()));

    let response = register_handler::<UnavailableStore>(
        State(service),
        axum::Json(Credentials {
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn wizard_requires_a_session_token() {
    let router = questionnaire_router(memory_service());

    let (missing, _) = send(&router, Method::GET, "/api/v1/wizard", None, None).await;
    let (unknown, body) = send(&router, Method::GET, "/api/v1/wizard", Some("nope"), None).await;

    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unknown_session");
}

#[tokio::test]
async fn wizard_flow_over_http() {
    let router = questionnaire_router(memory_service());
    let token = sign_up(&router, "a@b.com").await;

    let (status, view) = send(&router, Method::GET, "/api/v1/wizard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["step"], "personal_info");
    assert_eq!(view["record"]["personalInfo"]["email"], "a@b.com");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/wizard/advance",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "missing_required_field");

    let record = serde_json::to_value(complete_record()).unwrap();
    for (path, value) in record.as_object().unwrap() {
        let (status, _) = set_field(&router, &token, path, value.clone()).await;
        assert_eq!(status, StatusCode::OK, "{path}");
    }

    let mut last = Value::Null;
    for _ in 0..6 {
        let (status, body) =
            send(&router, Method::POST, "/api/v1/wizard/advance", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["transition"]["to"], "results");
    assert_eq!(last["transition"]["persisted"], true);
    assert_eq!(last["wizard"]["record"]["hexacoScores"]["scores"]["H"], 50.0);

    let (status, body) = set_field(&router, &token, "hexacoResponses.E1", json!(5)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "inventory_locked");

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/wizard/advance",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/wizard/finish",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, profile) = send(&router, Method::GET, "/api/v1/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(profile["completedAt"].is_string());
}

#[tokio::test]
async fn directory_is_admin_only() {
    let router = questionnaire_router(memory_service());
    let user = sign_up(&router, "plain@example.com").await;

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/v1/admin/profiles",
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "authorization_denied");

    let (status, master) = send(
        &router,
        Method::POST,
        "/api/v1/sessions",
        None,
        Some(json!({ "email": MASTER_EMAIL, "password": MASTER_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let master = master["token"].as_str().unwrap().to_string();

    let (status, rows) = send(
        &router,
        Method::GET,
        "/api/v1/admin/profiles?search=plain",
        Some(&master),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn admin_actions_report_outcomes() {
    let service = memory_service();
    let router = questionnaire_router(service.clone());
    let user = service.register("plain@example.com", "secret").expect("register");
    let master = service.login(MASTER_EMAIL, MASTER_PASSWORD).expect("master");
    let master_token = master.token.0.as_str();
    let uri = format!("/api/v1/admin/users/{}/promote-admin", user.user_id);

    let (status, body) = send(&router, Method::POST, &uri, Some(master_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "applied");

    let (_, body) = send(&router, Method::POST, &uri, Some(master_token), None).await;
    assert_eq!(body["outcome"], "unchanged");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/admin/users/ghost/promote-admin",
        Some(master_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/api/v1/admin/users/{}/crown", user.user_id),
        Some(master_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/api/v1/admin/users/{}", master.user_id),
        Some(master_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "protected_account");

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/api/v1/admin/users/{}", user.user_id),
        Some(master_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &router,
        Method::GET,
        "/api/v1/wizard",
        Some(user.token.0.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let router = questionnaire_router(memory_service());
    let token = sign_up(&router, "a@b.com").await;

    let (status, _) = send(&router, Method::DELETE, "/api/v1/sessions", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, Method::GET, "/api/v1/wizard", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inventory_endpoints_serve_items_and_scores() {
    let router = questionnaire_router(memory_service());

    let (status, inventory) = send(&router, Method::GET, "/api/v1/inventory", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inventory["questions"].as_array().unwrap().len(), 24);
    assert_eq!(inventory["scale"].as_array().unwrap().len(), 5);

    let responses = serde_json::to_value(uniform_responses(3)).unwrap();
    let (status, scores) = send(
        &router,
        Method::POST,
        "/api/v1/inventory/score",
        None,
        Some(responses),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for code in ["H", "E", "X", "A", "C", "O"] {
        assert_eq!(scores["scores"][code], 50.0);
    }

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/inventory/score",
        None,
        Some(json!({ "E1": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "out_of_range");
}

#[tokio::test]
async fn resume_reopens_the_stored_identity() {
    let router = questionnaire_router(memory_service());
    let (status, _) = send(&router, Method::GET, "/api/v1/sessions", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    sign_up(&router, "a@b.com").await;
    let (status, body) = send(&router, Method::GET, "/api/v1/sessions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token").to_string();

    let (status, _) = send(&router, Method::GET, "/api/v1/wizard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}
