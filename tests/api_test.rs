use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use clinica_backend::{
    app::build_router,
    config::{AppState, Config},
    db::MemoryStorage,
};

fn app() -> Router {
    let state = AppState::with_storage(Config::for_tests(), Arc::new(MemoryStorage::new()));
    build_router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login falhou: {}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn seeded_admin(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/seed", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seeded"], true);
    login(app, "admin@clinica.com", "admin123").await
}

#[tokio::test]
async fn health_is_public_and_the_rest_requires_a_token() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/patients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/patients", Some("nao-e-um-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_returns_a_profile_without_the_password_hash() {
    let app = app();
    let token = seeded_admin(&app).await;

    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "admin@clinica.com");
    assert_eq!(me["role"], "ADMIN");
    assert!(me.get("password").is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "admin@clinica.com", "password": "errada" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Segundo seed não duplica nada
    let (_, body) = send(&app, Method::POST, "/api/seed", None, None).await;
    assert_eq!(body["seeded"], false);
    let (_, users) = send(&app, Method::GET, "/api/users", Some(&token), None).await;
    assert_eq!(users.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn patient_lifecycle() {
    let app = app();
    let token = seeded_admin(&app).await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/patients",
        Some(&token),
        Some(json!({ "name": "Beatriz Lima", "phone": "(21) 98888-0000", "birthDate": "1995-07-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["active"], true);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/patients/{}", id),
        Some(&token),
        Some(json!({ "city": "Rio de Janeiro" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["city"], "Rio de Janeiro");
    assert_eq!(updated["birthDate"], "1995-07-01");

    let (status, body) = send(&app, Method::DELETE, &format!("/api/patients/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "DELETED");

    let (status, body) = send(&app, Method::GET, &format!("/api/patients/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Paciente não encontrado.");
}

#[tokio::test]
async fn seeded_patient_with_history_is_only_deactivated() {
    let app = app();
    let token = seeded_admin(&app).await;

    let (_, appointments) = send(&app, Method::GET, "/api/appointments", Some(&token), None).await;
    let patient_id = appointments[0]["patientId"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::DELETE, &format!("/api/patients/{}", patient_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "DEACTIVATED");

    // Continua aparecendo nas relações do agendamento
    let (_, appointments) = send(&app, Method::GET, "/api/appointments", Some(&token), None).await;
    assert_eq!(appointments[0]["patient"]["active"], false);
}

#[tokio::test]
async fn validation_errors_are_localized_with_details() {
    let app = app();
    let token = seeded_admin(&app).await;

    let request = Request::post("/api/patients")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .body(Body::from(json!({ "name": "", "phone": "1" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "One or more fields are invalid.");
    assert!(body["details"]["name"].is_array());
}

#[tokio::test]
async fn appointment_end_time_and_status_transitions() {
    let app = app();
    let token = seeded_admin(&app).await;

    let (_, procedures) = send(&app, Method::GET, "/api/procedures", Some(&token), None).await;
    let peeling = procedures
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Peeling Químico")
        .unwrap();
    let (_, patients) = send(&app, Method::GET, "/api/patients", Some(&token), None).await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/appointments",
        Some(&token),
        Some(json!({
            "patientId": patients[0]["id"],
            "procedureId": peeling["id"],
            "date": "2030-01-20",
            "startTime": "23:30",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["endTime"], "00:15");
    assert_eq!(created["status"], "SCHEDULED");
    assert_eq!(created["procedure"]["name"], "Peeling Químico");
    assert_eq!(created["user"]["email"], "admin@clinica.com");
    let id = created["id"].as_str().unwrap().to_string();

    let (_, on_day) = send(&app, Method::GET, "/api/appointments?date=2030-01-20&status=all", Some(&token), None).await;
    assert_eq!(on_day.as_array().unwrap().len(), 1);

    let status_uri = format!("/api/appointments/{}/status", id);
    let (status, _) = send(&app, Method::PATCH, &status_uri, Some(&token), Some(json!({ "status": "CANCELLED" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::PATCH, &status_uri, Some(&token), Some(json!({ "status": "COMPLETED" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("CANCELLED"));

    let (status, _) = send(&app, Method::DELETE, &format!("/api/appointments/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/appointments/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_movements_respect_the_available_balance() {
    let app = app();
    let token = seeded_admin(&app).await;

    let (_, products) = send(&app, Method::GET, "/api/products", Some(&token), None).await;
    let serum = products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Sérum Vitamina C")
        .unwrap()
        .clone();
    let serum_id = serum["id"].as_str().unwrap().to_string();
    assert_eq!(serum["currentStock"], json!(20.0));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/stock-movements",
        Some(&token),
        Some(json!({ "productId": serum_id, "type": "OUT", "quantity": 25, "reason": "Uso" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("insuficiente"));

    let (status, movement) = send(
        &app,
        Method::POST,
        "/api/stock-movements",
        Some(&token),
        Some(json!({ "productId": serum_id, "type": "OUT", "quantity": 15, "reason": "Uso" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(movement["product"]["currentStock"], json!(5.0));
    assert_eq!(movement["user"]["email"], "admin@clinica.com");

    let (_, stats) = send(&app, Method::GET, "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(stats["lowStockProducts"], 1);
    assert_eq!(stats["totalPacientes"], 4);
    assert_eq!(stats["procedimentosAtivos"], 5);

    // Produto com movimentação não some
    let (_, body) = send(&app, Method::DELETE, &format!("/api/products/{}", serum_id), Some(&token), None).await;
    assert_eq!(body["result"], "DEACTIVATED");
}

#[tokio::test]
async fn receptionist_cannot_touch_catalog_or_stock() {
    let app = app();
    seeded_admin(&app).await;
    let token = login(&app, "ana@clinica.com", "recepcao123").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(&token),
        Some(json!({ "name": "Tônico", "category": "Geral", "unit": "ml", "costPrice": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/api/backup/export", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Leitura continua liberada
    let (status, _) = send(&app, Method::GET, "/api/products", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn backup_round_trip_between_instances() {
    let source = app();
    let token = seeded_admin(&source).await;

    let (status, backup) = send(&source, Method::GET, "/api/backup/export", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backup["users"].as_array().unwrap().len(), 4);

    let target = app();
    let target_token = seeded_admin(&target).await;

    let (status, body) = send(&target, Method::POST, "/api/backup/import", Some(&target_token), Some(json!({ "patients": [{ "id": 1 }] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("patients"));

    let (status, body) = send(&target, Method::POST, "/api/backup/import", Some(&target_token), Some(backup.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"].as_array().unwrap().len(), 8);

    // Os usuários agora são os da origem: o token da origem vale no destino
    let (status, me) = send(&target, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "admin@clinica.com");

    let (status, _) = send(&target, Method::DELETE, "/api/backup", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&target, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
