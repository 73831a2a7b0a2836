//! End-to-end tests against the full router and an in-memory store.

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use flylight_api::{create_router, AppConfig, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;

struct Harness {
    server: TestServer,
    _uploads: TempDir,
}

async fn harness() -> Harness {
    let uploads = tempfile::tempdir().unwrap();
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        upload_dir: uploads.path().to_path_buf(),
        ..Default::default()
    };
    let state = AppState::from_config(config).await.unwrap();
    let server = TestServer::new(create_router(state)).unwrap();
    Harness {
        server,
        _uploads: uploads,
    }
}

async fn admin_token(server: &TestServer) -> String {
    server.post("/api/init-db").await;
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "admin@flylight.com", "password": "admin123" }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["access_token"].as_str().unwrap().to_string()
}

fn tournament_form(name: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name)
        .add_text("venue", "City Sports Arena")
        .add_text("start_date", "2026-11-01")
        .add_text("start_time", "09:00")
        .add_text("end_date", "2026-11-02")
        .add_text("end_time", "18:00")
        .add_text("price", "500")
}

async fn create_tournament(server: &TestServer, token: &str) -> String {
    let response = server
        .post("/api/admin/tournaments")
        .authorization_bearer(token)
        .multipart(tournament_form("City Open"))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

async fn join(server: &TestServer, tournament_id: &str, name: &str) -> String {
    let response = server
        .post(&format!("/api/tournaments/{}/join", tournament_id))
        .json(&json!({ "name": name, "email": "player@example.com", "phone": "9876543210" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["registration_id"].as_str().unwrap().to_string()
}

async fn initiate(
    server: &TestServer,
    reference_id: &str,
    reference_type: &str,
    amount: f64,
) -> Value {
    let response = server
        .post("/api/payments/initiate")
        .json(&json!({
            "amount": amount,
            "email": "player@example.com",
            "reference_id": reference_id,
            "reference_type": reference_type,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

fn verify_body(initiated: &Value) -> Value {
    json!({
        "payment_id": initiated["payment_id"],
        "transaction_id": initiated["transaction_id"],
        "verification_token": initiated["verification_token"],
    })
}

#[tokio::test]
async fn test_health() {
    let h = harness().await;
    let response = h.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_init_db_is_idempotent() {
    let h = harness().await;

    h.server.post("/api/init-db").await.assert_status(StatusCode::CREATED);
    h.server.post("/api/init-db").await.assert_status_ok();

    let products = h.server.get("/api/products").await.json::<Vec<Value>>();
    assert!(!products.is_empty());
}

#[tokio::test]
async fn test_register_and_login() {
    let h = harness().await;
    let credentials = json!({ "email": "sam@example.com", "password": "shuttle" });

    let response = h.server.post("/api/auth/register").json(&credentials).await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["role"], "user");

    h.server
        .post("/api/auth/register")
        .json(&credentials)
        .await
        .assert_status(StatusCode::CONFLICT);

    h.server.post("/api/auth/login").json(&credentials).await.assert_status_ok();
    h.server
        .post("/api/auth/login")
        .json(&json!({ "email": "sam@example.com", "password": "wrong" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_are_gated() {
    let h = harness().await;
    h.server.post("/api/init-db").await;

    h.server
        .get("/api/admin/stats")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    h.server
        .get("/api/admin/stats")
        .authorization_bearer("not.a.token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let user = h
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "sam@example.com", "password": "shuttle" }))
        .await
        .json::<Value>();
    let user_token = user["access_token"].as_str().unwrap();
    h.server
        .get("/api/admin/stats")
        .authorization_bearer(user_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let token = admin_token(&h.server).await;
    h.server
        .get("/api/admin/stats")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_tournament_payment_confirms_registration() {
    let h = harness().await;
    let token = admin_token(&h.server).await;
    let tournament_id = create_tournament(&h.server, &token).await;

    let detail = h
        .server
        .get(&format!("/api/tournaments/{}", tournament_id))
        .await
        .json::<Value>();
    assert_eq!(detail["display_status"], "upcoming");

    let registration_id = join(&h.server, &tournament_id, "Asha").await;
    let initiated = initiate(&h.server, &tournament_id, "tournament", 500.0).await;
    assert_eq!(initiated["amount"], 500.0);

    let response = h
        .server
        .post("/api/payments/verify")
        .json(&verify_body(&initiated))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["settlement"]["kind"], "registration_confirmed");
    assert_eq!(body["settlement"]["registration_id"], registration_id.as_str());
    assert!(body["payment"].get("verification_token").is_none());

    let registrations = h
        .server
        .get(&format!("/api/admin/tournaments/{}/registrations", tournament_id))
        .authorization_bearer(&token)
        .await
        .json::<Vec<Value>>();
    assert_eq!(registrations[0]["status"], "confirmed");

    // Same payment again inside the replay window
    h.server
        .post("/api/payments/verify")
        .json(&verify_body(&initiated))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_rejects_bad_identifiers() {
    let h = harness().await;
    let token = admin_token(&h.server).await;
    let tournament_id = create_tournament(&h.server, &token).await;
    join(&h.server, &tournament_id, "Asha").await;

    let initiated = initiate(&h.server, &tournament_id, "tournament", 500.0).await;
    let payment_id = initiated["payment_id"].as_str().unwrap();

    let mut body = verify_body(&initiated);
    body["transaction_id"] = json!("TXN_0_deadbeef");
    h.server
        .post("/api/payments/verify")
        .json(&body)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let mut body = verify_body(&initiated);
    body["verification_token"] = json!("00");
    h.server
        .post("/api/payments/verify")
        .json(&body)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    h.server
        .post("/api/payments/verify")
        .json(&json!({ "payment_id": payment_id }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // Rejected attempts leave the payment and the registration untouched
    let payment = h
        .server
        .get(&format!("/api/payments/{}", payment_id))
        .await
        .json::<Value>();
    assert_eq!(payment["status"], "pending");
    assert!(payment["verified_at"].is_null());

    let registrations = h
        .server
        .get(&format!("/api/admin/tournaments/{}/registrations", tournament_id))
        .authorization_bearer(&token)
        .await
        .json::<Vec<Value>>();
    assert_eq!(registrations[0]["status"], "pending");
    assert!(registrations[0]["payment_id"].is_null());

    h.server
        .post("/api/payments/missing/verify")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    h.server
        .get("/api/payments/missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let h = harness().await;

    let missing_field = h
        .server
        .post("/api/payments/initiate")
        .json(&json!({ "amount": 500, "email": "a@b.com", "reference_id": "T1" }))
        .await;
    missing_field.assert_status(StatusCode::BAD_REQUEST);
    let body = missing_field.json::<Value>();
    assert!(body["error"].as_str().unwrap().contains("reference_type"));

    let wrong_type = h
        .server
        .post("/api/payments/initiate")
        .json(&json!({
            "amount": "500",
            "email": "a@b.com",
            "reference_id": "T1",
            "reference_type": "tournament",
        }))
        .await;
    wrong_type.assert_status(StatusCode::BAD_REQUEST);
    assert!(wrong_type.json::<Value>()["error"].is_string());

    let not_json = h
        .server
        .post("/api/payments/verify")
        .bytes("{not json".into())
        .content_type("application/json")
        .await;
    not_json.assert_status(StatusCode::BAD_REQUEST);
    assert!(not_json.json::<Value>()["error"].is_string());

    let not_json = h
        .server
        .post("/api/payments/missing/verify")
        .bytes("{not json".into())
        .content_type("application/json")
        .await;
    not_json.assert_status(StatusCode::BAD_REQUEST);
    assert!(not_json.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_order_payment_decrements_stock() {
    let h = harness().await;
    h.server.post("/api/init-db").await;

    let products = h.server.get("/api/products").await.json::<Vec<Value>>();
    let product = &products[0];
    let product_id = product["id"].as_str().unwrap();
    let stock = product["stock"].as_i64().unwrap();

    let response = h
        .server
        .post("/api/orders")
        .json(&json!({
            "customer_name": "Asha",
            "email": "player@example.com",
            "phone": "9876543210",
            "address": "12 Court Road",
            "city": "Pune",
            "zip_code": "411001",
            "items": [{ "product_id": product_id, "quantity": 3, "price": product["price"] }],
            "total_amount": 300.0,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let order_id = response.json::<Value>()["order_id"].as_str().unwrap().to_string();

    let initiated = initiate(&h.server, &order_id, "order", 300.0).await;
    let payment_id = initiated["payment_id"].as_str().unwrap();
    let response = h
        .server
        .post(&format!("/api/payments/{}/verify", payment_id))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["settlement"]["kind"], "order_confirmed");

    let order = h.server.get(&format!("/api/orders/{}", order_id)).await.json::<Value>();
    assert_eq!(order["status"], "confirmed");
    assert_eq!(order["payment_id"], payment_id);

    let products = h.server.get("/api/products").await.json::<Vec<Value>>();
    let after = products.iter().find(|p| p["id"] == product_id).unwrap();
    assert_eq!(after["stock"].as_i64().unwrap(), stock - 3);
}

#[tokio::test]
async fn test_closed_tournament_refuses_entries() {
    let h = harness().await;
    let token = admin_token(&h.server).await;
    let tournament_id = create_tournament(&h.server, &token).await;

    h.server
        .put(&format!("/api/admin/tournaments/{}/settings", tournament_id))
        .authorization_bearer(&token)
        .json(&json!({ "accept_entries": false }))
        .await
        .assert_status_ok();

    let response = h
        .server
        .post(&format!("/api/tournaments/{}/join", tournament_id))
        .json(&json!({ "name": "Asha", "email": "player@example.com", "phone": "9876543210" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["status"], "ongoing");

    h.server
        .post("/api/tournaments/missing/join")
        .json(&json!({ "name": "Asha", "email": "player@example.com", "phone": "9876543210" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bracket_lifecycle() {
    let h = harness().await;
    let token = admin_token(&h.server).await;
    let tournament_id = create_tournament(&h.server, &token).await;

    let response = h
        .server
        .post("/api/admin/brackets")
        .authorization_bearer(&token)
        .json(&json!({ "tournament_id": tournament_id, "bracket_data": { "rounds": 3 } }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let bracket_id = response.json::<Value>()["id"].as_str().unwrap().to_string();

    h.server
        .put(&format!("/api/admin/brackets/{}/match", bracket_id))
        .authorization_bearer(&token)
        .json(&json!({ "match": { "round": 1, "winner": "Asha" } }))
        .await
        .assert_status_ok();

    let bracket = h
        .server
        .get(&format!("/api/admin/brackets/{}", tournament_id))
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(bracket["matches"][0]["winner"], "Asha");
}

#[tokio::test]
async fn test_payment_proof_upload() {
    let h = harness().await;
    let initiated = initiate(&h.server, "order-1", "order", 99.0).await;
    let payment_id = initiated["payment_id"].as_str().unwrap();

    let receipt = || {
        MultipartForm::new().add_part(
            "receipt",
            Part::bytes(b"\x89PNG".to_vec())
                .file_name("receipt.png")
                .mime_type("image/png"),
        )
    };

    let response = h
        .server
        .post(&format!("/api/payments/{}/proof", payment_id))
        .multipart(receipt())
        .await;
    response.assert_status_ok();
    let url = response.json::<Value>()["payment_proof_url"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(url.starts_with("/uploads/payment-receipts/"));

    h.server.get(&url).await.assert_status_ok();

    h.server
        .post("/api/payments/missing/proof")
        .multipart(receipt())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
