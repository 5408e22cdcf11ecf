use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use marquee::api::AppState;
use marquee::config::Config;
use marquee::models::user::Role;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const MANAGER: (&str, &str) = ("manager@example.com", "secret3");
const ALICE: (&str, &str) = ("alice@example.com", "secret");
const BOB: (&str, &str) = ("bob@example.com", "secret2");

async fn spawn_app_with(persistent_sessions: bool) -> (Arc<AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("marquee-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    config.server.persistent_sessions = persistent_sessions;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.totp_skew_steps = 1;

    let state = marquee::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    for ((email, password), role) in [(MANAGER, Role::Manager), (ALICE, Role::User), (BOB, Role::User)]
    {
        state
            .auth_service()
            .register(email, password, role)
            .await
            .expect("failed to register user");
    }

    let router = marquee::api::router(state.clone())
        .await
        .expect("failed to build router");
    (state, router)
}

async fn spawn_app() -> (Arc<AppState>, Router) {
    spawn_app_with(true).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
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
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Logs in and returns the `name=value` pair of the session cookie.
async fn login(app: &Router, (email, password): (&str, &str)) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "login failed for {email}");

    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("login should set a session cookie")
        .to_string()
}

async fn create_show(app: &Router, manager: &str, capacity: i32) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/theaters",
        Some(manager),
        Some(json!({ "name": "Petite salle", "capacity": capacity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let theater_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        app,
        "POST",
        "/api/shows",
        Some(manager),
        Some(json!({
            "name": "Spectacle 1",
            "theater_id": theater_id,
            "date": "2023-11-30",
            "time": "21:00",
            "description": "Descriptif 1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let (_, app) = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_protected_routes_require_login() {
    let (_, app) = spawn_app().await;

    for (method, uri) in [
        ("GET", "/api/shows"),
        ("GET", "/api/bookings"),
        ("GET", "/api/auth/me"),
        ("POST", "/api/shows/1/bookings"),
    ] {
        let (status, body) = send(&app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let (_, app) = spawn_app().await;

    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret" })),
    )
    .await;
    let (wrong_status, wrong_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ALICE.0, "password": "wrong-password" })),
    )
    .await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn test_me_and_logout() {
    let (_, app) = spawn_app_with(false).await;
    let cookie = login(&app, ALICE).await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], ALICE.0);
    assert_eq!(body["data"]["role"], "USER");
    assert_eq!(body["data"]["totp_enabled"], false);

    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_booking_flow_respects_capacity() {
    let (_, app) = spawn_app().await;
    let manager = login(&app, MANAGER).await;
    let alice = login(&app, ALICE).await;
    let bob = login(&app, BOB).await;

    let show_id = create_show(&app, &manager, 1).await;
    let book_uri = format!("/api/shows/{show_id}/bookings");

    let (status, body) = send(&app, "POST", &book_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["available"], 0);
    let alice_booking = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "POST", &book_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, "GET", "/api/bookings", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["show_name"], "Spectacle 1");
    assert_eq!(body["data"][0]["theater_name"], "Petite salle");

    // Bob cannot cancel Alice's seat
    let cancel_uri = format!("/api/bookings/{alice_booking}");
    let (status, _) = send(&app, "DELETE", &cancel_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &cancel_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &cancel_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", &book_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", &format!("/api/shows/{show_id}"), Some(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["booked"], 1);
    assert_eq!(body["data"]["spectators"][0]["email"], BOB.0);

    // Spectator lists are for managers only
    let (_, body) = send(&app, "GET", &format!("/api/shows/{show_id}"), Some(&alice), None).await;
    assert!(body["data"].get("spectators").is_none());
}

#[tokio::test]
async fn test_manager_only_routes() {
    let (_, app) = spawn_app().await;
    let alice = login(&app, ALICE).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/theaters",
        Some(&alice),
        Some(json!({ "name": "Grande salle", "capacity": 500 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/theaters", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", "/api/shows/1", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/metrics", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&alice),
        Some(json!({ "email": "boss@example.com", "password": "secret", "role": "MANAGER" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&alice),
        Some(json!({ "email": "friend@example.com", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_delete_show() {
    let (_, app) = spawn_app().await;
    let manager = login(&app, MANAGER).await;
    let alice = login(&app, ALICE).await;

    let show_id = create_show(&app, &manager, 10).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/shows/{show_id}/bookings"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let show_uri = format!("/api/shows/{show_id}");
    let (status, _) = send(&app, "DELETE", &show_uri, Some(&manager), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &show_uri, Some(&manager), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/bookings", Some(&alice), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, "DELETE", &show_uri, Some(&manager), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_show_input_validation() {
    let (_, app) = spawn_app().await;
    let manager = login(&app, MANAGER).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/theaters",
        Some(&manager),
        Some(json!({ "name": "Hall", "capacity": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/shows",
        Some(&manager),
        Some(json!({ "name": "Spectacle", "theater_id": 77, "date": "2023-11-30", "time": "21:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/shows",
        Some(&manager),
        Some(json!({ "name": "Spectacle", "theater_id": 1, "date": "30/11/2023", "time": "21:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_password_change_over_http() {
    let (_, app) = spawn_app().await;
    let alice = login(&app, ALICE).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&alice),
        Some(json!({ "old_password": "nope-nope", "new_password": "changed!" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&alice),
        Some(json!({ "old_password": ALICE.1, "new_password": "changed!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    login(&app, (ALICE.0, "changed!")).await;
}

#[tokio::test]
async fn test_totp_enrollment_and_login() {
    let (_, app) = spawn_app().await;
    let alice = login(&app, ALICE).await;

    let (status, body) = send(&app, "GET", "/api/auth/totp/setup", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let secret = body["data"]["secret"].as_str().unwrap().to_string();
    assert!(
        body["data"]["provisioning_uri"]
            .as_str()
            .unwrap()
            .starts_with("otpauth://totp/")
    );

    let code = || {
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap();
        marquee::services::totp::code_at(&secret, now).unwrap()
    };

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/totp",
        Some(&alice),
        Some(json!({ "code": code() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/auth/me", Some(&alice), None).await;
    assert_eq!(body["data"]["totp_enabled"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ALICE.0, "password": ALICE.1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ALICE.0, "password": ALICE.1, "totp": code() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", "/api/auth/totp", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    login(&app, ALICE).await;
}
