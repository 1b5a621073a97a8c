use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chargeback_webhook_api::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .expect("req"),
        )
        .await
        .expect("call");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn ada() -> Value {
    json!({
        "email": "ada@example.com",
        "username": "ada",
        "password": "secret1",
        "first_name": "Ada"
    })
}

#[tokio::test]
async fn create_get_list_round_trip() {
    let router = build_router(AppState::new());

    let (status, created) = call(&router, "POST", "/api/users", Some(ada())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["is_active"], true);
    assert!(created.get("password_hash").is_none());
    assert!(created.get("password").is_none());

    let (status, fetched) = call(&router, "GET", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, listed) = call(&router, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn duplicates_conflict() {
    let router = build_router(AppState::new());
    call(&router, "POST", "/api/users", Some(ada())).await;

    let (status, out) = call(&router, "POST", "/api/users", Some(ada())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(out["error"], "User with this email already exists");

    let mut same_name = ada();
    same_name["email"] = json!("other@example.com");
    let (status, out) = call(&router, "POST", "/api/users", Some(same_name)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(out["error"], "User with this username already exists");
}

#[tokio::test]
async fn invalid_create_body() {
    let router = build_router(AppState::new());
    let (status, out) = call(
        &router,
        "POST",
        "/api/users",
        Some(json!({ "email": "nope", "username": "ada", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        out,
        json!({
            "error": "Validation failed",
            "details": [{ "field": "email", "message": "Invalid email format" }]
        })
    );
}

#[tokio::test]
async fn update_and_delete() {
    let router = build_router(AppState::new());
    call(&router, "POST", "/api/users", Some(ada())).await;
    let mut bob = ada();
    bob["email"] = json!("bob@example.com");
    bob["username"] = json!("bob");
    call(&router, "POST", "/api/users", Some(bob)).await;

    let (status, out) = call(
        &router,
        "PUT",
        "/api/users/1",
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(out["error"], "User with this username already exists");

    let (status, out) = call(
        &router,
        "PUT",
        "/api/users/1",
        Some(json!({ "last_name": "Lovelace", "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["last_name"], "Lovelace");
    assert_eq!(out["is_active"], false);
    assert_eq!(out["username"], "ada");

    let (status, _) = call(&router, "DELETE", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, out) = call(&router, "GET", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(out["error"], "User not found");

    let (status, _) = call(&router, "DELETE", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let router = build_router(AppState::new());
    let (status, out) = call(&router, "GET", "/api/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(out["error"], "Invalid parameters");
    assert_eq!(out["details"][0]["field"], "id");
}
