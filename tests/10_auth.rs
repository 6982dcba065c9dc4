// Authentication / authorization chain tests.
//
// These drive the real router, but only along paths that are denied (or
// answered) before any database work happens, so no live Postgres is needed.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use jobboard_api::auth::{sign_token, Claims};
use jobboard_api::config;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn bearer_for(username: &str, is_admin: bool) -> String {
    let claims = Claims::new(username, is_admin);
    let token = sign_token(&claims, &config::config().security.jwt_secret).unwrap();
    format!("Bearer {}", token)
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const COMPANY_BODY: &str = r#"{"handle":"acme","name":"Acme","description":"Anvils"}"#;

#[tokio::test]
async fn root_is_public() {
    init_tracing();
    let app = jobboard_api::app();

    let response = app
        .oneshot(json_request("GET", "/", None, ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["success"], serde_json::json!(true));
}

#[tokio::test]
async fn root_ignores_valid_token() {
    let app = jobboard_api::app();
    let auth = bearer_for("u1", false);

    let response = app
        .oneshot(json_request("GET", "/", Some(&auth), ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_cannot_create_company() {
    let app = jobboard_api::app();

    let response = app
        .oneshot(json_request("POST", "/companies", None, COMPANY_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = body_json(response).await;
    assert_eq!(payload["code"], serde_json::json!("UNAUTHORIZED"));
}

#[tokio::test]
async fn non_admin_cannot_create_company() {
    let app = jobboard_api::app();
    let auth = bearer_for("u1", false);

    let response = app
        .oneshot(json_request("POST", "/companies", Some(&auth), COMPANY_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_wrong_secret_is_anonymous() {
    let app = jobboard_api::app();
    let claims = Claims::new("adminuser", true);
    let token = sign_token(&claims, "some-other-secret").unwrap();
    let auth = format!("Bearer {}", token);

    let response = app
        .oneshot(json_request("POST", "/companies", Some(&auth), COMPANY_BODY))
        .await
        .unwrap();

    // The bad signature does not fail the request; it just leaves the
    // context empty, and the admin check rejects the anonymous caller.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_authorization_header_is_anonymous() {
    let app = jobboard_api::app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/companies",
            Some("Token abc"),
            COMPANY_BODY,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_bearer_token_is_anonymous() {
    let app = jobboard_api::app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/companies",
            Some("Bearer not.a.token"),
            COMPANY_BODY,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_cannot_list_users() {
    let app = jobboard_api::app();

    let response = app
        .oneshot(json_request("GET", "/users", None, ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_cannot_list_users() {
    let app = jobboard_api::app();
    let auth = bearer_for("u1", false);

    let response = app
        .oneshot(json_request("GET", "/users", Some(&auth), ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_cannot_patch_other_user() {
    let app = jobboard_api::app();
    let auth = bearer_for("test2", false);

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/users/test",
            Some(&auth),
            r#"{"firstName":"X"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_filter_key_is_rejected() {
    let app = jobboard_api::app();

    let response = app
        .oneshot(json_request("GET", "/companies?nope=1", None, ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
