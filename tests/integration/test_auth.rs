//! Session login, CSRF enforcement and logout.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use locatif_lib::config::SESSION_COOKIE;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_login_rejects_bad_password() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": ADMIN_USERNAME, "password": "pas-le-bon" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_rt::test]
async fn test_disabled_admin_cannot_log_in() {
    let env = create_test_env().await;
    env.pool()
        .set_administrateur_actif(ADMIN_USERNAME, false)
        .await
        .unwrap();
    let app = create_test_app(&env).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_requests_without_session_are_rejected() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let req = test::TestRequest::get().uri("/api/v1/logements").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_me_returns_admin_and_csrf_token() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (status, body) = get(&app, &session, "/api/v1/auth/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["admin"]["username"], ADMIN_USERNAME);
    assert_eq!(body["data"]["csrf_token"], session.csrf.as_str());
    assert!(body["data"]["admin"].get("password_hash").is_none());
}

#[actix_rt::test]
async fn test_state_change_requires_csrf_header() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let payload = json!({ "reference": "CSRF-1", "adresse": "1 place Kléber" });

    let missing = test::TestRequest::post()
        .uri("/api/v1/logements")
        .cookie(Cookie::new(SESSION_COOKIE, session.token.clone()))
        .set_json(payload.clone())
        .to_request();
    let resp = test::call_service(&app, missing).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let wrong = test::TestRequest::post()
        .uri("/api/v1/logements")
        .cookie(Cookie::new(SESSION_COOKIE, session.token.clone()))
        .insert_header(("X-CSRF-Token", "0000"))
        .set_json(payload.clone())
        .to_request();
    let resp = test::call_service(&app, wrong).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let (status, _) = post(&app, &session, "/api/v1/logements", payload).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_rt::test]
async fn test_logout_revokes_session() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (status, _) = post(&app, &session, "/api/v1/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, &session, "/api/v1/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", body);
}

#[actix_rt::test]
async fn test_health_is_public() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;

    let req = test::TestRequest::get().uri("/api/v1/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["database"], "connected");
}

#[actix_rt::test]
async fn test_uploads_reject_escaping_paths() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (status, body) = get(&app, &session, "/uploads/..%2F..%2Fetc%2Fpasswd").await;
    assert!(
        status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND,
        "unexpected {}: {}",
        status,
        body
    );
}
