//! Shared helpers for the integration suite.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{Method, StatusCode};
use actix_web::{App, test};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use tempfile::TempDir;

use locatif_lib::api;
use locatif_lib::auth::hash_password;
use locatif_lib::config::{CSRF_HEADER, Config, SESSION_COOKIE};
use locatif_lib::db::DbPool;
use locatif_lib::services::RecordingMailer;
use locatif_lib::state::AppState;

pub const ADMIN_USERNAME: &str = "gestion";
pub const ADMIN_PASSWORD: &str = "mot-de-passe-solide";
/// Address configured as the notification recipient.
pub const NOTIFY_ADDRESS: &str = "notifications@agence.test";

const MULTIPART_BOUNDARY: &str = "locatif-test-boundary";

/// Minimal PNG header, enough for the signature and photo checks.
const PNG_BYTES: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// State plus the handles tests inspect afterwards. The directories are
/// removed on drop.
pub struct TestEnv {
    pub state: AppState,
    pub mailer: RecordingMailer,
    pub uploads: TempDir,
    pub backups: TempDir,
}

impl TestEnv {
    pub fn pool(&self) -> &DbPool {
        &self.state.pool
    }
}

/// Logged-in administrator session.
pub struct Session {
    pub token: String,
    pub csrf: String,
}

/// Fresh database, directories and an active administrator.
pub async fn create_test_env() -> TestEnv {
    let uploads = tempfile::tempdir().expect("uploads dir");
    let backups = tempfile::tempdir().expect("backup dir");
    let mut config =
        Config::for_directories(uploads.path().to_path_buf(), backups.path().to_path_buf());
    config.admin_email = NOTIFY_ADDRESS.to_string();

    let pool = DbPool::new(&config).await.expect("connect sqlite");
    pool.run_migrations().await.expect("run migrations");

    let hash = hash_password(ADMIN_PASSWORD).expect("hash password");
    pool.insert_administrateur(ADMIN_USERNAME, "gestion@agence.test", &hash, Some("Camille Gestion"))
        .await
        .expect("insert admin");

    let mailer = RecordingMailer::new();
    let state = AppState::new(config, pool, Arc::new(mailer.clone()));
    TestEnv {
        state,
        mailer,
        uploads,
        backups,
    }
}

/// Full router over the test state.
pub async fn create_test_app(
    env: &TestEnv,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let state = env.state.clone();
    test::init_service(
        App::new()
            .configure(move |cfg| state.register(cfg))
            .configure(api::configure_routes),
    )
    .await
}

pub async fn login<S>(app: &S) -> Session
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "login should succeed");
    let token = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .expect("session cookie");
    let body: Value = test::read_body_json(resp).await;
    let csrf = body["data"]["csrf_token"]
        .as_str()
        .expect("csrf token")
        .to_string();
    Session { token, csrf }
}

/// Send a request with the session cookie and CSRF header; returns the
/// status and the JSON body.
pub async fn call<S>(
    app: &S,
    session: &Session,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::default()
        .method(method)
        .uri(uri)
        .cookie(Cookie::new(SESSION_COOKIE, session.token.clone()))
        .insert_header((CSRF_HEADER, session.csrf.clone()));
    if let Some(body) = body {
        req = req.set_json(body);
    }
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

pub async fn get<S>(app: &S, session: &Session, uri: &str) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    call(app, session, Method::GET, uri, None).await
}

pub async fn post<S>(app: &S, session: &Session, uri: &str, body: Value) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    call(app, session, Method::POST, uri, Some(body)).await
}

pub async fn put<S>(app: &S, session: &Session, uri: &str, body: Value) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    call(app, session, Method::PUT, uri, Some(body)).await
}

/// POST a multipart form with text fields and one file part.
pub async fn post_multipart<S>(
    app: &S,
    session: &Session,
    uri: &str,
    fields: &[(&str, &str)],
    file: (&str, &str, &[u8]),
) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                b = MULTIPART_BOUNDARY
            )
            .as_bytes(),
        );
    }
    let (field, filename, bytes) = file;
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            b = MULTIPART_BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    let req = test::TestRequest::post()
        .uri(uri)
        .cookie(Cookie::new(SESSION_COOKIE, session.token.clone()))
        .insert_header((CSRF_HEADER, session.csrf.clone()))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

pub fn png_bytes() -> Vec<u8> {
    PNG_BYTES.to_vec()
}

pub fn signature_data_url() -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(PNG_BYTES))
}

/// Create a logement and return its id.
pub async fn create_logement<S>(app: &S, session: &Session, reference: &str) -> i32
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = post(
        app,
        session,
        "/api/v1/logements",
        json!({
            "reference": reference,
            "adresse": "8 rue des Tanneurs, 67000 Strasbourg",
            "type_logement": "T2",
            "surface": 41.5,
            "loyer": 620.0,
            "charges": 45.0,
            "depot_garantie": 620.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create logement: {}", body);
    body["data"]["id"].as_i64().expect("logement id") as i32
}

/// Create a lease with one tenant; returns `(contrat_id, locataire_id)`.
pub async fn create_contrat<S>(
    app: &S,
    session: &Session,
    logement_id: i32,
    tenant_email: &str,
) -> (i32, i32)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = post(
        app,
        session,
        "/api/v1/contrats",
        json!({
            "logement_id": logement_id,
            "date_prise_effet": "2026-11-01",
            "locataires": [
                { "nom": "Moreau", "prenom": "Alix", "email": tenant_email }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create contrat: {}", body);
    let contrat_id = body["data"]["contrat"]["id"].as_i64().expect("contrat id") as i32;
    let locataire_id = body["data"]["locataires"][0]["id"]
        .as_i64()
        .expect("locataire id") as i32;
    (contrat_id, locataire_id)
}

/// Sign the lease for `locataire_id`.
pub async fn sign_contrat<S>(app: &S, session: &Session, contrat_id: i32, locataire_id: i32) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = post(
        app,
        session,
        &format!("/api/v1/contrats/{}/signatures", contrat_id),
        json!({
            "locataire_id": locataire_id,
            "signature_data": signature_data_url(),
            "mention_lu_approuve": "Lu et approuvé"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "sign contrat: {}", body);
    body
}

/// Open the report of `type_etat` for the lease; returns `(id, tenant row ids)`.
pub async fn open_etat_lieux<S>(
    app: &S,
    session: &Session,
    contrat_id: i32,
    type_etat: &str,
) -> (i32, Vec<i32>)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = get(
        app,
        session,
        &format!("/api/v1/contrats/{}/etats-lieux/{}", contrat_id, type_etat),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "open etat des lieux: {}", body);
    let id = body["data"]["etat_lieux"]["id"].as_i64().expect("edl id") as i32;
    let rows = body["data"]["locataires"]
        .as_array()
        .expect("tenant rows")
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .map(|id| id as i32)
        .collect();
    (id, rows)
}

/// Save the report with two keys and every tenant signed.
pub async fn sign_etat_lieux<S>(app: &S, session: &Session, etat_id: i32, rows: &[i32]) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let signatures: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "etat_lieux_locataire_id": row,
                "signature_data": signature_data_url(),
                "certifie_exact": true
            })
        })
        .collect();
    let (status, body) = put(
        app,
        session,
        &format!("/api/v1/etats-lieux/{}", etat_id),
        json!({
            "compteur_electricite": "004512",
            "compteur_eau_froide": "000231",
            "cles_appartement": 2,
            "cles_boite_lettres": 1,
            "cles_autre": 0,
            "cles_total": 3,
            "etat_general": "Bon état général",
            "lieu_signature": "Strasbourg",
            "signatures": signatures
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "save etat des lieux: {}", body);
    body
}
