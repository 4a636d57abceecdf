//! Candidature creation, detail and document uploads.

use actix_web::http::StatusCode;
use serde_json::json;

use super::test_helpers::*;

fn candidature_payload(logement_id: i32) -> serde_json::Value {
    json!({
        "logement_id": logement_id,
        "nom": "Lambert",
        "prenom": "Noa",
        "email": "Noa.Lambert@exemple.test",
        "telephone": "06 12 34 56 78",
        "statut_professionnel": "CDI",
        "revenus_mensuels": 2400.0,
        "nb_occupants": 2,
        "garantie_visale": true
    })
}

#[actix_rt::test]
async fn test_detail_keeps_reference_and_groups_documents() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "CAND-L1").await;

    let (status, created) = post(
        &app,
        &session,
        "/api/v1/candidatures",
        candidature_payload(logement_id),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let id = created["data"]["id"].as_i64().unwrap();
    let reference = created["data"]["reference_unique"].as_str().unwrap().to_string();
    assert!(reference.starts_with("CAND-"));
    assert_eq!(created["data"]["email"], "noa.lambert@exemple.test");
    assert_eq!(created["data"]["statut"], "en_cours");

    let uri = format!("/api/v1/candidatures/{}/documents", id);
    for (type_document, filename) in [
        ("bulletins_salaire", "bulletin-septembre.pdf"),
        ("bulletins_salaire", "bulletin-aout.pdf"),
        ("piece_identite", "identite.png"),
    ] {
        let (status, body) = post_multipart(
            &app,
            &session,
            &uri,
            &[("type_document", type_document)],
            ("fichier", filename, b"%PDF-1.4 test"),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let (status, detail) = get(&app, &session, &format!("/api/v1/candidatures/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["candidature"]["reference_unique"], reference.as_str());
    assert_eq!(detail["data"]["logement"]["id"], logement_id);

    let documents = detail["data"]["documents"].as_object().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents["bulletins_salaire"].as_array().unwrap().len(), 2);
    assert_eq!(documents["piece_identite"].as_array().unwrap().len(), 1);
    for document in documents["bulletins_salaire"].as_array().unwrap() {
        let chemin = document["chemin_fichier"].as_str().unwrap();
        assert!(chemin.starts_with("candidatures/"));
        assert!(env.uploads.path().join(chemin).is_file());
    }
}

#[actix_rt::test]
async fn test_document_upload_rejects_unknown_type_and_extension() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (_, created) = post(
        &app,
        &session,
        "/api/v1/candidatures",
        json!({ "nom": "Roux", "prenom": "Lou", "email": "lou@exemple.test" }),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/candidatures/{}/documents", id);

    let (status, body) = post_multipart(
        &app,
        &session,
        &uri,
        &[("type_document", "lettre_motivation")],
        ("fichier", "lettre.pdf", b"%PDF"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (status, _) = post_multipart(
        &app,
        &session,
        &uri,
        &[("type_document", "autre")],
        ("fichier", "script.exe", b"MZ"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, detail) = get(&app, &session, &format!("/api/v1/candidatures/{}", id)).await;
    assert!(detail["data"]["documents"].as_object().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_invalid_candidature_is_rejected() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (status, body) = post(
        &app,
        &session,
        "/api/v1/candidatures",
        json!({ "nom": "", "prenom": "Lou", "email": "lou@exemple.test" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, list) = get(&app, &session, "/api/v1/candidatures").await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_status_change_is_logged() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (_, created) = post(
        &app,
        &session,
        "/api/v1/candidatures",
        json!({ "nom": "Roux", "prenom": "Lou", "email": "lou@exemple.test" }),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = put(
        &app,
        &session,
        &format!("/api/v1/candidatures/{}/statut", id),
        json!({ "statut": "visite_planifiee", "commentaire": "Visite jeudi 18h" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["statut"], "visite_planifiee");

    let (_, detail) = get(&app, &session, &format!("/api/v1/candidatures/{}", id)).await;
    let logs = detail["data"]["logs"].as_array().unwrap();
    assert!(logs.iter().any(|l| l["action"] == "statut_modifie"));
}
