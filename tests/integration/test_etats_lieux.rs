//! États des lieux: editor, photos, bilan and finalisation.

use actix_web::http::{Method, StatusCode};
use serde_json::json;

use super::test_helpers::*;

const TENANT: &str = "jo.perrin@exemple.test";

#[actix_rt::test]
async fn test_photo_with_unknown_category_creates_nothing() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "EDL-1").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;
    let (etat_id, _) = open_etat_lieux(&app, &session, contrat_id, "entree").await;

    let png = png_bytes();
    let (status, body) = post_multipart(
        &app,
        &session,
        &format!("/api/v1/etats-lieux/{}/photos", etat_id),
        &[("categorie", "grenier")],
        ("photo", "grenier.png", &png),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "INVALID_INPUT");

    assert_eq!(env.pool().count_etat_lieux_photos(etat_id).await.unwrap(), 0);
    assert!(!env.uploads.path().join("etats_lieux").exists());
}

#[actix_rt::test]
async fn test_photo_upload_and_delete() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "EDL-2").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;
    let (etat_id, _) = open_etat_lieux(&app, &session, contrat_id, "entree").await;

    let png = png_bytes();
    let (status, body) = post_multipart(
        &app,
        &session,
        &format!("/api/v1/etats-lieux/{}/photos", etat_id),
        &[("categorie", "compteur_electricite"), ("description", "Index relevé")],
        ("photo", "compteur.png", &png),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let photo_id = body["data"]["id"].as_i64().unwrap();
    let chemin = body["data"]["chemin_fichier"].as_str().unwrap().to_string();
    assert!(env.uploads.path().join(&chemin).is_file());

    let (_, detail) = get(&app, &session, &format!("/api/v1/etats-lieux/{}", etat_id)).await;
    let grouped = detail["data"]["photos"]["compteur_electricite"].as_array().unwrap();
    assert_eq!(grouped.len(), 1);

    let (status, _) = call(
        &app,
        &session,
        Method::DELETE,
        &format!("/api/v1/etats-lieux/{}/photos/{}", etat_id, photo_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(env.pool().count_etat_lieux_photos(etat_id).await.unwrap(), 0);
    assert!(!env.uploads.path().join(&chemin).exists());
}

#[actix_rt::test]
async fn test_key_total_must_match_counts() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "EDL-3").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;
    let (etat_id, _) = open_etat_lieux(&app, &session, contrat_id, "entree").await;

    let (status, body) = put(
        &app,
        &session,
        &format!("/api/v1/etats-lieux/{}", etat_id),
        json!({ "cles_appartement": 2, "cles_boite_lettres": 1, "cles_total": 4 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[actix_rt::test]
async fn test_finalise_requires_signatures_then_locks_report() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "EDL-4").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;
    let (etat_id, rows) = open_etat_lieux(&app, &session, contrat_id, "entree").await;
    assert_eq!(rows.len(), 1);

    let finalize_uri = format!("/api/v1/etats-lieux/{}/finaliser", etat_id);
    let (status, _) = post(&app, &session, &finalize_uri, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let saved = sign_etat_lieux(&app, &session, etat_id, &rows).await;
    assert_eq!(saved["data"]["etat_lieux"]["cles_total"], 3);
    assert!(saved["data"]["locataires"][0]["signature_url"].is_string());

    env.mailer.clear();
    let (status, body) = post(&app, &session, &finalize_uri, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["statut"], "finalise");
    assert_eq!(env.mailer.sent_to(TENANT).len(), 1);

    let (status, _) = put(
        &app,
        &session,
        &format!("/api/v1/etats-lieux/{}", etat_id),
        json!({ "cles_appartement": 1, "cles_total": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_sortie_references_entree_and_sends_bilan_once() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "EDL-5").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;
    let (entree_id, entree_rows) = open_etat_lieux(&app, &session, contrat_id, "entree").await;
    sign_etat_lieux(&app, &session, entree_id, &entree_rows).await;

    let (status, sortie) = get(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/etats-lieux/sortie", contrat_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sortie["data"]["reference_entree"]["id"], entree_id);
    assert_eq!(sortie["data"]["reference_entree"]["compteur_electricite"], "004512");
    let sortie_id = sortie["data"]["etat_lieux"]["id"].as_i64().unwrap();

    // The entree report carries no bilan.
    let (status, _) = put(
        &app,
        &session,
        &format!("/api/v1/etats-lieux/{}/bilan", entree_id),
        json!({ "rows": [{ "poste": "Peinture", "valeur": 120.0, "montant_du": 60.0 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bilan_uri = format!("/api/v1/etats-lieux/{}/bilan", sortie_id);
    let (status, bilan) = put(
        &app,
        &session,
        &bilan_uri,
        json!({
            "rows": [
                { "poste": "Peinture séjour", "commentaire": "Traces", "valeur": 120.0, "montant_du": 60.0 },
                { "poste": "", "commentaire": "", "valeur": 0.0, "montant_du": 0.0 },
                { "poste": "Ménage", "valeur": 80.0, "montant_du": 80.0 }
            ],
            "commentaire": "Retenue sur dépôt"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", bilan);
    assert_eq!(bilan["data"]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(bilan["data"]["total_montant_du"], 140.0);

    env.mailer.clear();
    let send_uri = format!("/api/v1/etats-lieux/{}/bilan/envoyer", sortie_id);
    let (status, sent) = post(&app, &session, &send_uri, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", sent);
    assert_eq!(sent["data"]["envoye"], true);
    let mails = env.mailer.sent_to(TENANT);
    assert_eq!(mails.len(), 1);
    assert!(mails[0].html.contains("Peinture séjour"));
    assert!(mails[0].html.contains("<table"));

    let (status, _) = post(&app, &session, &send_uri, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = put(&app, &session, &bilan_uri, json!({ "rows": [] })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_unknown_report_type_is_rejected() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "EDL-6").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;

    let (status, _) = get(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/etats-lieux/intermediaire", contrat_id),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn signature_files(env: &TestEnv) -> Vec<String> {
    match std::fs::read_dir(env.uploads.path().join("signatures")) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("edl_"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[actix_rt::test]
async fn test_save_without_signatures_clears_previous_ones() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "EDL-7").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;
    let (etat_id, rows) = open_etat_lieux(&app, &session, contrat_id, "entree").await;

    let saved = sign_etat_lieux(&app, &session, etat_id, &rows).await;
    assert!(saved["data"]["locataires"][0]["signature_url"].is_string());
    assert_eq!(signature_files(&env).len(), 1);

    let (status, body) = put(
        &app,
        &session,
        &format!("/api/v1/etats-lieux/{}", etat_id),
        json!({ "cles_appartement": 2, "cles_boite_lettres": 1, "cles_total": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    for row in body["data"]["locataires"].as_array().unwrap() {
        assert!(row["signature_url"].is_null());
        assert!(row["signature_timestamp"].is_null());
    }
    assert!(signature_files(&env).is_empty());

    let (status, _) = post(
        &app,
        &session,
        &format!("/api/v1/etats-lieux/{}/finaliser", etat_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_resigning_replaces_the_stored_image() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "EDL-8").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;
    let (etat_id, rows) = open_etat_lieux(&app, &session, contrat_id, "entree").await;

    sign_etat_lieux(&app, &session, etat_id, &rows).await;
    let first = signature_files(&env);
    sign_etat_lieux(&app, &session, etat_id, &rows).await;
    let second = signature_files(&env);

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first, second);
}

#[actix_rt::test]
async fn test_malformed_signature_is_rejected_without_writing() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "EDL-9").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;
    let (etat_id, rows) = open_etat_lieux(&app, &session, contrat_id, "entree").await;

    for data in [
        "data:image/gif;base64,R0lGODlhAQABAAAAACw=",
        "data:image/png;base64,@@@@",
        "javascript:alert(1)",
    ] {
        let (status, body) = put(
            &app,
            &session,
            &format!("/api/v1/etats-lieux/{}", etat_id),
            json!({
                "cles_total": 0,
                "signatures": [{
                    "etat_lieux_locataire_id": rows[0],
                    "signature_data": data,
                    "certifie_exact": true
                }]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}: {}", data, body);
        assert_eq!(body["error"], "INVALID_INPUT");
    }
    assert!(signature_files(&env).is_empty());

    let (_, body) = get(&app, &session, &format!("/api/v1/etats-lieux/{}", etat_id)).await;
    assert!(body["data"]["locataires"][0]["signature_url"].is_null());
}
