//! Lease lifecycle: signatures, validation and cancellation.

use actix_web::http::StatusCode;
use serde_json::json;

use super::test_helpers::*;

const TENANT: &str = "alix.moreau@exemple.test";

#[actix_rt::test]
async fn test_signing_every_tenant_moves_lease_to_signe() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "CTR-1").await;
    let (contrat_id, locataire_id) = create_contrat(&app, &session, logement_id, TENANT).await;

    let (_, detail) = get(&app, &session, &format!("/api/v1/contrats/{}", contrat_id)).await;
    assert_eq!(detail["data"]["contrat"]["statut"], "en_attente");
    assert!(detail["data"]["contrat"]["date_expiration"].is_string());

    let signed = sign_contrat(&app, &session, contrat_id, locataire_id).await;
    assert_eq!(signed["data"]["statut"], "signe");
    assert!(signed["data"]["date_signature"].is_string());

    let (_, detail) = get(&app, &session, &format!("/api/v1/contrats/{}", contrat_id)).await;
    let url = detail["data"]["locataires"][0]["signature_url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/signatures/"));

    // A second signature on a signed lease is refused.
    let (status, _) = post(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/signatures", contrat_id),
        json!({ "locataire_id": locataire_id, "signature_data": signature_data_url() }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_invalid_signature_is_rejected() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "CTR-2").await;
    let (contrat_id, locataire_id) = create_contrat(&app, &session, logement_id, TENANT).await;

    let (status, body) = post(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/signatures", contrat_id),
        json!({ "locataire_id": locataire_id, "signature_data": "data:image/svg+xml;base64,PHN2Zz4=" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (_, detail) = get(&app, &session, &format!("/api/v1/contrats/{}", contrat_id)).await;
    assert_eq!(detail["data"]["contrat"]["statut"], "en_attente");
}

#[actix_rt::test]
async fn test_validation_requires_signed_entree() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "CTR-3").await;
    let (contrat_id, locataire_id) = create_contrat(&app, &session, logement_id, TENANT).await;
    sign_contrat(&app, &session, contrat_id, locataire_id).await;

    let (status, body) = post(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/valider", contrat_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (_, detail) = get(&app, &session, &format!("/api/v1/contrats/{}", contrat_id)).await;
    assert_eq!(detail["data"]["contrat"]["statut"], "signe");
}

#[actix_rt::test]
async fn test_validation_sets_date_document_and_sends_two_emails() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "CTR-4").await;
    let (contrat_id, locataire_id) = create_contrat(&app, &session, logement_id, TENANT).await;
    sign_contrat(&app, &session, contrat_id, locataire_id).await;

    let (etat_id, rows) = open_etat_lieux(&app, &session, contrat_id, "entree").await;
    sign_etat_lieux(&app, &session, etat_id, &rows).await;

    let (status, _) = post(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/verification", contrat_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    env.mailer.clear();
    let (status, body) = post(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/valider", contrat_id),
        json!({ "notes": "Dossier complet" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let contrat = &body["data"];
    assert_eq!(contrat["statut"], "valide");
    assert!(contrat["date_validation"].is_string());
    assert_eq!(contrat["validation_notes"], "Dossier complet");
    let fichier = contrat["fichier_bail"].as_str().unwrap();
    assert!(fichier.starts_with("contrats/bail_"));
    assert!(env.uploads.path().join(fichier).is_file());

    assert_eq!(env.mailer.sent_to(TENANT).len(), 1);
    assert_eq!(env.mailer.sent_to(NOTIFY_ADDRESS).len(), 1);
    assert_eq!(env.mailer.sent().len(), 2);
    let admin_mail = &env.mailer.sent_to(NOTIFY_ADDRESS)[0];
    assert!(admin_mail.html.contains("Dossier complet"));

    let (_, logement) = get(&app, &session, &format!("/api/v1/logements/{}", logement_id)).await;
    assert_eq!(logement["data"]["statut"], "en_location");

    // Validated leases cannot be validated again.
    let (status, _) = post(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/valider", contrat_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_cancel_without_motif_leaves_status_unchanged() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "CTR-5").await;
    let (contrat_id, locataire_id) = create_contrat(&app, &session, logement_id, TENANT).await;
    sign_contrat(&app, &session, contrat_id, locataire_id).await;
    env.mailer.clear();

    for motif in [json!({}), json!({ "motif_annulation": "   " })] {
        let (status, body) = post(
            &app,
            &session,
            &format!("/api/v1/contrats/{}/annuler", contrat_id),
            motif,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    let (_, detail) = get(&app, &session, &format!("/api/v1/contrats/{}", contrat_id)).await;
    assert_eq!(detail["data"]["contrat"]["statut"], "signe");
    assert!(detail["data"]["contrat"]["motif_annulation"].is_null());
    assert!(env.mailer.sent().is_empty());
}

#[actix_rt::test]
async fn test_cancel_with_motif_notifies_tenant_and_admin() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "CTR-6").await;
    let (contrat_id, locataire_id) = create_contrat(&app, &session, logement_id, TENANT).await;
    sign_contrat(&app, &session, contrat_id, locataire_id).await;
    env.mailer.clear();

    let (status, body) = post(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/annuler", contrat_id),
        json!({ "motif_annulation": "Garant défaillant" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["statut"], "annule");
    assert_eq!(body["data"]["motif_annulation"], "Garant défaillant");

    let tenant_mail = env.mailer.sent_to(TENANT);
    assert_eq!(tenant_mail.len(), 1);
    assert!(tenant_mail[0].html.contains("Garant défaillant"));
    assert_eq!(env.mailer.sent_to(NOTIFY_ADDRESS).len(), 1);
}

#[actix_rt::test]
async fn test_pending_lease_cannot_be_cancelled() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "CTR-7").await;
    let (contrat_id, _) = create_contrat(&app, &session, logement_id, TENANT).await;

    let (status, _) = post(
        &app,
        &session,
        &format!("/api/v1/contrats/{}/annuler", contrat_id),
        json!({ "motif_annulation": "Erreur de saisie" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
