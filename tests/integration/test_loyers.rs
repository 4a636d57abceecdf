//! Rent grid toggles and reminders.

use actix_web::http::StatusCode;
use chrono::{Datelike, Utc};
use serde_json::json;

use super::test_helpers::*;

const TENANT: &str = "eden.faure@exemple.test";

#[actix_rt::test]
async fn test_three_toggles_cycle_back_to_attente() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "LOY-1").await;

    let request = json!({ "logement_id": logement_id, "mois": 3, "annee": 2026 });
    let mut seen = Vec::new();
    for _ in 0..3 {
        let (status, body) = post(&app, &session, "/api/v1/loyers/toggle", request.clone()).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        seen.push(body["data"]["statut"].as_str().unwrap().to_string());
        if body["data"]["statut"] == "paye" {
            assert!(body["data"]["date_paiement"].is_string());
        } else {
            assert!(body["data"]["date_paiement"].is_null());
        }
    }
    assert_eq!(seen, ["paye", "impaye", "attente"]);

    let (_, grid) = get(
        &app,
        &session,
        &format!("/api/v1/loyers?annee=2026&logement_id={}", logement_id),
    )
    .await;
    let cells = grid["data"]["rows"][0]["mois"].as_array().unwrap();
    assert_eq!(cells.len(), 12);
    assert_eq!(cells[2]["statut"], "attente");
    assert_eq!(cells[2]["montant_attendu"], 665.0);
}

#[actix_rt::test]
async fn test_stale_expected_status_is_a_conflict() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "LOY-2").await;

    let (status, _) = post(
        &app,
        &session,
        "/api/v1/loyers/toggle",
        json!({ "logement_id": logement_id, "mois": 5, "annee": 2026, "expected_statut": "attente" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A second client still showing `attente` loses.
    let (status, body) = post(
        &app,
        &session,
        "/api/v1/loyers/toggle",
        json!({ "logement_id": logement_id, "mois": 5, "annee": 2026, "expected_statut": "attente" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let (_, grid) = get(
        &app,
        &session,
        &format!("/api/v1/loyers?annee=2026&logement_id={}", logement_id),
    )
    .await;
    assert_eq!(grid["data"]["rows"][0]["mois"][4]["statut"], "paye");
}

#[actix_rt::test]
async fn test_invalid_month_is_rejected() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "LOY-3").await;

    let (status, _) = post(
        &app,
        &session,
        "/api/v1/loyers/toggle",
        json!({ "logement_id": logement_id, "mois": 13, "annee": 2026 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_reminder_only_for_unpaid_month() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "LOY-4").await;
    let (contrat_id, locataire_id) = create_contrat(&app, &session, logement_id, TENANT).await;
    sign_contrat(&app, &session, contrat_id, locataire_id).await;

    let rappel = json!({ "logement_id": logement_id, "mois": 2, "annee": 2026 });
    let (status, _) = post(&app, &session, "/api/v1/loyers/rappel", rappel.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        post(
            &app,
            &session,
            "/api/v1/loyers/toggle",
            json!({ "logement_id": logement_id, "mois": 2, "annee": 2026 }),
        )
        .await;
    }

    env.mailer.clear();
    let (status, body) = post(&app, &session, "/api/v1/loyers/rappel", rappel).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["nb_rappels"], 1);
    assert_eq!(body["data"]["rappel_envoye"], true);

    let mails = env.mailer.sent_to(TENANT);
    assert_eq!(mails.len(), 1);
    assert!(mails[0].html.contains("février 2026"));
    assert!(mails[0].html.contains("665,00 €"));
}

#[actix_rt::test]
async fn test_admin_summary_reaches_every_administrator() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "LOY-5").await;

    let (status, _) = put(
        &app,
        &session,
        &format!("/api/v1/logements/{}", logement_id),
        json!({
            "reference": "LOY-5",
            "adresse": "8 rue des Tanneurs, 67000 Strasbourg",
            "loyer": 620.0,
            "charges": 45.0,
            "depot_garantie": 620.0,
            "statut": "en_location"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let today = Utc::now().date_naive();
    post(
        &app,
        &session,
        "/api/v1/loyers/toggle",
        json!({ "logement_id": logement_id, "mois": today.month(), "annee": today.year() }),
    )
    .await;

    env.mailer.clear();
    let (status, body) = post(&app, &session, "/api/v1/loyers/rappel-admin", json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["nb_payes"], 1);
    assert_eq!(body["data"]["destinataires"], 2);
    assert_eq!(body["data"]["envoyes"], 2);
    assert_eq!(env.mailer.sent_to("gestion@agence.test").len(), 1);
    assert_eq!(env.mailer.sent_to(NOTIFY_ADDRESS).len(), 1);

    let job = env
        .pool()
        .get_cron_job("rappel_loyers")
        .await
        .unwrap()
        .expect("seeded job");
    assert_eq!(job.statut_derniere_execution.as_deref(), Some("success"));
    assert!(job.derniere_execution.is_some());
}
