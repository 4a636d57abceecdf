//! Backups: file archives, restore path checks and the schedule.

use actix_web::http::StatusCode;
use locatif_lib::entity::sauvegarde::SauvegardeType;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_restore_rejects_escaping_file_name() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let outside = env.uploads.path().join("marker.txt");
    std::fs::write(&outside, b"intact").unwrap();

    let row = env
        .pool()
        .insert_sauvegarde(SauvegardeType::Database, "../../etc/evil.sql.gz", None, 10, None)
        .await
        .unwrap();

    let (status, body) = post(
        &app,
        &session,
        &format!("/api/v1/sauvegardes/{}/restore", row.id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["error"], "INVALID_PATH");
    assert_eq!(std::fs::read(&outside).unwrap(), b"intact");
}

#[actix_rt::test]
async fn test_full_backup_checks_both_parts_before_restoring() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    // The database part is fine, the archive part escapes.
    std::fs::write(env.backups.path().join("ok.sql.gz"), b"").unwrap();
    let row = env
        .pool()
        .insert_sauvegarde(SauvegardeType::Full, "ok.sql.gz", Some("/tmp/files.tar.gz"), 0, None)
        .await
        .unwrap();

    let (status, body) = post(
        &app,
        &session,
        &format!("/api/v1/sauvegardes/{}/restore", row.id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_PATH");
}

#[actix_rt::test]
async fn test_files_backup_restores_uploads() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let document = env.uploads.path().join("candidatures").join("piece.pdf");
    std::fs::create_dir_all(document.parent().unwrap()).unwrap();
    std::fs::write(&document, b"%PDF-1.4 contenu").unwrap();

    let (status, body) = post(&app, &session, "/api/v1/sauvegardes", json!({ "type": "files" })).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["data"]["id"].as_i64().unwrap();
    let fichier = body["data"]["fichier"].as_str().unwrap().to_string();
    assert!(fichier.starts_with("backup_files_"));
    assert!(fichier.ends_with(".tar.gz"));
    assert!(env.backups.path().join(&fichier).is_file());

    std::fs::remove_file(&document).unwrap();

    let (status, _) = post(
        &app,
        &session,
        &format!("/api/v1/sauvegardes/{}/restore", id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(std::fs::read(&document).unwrap(), b"%PDF-1.4 contenu");

    let (_, list) = get(&app, &session, "/api/v1/sauvegardes").await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let (status, _) = call(
        &app,
        &session,
        actix_web::http::Method::DELETE,
        &format!("/api/v1/sauvegardes/{}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!env.backups.path().join(&fichier).exists());

    let (_, list) = get(&app, &session, "/api/v1/sauvegardes").await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_schedule_round_trip_and_validation() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (status, body) = get(&app, &session, "/api/v1/sauvegardes/schedule").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["actif"], false);

    let schedule = json!({ "actif": true, "frequence": "weekly", "heure": 3, "retention_jours": 14 });
    let (status, _) = put(&app, &session, "/api/v1/sauvegardes/schedule", schedule.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, &session, "/api/v1/sauvegardes/schedule").await;
    assert_eq!(body["data"], schedule);

    let job = env.pool().get_cron_job("backup").await.unwrap().unwrap();
    assert!(job.actif);
    assert_eq!(job.cron_expression, "0 3 * * 0");

    let (status, _) = put(
        &app,
        &session,
        "/api/v1/sauvegardes/schedule",
        json!({ "actif": true, "frequence": "daily", "heure": 24, "retention_jours": 14 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put(
        &app,
        &session,
        "/api/v1/sauvegardes/schedule",
        json!({ "actif": true, "frequence": "daily", "heure": 2, "retention_jours": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_upload_rejects_unknown_extension() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (status, _) = post_multipart(
        &app,
        &session,
        "/api/v1/sauvegardes/upload",
        &[],
        ("fichier", "dump.zip", b"PK"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(env.backups.path()).unwrap().count(), 0);
}
