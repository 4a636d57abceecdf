//! Inventory catalog, per-logement equipment and checklists.

use actix_web::http::{Method, StatusCode};
use serde_json::{Value, json};

use super::test_helpers::*;

fn category_ids(list: &Value) -> Vec<i64> {
    list["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_i64())
        .collect()
}

#[actix_rt::test]
async fn test_non_empty_category_needs_confirmation() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "INV-1").await;

    let (status, created) = post(
        &app,
        &session,
        "/api/v1/inventaire/categories",
        json!({ "nom": "Extérieur", "icone": "tree" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let categorie_id = created["data"]["id"].as_i64().unwrap();

    let (status, _) = post(
        &app,
        &session,
        "/api/v1/inventaire/sous-categories",
        json!({ "categorie_id": categorie_id, "nom": "Balcon" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, equipement) = post(
        &app,
        &session,
        &format!("/api/v1/logements/{}/equipements", logement_id),
        json!({ "categorie_id": categorie_id, "nom": "Salon de jardin", "quantite": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", equipement);
    let equipement_id = equipement["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/inventaire/categories/{}", categorie_id);
    let (status, body) = call(&app, &session, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["needs_confirmation"], true);
    assert_eq!(body["data"]["deleted"], false);
    assert_eq!(body["data"]["nb_sous_categories"], 1);
    assert_eq!(body["data"]["nb_equipements"], 1);
    assert_eq!(body["notices"][0]["level"], "warning");

    let (_, list) = get(&app, &session, "/api/v1/inventaire/categories").await;
    assert!(category_ids(&list).contains(&categorie_id));

    let (status, body) = call(
        &app,
        &session,
        Method::DELETE,
        &format!("{}?confirmed=1", uri),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (_, list) = get(&app, &session, "/api/v1/inventaire/categories").await;
    assert!(!category_ids(&list).contains(&categorie_id));

    let (_, equipements) = get(
        &app,
        &session,
        &format!("/api/v1/logements/{}/equipements", logement_id),
    )
    .await;
    assert!(
        !equipements["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["id"].as_i64() == Some(equipement_id))
    );
}

#[actix_rt::test]
async fn test_empty_category_is_deleted_directly() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (_, created) = post(
        &app,
        &session,
        "/api/v1/inventaire/categories",
        json!({ "nom": "Cave" }),
    )
    .await;
    let categorie_id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        &session,
        Method::DELETE,
        &format!("/api/v1/inventaire/categories/{}", categorie_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);
    assert_eq!(body["data"]["needs_confirmation"], false);
}

#[actix_rt::test]
async fn test_first_listing_seeds_default_equipment_once() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "INV-2").await;
    let uri = format!("/api/v1/logements/{}/equipements", logement_id);

    let (status, first) = get(&app, &session, &uri).await;
    assert_eq!(status, StatusCode::OK);
    let seeded = first["data"].as_array().unwrap().len();
    assert!(seeded > 0);
    assert_eq!(first["notices"][0]["level"], "info");

    // Deleting everything must not trigger a second seeding.
    for equipement in first["data"].as_array().unwrap() {
        let id = equipement["id"].as_i64().unwrap();
        let (status, _) = call(
            &app,
            &session,
            Method::DELETE,
            &format!("/api/v1/equipements/{}", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, second) = get(&app, &session, &uri).await;
    assert!(second["data"].as_array().unwrap().is_empty());
    assert!(second.get("notices").is_none());
}

#[actix_rt::test]
async fn test_checklist_snapshot_edit_and_finalise() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;
    let logement_id = create_logement(&app, &session, "INV-3").await;
    let (_, equipements) = get(
        &app,
        &session,
        &format!("/api/v1/logements/{}/equipements", logement_id),
    )
    .await;
    let expected = equipements["data"].as_array().unwrap().len();

    let (status, created) = post(
        &app,
        &session,
        "/api/v1/inventaires",
        json!({ "logement_id": logement_id, "type": "entree" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let id = created["data"]["id"].as_i64().unwrap();
    let mut rows = created["data"]["rows"].as_array().unwrap().clone();
    assert_eq!(rows.len(), expected);
    assert_eq!(created["data"]["statut"], "brouillon");

    rows[0]["quantite_presente"] = json!(0);
    rows[0]["etat"] = json!("absent");
    let (status, updated) = put(
        &app,
        &session,
        &format!("/api/v1/inventaires/{}", id),
        json!({ "rows": rows, "observations_generales": "Un élément manquant" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["data"]["rows"][0]["etat"], "absent");

    let (status, _) = post(
        &app,
        &session,
        &format!("/api/v1/inventaires/{}/finaliser", id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = put(
        &app,
        &session,
        &format!("/api/v1/inventaires/{}", id),
        json!({ "rows": rows }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_reorder_rejects_duplicate_ids() {
    let env = create_test_env().await;
    let app = create_test_app(&env).await;
    let session = login(&app).await;

    let (_, list) = get(&app, &session, "/api/v1/inventaire/categories").await;
    let ids = category_ids(&list);
    assert!(ids.len() >= 2);

    let (status, _) = post(
        &app,
        &session,
        "/api/v1/inventaire/categories/reorder",
        json!({ "ids": [ids[0], ids[0]] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let reversed: Vec<i64> = ids.iter().rev().copied().collect();
    let (status, _) = post(
        &app,
        &session,
        "/api/v1/inventaire/categories/reorder",
        json!({ "ids": reversed }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = get(&app, &session, "/api/v1/inventaire/categories").await;
    assert_eq!(category_ids(&list), reversed);
}
