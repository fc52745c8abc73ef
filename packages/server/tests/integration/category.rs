use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn create_and_get_category() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::CATEGORIES,
            &json!({ "name": "  Documentary ", "description": "Real stories" }),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["name"], "Documentary");
    assert_eq!(res.body["is_active"], true);
    assert!(res.body["deleted_at"].is_null());

    let id = res.id();
    let res = app.get(&routes::category(&id)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["description"], "Real stories");
}

#[tokio::test]
async fn create_category_requires_name() {
    let app = TestApp::spawn().await;

    let res = app.post(routes::CATEGORIES, &json!({ "is_active": false })).await;

    assert_eq!(res.status, 422);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(res.field_errors("name"), vec!["The name field is required."]);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let res = app.post(routes::CATEGORIES, &json!({ "name": 42 })).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn put_and_patch_update_only_sent_fields() {
    let app = TestApp::spawn().await;
    let id = app.create_category("Drama").await;

    let res = app
        .patch(&routes::category(&id), &json!({ "description": "Serious" }))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["name"], "Drama");
    assert_eq!(res.body["description"], "Serious");

    let res = app
        .put(&routes::category(&id), &json!({ "is_active": false, "description": null }))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["is_active"], false);
    assert!(res.body["description"].is_null());
}

#[tokio::test]
async fn soft_deleted_category_disappears() {
    let app = TestApp::spawn().await;
    let id = app.create_category("Gone").await;
    app.create_category("Kept").await;

    let res = app.delete(&routes::category(&id)).await;
    assert_eq!(res.status, 204);
    assert!(res.text.is_empty());

    assert_eq!(app.get(&routes::category(&id)).await.status, 404);
    assert_eq!(app.delete(&routes::category(&id)).await.status, 404);

    let list = app.get(routes::CATEGORIES).await;
    assert_eq!(list.body["pagination"]["total"], 1);
    assert_eq!(list.body["data"][0]["name"], "Kept");
}

#[tokio::test]
async fn list_paginates_searches_and_sorts() {
    let app = TestApp::spawn().await;
    for name in ["Action", "Adventure", "Comedy", "Drama"] {
        app.create_category(name).await;
    }

    let res = app
        .get(&format!("{}?per_page=3&page=2&sort_by=name&sort_order=asc", routes::CATEGORIES))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["pagination"]["total"], 4);
    assert_eq!(res.body["pagination"]["total_pages"], 2);
    assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(res.body["data"][0]["name"], "Drama");

    let res = app.get(&format!("{}?search=AD", routes::CATEGORIES)).await;
    assert_eq!(res.body["pagination"]["total"], 1);
    assert_eq!(res.body["data"][0]["name"], "Adventure");

    let res = app.get(&format!("{}?sort_by=nope", routes::CATEGORIES)).await;
    assert_eq!(res.status, 422);
    assert!(!res.field_errors("sort_by").is_empty());
}

#[tokio::test]
async fn unknown_or_malformed_id_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::category(&uuid::Uuid::now_v7().to_string())).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");

    let res = app.get(&routes::category("not-a-uuid")).await;
    assert_eq!(res.status, 400);
}
