use reqwest::Method;
use serde_json::{Value, json};
use common::storage::BlobStore;

use crate::common::{FilePart, PUBLIC_URL, TestApp, routes};

struct Catalog {
    c1: String,
    c2: String,
    c3: String,
    g1: String,
    g2: String,
}

/// C1..C3 with G1 -> {C1, C2, C3} and G2 -> {C2}.
async fn seed(app: &TestApp) -> Catalog {
    let c1 = app.create_category("C1").await;
    let c2 = app.create_category("C2").await;
    let c3 = app.create_category("C3").await;
    let g1 = app.create_genre("G1", &[&c1, &c2, &c3]).await;
    let g2 = app.create_genre("G2", &[&c2]).await;
    Catalog { c1, c2, c3, g1, g2 }
}

fn video_body(categories: &[&str], genres: &[&str]) -> Value {
    json!({
        "title": "The Long Take",
        "description": "A film in one shot",
        "year_launched": 2020,
        "rating": "14",
        "duration": 95,
        "categories_id": categories,
        "genres_id": genres,
    })
}

fn ids(body: &Value, key: &str) -> Vec<String> {
    let mut ids: Vec<String> = body[key]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids
}

fn sorted(values: &[&str]) -> Vec<String> {
    let mut v: Vec<String> = values.iter().map(|s| s.to_string()).collect();
    v.sort();
    v
}

fn form_fields(catalog: &Catalog) -> Vec<(&'static str, String)> {
    vec![
        ("title", "Uploaded".to_string()),
        ("description", "With files".to_string()),
        ("year_launched", "2019".to_string()),
        ("opened", "1".to_string()),
        ("rating", "L".to_string()),
        ("duration", "42".to_string()),
        ("categories_id[]", catalog.c1.clone()),
        ("genres_id[]", catalog.g1.clone()),
    ]
}

#[tokio::test]
async fn create_video_with_relations() {
    let app = TestApp::spawn().await;
    let catalog = seed(&app).await;

    let res = app
        .post(routes::VIDEOS, &video_body(&[&catalog.c1], &[&catalog.g1]))
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["opened"], false);
    assert_eq!(res.body["rating"], "14");
    assert_eq!(ids(&res.body, "categories"), vec![catalog.c1.clone()]);
    assert_eq!(ids(&res.body, "genres"), vec![catalog.g1.clone()]);
    assert!(res.body["thumb_file_url"].is_null());

    let id = res.id();
    let res = app.get(&routes::video(&id)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["title"], "The Long Take");
}

#[tokio::test]
async fn genre_without_shared_category_fails_before_writing() {
    let app = TestApp::spawn().await;
    let catalog = seed(&app).await;

    let res = app
        .post(routes::VIDEOS, &video_body(&[&catalog.c1], &[&catalog.g2]))
        .await;
    assert_eq!(res.status, 422, "{}", res.text);
    assert_eq!(
        res.field_errors("genres_id"),
        vec!["A genre ID must be related at least a category ID."]
    );

    let list = app.get(routes::VIDEOS).await;
    assert_eq!(list.body["pagination"]["total"], 0);
}

#[tokio::test]
async fn create_video_reports_every_invalid_field() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::VIDEOS,
            &json!({
                "title": "",
                "year_launched": 20,
                "rating": "99",
                "duration": 0,
                "categories_id": [],
                "genres_id": ["not-a-uuid"],
            }),
        )
        .await;

    assert_eq!(res.status, 422);
    for field in [
        "title",
        "description",
        "year_launched",
        "rating",
        "duration",
        "categories_id",
        "genres_id",
    ] {
        assert!(!res.field_errors(field).is_empty(), "missing error for {field}");
    }
}

#[tokio::test]
async fn update_replaces_categories_exactly() {
    let app = TestApp::spawn().await;
    let catalog = seed(&app).await;
    let id = app
        .post(routes::VIDEOS, &video_body(&[&catalog.c1], &[&catalog.g1]))
        .await
        .id();

    let res = app
        .patch(
            &routes::video(&id),
            &json!({ "categories_id": [catalog.c2, catalog.c3] }),
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(ids(&res.body, "categories"), sorted(&[&catalog.c2, &catalog.c3]));
    assert_eq!(ids(&res.body, "genres"), vec![catalog.g1.clone()]);
    assert_eq!(res.body["title"], "The Long Take");
}

#[tokio::test]
async fn partial_update_checks_rule_against_stored_set() {
    let app = TestApp::spawn().await;
    let catalog = seed(&app).await;
    let id = app
        .post(routes::VIDEOS, &video_body(&[&catalog.c1], &[&catalog.g1]))
        .await
        .id();

    // G2 only owns C2, and the stored categories are [C1].
    let res = app
        .patch(&routes::video(&id), &json!({ "genres_id": [catalog.g2] }))
        .await;
    assert_eq!(res.status, 422, "{}", res.text);
    assert!(!res.field_errors("genres_id").is_empty());

    let res = app.get(&routes::video(&id)).await;
    assert_eq!(ids(&res.body, "genres"), vec![catalog.g1.clone()]);
}

#[tokio::test]
async fn multipart_create_stores_files() {
    let app = TestApp::spawn().await;
    let catalog = seed(&app).await;

    let res = app
        .multipart(
            Method::POST,
            routes::VIDEOS,
            &form_fields(&catalog),
            vec![
                FilePart::new("thumb_file", "thumb.png", "image/png", b"png-bytes"),
                FilePart::new("video_file", "movie.mp4", "video/mp4", b"mp4-bytes"),
            ],
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["opened"], true);

    let id = res.id();
    let thumb = res.body["thumb_file"].as_str().unwrap().to_string();
    let video = res.body["video_file"].as_str().unwrap().to_string();
    assert!(thumb.ends_with(".png"));
    assert!(res.body["banner_file"].is_null());
    assert_eq!(
        res.body["thumb_file_url"],
        format!("{PUBLIC_URL}/{id}/{thumb}").as_str()
    );

    let mut expected = vec![format!("{id}/{thumb}"), format!("{id}/{video}")];
    expected.sort();
    assert_eq!(app.store.all_files().await.unwrap(), expected);
}

#[tokio::test]
async fn multipart_rejects_wrong_file_type() {
    let app = TestApp::spawn().await;
    let catalog = seed(&app).await;

    let res = app
        .multipart(
            Method::POST,
            routes::VIDEOS,
            &form_fields(&catalog),
            vec![FilePart::new("trailer_file", "trailer.avi", "video/x-msvideo", b"avi")],
        )
        .await;

    assert_eq!(res.status, 422, "{}", res.text);
    assert_eq!(
        res.field_errors("trailer_file"),
        vec!["The trailer_file must be a file of type: video/mp4."]
    );
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn replacing_a_file_deletes_the_old_one() {
    let app = TestApp::spawn().await;
    let catalog = seed(&app).await;
    let created = app
        .multipart(
            Method::POST,
            routes::VIDEOS,
            &form_fields(&catalog),
            vec![
                FilePart::new("thumb_file", "a.jpg", "image/jpeg", b"old"),
                FilePart::new("banner_file", "b.jpg", "image/jpeg", b"banner"),
            ],
        )
        .await;
    assert_eq!(created.status, 201, "{}", created.text);
    let id = created.id();
    let old_thumb = created.body["thumb_file"].as_str().unwrap().to_string();
    let banner = created.body["banner_file"].as_str().unwrap().to_string();

    let res = app
        .multipart(
            Method::PUT,
            &routes::video(&id),
            &[("title", "Renamed".to_string())],
            vec![FilePart::new("thumb_file", "c.jpg", "image/jpeg", b"new")],
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let new_thumb = res.body["thumb_file"].as_str().unwrap().to_string();
    assert_ne!(new_thumb, old_thumb);
    assert_eq!(res.body["banner_file"], banner.as_str());
    assert_eq!(res.body["title"], "Renamed");

    let mut expected = vec![format!("{id}/{banner}"), format!("{id}/{new_thumb}")];
    expected.sort();
    assert_eq!(app.store.all_files().await.unwrap(), expected);
}

#[tokio::test]
async fn soft_deleted_video_is_hidden_but_keeps_files() {
    let app = TestApp::spawn().await;
    let catalog = seed(&app).await;
    let id = app
        .multipart(
            Method::POST,
            routes::VIDEOS,
            &form_fields(&catalog),
            vec![FilePart::new("thumb_file", "a.jpg", "image/jpeg", b"jpg")],
        )
        .await
        .id();

    assert_eq!(app.delete(&routes::video(&id)).await.status, 204);
    assert_eq!(app.get(&routes::video(&id)).await.status, 404);
    assert_eq!(
        app.patch(&routes::video(&id), &json!({ "title": "X" })).await.status,
        404
    );
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn list_videos_includes_relations() {
    let app = TestApp::spawn().await;
    let catalog = seed(&app).await;
    app.post(routes::VIDEOS, &video_body(&[&catalog.c1], &[&catalog.g1]))
        .await;
    let mut other = video_body(&[&catalog.c2], &[&catalog.g2]);
    other["title"] = json!("Another Story");
    app.post(routes::VIDEOS, &other).await;

    let res = app.get(&format!("{}?search=another", routes::VIDEOS)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["pagination"]["total"], 1);
    assert_eq!(res.body["data"][0]["genres"][0]["name"], "G2");
    assert_eq!(res.body["data"][0]["categories"][0]["name"], "C2");
}
