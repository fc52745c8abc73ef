use reqwest::Method;

use crate::common::{FilePart, TestApp, routes};

#[tokio::test]
async fn stored_file_is_served_with_guessed_type() {
    let app = TestApp::spawn().await;
    let c1 = app.create_category("C1").await;
    let g1 = app.create_genre("G1", &[&c1]).await;

    let res = app
        .multipart(
            Method::POST,
            routes::VIDEOS,
            &[
                ("title", "Clip".to_string()),
                ("description", "Short".to_string()),
                ("year_launched", "2021".to_string()),
                ("rating", "L".to_string()),
                ("duration", "3".to_string()),
                ("categories_id", c1.clone()),
                ("genres_id", g1.clone()),
            ],
            vec![FilePart::new("trailer_file", "clip.mp4", "video/mp4", b"mp4-bytes")],
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    let id = res.id();
    let trailer = res.body["trailer_file"].as_str().unwrap().to_string();

    let download = app
        .client
        .get(format!("http://{}{}", app.addr, routes::file(&id, &trailer)))
        .send()
        .await
        .unwrap();
    assert_eq!(download.status(), 200);
    assert_eq!(download.headers()["content-type"], "video/mp4");
    assert_eq!(&download.bytes().await.unwrap()[..], b"mp4-bytes");
}

#[tokio::test]
async fn missing_or_hidden_files_are_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::file("some-dir", "missing.mp4")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");

    let res = app.get(&routes::file("some-dir", ".secret")).await;
    assert_eq!(res.status, 400);
}
