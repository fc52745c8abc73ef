use serde_json::Value;

use crate::common::{TestApp, routes};

fn request_content_types(doc: &Value, path: &str, method: &str) -> Vec<String> {
    let paths = doc["paths"].as_object().expect("paths object");
    let (_, item) = paths
        .iter()
        .find(|(key, _)| key.trim_end_matches('/') == path)
        .unwrap_or_else(|| panic!("{path} is not documented"));
    let mut types: Vec<String> = item[method]["requestBody"]["content"]
        .as_object()
        .map(|content| content.keys().cloned().collect())
        .unwrap_or_default();
    types.sort();
    types
}

#[tokio::test]
async fn video_writes_document_json_and_multipart_bodies() {
    let app = TestApp::spawn().await;
    let res = app.get("/api-docs/openapi.json").await;
    assert_eq!(res.status, 200, "{}", res.text);

    let expected = vec!["application/json".to_string(), "multipart/form-data".to_string()];
    assert_eq!(request_content_types(&res.body, routes::VIDEOS, "post"), expected);
    assert_eq!(
        request_content_types(&res.body, &format!("{}/{{id}}", routes::VIDEOS), "put"),
        expected
    );
}
