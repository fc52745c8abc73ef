use std::net::SocketAddr;
use std::sync::Arc;

use common::storage::memory::MemoryBlobStore;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use catalog_server::config::{
    AppConfig, CorsConfig, DEFAULT_MAX_UPLOAD_SIZE, DatabaseConfig, ServerConfig, StorageConfig,
    StorageDriver,
};
use catalog_server::state::AppState;

pub const PUBLIC_URL: &str = "http://files.test/api/v1/files";

pub mod routes {
    pub const CATEGORIES: &str = "/api/v1/categories";
    pub const GENRES: &str = "/api/v1/genres";
    pub const CAST_MEMBERS: &str = "/api/v1/cast_members";
    pub const VIDEOS: &str = "/api/v1/videos";

    pub fn category(id: &str) -> String {
        format!("/api/v1/categories/{id}")
    }

    pub fn genre(id: &str) -> String {
        format!("/api/v1/genres/{id}")
    }

    pub fn cast_member(id: &str) -> String {
        format!("/api/v1/cast_members/{id}")
    }

    pub fn video(id: &str) -> String {
        format!("/api/v1/videos/{id}")
    }

    pub fn file(dir: &str, filename: &str) -> String {
        format!("/api/v1/files/{dir}/{filename}")
    }
}

/// A running test server backed by a throwaway SQLite file and an in-memory
/// blob store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub store: MemoryBlobStore,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

/// One file part of a multipart request.
pub struct FilePart {
    pub field: &'static str,
    pub file_name: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(field: &'static str, file_name: &'static str, mime: &'static str, bytes: &[u8]) -> Self {
        Self {
            field,
            file_name,
            mime,
            bytes: bytes.to_vec(),
        }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("catalog.db").display());
        let db = catalog_server::database::init_db(&db_url, 5)
            .await
            .expect("Failed to initialize test database");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url,
                max_connections: 5,
            },
            storage: StorageConfig {
                driver: StorageDriver::Memory,
                root: dir.path().join("storage").display().to_string(),
                public_url: PUBLIC_URL.to_string(),
                max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            },
        };

        let store = MemoryBlobStore::new();
        let state = AppState {
            db: db.clone(),
            config: Arc::new(app_config),
            blob_store: Arc::new(store.clone()),
        };

        let app = catalog_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            store,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PATCH request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Send a multipart request: text fields first, then file parts.
    pub async fn multipart(
        &self,
        method: reqwest::Method,
        path: &str,
        fields: &[(&str, String)],
        files: Vec<FilePart>,
    ) -> TestResponse {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.clone());
        }
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(file.mime)
                .expect("Failed to set MIME type");
            form = form.part(file.field, part);
        }

        let res = self
            .client
            .request(method, self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    /// Create a category and return its ID.
    pub async fn create_category(&self, name: &str) -> String {
        let res = self
            .post(routes::CATEGORIES, &serde_json::json!({ "name": name }))
            .await;
        assert_eq!(res.status, 201, "Category creation failed: {}", res.text);
        res.id()
    }

    /// Create a genre linked to `categories` and return its ID.
    pub async fn create_genre(&self, name: &str, categories: &[&str]) -> String {
        let res = self
            .post(
                routes::GENRES,
                &serde_json::json!({ "name": name, "categories_id": categories }),
            )
            .await;
        assert_eq!(res.status, 201, "Genre creation failed: {}", res.text);
        res.id()
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .unwrap_or_else(|| panic!("No id in response: {}", self.text))
            .to_string()
    }

    /// Messages reported for one field of a 422 response.
    pub fn field_errors(&self, field: &str) -> Vec<String> {
        self.body["errors"][field]
            .as_array()
            .map(|a| a.iter().filter_map(|m| m.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }
}
