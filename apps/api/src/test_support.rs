//! Fixtures shared by router-level tests: an in-process app with swappable
//! collaborators and helpers to drive it through `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Config;
use crate::jsearch::JSearchClient;
use crate::llm_client::{LanguageModel, LlmError};
use crate::routes::build_router;
use crate::state::AppState;
use crate::users::store::MemoryUserStore;

const BOUNDARY: &str = "jobassist-test-boundary";

/// Language model that answers every prompt with the same reply and records calls.
pub struct CannedModel {
    reply: Option<String>,
    calls: Mutex<Vec<(String, f32)>>,
}

impl CannedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn last_call(&self) -> Option<(String, f32)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for CannedModel {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), temperature));
        self.reply.clone().ok_or(LlmError::Api {
            status: 500,
            message: "canned failure".to_string(),
        })
    }
}

pub struct TestApp {
    users: Arc<MemoryUserStore>,
    model: Arc<CannedModel>,
    jsearch_base_url: String,
    scratch: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            model: Arc::new(CannedModel::replying("")),
            // Nothing listens here; tests that reach the job API call `with_jsearch`.
            jsearch_base_url: "http://127.0.0.1:9".to_string(),
            scratch: tempfile::tempdir().unwrap(),
        }
    }

    pub fn with_jsearch(mut self, base_url: &str) -> Self {
        self.jsearch_base_url = base_url.to_string();
        self
    }

    pub fn with_model(mut self, model: CannedModel) -> Self {
        self.model = Arc::new(model);
        self
    }

    pub fn model(&self) -> &CannedModel {
        &self.model
    }

    /// Number of files currently in the resume scratch directory.
    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch.path()).unwrap().count()
    }

    /// A router over this app's collaborators. Routers built from the same
    /// `TestApp` share one user store.
    pub fn router(&self) -> Router {
        let config = Config {
            database_url: None,
            openai_api_key: "test-key".to_string(),
            openai_base_url: "http://127.0.0.1:9".to_string(),
            jsearch_api_key: "test-key".to_string(),
            jsearch_host: "test-host".to_string(),
            jsearch_base_url: self.jsearch_base_url.clone(),
            resume_scratch_dir: self.scratch.path().to_path_buf(),
            port: 0,
            rust_log: "debug".to_string(),
        };

        build_router(AppState {
            users: self.users.clone(),
            llm: self.model.clone(),
            jsearch: JSearchClient::new(
                config.jsearch_base_url.clone(),
                config.jsearch_api_key.clone(),
                config.jsearch_host.clone(),
            ),
            config,
        })
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn as_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, as_json(&body))
}

pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, String::from_utf8(body).unwrap())
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();
    let (status, body) = send(app, request).await;
    (status, as_json(&body))
}

/// Encodes text fields and an optional `file` part as multipart/form-data.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, as_json(&body))
}

/// A single-page PDF whose only content is `text` set in Helvetica.
pub fn one_page_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{object}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = pdf.len();
    let size = objects.len() + 1;
    let mut tail = format!("xref\n0 {size}\n0000000000 65535 f \n");
    for offset in offsets {
        tail.push_str(&format!("{offset:010} 00000 n \n"));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
    ));
    pdf.extend_from_slice(tail.as_bytes());
    pdf
}
