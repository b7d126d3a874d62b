//! services/api/src/adapters/extraction.rs
//!
//! This module contains the adapter for the OCR backend. It implements the
//! `TextExtractionService` port from the `core` crate.
//!
//! The backend is a two-step HTTP service: the file is uploaded to `/upload`, then
//! `/analyze` runs extraction on the last upload and returns the text. The backend
//! keeps a single upload slot, so one extraction at a time is allowed through.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use scrible_core::domain::ScanFile;
use scrible_core::ports::{PortError, PortResult, TextExtractionService};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

//=========================================================================================
// Backend Payloads
//=========================================================================================

#[derive(Debug, Deserialize)]
struct BackendReply {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    extracted_text: Option<String>,
    /// Older backends answer with this field instead of `extracted_text`.
    #[serde(default)]
    gemini_response: Option<String>,
}

impl BackendReply {
    fn into_success(self, step: &str) -> PortResult<Self> {
        if self.status == "success" {
            Ok(self)
        } else {
            Err(PortError::Unexpected(
                self.message.unwrap_or_else(|| format!("{} failed", step)),
            ))
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `TextExtractionService` port over HTTP.
#[derive(Clone)]
pub struct HttpExtractionAdapter {
    client: reqwest::Client,
    base_url: String,
    /// Held from upload through analyze.
    backend_slot: Arc<Mutex<()>>,
}

impl HttpExtractionAdapter {
    /// Creates a new `HttpExtractionAdapter` for a backend at `base_url`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            backend_slot: Arc::new(Mutex::new(())),
        }
    }

    async fn upload(&self, file: &ScanFile) -> PortResult<()> {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| PortError::Unexpected(format!("Invalid content type: {}", e)))?;
        }
        let form = Form::new().part("file", part);

        let reply: BackendReply = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Upload failed: {}", e)))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Upload failed: {}", e)))?;
        reply.into_success("Upload")?;
        debug!("Uploaded {} to the OCR backend", file.file_name);
        Ok(())
    }

    async fn analyze(&self) -> PortResult<String> {
        let reply: BackendReply = self
            .client
            .get(format!("{}/analyze", self.base_url))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Analyze failed: {}", e)))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Analyze failed: {}", e)))?;
        let reply = reply.into_success("Analyze")?;
        Ok(reply
            .gemini_response
            .filter(|text| !text.is_empty())
            .or(reply.extracted_text)
            .unwrap_or_default())
    }
}

//=========================================================================================
// `TextExtractionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextExtractionService for HttpExtractionAdapter {
    async fn extract_text(&self, file: &ScanFile) -> PortResult<String> {
        let _slot = self.backend_slot.lock().await;
        self.upload(file).await?;
        let text = self.analyze().await?;
        info!("OCR backend returned {} characters", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> BackendReply {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn failed_step_surfaces_the_backend_message() {
        let err = reply(r#"{"status":"error","message":"No file uploaded"}"#)
            .into_success("Upload")
            .unwrap_err();
        assert_eq!(err.to_string(), "An unexpected error occurred: No file uploaded");
    }

    #[test]
    fn failed_step_without_message_names_the_step() {
        let err = reply(r#"{"status":"error"}"#).into_success("Analyze").unwrap_err();
        assert!(err.to_string().contains("Analyze failed"));
    }

    #[test]
    fn success_reply_keeps_the_text() {
        let ok = reply(r#"{"status":"success","extracted_text":"hello"}"#)
            .into_success("Analyze")
            .unwrap();
        assert_eq!(ok.extracted_text.as_deref(), Some("hello"));
    }

    /// A backend that, like the real one, analyzes whatever was uploaded last.
    async fn shared_slot_backend() -> String {
        use axum::{
            extract::{Multipart, State},
            routing::{get, post},
            Json, Router,
        };
        use serde_json::{json, Value};
        use std::time::Duration;

        type Slot = Arc<Mutex<String>>;

        async fn upload(State(slot): State<Slot>, mut multipart: Multipart) -> Json<Value> {
            while let Some(field) = multipart.next_field().await.unwrap() {
                if field.name() == Some("file") {
                    let bytes = field.bytes().await.unwrap();
                    *slot.lock().await = String::from_utf8_lossy(&bytes).into_owned();
                }
            }
            // Leave room for another request to overwrite the slot.
            tokio::time::sleep(Duration::from_millis(20)).await;
            Json(json!({ "status": "success" }))
        }

        async fn analyze(State(slot): State<Slot>) -> Json<Value> {
            let text = slot.lock().await.clone();
            Json(json!({ "status": "success", "extracted_text": text }))
        }

        let app = Router::new()
            .route("/upload", post(upload))
            .route("/analyze", get(analyze))
            .with_state(Slot::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn page(text: &str) -> ScanFile {
        ScanFile {
            file_name: "page.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_extractions_each_get_their_own_text() {
        let adapter = Arc::new(HttpExtractionAdapter::new(
            reqwest::Client::new(),
            shared_slot_backend().await,
        ));

        for round in 0..5 {
            let alice_page = format!("alice-{}", round);
            let bob_page = format!("bob-{}", round);
            let alice = tokio::spawn({
                let adapter = adapter.clone();
                let file = page(&alice_page);
                async move { adapter.extract_text(&file).await }
            });
            let bob = tokio::spawn({
                let adapter = adapter.clone();
                let file = page(&bob_page);
                async move { adapter.extract_text(&file).await }
            });

            assert_eq!(alice.await.unwrap().unwrap(), alice_page);
            assert_eq!(bob.await.unwrap().unwrap(), bob_page);
        }
    }

    #[test]
    fn trailing_slash_is_dropped_from_the_base_url() {
        let adapter = HttpExtractionAdapter::new(reqwest::Client::new(), "http://localhost:5000/");
        assert_eq!(adapter.base_url, "http://localhost:5000");
    }
}
