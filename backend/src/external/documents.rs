//! Document render service client
//!
//! The workshop's printable documents (quotes, work orders, delivery notes,
//! glass labels) are rendered from HTML by a separate headless-browser
//! service. This client only ships HTML out and PDF bytes back; layout and
//! rasterization are entirely the render service's concern.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Kinds of documents the render service produces
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Quote,
    WorkOrder,
    DeliveryNote,
    GlassLabel,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "quote",
            DocumentKind::WorkOrder => "work_order",
            DocumentKind::DeliveryNote => "delivery_note",
            DocumentKind::GlassLabel => "glass_label",
        }
    }
}

/// Render request payload
#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    kind: &'a str,
    filename: &'a str,
    html: &'a str,
}

/// Client for the PDF render service
#[derive(Clone)]
pub struct DocumentRenderClient {
    client: Client,
    endpoint: String,
}

impl DocumentRenderClient {
    /// Create a new render client
    pub fn new(endpoint: String, timeout_seconds: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// Render an HTML document to PDF bytes
    pub async fn render(
        &self,
        kind: DocumentKind,
        filename: &str,
        html: &str,
    ) -> AppResult<Vec<u8>> {
        let url = format!("{}/render", self.endpoint);
        let request = RenderRequest {
            kind: kind.as_str(),
            filename,
            html,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::RenderService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::RenderService(format!(
                "render service returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::RenderService(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
