//! Reqwest-based client for the Generative Language REST API (v1beta).

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, RequestBuilder, Response,
};
use serde::Deserialize;

use super::{ChatService, FileService, GeminiError, GenerateRequest, RemoteFile};
use crate::config::Config;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn from_config(cfg: &Config) -> Result<Self, GeminiError> {
        let timeout = cfg.get_u64("REQUEST_TIMEOUT").unwrap_or(60);
        let base_url = cfg
            .get("GEMINI_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let http = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self { http, base_url, api_key: cfg.api_key() })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, GeminiError> {
        let key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        Ok(req.header("x-goog-api-key", key))
    }

    async fn check(resp: Response) -> Result<Response, GeminiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(GeminiError::Status { status, body })
    }
}

#[async_trait]
impl FileService for GeminiClient {
    async fn upload_file(&self, path: &Path, display_name: &str) -> Result<RemoteFile, GeminiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| GeminiError::Io {
            path: path.display().to_string(),
            source,
        })?;

        // Step 1: open a resumable upload session.
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-upload-protocol", HeaderValue::from_static("resumable"));
        headers.insert("x-goog-upload-command", HeaderValue::from_static("start"));
        headers.insert("x-goog-upload-header-content-length", HeaderValue::from(bytes.len()));
        headers.insert("x-goog-upload-header-content-type", HeaderValue::from_static(PDF_MIME));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let url = format!("{}/upload/v1beta/files", self.base_url);
        let start = self
            .authorized(self.http.post(&url))?
            .headers(headers)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = Self::check(start).await?;
        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .ok_or(GeminiError::MissingUploadUrl)?
            .to_string();
        tracing::debug!(%display_name, "upload session opened");

        // Step 2: send the bytes and finalize in one request.
        let resp = self
            .http
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadResponse = Self::check(resp).await?.json().await?;
        tracing::debug!(name = %uploaded.file.name, state = uploaded.file.state.as_str(), "file uploaded");
        Ok(uploaded.file)
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, GeminiError> {
        let url = format!("{}/v1beta/{}", self.base_url, name);
        let resp = self.authorized(self.http.get(&url))?.send().await?;
        Ok(Self::check(resp).await?.json::<RemoteFile>().await?)
    }
}

#[async_trait]
impl ChatService for GeminiClient {
    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String, GeminiError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let resp = self
            .authorized(self.http.post(&url))?
            .json(request)
            .send()
            .await?;
        let body: GenerateResponse = Self::check(resp).await?.json().await?;
        first_candidate_text(body).ok_or(GeminiError::EmptyResponse)
    }
}

fn first_candidate_text(body: GenerateResponse) -> Option<String> {
    let content = body.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() { None } else { Some(text) }
}
