//! Gemini file storage and content generation: types, service traits and the
//! reqwest-backed client.

pub mod chat;
mod client;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use client::GeminiClient;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini error: {status} - {body}")]
    Status { status: reqwest::StatusCode, body: String },
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("upload session did not return an upload URL")]
    MissingUploadUrl,
    #[error("model returned no text")]
    EmptyResponse,
}

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileState {
    Processing,
    Active,
    Failed,
    #[default]
    Unspecified,
    /// A state this client does not know about yet.
    Unknown(String),
}

impl FileState {
    pub fn is_processing(&self) -> bool {
        matches!(self, FileState::Processing)
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileState::Processing => "PROCESSING",
            FileState::Active => "ACTIVE",
            FileState::Failed => "FAILED",
            FileState::Unspecified => "STATE_UNSPECIFIED",
            FileState::Unknown(s) => s,
        }
    }
}

impl From<&str> for FileState {
    fn from(s: &str) -> Self {
        match s {
            "PROCESSING" => FileState::Processing,
            "ACTIVE" => FileState::Active,
            "FAILED" => FileState::Failed,
            "STATE_UNSPECIFIED" | "" => FileState::Unspecified,
            other => FileState::Unknown(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for FileState {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(FileState::from(s.as_str()))
    }
}

impl Serialize for FileState {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// Handle to a file held by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc-123`.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub state: FileState,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    FileData(FileData),
}

impl Part {
    pub fn text(t: impl Into<String>) -> Self {
        Part::Text(t.into())
    }

    pub fn file(f: &RemoteFile) -> Self {
        Part::FileData(FileData {
            mime_type: f.mime_type.clone(),
            file_uri: f.uri.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self { role: Some(Role::User), parts }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Some(Role::Model), parts: vec![Part::text(text)] }
    }

    /// Concatenated text parts.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::FileData(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
}

/// Remote file storage: upload and status lookup.
#[async_trait]
pub trait FileService {
    async fn upload_file(&self, path: &Path, display_name: &str) -> Result<RemoteFile, GeminiError>;
    async fn get_file(&self, name: &str) -> Result<RemoteFile, GeminiError>;
}

/// Single-shot content generation over a full conversation.
#[async_trait]
pub trait ChatService {
    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String, GeminiError>;
}
