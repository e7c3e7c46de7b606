//! Request types for CLI/view to daemon communication.

use serde::{Deserialize, Serialize};

use crate::ModelOption;

/// A request from a client (CLI or browser view) to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Upload an image into the session.
    Upload(UploadRequest),

    /// Change the selected model.
    SelectModel(SelectModelRequest),

    /// Run OCR on the uploaded image with the selected model.
    RunOcr,

    /// Highlight a term in the extracted text.
    Highlight(HighlightRequest),

    /// Get the extracted text without markup.
    GetText,

    /// Get session info.
    SessionInfo,

    /// Ping the daemon (for health checks).
    Ping,

    /// Shutdown the daemon gracefully.
    Shutdown,
}

/// Image upload parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Original file name (for display only).
    #[serde(default)]
    pub name: String,

    /// Base64-encoded image bytes (PNG or JPEG).
    pub data: String,
}

/// Model selection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectModelRequest {
    /// Option to select.
    pub model: ModelOption,
}

/// Highlight parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighlightRequest {
    /// Word or phrase to highlight. Empty means no highlighting.
    #[serde(default)]
    pub term: String,
}
