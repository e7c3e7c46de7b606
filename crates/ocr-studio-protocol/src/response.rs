//! Response types for daemon to client communication.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ModelOption;

/// A response from the daemon to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Response data on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,

    /// Error details on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl Response {
    /// Create a successful response with data.
    pub fn success(data: ResponseData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a simple success response with no data.
    pub fn ok() -> Self {
        Self::success(ResponseData::Ok)
    }

    /// Create an error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorInfo {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Response data variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseData {
    /// Simple acknowledgment.
    Ok,

    /// Image accepted into the session.
    Uploaded(ImageInfo),

    /// Model option selected.
    ModelSelected {
        /// The now-selected option.
        model: ModelOption,
    },

    /// OCR finished successfully.
    OcrResult {
        /// Model that produced the text.
        model: ModelOption,
        /// Extracted text.
        text: String,
    },

    /// Highlighted extracted text.
    Highlighted {
        /// Term that was highlighted.
        term: String,
        /// Number of highlighted occurrences.
        matches: usize,
        /// Text with highlight markup.
        markup: String,
    },

    /// Extracted text without markup.
    Text {
        /// Extracted text.
        text: String,
    },

    /// Session information.
    SessionInfo(SessionInfo),

    /// List of active sessions.
    SessionList {
        /// Active sessions.
        sessions: Vec<SessionSummary>,
    },

    /// Pong response for ping.
    Pong,
}

/// Uploaded image details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageInfo {
    /// Original file name.
    pub name: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Detected format ("png" or "jpeg").
    pub format: String,
}

/// Session information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session name.
    pub name: String,

    /// Where the session is in its upload/run lifecycle.
    pub state: SessionState,

    /// Currently selected model.
    pub model: ModelOption,

    /// Uploaded image (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,

    /// Models already loaded in this process.
    #[serde(default)]
    pub loaded_models: Vec<ModelOption>,

    /// Daemon process ID.
    pub pid: u32,

    /// Time since daemon started (seconds).
    pub uptime_secs: u64,
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No image uploaded yet.
    NoImage,
    /// Image uploaded, no extracted text yet.
    ImageUploaded,
    /// Extracted text available.
    ResultReady,
}

/// Summary of a session for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session name.
    pub name: String,
    /// Session state, if the daemon answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SessionState>,
    /// Selected model, if the daemon answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelOption>,
}

/// Error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

/// Error codes for structured error handling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// OCR requested before any image was uploaded.
    #[error("no image")]
    NoImage,

    /// Highlight or text requested before any successful run.
    #[error("no result")]
    NoResult,

    /// Uploaded file is not PNG or JPEG.
    #[error("unsupported format")]
    UnsupportedFormat,

    /// Uploaded bytes could not be decoded.
    #[error("invalid image")]
    InvalidImage,

    /// Model inference failed.
    #[error("inference failed")]
    InferenceFailed,

    /// Model weights or device unavailable.
    #[error("model unavailable")]
    ModelUnavailable,

    /// Invalid request parameters.
    #[error("invalid request")]
    InvalidRequest,

    /// Daemon not running.
    #[error("daemon not running")]
    DaemonNotRunning,
}
