//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;

/// Upload an image, run a pretrained OCR model and highlight the extracted text.
#[derive(Parser)]
#[command(name = "ocr-studio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Session name
    #[arg(long, default_value = "default", env = "OCR_STUDIO_SESSION", global = true)]
    pub session: String,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Command timeout in milliseconds (model loading can take a while)
    #[arg(long, default_value = "300000", global = true)]
    pub timeout: u64,

    /// WebSocket view port for a newly started daemon (0 = disabled)
    #[arg(long, default_value = "0", env = "OCR_STUDIO_UI_PORT", global = true)]
    pub ui_port: u16,

    /// Directory holding one model directory per option
    #[arg(long, env = "OCR_STUDIO_MODELS_DIR", global = true)]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a PNG or JPEG image into the session
    Upload(UploadArgs),

    /// Select or list OCR models
    Model(ModelArgs),

    /// Run OCR on the uploaded image
    Run(RunArgs),

    /// Highlight a word or phrase in the extracted text
    Highlight(HighlightArgs),

    /// Print the extracted text
    Text,

    /// Session management
    Session(SessionArgs),

    /// Print the WebSocket view address
    View,
}

/// Upload command arguments.
#[derive(Parser)]
pub struct UploadArgs {
    /// Image file (png, jpg, jpeg)
    pub path: PathBuf,
}

/// Model command arguments.
#[derive(Parser)]
pub struct ModelArgs {
    #[command(subcommand)]
    pub action: ModelAction,
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// Select a model (label, id, or "cpu"/"gpu")
    Select {
        /// Model option
        option: String,
    },

    /// List the available models
    List,
}

/// Run command arguments.
#[derive(Parser)]
pub struct RunArgs {
    /// Select this model before running
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Highlight this term in the printed result
    #[arg(long)]
    pub highlight: Option<String>,
}

/// Highlight command arguments.
#[derive(Parser)]
pub struct HighlightArgs {
    /// Word or phrase to highlight (empty clears the highlight)
    #[arg(default_value = "")]
    pub term: String,
}

/// Session command arguments.
#[derive(Parser)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub action: SessionAction,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// List active sessions
    List,

    /// Get current session info
    Info,

    /// Stop the session daemon
    Stop,

    /// Run as daemon (internal use)
    #[command(hide = true)]
    Daemon,
}
