//! Daemon configuration from `OCR_STUDIO_*` environment variables.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::model::{default_models_dir, probe_accelerator};

pub const MODELS_DIR_ENV: &str = "OCR_STUDIO_MODELS_DIR";
pub const WORK_DIR_ENV: &str = "OCR_STUDIO_WORK_DIR";
pub const UI_PORT_ENV: &str = "OCR_STUDIO_UI_PORT";
pub const PREVIEW_QUALITY_ENV: &str = "OCR_STUDIO_PREVIEW_QUALITY";
pub const ACCELERATOR_ENV: &str = "OCR_STUDIO_ACCELERATOR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },

    #[error("cannot determine models directory: {0}")]
    ModelsDir(String),

    #[error("cannot determine working directory: {0}")]
    WorkDir(#[from] std::io::Error),
}

/// Runtime settings for one daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Root holding one subdirectory of `.rten` files per model option.
    pub models_dir: PathBuf,
    /// Where temp images are written during inference.
    pub work_dir: PathBuf,
    /// WebSocket view port (0 = disabled).
    pub ui_port: u16,
    /// JPEG quality for image previews sent to the view.
    pub preview_quality: u8,
    /// Whether GPU-bound models may be loaded.
    pub accelerator_available: bool,
}

impl DaemonConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let models_dir = match lookup(MODELS_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_models_dir().map_err(|e| ConfigError::ModelsDir(format!("{:#}", e)))?,
        };

        let work_dir = match lookup(WORK_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };

        let ui_port = parse_or(&lookup, UI_PORT_ENV, 0u16)?;
        let preview_quality = parse_or(&lookup, PREVIEW_QUALITY_ENV, 80u8)?.clamp(1, 100);

        let accelerator_available = match lookup(ACCELERATOR_ENV) {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                name: ACCELERATOR_ENV,
                value,
            })?,
            None => probe_accelerator(),
        };

        let config = Self {
            models_dir,
            work_dir,
            ui_port,
            preview_quality,
            accelerator_available,
        };
        debug!("Daemon config: {:?}", config);
        Ok(config)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
