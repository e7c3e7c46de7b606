//! Pretrained OCR models: loading, memoization and the inference seam.

mod engine;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ocr_studio_protocol::ModelOption;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

pub use self::engine::{default_models_dir, OcrsLoader, OcrsModel};

/// Raw output of a model's OCR entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutput {
    /// A single block of text.
    Text(String),
    /// One entry per recognized line.
    Lines(Vec<String>),
}

impl fmt::Display for ModelOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelOutput::Text(text) => f.write_str(text),
            ModelOutput::Lines(lines) => f.write_str(&lines.join("\n")),
        }
    }
}

/// An inference-ready model handle.
pub trait OcrModel: Send + Sync {
    /// Run OCR-mode inference on the image stored at `image_path`.
    fn recognize(&self, image_path: &Path) -> anyhow::Result<ModelOutput>;
}

/// Where a model configuration runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Gpu,
}

/// On-disk layout and placement of one model option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// Directory under the models root holding the `.rten` files.
    pub dir_name: &'static str,
    /// Device the model must be bound to.
    pub device: Device,
}

impl ModelSpec {
    pub fn for_option(option: ModelOption) -> Self {
        match option {
            ModelOption::EnglishHindiCpu => Self {
                dir_name: "english-hindi-cpu",
                device: Device::Cpu,
            },
            ModelOption::EnglishGpu => Self {
                dir_name: "english-gpu",
                device: Device::Gpu,
            },
        }
    }
}

/// Check whether an accelerator device node is present.
pub fn probe_accelerator() -> bool {
    #[cfg(target_os = "linux")]
    {
        Path::new("/dev/nvidia0").exists()
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

/// Fatal configuration errors raised while loading a model.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("'{option}' requires an accelerator device but none is available")]
    DeviceUnavailable { option: ModelOption },

    #[error("failed to load '{option}' weights: {message}")]
    ModelFiles { option: ModelOption, message: String },

    #[error("failed to initialize '{option}' engine: {message}")]
    Engine { option: ModelOption, message: String },
}

/// Loads a model handle for a selector option.
pub trait ModelLoader: Send + Sync {
    fn load(&self, option: ModelOption) -> Result<Arc<dyn OcrModel>, LoadError>;
}

/// Process-wide cache of loaded models.
///
/// Each option is loaded at most once; a failed load caches nothing, so a
/// later request retries it.
pub struct ModelRegistry {
    loader: Box<dyn ModelLoader>,
    loaded: Mutex<HashMap<ModelOption, Arc<dyn OcrModel>>>,
}

impl ModelRegistry {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached handle for `option`, loading it on first use.
    pub fn get_or_load(&self, option: ModelOption) -> Result<Arc<dyn OcrModel>, LoadError> {
        // Held across the load so concurrent first uses load once.
        let mut loaded = self.loaded.lock();

        if let Some(model) = loaded.get(&option) {
            debug!("Using cached model '{}'", option);
            return Ok(Arc::clone(model));
        }

        info!("Loading model '{}'", option);
        let started = Instant::now();
        let model = self.loader.load(option)?;
        info!("Model '{}' loaded in {:?}", option, started.elapsed());

        loaded.insert(option, Arc::clone(&model));
        Ok(model)
    }

    /// Options currently loaded, in selector order.
    pub fn loaded(&self) -> Vec<ModelOption> {
        let loaded = self.loaded.lock();
        ModelOption::ALL
            .into_iter()
            .filter(|option| loaded.contains_key(option))
            .collect()
    }
}
