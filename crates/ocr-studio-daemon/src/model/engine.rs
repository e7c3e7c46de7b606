//! OCR model backed by the ocrs library.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use ocr_studio_protocol::ModelOption;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, trace};

use super::{Device, LoadError, ModelLoader, ModelOutput, ModelSpec, OcrModel};

const DETECTION_MODEL: &str = "text-detection.rten";
const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// Detection + recognition model pair for one option.
pub struct OcrsModel {
    option: ModelOption,
    engine: OcrEngine,
}

impl OcrsModel {
    /// Load both models from `dir`.
    pub fn load(dir: &Path, option: ModelOption) -> Result<Self, LoadError> {
        let files_error = |e: anyhow::Error| LoadError::ModelFiles {
            option,
            message: format!("{:#}", e),
        };

        let detection_path = dir.join(DETECTION_MODEL);
        let recognition_path = dir.join(RECOGNITION_MODEL);

        debug!("Loading detection model from {:?}", detection_path);
        let detection_model = Model::load_file(&detection_path)
            .with_context(|| format!("Failed to load detection model from {:?}", detection_path))
            .map_err(files_error)?;

        debug!("Loading recognition model from {:?}", recognition_path);
        let recognition_model = Model::load_file(&recognition_path)
            .with_context(|| {
                format!("Failed to load recognition model from {:?}", recognition_path)
            })
            .map_err(files_error)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| LoadError::Engine {
            option,
            message: e.to_string(),
        })?;

        debug!("OCR engine for '{}' initialized", option);
        Ok(Self { option, engine })
    }
}

impl OcrModel for OcrsModel {
    fn recognize(&self, image_path: &Path) -> Result<ModelOutput> {
        let img = image::open(image_path)
            .with_context(|| format!("Failed to read image {:?}", image_path))?
            .into_rgb8();

        let (width, height) = (img.width(), img.height());
        trace!("Image loaded: {}x{} for '{}'", width, height, self.option);

        let img_source = ImageSource::from_bytes(img.as_raw(), (width, height))
            .context("Failed to create image source")?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .context("Failed to prepare OCR input")?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .context("Failed to detect words")?;

        trace!("Detected {} word regions", word_rects.len());

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .context("Failed to recognize text")?;

        let lines: Vec<String> = line_texts
            .iter()
            .flatten()
            .map(|line| line.to_string())
            .filter(|text| !text.trim().is_empty())
            .collect();

        debug!("Recognized {} text lines", lines.len());
        Ok(ModelOutput::Lines(lines))
    }
}

/// Loads [`OcrsModel`]s from `<models_dir>/<option dir>/`.
pub struct OcrsLoader {
    models_dir: PathBuf,
    accelerator_available: bool,
}

impl OcrsLoader {
    pub fn new(models_dir: PathBuf, accelerator_available: bool) -> Self {
        Self {
            models_dir,
            accelerator_available,
        }
    }

    /// Directory holding the model files for `option`.
    pub fn model_dir(&self, option: ModelOption) -> PathBuf {
        self.models_dir.join(ModelSpec::for_option(option).dir_name)
    }
}

impl ModelLoader for OcrsLoader {
    fn load(&self, option: ModelOption) -> Result<Arc<dyn OcrModel>, LoadError> {
        let spec = ModelSpec::for_option(option);

        if spec.device == Device::Gpu && !self.accelerator_available {
            return Err(LoadError::DeviceUnavailable { option });
        }

        let model = OcrsModel::load(&self.model_dir(option), option)?;
        Ok(Arc::new(model))
    }
}

/// Default models directory, relative to the executable.
///
/// Models live at `bin/../models`, one subdirectory per option.
pub fn default_models_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("Failed to get executable path")?;

    exe_path
        .parent() // bin/
        .and_then(|p| p.parent()) // package root
        .map(|p| p.join("models"))
        .context("Failed to compute models directory path")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_option_without_accelerator() {
        let dir = tempfile::tempdir().unwrap();
        let loader = OcrsLoader::new(dir.path().to_path_buf(), false);

        let err = loader.load(ModelOption::EnglishGpu).err().unwrap();
        assert!(matches!(err, LoadError::DeviceUnavailable { option: ModelOption::EnglishGpu }));
    }

    #[test]
    fn test_missing_model_files() {
        let dir = tempfile::tempdir().unwrap();
        let loader = OcrsLoader::new(dir.path().to_path_buf(), true);

        let err = loader.load(ModelOption::EnglishHindiCpu).err().unwrap();
        match err {
            LoadError::ModelFiles { option, message } => {
                assert_eq!(option, ModelOption::EnglishHindiCpu);
                assert!(message.contains("text-detection.rten"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_model_dir_layout() {
        let loader = OcrsLoader::new(PathBuf::from("/opt/models"), false);
        assert_eq!(
            loader.model_dir(ModelOption::EnglishGpu),
            PathBuf::from("/opt/models/english-gpu")
        );
    }
}
