//! Session state: the uploaded image, the extracted text and the selected model.

use image::{DynamicImage, ImageFormat};
use ocr_studio_protocol::{ErrorCode, ImageInfo, ModelOption, SessionState};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::highlight;
use crate::invoker::OcrInvoker;
use crate::model::{LoadError, ModelRegistry};

/// Message shown when OCR is requested with nothing uploaded.
pub const NO_IMAGE_MESSAGE: &str = "Please upload an image before running OCR.";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{}", NO_IMAGE_MESSAGE)]
    NoImage,

    #[error("No extracted text yet. Run OCR first.")]
    NoResult,

    #[error("unsupported image format '{0}' (expected PNG or JPEG)")]
    UnsupportedFormat(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Recovered inference failure, already rendered as `"Error: ..."`.
    #[error("{0}")]
    Inference(String),

    #[error(transparent)]
    ModelUnavailable(#[from] LoadError),
}

impl SessionError {
    /// Protocol error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NoImage => ErrorCode::NoImage,
            SessionError::NoResult => ErrorCode::NoResult,
            SessionError::UnsupportedFormat(_) => ErrorCode::UnsupportedFormat,
            SessionError::InvalidImage(_) => ErrorCode::InvalidImage,
            SessionError::Inference(_) => ErrorCode::InferenceFailed,
            SessionError::ModelUnavailable(_) => ErrorCode::ModelUnavailable,
        }
    }

    /// Whether the failure ends the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::ModelUnavailable(_))
    }
}

/// A decoded upload.
pub struct UploadedImage {
    pub name: String,
    pub format: ImageFormat,
    pub image: DynamicImage,
}

impl UploadedImage {
    /// Sniff and decode PNG or JPEG bytes.
    pub fn decode(name: &str, bytes: &[u8]) -> Result<Self, SessionError> {
        let format = match image::guess_format(bytes) {
            Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
            Ok(other) => {
                let name = format!("{:?}", other).to_lowercase();
                return Err(SessionError::UnsupportedFormat(name));
            }
            Err(_) => return Err(SessionError::UnsupportedFormat("unknown".to_string())),
        };

        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| SessionError::InvalidImage(e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            format,
            image,
        })
    }

    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            name: self.name.clone(),
            width: self.image.width(),
            height: self.image.height(),
            format: match self.format {
                ImageFormat::Jpeg => "jpeg",
                _ => "png",
            }
            .to_string(),
        }
    }
}

/// One user's interaction state.
///
/// The extracted text survives new uploads and model changes; only a new
/// successful run replaces it.
pub struct Session {
    image: Option<UploadedImage>,
    extracted_text: Option<String>,
    selected_model: ModelOption,
    search_term: String,
}

impl Session {
    pub fn new(selected_model: ModelOption) -> Self {
        Self {
            image: None,
            extracted_text: None,
            selected_model,
            search_term: String::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.image, &self.extracted_text) {
            (_, Some(_)) => SessionState::ResultReady,
            (Some(_), None) => SessionState::ImageUploaded,
            (None, None) => SessionState::NoImage,
        }
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn selected_model(&self) -> ModelOption {
        self.selected_model
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Replace the current image.
    pub fn upload(&mut self, name: &str, bytes: &[u8]) -> Result<ImageInfo, SessionError> {
        let uploaded = UploadedImage::decode(name, bytes)?;
        let info = uploaded.info();
        info!("Uploaded '{}' ({}x{} {})", info.name, info.width, info.height, info.format);
        self.image = Some(uploaded);
        Ok(info)
    }

    pub fn select_model(&mut self, option: ModelOption) {
        if option != self.selected_model {
            info!("Selected model '{}'", option);
        }
        self.selected_model = option;
    }

    /// Run OCR on the current image with the selected model.
    ///
    /// On success the text becomes the session result. A failed run leaves
    /// the previous result untouched.
    pub fn run_ocr(
        &mut self,
        registry: &ModelRegistry,
        invoker: &OcrInvoker,
    ) -> Result<String, SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        let model = registry.get_or_load(self.selected_model)?;

        match invoker.invoke(&image.image, model.as_ref()) {
            Ok(text) => {
                info!(
                    "OCR with '{}' extracted {} characters",
                    self.selected_model,
                    text.chars().count()
                );
                self.extracted_text = Some(text.clone());
                Ok(text)
            }
            Err(e) => {
                warn!("OCR with '{}' failed: {}", self.selected_model, e);
                Err(SessionError::Inference(e.report()))
            }
        }
    }

    /// Highlight `term` in the extracted text and remember it for later renders.
    pub fn highlight(&mut self, term: &str) -> Result<(String, usize), SessionError> {
        let text = self.extracted_text.as_deref().ok_or(SessionError::NoResult)?;
        let markup = highlight::highlight(text, term);
        let matches = highlight::count_matches(text, term);
        debug!("Highlighted {} occurrence(s) of '{}'", matches, term);

        self.search_term = term.to_string();
        Ok((markup, matches))
    }

    /// Result pane markup with the current search term, if there is a result.
    pub fn render_result(&self) -> Option<String> {
        self.extracted_text
            .as_deref()
            .map(|text| highlight::render_result_pane(text, &self.search_term))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ModelOption::default())
    }
}
