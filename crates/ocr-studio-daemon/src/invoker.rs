//! OCR invocation through a scoped temp image file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::OcrModel;

/// Prefix of every recovered-failure report returned by [`OcrInvoker::run_ocr`].
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("failed to write temp image {path:?}: {message}")]
    TempFile { path: PathBuf, message: String },

    #[error("{0}")]
    Inference(String),
}

impl InvokeError {
    /// The user-facing `"Error: ..."` form of this failure.
    pub fn report(&self) -> String {
        format!("{}{}", ERROR_PREFIX, self)
    }
}

/// A uniquely named PNG removed when dropped.
pub struct TempImage {
    path: PathBuf,
}

impl TempImage {
    /// Encode `image` as `<dir>/<uuid>.png`.
    pub fn write(dir: &Path, image: &DynamicImage) -> Result<Self, InvokeError> {
        let temp = Self {
            path: dir.join(format!("{}.png", Uuid::new_v4())),
        };

        // On failure `temp` drops here and removes any partial file.
        image
            .save_with_format(&temp.path, ImageFormat::Png)
            .map_err(|e| InvokeError::TempFile {
                path: temp.path.clone(),
                message: e.to_string(),
            })?;

        Ok(temp)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temp image {:?}", self.path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temp image {:?}: {}", self.path, e),
        }
    }
}

/// Runs a model's OCR entry point on in-memory images.
pub struct OcrInvoker {
    work_dir: PathBuf,
}

impl OcrInvoker {
    /// Create an invoker writing temp images into `work_dir`.
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }

    /// Run OCR, returning the recognized text or the failure.
    ///
    /// The temp image never outlives this call, including when the model
    /// panics.
    pub fn invoke(
        &self,
        image: &DynamicImage,
        model: &dyn OcrModel,
    ) -> Result<String, InvokeError> {
        let temp = TempImage::write(&self.work_dir, image)?;
        debug!("Running OCR on {:?}", temp.path());

        let output = model
            .recognize(temp.path())
            .map_err(|e| InvokeError::Inference(format!("{:#}", e)))?;

        Ok(output.to_string())
    }

    /// Run OCR, reporting any failure as an `"Error: ..."` string.
    pub fn run_ocr(&self, image: &DynamicImage, model: &dyn OcrModel) -> String {
        match self.invoke(image, model) {
            Ok(text) => text,
            Err(e) => {
                warn!("OCR failed: {}", e);
                e.report()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;
    use crate::testing::{sample_image, FakeModel};

    fn dir_is_empty(dir: &Path) -> bool {
        fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_success_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = OcrInvoker::new(dir.path().to_path_buf());
        let model = FakeModel::text("HELLO");

        let text = invoker.run_ocr(&sample_image(100, 50), &model);
        assert_eq!(text, "HELLO");
        assert!(!text.starts_with(ERROR_PREFIX));

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        let (path, existed) = &calls[0];
        assert!(existed, "temp image must exist while the model runs");
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert!(!path.exists());
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn test_failure_is_reported_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = OcrInvoker::new(dir.path().to_path_buf());
        let model = FakeModel::failing("CUDA out of memory");

        let text = invoker.run_ocr(&sample_image(100, 50), &model);
        assert_eq!(text, "Error: CUDA out of memory");
        assert_eq!(model.calls().len(), 1);
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn test_panic_still_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = OcrInvoker::new(dir.path().to_path_buf());
        let model = FakeModel::panicking();
        let image = sample_image(10, 10);

        let result = panic::catch_unwind(AssertUnwindSafe(|| invoker.invoke(&image, &model)));
        assert!(result.is_err());
        assert_eq!(model.calls().len(), 1);
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn test_lines_are_joined() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = OcrInvoker::new(dir.path().to_path_buf());
        let model = FakeModel::lines(&["The cat", "sat on the mat."]);

        let text = invoker.invoke(&sample_image(10, 10), &model).unwrap();
        assert_eq!(text, "The cat\nsat on the mat.");
    }

    #[test]
    fn test_temp_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = OcrInvoker::new(dir.path().to_path_buf());
        let model = FakeModel::text("x");
        let image = sample_image(10, 10);

        invoker.run_ocr(&image, &model);
        invoker.run_ocr(&image, &model);

        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        assert_ne!(calls[0].0, calls[1].0);
    }

    #[test]
    fn test_unwritable_work_dir_skips_model() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = OcrInvoker::new(dir.path().join("missing"));
        let model = FakeModel::text("HELLO");

        let text = invoker.run_ocr(&sample_image(10, 10), &model);
        assert!(text.starts_with(ERROR_PREFIX));
        assert!(text.contains("failed to write temp image"));
        assert!(model.calls().is_empty());
    }
}
