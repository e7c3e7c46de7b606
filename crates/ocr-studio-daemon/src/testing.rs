//! In-memory models and images for unit tests.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ocr_studio_protocol::ModelOption;
use parking_lot::Mutex;

use crate::model::{LoadError, ModelLoader, ModelOutput, OcrModel};

#[derive(Clone)]
enum Behavior {
    Output(ModelOutput),
    Fail(String),
    Panic,
}

/// A model that records every call and answers with a fixed behavior.
#[derive(Clone)]
pub struct FakeModel {
    behavior: Behavior,
    calls: Arc<Mutex<Vec<(PathBuf, bool)>>>,
}

impl FakeModel {
    pub fn text(text: &str) -> Self {
        Self::with(Behavior::Output(ModelOutput::Text(text.to_string())))
    }

    pub fn lines(lines: &[&str]) -> Self {
        Self::with(Behavior::Output(ModelOutput::Lines(
            lines.iter().map(|l| l.to_string()).collect(),
        )))
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Behavior::Fail(message.to_string()))
    }

    pub fn panicking() -> Self {
        Self::with(Behavior::Panic)
    }

    fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Paths seen by `recognize`, with whether the file existed at call time.
    pub fn calls(&self) -> Vec<(PathBuf, bool)> {
        self.calls.lock().clone()
    }
}

impl OcrModel for FakeModel {
    fn recognize(&self, image_path: &Path) -> anyhow::Result<ModelOutput> {
        self.calls
            .lock()
            .push((image_path.to_path_buf(), image_path.exists()));

        match &self.behavior {
            Behavior::Output(output) => Ok(output.clone()),
            Behavior::Fail(message) => Err(anyhow::anyhow!("{}", message)),
            Behavior::Panic => panic!("model crashed"),
        }
    }
}

/// A loader handing out one shared [`FakeModel`], counting loads.
pub struct FakeLoader {
    model: Option<FakeModel>,
    loads: Arc<AtomicUsize>,
}

impl FakeLoader {
    pub fn new(model: FakeModel) -> Self {
        Self {
            model: Some(model),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A loader whose every load fails as if no accelerator were present.
    pub fn failing() -> Self {
        Self {
            model: None,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn load_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }
}

impl ModelLoader for FakeLoader {
    fn load(&self, option: ModelOption) -> Result<Arc<dyn OcrModel>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.model {
            Some(model) => Ok(Arc::new(model.clone())),
            None => Err(LoadError::DeviceUnavailable { option }),
        }
    }
}

pub fn sample_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
}

/// Encode a blank image in the given format.
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    sample_image(width, height)
        .write_to(&mut buffer, format)
        .unwrap();
    buffer.into_inner()
}
