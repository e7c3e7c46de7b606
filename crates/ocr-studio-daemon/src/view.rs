//! Render messages pushed to WebSocket view clients.

use image::DynamicImage;
use ocr_studio_protocol::{ModelOption, SessionState};
use serde::Serialize;

use crate::session::Session;

/// A message telling the view what to draw.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewMessage {
    /// Busy indicator, selected model and lifecycle state.
    Status {
        busy: bool,
        model: ModelOption,
        state: SessionState,
    },

    /// Preview of the uploaded image.
    Preview {
        name: String,
        width: u32,
        height: u32,
        /// Base64-encoded JPEG.
        data: String,
    },

    /// Result pane markup.
    Result {
        term: String,
        markup: String,
    },

    /// Error banner.
    Error { message: String },
}

impl ViewMessage {
    pub fn status(session: &Session, busy: bool) -> Self {
        ViewMessage::Status {
            busy,
            model: session.selected_model(),
            state: session.state(),
        }
    }

    /// Preview of the current upload, if any.
    pub fn preview(session: &Session, jpeg_quality: u8) -> anyhow::Result<Option<Self>> {
        let Some(uploaded) = session.image() else {
            return Ok(None);
        };

        let jpeg = encode_jpeg(&uploaded.image, jpeg_quality)?;
        Ok(Some(ViewMessage::Preview {
            name: uploaded.name.clone(),
            width: uploaded.image.width(),
            height: uploaded.image.height(),
            data: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &jpeg),
        }))
    }

    /// Result pane with the session's current search term, if there is a result.
    pub fn result(session: &Session) -> Option<Self> {
        session.render_result().map(|markup| ViewMessage::Result {
            term: session.search_term().to_string(),
            markup,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        ViewMessage::Error {
            message: message.into(),
        }
    }

    /// Everything a freshly connected view needs to draw the session.
    pub fn snapshot(session: &Session, jpeg_quality: u8) -> anyhow::Result<Vec<Self>> {
        let mut messages = vec![ViewMessage::status(session, false)];
        messages.extend(ViewMessage::preview(session, jpeg_quality)?);
        messages.extend(ViewMessage::result(session));
        Ok(messages)
    }
}

/// Encode an image to JPEG.
fn encode_jpeg(image: &DynamicImage, quality: u8) -> anyhow::Result<Vec<u8>> {
    // JPEG has no alpha channel.
    let rgb = image.to_rgb8();

    let mut jpeg_data = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_data, quality);
    rgb.write_with_encoder(encoder)?;

    Ok(jpeg_data)
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use image::ImageFormat;

    use super::*;
    use crate::testing::encoded_image;

    #[test]
    fn test_empty_session_snapshot() {
        let session = Session::default();
        let messages = ViewMessage::snapshot(&session, 80).unwrap();
        assert_eq!(
            messages,
            vec![ViewMessage::Status {
                busy: false,
                model: ModelOption::EnglishHindiCpu,
                state: SessionState::NoImage,
            }]
        );
    }

    #[test]
    fn test_preview_is_jpeg() {
        let mut session = Session::default();
        session
            .upload("hello.png", &encoded_image(100, 50, ImageFormat::Png))
            .unwrap();

        match ViewMessage::preview(&session, 80).unwrap() {
            Some(ViewMessage::Preview { name, width, height, data }) => {
                assert_eq!(name, "hello.png");
                assert_eq!((width, height), (100, 50));
                let bytes = base64::engine::general_purpose::STANDARD.decode(data).unwrap();
                assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
            }
            other => panic!("unexpected preview: {:?}", other),
        }
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ViewMessage::Status {
            busy: true,
            model: ModelOption::EnglishGpu,
            state: SessionState::ImageUploaded,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"status","busy":true,"model":"english_gpu","state":"image_uploaded"}"#
        );
    }
}
