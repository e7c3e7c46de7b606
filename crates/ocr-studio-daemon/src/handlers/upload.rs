//! Image upload handler.

use base64::Engine;
use ocr_studio_protocol::{ErrorCode, Response, ResponseData, UploadRequest};
use tracing::warn;

use crate::shell::Shell;
use crate::view::ViewMessage;

/// Handle an upload request.
pub async fn handle(shell: &Shell, params: UploadRequest) -> Response {
    let bytes = match base64::engine::general_purpose::STANDARD.decode(params.data.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            return Response::error(
                ErrorCode::InvalidRequest,
                format!("Image data is not valid base64: {}", e),
            );
        }
    };

    let mut session = shell.session().lock().await;
    let info = match session.upload(&params.name, &bytes) {
        Ok(info) => info,
        Err(e) => {
            shell.publish(&ViewMessage::error(e.to_string()));
            return Response::error(e.code(), e.to_string());
        }
    };

    shell.publish(&ViewMessage::status(&session, false));
    match ViewMessage::preview(&session, shell.preview_quality()) {
        Ok(Some(preview)) => shell.publish(&preview),
        Ok(None) => {}
        Err(e) => warn!("Failed to encode preview: {}", e),
    }

    Response::success(ResponseData::Uploaded(info))
}
