//! OCR run handler.

use ocr_studio_protocol::{Response, ResponseData};
use tracing::{debug, error};

use crate::shell::Shell;
use crate::view::ViewMessage;

/// Handle a run request.
pub async fn handle(shell: &Shell) -> Response {
    let mut session = shell.session().lock().await;

    if session.image().is_some() {
        shell.publish(&ViewMessage::status(&session, true));
    }

    let model = session.selected_model();
    debug!("Run request with '{}'", model);

    // Inference is CPU-bound and runs to completion while the session is locked.
    let result = session.run_ocr(shell.registry(), shell.invoker());

    shell.publish(&ViewMessage::status(&session, false));

    match result {
        Ok(text) => {
            if let Some(pane) = ViewMessage::result(&session) {
                shell.publish(&pane);
            }
            Response::success(ResponseData::OcrResult { model, text })
        }
        Err(e) => {
            shell.publish(&ViewMessage::error(e.to_string()));
            if e.is_fatal() {
                error!("Cannot continue session: {}", e);
                shell.report_fatal(e.to_string());
            }
            Response::error(e.code(), e.to_string())
        }
    }
}
