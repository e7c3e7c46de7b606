//! Highlight and text retrieval handlers.

use ocr_studio_protocol::{HighlightRequest, Response, ResponseData};

use crate::session::SessionError;
use crate::shell::Shell;
use crate::view::ViewMessage;

/// Handle a highlight request.
pub async fn handle(shell: &Shell, params: HighlightRequest) -> Response {
    let mut session = shell.session().lock().await;

    match session.highlight(&params.term) {
        Ok((markup, matches)) => {
            if let Some(pane) = ViewMessage::result(&session) {
                shell.publish(&pane);
            }
            Response::success(ResponseData::Highlighted {
                term: params.term,
                matches,
                markup,
            })
        }
        Err(e) => Response::error(e.code(), e.to_string()),
    }
}

/// Handle a request for the plain extracted text.
pub async fn handle_get_text(shell: &Shell) -> Response {
    let session = shell.session().lock().await;

    match session.extracted_text() {
        Some(text) => Response::success(ResponseData::Text {
            text: text.to_string(),
        }),
        None => {
            let e = SessionError::NoResult;
            Response::error(e.code(), e.to_string())
        }
    }
}
