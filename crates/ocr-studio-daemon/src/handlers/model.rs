//! Model selection handler.

use ocr_studio_protocol::{Response, ResponseData, SelectModelRequest};

use crate::shell::Shell;
use crate::view::ViewMessage;

/// Handle a model selection request.
///
/// Selection only records the choice; the model loads on the next run.
pub async fn handle(shell: &Shell, params: SelectModelRequest) -> Response {
    let mut session = shell.session().lock().await;
    session.select_model(params.model);
    shell.publish(&ViewMessage::status(&session, false));

    Response::success(ResponseData::ModelSelected {
        model: session.selected_model(),
    })
}

#[cfg(test)]
mod tests {
    use ocr_studio_protocol::ModelOption;

    use super::*;
    use crate::shell::tests::shell_with;
    use crate::testing::FakeModel;

    #[tokio::test]
    async fn test_select_does_not_load() {
        let (shell, _fatal_rx, _dir) = shell_with(Some(FakeModel::text("x")));

        let resp = handle(&shell, SelectModelRequest { model: ModelOption::EnglishGpu }).await;
        assert!(resp.success);
        match resp.data {
            Some(ResponseData::ModelSelected { model }) => {
                assert_eq!(model, ModelOption::EnglishGpu)
            }
            other => panic!("unexpected data: {:?}", other),
        }
        assert!(shell.registry().loaded().is_empty());
        assert_eq!(shell.session().lock().await.selected_model(), ModelOption::EnglishGpu);
    }
}
