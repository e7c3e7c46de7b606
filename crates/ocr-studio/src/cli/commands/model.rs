//! Model selection command implementation.

use ocr_studio_protocol::{ErrorCode, ModelOption, Request, SelectModelRequest};

use super::{finish, send};
use crate::cli::{ModelAction, ModelArgs};
use crate::output::Output;

pub async fn run(
    session: &str,
    args: ModelArgs,
    output: &Output,
    timeout_ms: u64,
) -> anyhow::Result<()> {
    match args.action {
        ModelAction::Select { option } => {
            let model = parse_option(&option, output);
            let request = Request::SelectModel(SelectModelRequest { model });
            let response = send(session, &request, timeout_ms).await?;
            finish(output, &response)
        }
        ModelAction::List => {
            list(output);
            Ok(())
        }
    }
}

/// Parse a model option, exiting with an `invalid_request` error if it is unknown.
pub(crate) fn parse_option(option: &str, output: &Output) -> ModelOption {
    match option.parse::<ModelOption>() {
        Ok(model) => model,
        Err(e) => {
            output.print_error(ErrorCode::InvalidRequest, &e.to_string());
            std::process::exit(1);
        }
    }
}

fn list(output: &Output) {
    if output.is_json() {
        let models: Vec<serde_json::Value> = ModelOption::ALL
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id(),
                    "label": m.label(),
                    "default": *m == ModelOption::default(),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(models));
    } else {
        for model in ModelOption::ALL {
            let marker = if model == ModelOption::default() { " (default)" } else { "" };
            println!("{:<16} {}{}", model.id(), model.label(), marker);
        }
    }
}
