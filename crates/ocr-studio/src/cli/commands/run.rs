//! Run command implementation.

use ocr_studio_protocol::{HighlightRequest, Request, SelectModelRequest};

use super::model::parse_option;
use super::{finish, send};
use crate::cli::RunArgs;
use crate::output::Output;

pub async fn run(
    session: &str,
    args: RunArgs,
    output: &Output,
    timeout_ms: u64,
) -> anyhow::Result<()> {
    if let Some(ref option) = args.model {
        let model = parse_option(option, output);
        let response = send(
            session,
            &Request::SelectModel(SelectModelRequest { model }),
            timeout_ms,
        )
        .await?;
        if !response.success {
            return finish(output, &response);
        }
    }

    let response = send(session, &Request::RunOcr, timeout_ms).await?;
    let term = match args.highlight {
        Some(term) if response.success => term,
        _ => return finish(output, &response),
    };

    let response = send(session, &Request::Highlight(HighlightRequest { term }), timeout_ms).await?;
    finish(output, &response)
}
