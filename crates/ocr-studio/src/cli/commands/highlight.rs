//! Highlight command implementation.

use ocr_studio_protocol::{HighlightRequest, Request};

use super::{finish, send};
use crate::cli::HighlightArgs;
use crate::output::Output;

pub async fn run(
    session: &str,
    args: HighlightArgs,
    output: &Output,
    timeout_ms: u64,
) -> anyhow::Result<()> {
    let request = Request::Highlight(HighlightRequest { term: args.term });
    let response = send(session, &request, timeout_ms).await?;
    finish(output, &response)
}
