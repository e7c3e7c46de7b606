//! ocr-studio: upload an image, run a pretrained OCR model, highlight the text.

mod cli;
mod ipc_client;
mod output;
mod session_manager;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    use output::Output;

    let output = Output::new(cli.json);

    // A spawned daemon reads its settings from the environment it inherits.
    if cli.ui_port > 0 {
        std::env::set_var(ocr_studio_daemon::config::UI_PORT_ENV, cli.ui_port.to_string());
    }
    if let Some(ref dir) = cli.models_dir {
        std::env::set_var(ocr_studio_daemon::config::MODELS_DIR_ENV, dir);
    }

    match cli.command {
        Commands::Upload(args) => {
            cli::commands::upload::run(&cli.session, args, &output, cli.timeout).await
        }
        Commands::Model(args) => {
            cli::commands::model::run(&cli.session, args, &output, cli.timeout).await
        }
        Commands::Run(args) => {
            cli::commands::run::run(&cli.session, args, &output, cli.timeout).await
        }
        Commands::Highlight(args) => {
            cli::commands::highlight::run(&cli.session, args, &output, cli.timeout).await
        }
        Commands::Text => {
            cli::commands::text::run(&cli.session, &output, cli.timeout).await
        }
        Commands::Session(args) => {
            cli::commands::session::run(&cli.session, args, &output, cli.timeout).await
        }
        Commands::View => {
            cli::commands::view::run(cli.ui_port, &output)
        }
    }
}
