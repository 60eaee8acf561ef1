use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use client_core::{ApplyClient, MissingTokenSource, StaticTokenSource, TokenSource};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod controller;
mod render;

use cli::Cli;
use controller::{
    commands::App,
    events::{UiError, UiErrorContext},
};

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_app(cli: &Cli) -> anyhow::Result<App> {
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        settings.api_url = url.clone();
    }
    if let Some(token) = &cli.token {
        settings.access_token = Some(token.clone()).filter(|t| !t.trim().is_empty());
    }

    let tokens: Arc<dyn TokenSource> = match settings.access_token.clone() {
        Some(token) => Arc::new(StaticTokenSource::new(token)),
        None => Arc::new(MissingTokenSource),
    };
    let client = ApplyClient::new(&settings.api_url, tokens)?;
    tracing::info!(api_url = client.base_url(), "configured analysis service");
    Ok(App {
        client,
        simulator: settings.simulator_config(),
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match build_app(&cli) {
        Ok(app) => app.dispatch(cli.command).await,
        Err(err) => Err(UiError::from_error(UiErrorContext::Startup, &err)),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(
                category = ?err.category(),
                context = ?err.context(),
                reauth = err.requires_reauth(),
                "command failed: {}",
                err.message()
            );
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
