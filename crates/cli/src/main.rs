mod commands;
mod config;
mod handlers;
mod render;
mod session;

use anyhow::Context as _;
use clap::Parser;
use dotenvy::dotenv;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::Cli;
use config::Settings;
use handlers::Context;
use remote::Api;
use session::SessionFile;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::new(cli.config.as_deref()).context("Failed to load configuration")?;

    // 日志走 stderr，stdout 只留给渲染结果
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let api = Api::new(
        &settings.api.base_url,
        Duration::from_secs(settings.api.timeout_secs),
    )?;
    debug!("Using API at {}", api.base_url());

    let ctx = Context {
        api,
        session: SessionFile::new(&settings.session.path),
    };

    handlers::run(cli.command, &ctx).await
}
