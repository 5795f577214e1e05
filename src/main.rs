mod cli;
mod constants;
mod dispatch;
mod error;
mod lookup;
mod npi;
mod registry;
mod server;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    match args.cmd {
        cli::Command::Serve(cmd) => server::run(cmd).await.context("serve failed"),
        cli::Command::Lookup(cmd) => lookup::run(cmd).await.context("lookup failed"),
    }
}
