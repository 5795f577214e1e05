use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::constants::{DEFAULT_NPI_API_BASE_URL, DEFAULT_NPI_API_VERSION, MAX_BATCH_SIZE};
use crate::dispatch::LookupConfig;

#[derive(Parser, Debug)]
#[command(name = "npi-lookup")]
#[command(about = "Look up NPPES provider records by NPI", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP lookup API.
    Serve(ServeArgs),
    /// Look up one or more NPIs and print the normalized records.
    Lookup(LookupArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RegistryArgs {
    /// NPI registry API base URL (see https://npiregistry.cms.hhs.gov/api-page).
    #[arg(long, env = "NPI_REGISTRY_URL", default_value = DEFAULT_NPI_API_BASE_URL)]
    pub registry_url: String,

    /// NPI registry API version query parameter.
    #[arg(long, default_value = DEFAULT_NPI_API_VERSION)]
    pub api_version: String,

    /// Per-NPI request deadline in seconds.
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,

    /// Max NPIs processed per batch; extra NPIs are ignored.
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    pub max_batch: usize,
}

impl RegistryArgs {
    pub fn lookup_config(&self) -> LookupConfig {
        LookupConfig {
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            max_batch: self.max_batch.max(1),
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8787)]
    pub port: u16,

    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LookupArgs {
    /// Comma-separated NPI numbers (e.g. 1417005489,1306849806).
    pub npis: String,

    /// Print the JSON response document instead of text blocks.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub registry: RegistryArgs,
}
