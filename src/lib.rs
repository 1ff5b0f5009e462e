//! Connectivity check for Azure OpenAI chat completion deployments.
//!
//! A run resolves configuration, sends one fixed chat completion request and
//! reports the assistant reply. [`CheckError::exit_code`] maps each failure to
//! the process exit status.

pub mod cli;
pub mod config;
pub mod env_file;
pub mod error;
pub mod logging;
pub mod providers;
pub mod request;
pub mod response;

use reqwest::Client;
use std::io::{self, Write};
use std::path::Path;

use cli::Cli;
use config::Config;
use env_file::{DEFAULT_ENV_FILE, EnvFile};
pub use error::CheckError;
use providers::azure_openai;
use request::ChatRequest;

pub async fn run(cli: Cli) -> Result<(), CheckError> {
    let env_file = EnvFile::load(Path::new(DEFAULT_ENV_FILE));
    let cfg = Config::resolve(&cli, &env_file)?;
    let client = azure_openai::build_client(&cfg)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = check(&client, &cfg, &mut out).await;
    out.flush()?;
    result
}

/// Sends the test request and writes the report to `out`.
pub async fn check(client: &Client, cfg: &Config, out: &mut impl Write) -> Result<(), CheckError> {
    let request = ChatRequest::new(cfg);
    if cfg.verbose {
        request.describe(out)?;
        out.flush()?;
    }

    let raw = azure_openai::send(client, cfg, &request).await?;
    response::interpret(&raw, cfg.verbose, out)
}
