use std::env;
use std::fmt;
use tracing::info;

use crate::cli::Cli;
use crate::env_file::EnvFile;
use crate::error::CheckError;

pub const ENDPOINT_VARS: &[&str] = &["AZURE_OPENAI_ENDPOINT", "OPENAI_API_BASE"];
pub const KEY_VARS: &[&str] = &["AZURE_OPENAI_KEY", "OPENAI_API_KEY", "OPENAI_KEY"];
pub const DEPLOYMENT_VARS: &[&str] = &["AZURE_OPENAI_DEPLOYMENT", "OPENAI_DEPLOYMENT"];
pub const API_VERSION_VARS: &[&str] = &["AZURE_OPENAI_API_VERSION", "OPENAI_API_VERSION"];
pub const TIMEOUT_VARS: &[&str] = &["AZURE_OPENAI_TIMEOUT_SECS"];

pub const DEFAULT_API_VERSION: &str = "2023-05-15";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Flag,
    Variable(&'static str),
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("flag"),
            Self::Variable(name) => f.write_str(name),
            Self::Default => f.write_str("default"),
        }
    }
}

/// One step in the lookup order for a setting.
#[derive(Debug, Clone, Copy)]
enum Lookup<'a> {
    Flag(Option<&'a str>),
    Variable(&'static str),
}

/// Walks `lookups` in order and returns the first non-empty value.
fn first_match(
    lookups: &[Lookup<'_>],
    get_var: &mut impl FnMut(&str) -> Option<String>,
) -> Option<(String, Source)> {
    lookups.iter().find_map(|lookup| {
        let (value, source) = match *lookup {
            Lookup::Flag(value) => (value.map(str::to_string), Source::Flag),
            Lookup::Variable(name) => (get_var(name), Source::Variable(name)),
        };
        value
            .filter(|value| !value.is_empty())
            .map(|value| (value, source))
    })
}

fn lookups<'a>(flag: Option<&'a str>, vars: &[&'static str]) -> Vec<Lookup<'a>> {
    std::iter::once(Lookup::Flag(flag))
        .chain(vars.iter().copied().map(Lookup::Variable))
        .collect()
}

#[derive(Clone)]
pub struct Config {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub timeout_secs: u64,
    pub verbose: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Config {
    /// Resolves settings from flags, then the process environment, then `env_file`.
    ///
    /// A variable set in the process environment shadows the same name in the
    /// file, even when it is empty.
    pub fn resolve(cli: &Cli, env_file: &EnvFile) -> Result<Self, CheckError> {
        Self::resolve_with(cli, |key| {
            env::var(key)
                .ok()
                .or_else(|| env_file.get(key).map(str::to_string))
        })
    }

    pub fn resolve_with(
        cli: &Cli,
        mut get_var: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, CheckError> {
        let endpoint = first_match(
            &lookups(cli.endpoint.as_deref(), ENDPOINT_VARS),
            &mut get_var,
        );
        let api_key = first_match(&lookups(cli.key.as_deref(), KEY_VARS), &mut get_var);
        let deployment = first_match(
            &lookups(cli.deployment.as_deref(), DEPLOYMENT_VARS),
            &mut get_var,
        );

        let (endpoint, api_key, deployment) = match (endpoint, api_key, deployment) {
            (Some(endpoint), Some(api_key), Some(deployment)) => (endpoint, api_key, deployment),
            (endpoint, api_key, deployment) => {
                let missing = [
                    ("endpoint", endpoint.is_none()),
                    ("key", api_key.is_none()),
                    ("deployment", deployment.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, is_missing)| is_missing.then_some(name))
                .collect();
                return Err(CheckError::MissingConfig { missing });
            }
        };

        let (api_version, api_version_source) = first_match(
            &lookups(cli.api_version.as_deref(), API_VERSION_VARS),
            &mut get_var,
        )
        .unwrap_or_else(|| (DEFAULT_API_VERSION.to_string(), Source::Default));

        let timeout_secs = match cli.timeout_secs.filter(|secs| *secs > 0) {
            Some(secs) => secs,
            None => parse_timeout_secs(
                first_match(&lookups(None, TIMEOUT_VARS), &mut get_var)
                    .map(|(value, _)| value)
                    .as_deref(),
            ),
        };

        info!(
            endpoint = %endpoint.0,
            endpoint_source = %endpoint.1,
            key_source = %api_key.1,
            deployment = %deployment.0,
            deployment_source = %deployment.1,
            api_version = %api_version,
            api_version_source = %api_version_source,
            timeout_secs,
            "resolved configuration"
        );

        Ok(Self {
            endpoint: endpoint.0,
            api_key: api_key.0,
            deployment: deployment.0,
            api_version,
            timeout_secs,
            verbose: cli.verbose,
        })
    }
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    parse_positive_u64(raw, DEFAULT_TIMEOUT_SECS)
}
