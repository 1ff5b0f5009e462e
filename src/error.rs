use thiserror::Error;

use crate::config::{DEPLOYMENT_VARS, ENDPOINT_VARS, KEY_VARS};

/// Exit status for a check that reached the endpoint but did not succeed.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status for missing configuration or an unusable HTTP client.
pub const EXIT_MISCONFIGURED: u8 = 2;

/// Terminal outcomes of a connectivity check.
///
/// The binary prints the `Display` form to stderr. Everything else in the
/// report (status line, reply markers, JSON dumps) goes to stdout, so a
/// `MissingConfig` or `Transport` failure leaves stdout empty.
#[derive(Debug, Error)]
pub enum CheckError {
    /// One or more of endpoint, key and deployment could not be resolved.
    #[error(
        "Missing configuration ({}). Provide --endpoint, --key, and --deployment or set env vars:\n  {}, {}, {}",
        .missing.join(", "),
        ENDPOINT_VARS[0],
        KEY_VARS[0],
        DEPLOYMENT_VARS[0]
    )]
    MissingConfig { missing: Vec<&'static str> },

    /// The HTTP client could not be constructed.
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The request never produced a response.
    #[error("Request failed: {message}")]
    Transport { message: String },

    /// The response body was not JSON.
    #[error("Response with status {status} was not valid JSON")]
    NonJson { status: u16 },

    /// The response was JSON but carried no recognizable assistant text.
    #[error("No assistant message found in response with status {status}")]
    NoAssistantText { status: u16 },

    /// Assistant text was returned alongside a non-200 status.
    #[error("Model replied but the endpoint returned status {status}")]
    UnexpectedStatus { status: u16 },

    /// The report could not be written.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CheckError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingConfig { .. } | Self::HttpClient(_) => EXIT_MISCONFIGURED,
            Self::Transport { .. }
            | Self::NonJson { .. }
            | Self::NoAssistantText { .. }
            | Self::UnexpectedStatus { .. }
            | Self::Output(_) => EXIT_FAILURE,
        }
    }
}
