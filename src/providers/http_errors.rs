use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::CheckError;

fn error_chain_has_io_kind(
    err: &(dyn StdError + 'static),
    kind: ErrorKind,
    needle: &str,
) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_io_kind(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_io_kind(err, ErrorKind::TimedOut, "timed out")
}

/// Flattens an error and its sources into one line.
fn error_chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        current = source.source();
    }
    parts.join(": ")
}

pub(crate) fn transport_error(err: reqwest::Error, api_url: &str, timeout_secs: u64) -> CheckError {
    let detail = error_chain_message(&err);

    let message = if err.is_timeout() || error_chain_has_timeout(&err) {
        format!(
            "timed out after {}s while calling '{}' ({})",
            timeout_secs, api_url, detail
        )
    } else if err.is_connect() && error_chain_has_connection_refused(&err) {
        format!(
            "connection refused by '{}'; check the endpoint ({})",
            api_url, detail
        )
    } else if err.is_connect() {
        format!(
            "failed to connect to '{}'; check the endpoint and network connectivity ({})",
            api_url, detail
        )
    } else {
        detail
    };

    CheckError::Transport { message }
}
