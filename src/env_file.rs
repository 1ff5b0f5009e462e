use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Variables read from a dotenv file.
///
/// The file is a lookup layer beneath the process environment and never
/// writes into it. When a key repeats, the first assignment wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    vars: HashMap<String, String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Assignment(&'a str, &'a str),
    Malformed,
}

/// `KEY=VALUE`, split on the first `=`. Values are taken literally apart from
/// surrounding whitespace and quote characters.
fn parse_line(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Line::Blank;
    }

    match line.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Line::Assignment(
            key.trim(),
            value.trim().trim_matches('"').trim_matches('\''),
        ),
        _ => Line::Malformed,
    }
}

impl EnvFile {
    /// Loads `path`, treating a missing or unreadable file as empty.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(file)) => {
                debug!(
                    path = %path.display(),
                    var_count = file.len(),
                    "loaded env file"
                );
                file
            }
            Ok(None) => {
                debug!(path = %path.display(), "no env file present");
                Self::default()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %format!("{err:#}"), "ignoring env file");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
            }
        };

        let mut vars = HashMap::new();
        for (index, line) in contents.lines().enumerate() {
            match parse_line(line) {
                Line::Blank => {}
                Line::Assignment(key, value) => {
                    vars.entry(key.to_string())
                        .or_insert_with(|| value.to_string());
                }
                // The line text may hold a secret, so only its number is logged.
                Line::Malformed => {
                    warn!(
                        path = %path.display(),
                        line = index + 1,
                        "skipping env file line without an assignment"
                    );
                }
            }
        }

        Ok(Some(Self { vars }))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.vars.len()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvFile
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = HashMap::new();
        for (key, value) in iter {
            vars.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { vars }
    }
}
