//! Launch configuration: `.env`, then process environment, then flags.

use std::fmt;

use exam_core::navigation::{Flow, Step};
use exam_core::timer::TimerPolicy;
use services::ServiceOptions;

pub const DEFAULT_DB_URL: &str = "sqlite://exams.sqlite3";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidFlow { raw: String },
    InvalidStep { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidFlow { raw } => write!(f, "invalid flow: {raw} (expected timed or classic)"),
            ArgsError::InvalidStep { raw } => write!(f, "invalid --step value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

pub fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_url: String,
    /// Base URL or directory holding `exams/<subject>/<type>/<year>.json`.
    pub source: String,
    pub flow: Flow,
    /// Exam types that get the longer countdown.
    pub extended_types: Vec<String>,
    /// Deep link applied on launch, e.g. `?step=history`.
    pub query: String,
    pub rust_log: String,
}

impl AppConfig {
    /// Read `EXAM_*` variables and `RUST_LOG` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` when a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// # Errors
    ///
    /// Returns `ArgsError` when a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ArgsError> {
        let db_url = lookup("EXAM_DB_URL").map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let flow = match lookup("EXAM_FLOW") {
            Some(raw) => parse_flow(raw)?,
            None => Flow::default(),
        };
        let extended_types = lookup("EXAM_EXTENDED_TYPES").map_or_else(
            || vec!["final".to_string()],
            |raw| {
                raw.split(',')
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect()
            },
        );

        Ok(Self {
            db_url,
            source: lookup("EXAM_SOURCE").unwrap_or_else(|| ".".into()),
            flow,
            extended_types,
            query: String::new(),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".into()),
        })
    }

    /// Consume one shared flag. Returns `false` when `flag` is not one of ours.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for missing or invalid values.
    pub fn apply_flag(
        &mut self,
        flag: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<bool, ArgsError> {
        match flag {
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                self.db_url = normalize_sqlite_url(value);
            }
            "--source" => self.source = require_value(args, "--source")?,
            "--flow" => self.flow = parse_flow(require_value(args, "--flow")?)?,
            "--step" => {
                let value = require_value(args, "--step")?;
                let step = Step::from_query(&format!("?step={value}"))
                    .map_err(|_| ArgsError::InvalidStep { raw: value })?;
                self.query = step.to_query();
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    #[must_use]
    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            flow: self.flow,
            timer: TimerPolicy::new(self.extended_types.iter().map(String::as_str)),
            ..ServiceOptions::default()
        }
    }
}

fn parse_flow(raw: String) -> Result<Flow, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidFlow { raw })
}

#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory so the pool can open it.
///
/// # Errors
///
/// Returns an error for malformed URLs or filesystem failures.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert_eq!(config.source, ".");
        assert_eq!(config.flow, Flow::Timed);
        assert_eq!(config.extended_types, vec!["final".to_string()]);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("EXAM_FLOW", "classic"),
            ("EXAM_SOURCE", "https://exams.example.org"),
            ("EXAM_EXTENDED_TYPES", "Final, board ,"),
            ("EXAM_DB_URL", "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(config.flow, Flow::Classic);
        assert_eq!(config.source, "https://exams.example.org");
        assert_eq!(config.extended_types, vec!["final".to_string(), "board".to_string()]);
        assert_eq!(config.db_url, "sqlite::memory:");
    }

    #[test]
    fn invalid_flow_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("EXAM_FLOW", "sprint")])).unwrap_err();
        assert_eq!(err, ArgsError::InvalidFlow { raw: "sprint".into() });
    }

    #[test]
    fn flags_override_environment() {
        let mut config = AppConfig::from_lookup(lookup(&[("EXAM_FLOW", "classic")])).unwrap();
        let mut args = vec!["timed".to_string(), "history".to_string()].into_iter();
        assert!(config.apply_flag("--flow", &mut args).unwrap());
        assert!(config.apply_flag("--step", &mut args).unwrap());
        assert_eq!(config.flow, Flow::Timed);
        assert_eq!(config.query, "?step=history");
        assert!(!config.apply_flag("--subject", &mut args).unwrap());
    }

    #[test]
    fn missing_flag_value_is_reported() {
        let mut config = AppConfig::from_lookup(lookup(&[])).unwrap();
        let mut args = Vec::<String>::new().into_iter();
        assert_eq!(
            config.apply_flag("--source", &mut args).unwrap_err(),
            ArgsError::MissingValue { flag: "--source" }
        );
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/exams.db".into());
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("data/exams.db"), "{url}");
    }
}
