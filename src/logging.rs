//! Tracing setup shared by the CLI and the seed script.

use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "ecopreco=info,seed_catalog=info";

/// Output switches read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// `ECOPRECO_LOG_JSON=true|1`: JSON lines on stderr.
    pub json: bool,
    /// `ECOPRECO_LOG_DIR`: directory for a daily-rolling `ecopreco.log`.
    pub dir: Option<String>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        let json = env::var("ECOPRECO_LOG_JSON")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        let dir = env::var("ECOPRECO_LOG_DIR")
            .ok()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Self { json, dir }
    }
}

/// Installs the global subscriber from [`LogSettings::from_env`]; `RUST_LOG`
/// picks the filter (default: info for this crate). Load `.env` first (see
/// `config::load_env_file`) if it carries any of these.
///
/// Keep the returned guard alive until exit or buffered file lines are lost.
pub fn init() -> Option<WorkerGuard> {
    init_with(LogSettings::from_env())
}

pub fn init_with(settings: LogSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match settings.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ecopreco.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    let (stderr_json, stderr_text) = if settings.json {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (None, Some(fmt::layer().with_target(false).with_writer(std::io::stderr)))
    };

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_json)
        .with(stderr_text)
        .with(file_layer)
        .try_init();

    guard
}
