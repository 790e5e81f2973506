use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Log level filter (e.g., "debug", "info", "warn", "error")
    pub level: String,
    /// Optional log file path. If None, logs only to stderr
    pub file_path: Option<PathBuf>,
    /// Whether to use structured JSON format for logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Create LogConfig from environment variables
    ///
    /// - `RUST_LOG`: level filter (default "info")
    /// - `COMPDB_LOG_FILE`: log to this file instead of stderr
    /// - `COMPDB_LOG_UNIQUE=true`: add the process ID to the log file name
    /// - `COMPDB_LOG_JSON=true`: emit JSON lines
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let unique = env::var("COMPDB_LOG_UNIQUE").unwrap_or_default() == "true";
        let file_path = env::var("COMPDB_LOG_FILE").ok().map(|path| {
            let path = PathBuf::from(path);
            if unique {
                unique_log_path(&path, std::process::id())
            } else {
                path
            }
        });

        let json_format = env::var("COMPDB_LOG_JSON").unwrap_or_default() == "true";

        Self {
            level,
            file_path,
            json_format,
        }
    }

    /// Override values from CLI arguments
    pub fn with_overrides(mut self, level: Option<String>, file_path: Option<PathBuf>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        if let Some(file_path) = file_path {
            self.file_path = Some(file_path);
        }
        self
    }
}

/// Insert `pid` before the extension: `compdb.log` -> `compdb.1234.log`
fn unique_log_path(path: &Path, pid: u32) -> PathBuf {
    let Some(stem) = path.file_stem() else {
        return path.to_path_buf();
    };

    let unique_filename = match path.extension() {
        Some(extension) => format!(
            "{}.{}.{}",
            stem.to_string_lossy(),
            pid,
            extension.to_string_lossy()
        ),
        None => format!("{}.{}", stem.to_string_lossy(), pid),
    };

    path.with_file_name(unique_filename)
}

/// Initialize the logging system based on configuration
///
/// Logs never go to stdout, which carries command output.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Create environment filter from log level
    let env_filter = EnvFilter::try_new(&config.level).or_else(|_| EnvFilter::try_new("info"))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match (&config.file_path, config.json_format) {
        // File + JSON format
        (Some(file_path), true) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer().json().with_writer(file).with_ansi(false);

            subscriber.with(file_layer).init();
        }
        // File + human readable format
        (Some(file_path), false) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);

            subscriber.with(file_layer).init();
        }
        // Stderr only + JSON format
        (None, true) => {
            let stderr_layer = fmt::layer().json().with_writer(io::stderr).with_ansi(false);

            subscriber.with(stderr_layer).init();
        }
        // Stderr only + human readable format (default)
        (None, false) => {
            let stderr_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true)
                .with_target(false);

            subscriber.with(stderr_layer).init();
        }
    }

    Ok(())
}

/// Log how long an operation took as a structured event
#[macro_export]
macro_rules! log_timing {
    ($level:expr, $operation:expr, $duration:expr) => {
        tracing::event!(
            $level,
            operation = $operation,
            duration_ms = $duration.as_millis(),
            "Performance timing"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.file_path, None);
        assert!(!config.json_format);
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let config = LogConfig {
            level: "warn".to_string(),
            file_path: Some(PathBuf::from("/tmp/env.log")),
            json_format: true,
        };

        let unchanged = config.clone().with_overrides(None, None);
        assert_eq!(unchanged, config);

        let overridden = config.with_overrides(
            Some("trace".to_string()),
            Some(PathBuf::from("/tmp/cli.log")),
        );
        assert_eq!(overridden.level, "trace");
        assert_eq!(overridden.file_path, Some(PathBuf::from("/tmp/cli.log")));
        assert!(overridden.json_format);
    }

    #[test]
    fn test_unique_log_path() {
        assert_eq!(
            unique_log_path(Path::new("/var/log/compdb.log"), 42),
            PathBuf::from("/var/log/compdb.42.log")
        );
        assert_eq!(
            unique_log_path(Path::new("/var/log/compdb"), 42),
            PathBuf::from("/var/log/compdb.42")
        );
    }
}
