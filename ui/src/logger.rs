use crate::config::LoggingConfig;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Default log file name inside the config directory
pub const DEFAULT_LOG_FILE: &str = "reskin.log";

pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info, // Default to Info for any other value
    }
}

/// Installs the global logger.
///
/// Logs go to the configured file, else `reskin.log` in `config_dir`. When
/// neither can be opened they go to stderr. `verbose` raises the level to at
/// least `debug`.
pub fn setup_logger(
    logging: &LoggingConfig,
    config_dir: Option<&Path>,
    verbose: bool,
) -> Result<(), log::SetLoggerError> {
    let mut log_level = parse_level(logging.level());
    if verbose && log_level < LevelFilter::Debug {
        log_level = LevelFilter::Debug;
    }

    let colors = ColoredLevelConfig::new()
        .trace(Color::BrightBlack)
        .debug(Color::BrightBlue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    let base_config = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(log_level)
        // Dependencies only at warn
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn);

    let log_path: Option<PathBuf> = logging
        .file()
        .map(PathBuf::from)
        .or_else(|| config_dir.map(|dir| dir.join(DEFAULT_LOG_FILE)));

    match log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                let _ = std::fs::create_dir_all(parent);
            }
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => base_config.chain(file).apply()?,
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to open log file '{}': {e}",
                        path.display()
                    );
                    eprintln!("Logging to stderr instead.");
                    base_config.chain(std::io::stderr()).apply()?;
                }
            }
        }
        None => base_config.chain(std::io::stderr()).apply()?,
    }

    log::info!("Logger initialized with level: {log_level}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), LevelFilter::Trace);
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("warn"), LevelFilter::Warn);
        assert_eq!(parse_level("error"), LevelFilter::Error);
        assert_eq!(parse_level("info"), LevelFilter::Info);
        assert_eq!(parse_level("unknown"), LevelFilter::Info);
    }
}
