//! Diagnostic logging setup
//!
//! The window's log pane shows user-facing lines; this is the developer
//! log behind it, routed through the `log` facade and `env_logger`.

use crate::core::config::LoggingConfig;
use env_logger::Builder;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;

/// Writer that sends everything to stderr and a file
pub struct DualWriter {
    pub console: std::io::Stderr,
    pub file: std::fs::File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        // Write to console
        let _ = self.console.write(buf);
        // Write to file
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}

/// Map a config level string to a filter, defaulting to `Info`
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Install the global logger
///
/// `RUST_LOG` still wins over the configured level when logging to the
/// console only.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    if config.log_to_file {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;

        Builder::new()
            .filter_level(parse_level(&config.level))
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} {} {}] {}",
                    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .target(env_logger::Target::Pipe(Box::new(DualWriter {
                console: std::io::stderr(),
                file: log_file,
            })))
            .init();

        log::info!("Logging to file: {}", config.log_file.display());
    } else {
        Builder::from_env(env_logger::Env::default().default_filter_or(&config.level)).init();
    }

    Ok(())
}
