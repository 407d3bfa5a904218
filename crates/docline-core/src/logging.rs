//! Logging setup with indicatif integration

use indicatif::MultiProgress;

/// Default log level, overridable with `RUST_LOG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

impl Verbosity {
    fn default_filter(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Debug => "debug",
        }
    }
}

/// Padded label and optional ANSI color for a level.
fn level_label(level: log::Level, color: bool) -> String {
    let (ansi, label) = match level {
        log::Level::Error => ("\x1b[31m", "ERROR"),
        log::Level::Warn => ("\x1b[33m", "WARN "),
        log::Level::Info => ("\x1b[32m", "INFO "),
        log::Level::Debug => ("\x1b[36m", "DEBUG"),
        log::Level::Trace => ("\x1b[35m", "TRACE"),
    };
    if color {
        format!("{ansi}{label}\x1b[0m")
    } else {
        label.to_string()
    }
}

/// Logger that prints through `MultiProgress` so lines don't tear progress bars.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            let line = format!("[{}] {}", level_label(record.level(), true), record.args());
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the global logger.
///
/// With `multi` (TTY), log lines go through the progress bars; without it,
/// plain `[LEVEL] message` lines for log aggregation.
pub fn init_logging(verbosity: Verbosity, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let env = env_logger::Env::default().default_filter_or(verbosity.default_filter());

    if let Some(multi) = multi {
        let logger = env_logger::Builder::from_env(env).build();
        let max_level = logger.filter();
        if log::set_boxed_logger(Box::new(IndicatifLogger::new(logger, multi.clone()))).is_ok() {
            log::set_max_level(max_level);
        }
    } else {
        let _ = env_logger::Builder::from_env(env)
            .format(|buf, record| {
                writeln!(buf, "[{}] {}", level_label(record.level(), false), record.args())
            })
            .try_init();
    }
}
