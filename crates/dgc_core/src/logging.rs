//! Process-wide `log` backend.
//!
//! One `flexi_logger` instance serves the whole process. Server and CLI call
//! [`init_logging`] at startup; repeating the call with the same settings is
//! a no-op, while different settings are refused so a second caller cannot
//! silently redirect output. Panics are mirrored into the log as single-line
//! events.

use flexi_logger::{
    detailed_format, Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{self, PanicHookInfo};
use std::path::PathBuf;
use std::str::FromStr;

const FILE_BASENAME: &str = "dgc";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_MESSAGE_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Size-rotated files under an absolute directory.
    Directory(PathBuf),
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for Level {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LoggingError::UnknownLevel(raw.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    RelativeDirectory(PathBuf),
    CreateDirectory(PathBuf, std::io::Error),
    /// Logging is already running with other settings.
    AlreadyActive {
        active: String,
        requested: String,
    },
    Backend(flexi_logger::FlexiLoggerError),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(raw) => write!(
                f,
                "unsupported log level `{raw}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDirectory(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::CreateDirectory(dir, err) => {
                write!(f, "cannot create log directory `{}`: {err}", dir.display())
            }
            Self::AlreadyActive { active, requested } => write!(
                f,
                "logging already active as `{active}`; refusing to switch to `{requested}`"
            ),
            Self::Backend(err) => write!(f, "logger backend failed to start: {err}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory(_, err) => Some(err),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

struct ActiveLogger {
    level: Level,
    target: LogTarget,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn describe(level: Level, target: &LogTarget) -> String {
        format!("{} -> {target}", level.as_str())
    }

    fn ensure_same(&self, level: Level, target: &LogTarget) -> Result<(), LoggingError> {
        if self.level == level && &self.target == target {
            return Ok(());
        }
        Err(LoggingError::AlreadyActive {
            active: Self::describe(self.level, &self.target),
            requested: Self::describe(level, target),
        })
    }
}

/// Starts logging at `level` into `target`.
pub fn init_logging(level: &str, target: LogTarget) -> Result<(), LoggingError> {
    let level: Level = level.parse()?;
    if let LogTarget::Directory(dir) = &target {
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeDirectory(dir.clone()));
        }
    }

    ACTIVE
        .get_or_try_init(|| start(level, &target))?
        .ensure_same(level, &target)
}

fn start(level: Level, target: &LogTarget) -> Result<ActiveLogger, LoggingError> {
    let logger = Logger::try_with_str(level.as_str()).map_err(LoggingError::Backend)?;
    let logger = match target {
        LogTarget::Stderr => logger.log_to_stderr().format_for_stderr(detailed_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|err| LoggingError::CreateDirectory(dir.clone(), err))?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_FILES),
                )
                .append()
                .write_mode(WriteMode::BufferAndFlush)
                .format_for_files(detailed_format)
        }
    };
    let handle = logger.start().map_err(LoggingError::Backend)?;

    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        error!(
            "event=panic module=core status=error location={} message={}",
            info.location()
                .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line())),
            panic_message(info)
        );
        previous(info);
    }));

    info!(
        "event=logging_init module=core status=ok level={} target={target} os={} version={}",
        level.as_str(),
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        target: target.clone(),
        _handle: handle,
    })
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        Level::Debug.as_str()
    } else {
        Level::Info.as_str()
    }
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    single_line(text, PANIC_MESSAGE_LIMIT)
}

fn single_line(text: &str, limit: usize) -> String {
    let mut line: String = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(limit)
        .collect();
    if text.chars().count() > limit {
        line.push_str("...");
    }
    line
}
