//! # sdrlog
//! Asynchronous, level-filtered logger for SDR tools. Callers never wait on
//! I/O: records go through a bounded queue to a single worker thread that
//! writes them, in order, as `[<Level>]: <text>`.
//!
//! ## Usage
//! ```rust
//! use sdrlog::{Level, logf, logger_config};
//!
//! let logger = logger_config()
//!     .with_target("stdout")
//!     .expect("Unable to open log target")
//!     .with_debug(false)
//!     .build();
//! logger.log(Level::Info, "Found 2 attached SDR(s)\n").unwrap();
//! logf!(logger, Level::Debug, "Making device with label: '{}'\n", "rtl").unwrap();
//! logger.close().unwrap(); // waits until every queued line is written
//! ```
//!
//! ## Sharing between threads
//! The logger is passed around explicitly as an `Arc`. The owner closes it
//! once the other holders are done.
//!
//! ```rust
//! use std::sync::Arc;
//! use sdrlog::{Level, MemorySink, logger_config};
//!
//! let sink = MemorySink::new();
//! let logger = logger_config().with_sink(sink.clone()).build();
//! let handles: Vec<_> = (0..4).map(|i| {
//!     let logger = Arc::clone(&logger);
//!     std::thread::spawn(move || {
//!         logger.log(Level::Error, format!("stream {i} stalled\n")).unwrap();
//!     })
//! }).collect();
//! for h in handles { h.join().unwrap(); }
//! logger.close().unwrap();
//! assert_eq!(sink.contents().lines().count(), 4);
//! ```
//!
//! ## Logging to files
//! Any target other than `stdout` is a file path. The file is created, or
//! truncated if it exists.
//!
//! ```rust
//! use sdrlog::{Level, logger_config};
//!
//! let logger = logger_config()
//!     .with_log_file("/tmp/sdrlog_doc.log")
//!     .expect("Unable to create log file")
//!     .build();
//! logger.log(Level::Fatal, "device vanished").unwrap();
//! logger.close().unwrap();
//! assert_eq!(std::fs::read_to_string("/tmp/sdrlog_doc.log").unwrap(), "[Fatal]: device vanished");
//! ```

mod facade;
mod logger;
mod soapy;

use std::{io, path::Path, sync::Arc};

pub use facade::install_log_facade;
pub use logger::{AsyncLogger, LoggerState};
pub use sdrlog_core::{
    DEFAULT_QUEUE_CAPACITY, FileSink, Level, LogError, LogSink, MemorySink, SDRLOG_CONFIG,
    StdoutSink, TargetSink, WriteFailureHook, level_name, should_log,
};
pub use soapy::{SoapyBridge, SoapyLevel, soapy_level_name};

/// Renders a message on the calling thread and submits it.
///
/// `logf!(logger, Level::Info, "Found {} device(s)\n", n)` is
/// `logger.log_fmt(Level::Info, format_args!(...))`; nothing is rendered when
/// the level is filtered out.
#[macro_export]
macro_rules! logf {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_fmt($level, format_args!($($arg)+))
    };
}

/// Builder for configuring and starting a logger.
pub struct ConfigBuilder {
    sink: Option<Box<dyn LogSink>>,
    log_level: Level,
    capacity: usize,
    on_failure: Option<WriteFailureHook>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            sink: None,
            log_level: SDRLOG_CONFIG.level(),
            capacity: SDRLOG_CONFIG.queue_capacity(),
            on_failure: None,
        }
    }
}

impl ConfigBuilder {
    /// Sets the output from a selector: `stdout` (any case) or a file path.
    pub fn with_target(self, selector: &str) -> Result<Self, LogError> {
        Ok(Self {
            sink: Some(Box::new(TargetSink::open(selector)?)),
            ..self
        })
    }
    /// Sets a log file, truncating it.
    pub fn with_log_file<P: AsRef<Path>>(self, path: P) -> Result<Self, LogError> {
        Ok(Self {
            sink: Some(Box::new(FileSink::new(path)?)),
            ..self
        })
    }
    /// Log to stdout. This is also what happens when no output is set.
    pub fn with_stdout(self) -> Self {
        Self {
            sink: Some(Box::new(StdoutSink)),
            ..self
        }
    }
    pub fn with_sink<W: LogSink + 'static>(self, sink: W) -> Self {
        Self {
            sink: Some(Box::new(sink)),
            ..self
        }
    }
    pub fn with_max_level(self, level: Level) -> Self {
        Self {
            log_level: level,
            ..self
        }
    }
    /// `Debug` when set, `Info` otherwise.
    pub fn with_debug(self, yes: bool) -> Self {
        Self {
            log_level: if yes { Level::Debug } else { Level::Info },
            ..self
        }
    }
    /// Queue capacity. Producers block once this many records are pending.
    pub fn with_capacity(self, capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ..self
        }
    }
    /// Called on the worker thread when the sink fails. The hook must not
    /// close the logger. It may log through it: such records are never
    /// waited on and fail with `LogError::WorkerQueueFull` when the queue is full.
    pub fn on_write_failure<F: Fn(&io::Error) + Send + 'static>(self, hook: F) -> Self {
        Self {
            on_failure: Some(Box::new(hook)),
            ..self
        }
    }
    /// Starts the worker thread and returns the shared logger.
    #[must_use = "the logger must be kept and closed to make sure every line is written"]
    pub fn build(self) -> Arc<AsyncLogger> {
        let Self {
            sink,
            log_level,
            capacity,
            on_failure,
        } = self;
        let sink = sink.unwrap_or_else(|| Box::new(StdoutSink) as Box<dyn LogSink>);
        Arc::new(AsyncLogger::spawn(sink, log_level, capacity, on_failure))
    }
}

/// Returns a default ConfigBuilder for configuring the logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}
