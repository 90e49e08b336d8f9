//! # sdrlog-core
//! Core of sdrlog: severity levels, sinks, configuration and the background
//! worker that drains the log queue.

mod config;
mod error;
mod level;
mod sink;
mod worker;

pub use config::{DEFAULT_QUEUE_CAPACITY, SDRLOG_CONFIG, SdrLogConfig};
pub use error::LogError;
pub use level::{Level, level_name, should_log};
pub use sink::{FileSink, LogSink, MemorySink, StdoutSink, TargetSink};
pub use worker::{LogRecord, LogWorker, WorkerReport, WriteFailureHook, spawn_log_thread};

pub use crossbeam_channel::{Sender, TrySendError};
