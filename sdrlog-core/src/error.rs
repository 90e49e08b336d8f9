use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    /// The sink could not be created. No logger exists.
    #[error("unable to open log file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The sink stopped accepting lines. `dropped` counts the records that
    /// were drained without being written afterwards.
    #[error("log sink write failed ({dropped} record(s) dropped): {source}")]
    Write {
        #[source]
        source: io::Error,
        dropped: u64,
    },
    #[error("logger is closed")]
    Closed,
    /// A record submitted from the worker thread itself found the queue full
    /// or the logger closing. The worker never waits on its own queue.
    #[error("log queue is full; record from the worker thread dropped")]
    WorkerQueueFull,
    #[error("logger worker thread panicked")]
    WorkerPanicked,
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
}
