use std::sync::Arc;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use sdrlog_core::should_log;

use crate::AsyncLogger;

/// Records coming through the `log` macros carry no trailing newline, so one
/// is added to keep one record per line.
impl Log for AsyncLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.is_open() && should_log(self.max_level(), metadata.level().into())
    }

    fn log(&self, record: &Record) {
        if !Log::enabled(self, record.metadata()) {
            return;
        }
        // A close() racing with this call is the only expected failure.
        self.log_fmt(record.level().into(), format_args!("{}\n", record.args()))
            .ok();
    }

    fn flush(&self) {}
}

/// Routes the `log` crate macros to `logger`.
///
/// Filtering stays with the logger's own max level. The facade keeps its
/// reference for the rest of the process, so the owner must still call
/// `close()` before exiting.
pub fn install_log_facade(logger: &Arc<AsyncLogger>) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(Arc::clone(logger)))?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}
