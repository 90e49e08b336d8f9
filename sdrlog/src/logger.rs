use std::{
    fmt,
    sync::{
        Mutex, PoisonError, RwLock, TryLockError,
        atomic::{AtomicU8, Ordering},
    },
    thread::{self, ThreadId},
};

use colored::Colorize;
use sdrlog_core::{
    Level, LogError, LogRecord, LogSink, LogWorker, SDRLOG_CONFIG, Sender, TargetSink,
    TrySendError, WriteFailureHook, should_log, spawn_log_thread,
};

const OPEN: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    /// Accepting records, worker running.
    Open,
    /// `close()` is waiting for the worker to drain.
    Closing,
    /// Worker exited and the sink has been released.
    Closed,
}

/// Level-filtered logger writing through a single background worker.
///
/// Producers only block when the queue is full. Share it as
/// `Arc<AsyncLogger>` and have the longest-lived holder call [`close`](Self::close)
/// once everyone else is done; dropping an open logger closes it as well.
pub struct AsyncLogger {
    max_level: AtomicU8,
    state: AtomicU8,
    sender: RwLock<Option<Sender<LogRecord>>>,
    worker: Mutex<Option<LogWorker>>,
    worker_thread: ThreadId,
}

impl AsyncLogger {
    /// Starts a logger on `sink` with the configured queue capacity.
    pub fn new<W: LogSink + 'static>(sink: W, max_level: Level) -> Self {
        Self::spawn(sink, max_level, SDRLOG_CONFIG.queue_capacity(), None)
    }

    /// Starts a logger on `stdout` or on the file named by `selector`, at level `Info`.
    pub fn open(selector: &str) -> Result<Self, LogError> {
        Ok(Self::new(TargetSink::open(selector)?, Level::Info))
    }

    pub(crate) fn spawn<W: LogSink + 'static>(
        sink: W,
        max_level: Level,
        capacity: usize,
        on_failure: Option<WriteFailureHook>,
    ) -> Self {
        let (sender, worker) = spawn_log_thread(sink, capacity, on_failure);
        let worker_thread = worker.thread_id();
        Self {
            max_level: AtomicU8::new(max_level.code()),
            state: AtomicU8::new(OPEN),
            sender: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            worker_thread,
        }
    }

    pub fn max_level(&self) -> Level {
        Level::from_code(self.max_level.load(Ordering::Acquire)).unwrap_or(Level::Info)
    }

    /// Changes the level for every record submitted from now on, then
    /// announces the change at `Info`. The announcement goes through the new
    /// level, so it is suppressed when that level is below `Info`.
    ///
    /// A closed logger keeps its level and returns [`LogError::Closed`].
    pub fn set_max_level(&self, level: Level) -> Result<(), LogError> {
        if !self.is_open() {
            return Err(LogError::Closed);
        }
        self.max_level.store(level.code(), Ordering::Release);
        self.log_fmt(
            Level::Info,
            format_args!("Setting max logging level to '{level}'\n"),
        )
    }

    pub fn enabled(&self, level: Level) -> bool {
        should_log(self.max_level(), level)
    }

    pub fn state(&self) -> LoggerState {
        match self.state.load(Ordering::Acquire) {
            OPEN => LoggerState::Open,
            CLOSING => LoggerState::Closing,
            _ => LoggerState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == LoggerState::Open
    }

    /// Queues `text` if `level` passes the current max level.
    ///
    /// Blocks while the queue is full. Fails with [`LogError::Closed`] once
    /// `close()` has started, whether or not the level would pass.
    pub fn log(&self, level: Level, text: impl Into<String>) -> Result<(), LogError> {
        if !self.is_open() {
            return Err(LogError::Closed);
        }
        if !self.enabled(level) {
            return Ok(());
        }
        self.enqueue(LogRecord::new(level, text))
    }

    /// Like [`log`](Self::log), but only renders `args` when the level passes.
    /// Rendering happens on the calling thread.
    pub fn log_fmt(&self, level: Level, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        if !self.is_open() {
            return Err(LogError::Closed);
        }
        if !self.enabled(level) {
            return Ok(());
        }
        self.enqueue(LogRecord::new(level, args.to_string()))
    }

    fn enqueue(&self, record: LogRecord) -> Result<(), LogError> {
        if thread::current().id() == self.worker_thread {
            return self.enqueue_from_worker(record);
        }
        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            // The receiver only goes away before close() if the worker died.
            Some(sender) => sender
                .send(record)
                .map_err(|_| LogError::WorkerPanicked),
            None => Err(LogError::Closed),
        }
    }

    /// The worker is the only consumer, so it must never block on the queue
    /// or on the sender lock (`close()` may be waiting for it).
    fn enqueue_from_worker(&self, record: LogRecord) -> Result<(), LogError> {
        let sender = match self.sender.try_read() {
            Ok(sender) => sender,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return self.reject_from_worker(record),
        };
        match sender.as_ref() {
            Some(sender) => match sender.try_send(record) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(record)) => self.reject_from_worker(record),
                Err(TrySendError::Disconnected(_)) => Err(LogError::WorkerPanicked),
            },
            None => Err(LogError::Closed),
        }
    }

    fn reject_from_worker(&self, record: LogRecord) -> Result<(), LogError> {
        eprintln!(
            "{} {}",
            "sdrlog: queue full, dropped record from the log worker:".yellow(),
            record.render()
        );
        Err(LogError::WorkerQueueFull)
    }

    /// Stops accepting records, waits for the worker to write everything
    /// already queued, and releases the sink. There is no timeout.
    ///
    /// Returns the worker's write failure, if it had one. Later calls are
    /// no-ops and only print a notice to stderr. Must not be called from a
    /// write-failure hook.
    pub fn close(&self) -> Result<(), LogError> {
        if self
            .state
            .compare_exchange(OPEN, CLOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            eprintln!(
                "{}",
                "sdrlog: close() called on a logger that is already closed".dimmed()
            );
            return Ok(());
        }
        // Dropping the sender disconnects the channel once in-flight sends finish.
        self.sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let result = match worker {
            Some(worker) => worker.join().map(|_| ()),
            None => Ok(()),
        };
        self.state.store(CLOSED, Ordering::Release);
        result
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        if self.is_open()
            && let Err(err) = self.close()
        {
            eprintln!("sdrlog: {err}");
        }
    }
}

impl fmt::Debug for AsyncLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLogger")
            .field("max_level", &self.max_level())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc, time::Duration};

    use sdrlog_core::MemorySink;

    use super::*;

    struct SlowSink {
        inner: MemorySink,
        delay: Duration,
    }

    impl LogSink for SlowSink {
        fn write(&mut self, line: &str) -> io::Result<()> {
            std::thread::sleep(self.delay);
            self.inner.write(line)
        }
    }

    struct FailingSink;

    impl LogSink for FailingSink {
        fn write(&mut self, _line: &str) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    fn memory_logger() -> (AsyncLogger, MemorySink) {
        let sink = MemorySink::new();
        (AsyncLogger::new(sink.clone(), Level::Info), sink)
    }

    #[test]
    fn test_unformatted_message() {
        let (logger, sink) = memory_logger();
        logger.log(Level::Error, "An error message").unwrap();
        logger.close().unwrap();
        assert_eq!(sink.contents(), "[Error]: An error message");
    }

    #[test]
    fn test_formatted_messages() {
        let (logger, sink) = memory_logger();
        logger
            .log_fmt(Level::Fatal, format_args!("Test message with variable: {}", 16))
            .unwrap();
        logger.close().unwrap();
        assert_eq!(sink.contents(), "[Fatal]: Test message with variable: 16");

        let (logger, sink) = memory_logger();
        crate::logf!(logger, Level::Info, "Test msg with two variables: {}, {}", 4, "str").unwrap();
        logger.close().unwrap();
        assert_eq!(sink.contents(), "[Info]: Test msg with two variables: 4, str");
    }

    #[test]
    fn test_default_level_filters_debug() {
        let (logger, sink) = memory_logger();
        assert_eq!(logger.max_level(), Level::Info);
        logger.log(Level::Info, "Info message 1").unwrap();
        logger.log(Level::Debug, "Debug message 1").unwrap();
        crate::logf!(logger, Level::Debug, "Debug message {}", 2).unwrap();
        logger.close().unwrap();
        assert_eq!(sink.contents(), "[Info]: Info message 1");
    }

    #[test]
    fn test_set_max_level() {
        let (logger, sink) = memory_logger();
        logger.log(Level::Info, "Info message 1").unwrap();
        logger.set_max_level(Level::Error).unwrap();
        logger.log(Level::Info, "Info message 4").unwrap();
        crate::logf!(logger, Level::Error, "Error message {}", 1).unwrap();
        logger.log(Level::Fatal, "Fatal message").unwrap();
        logger.close().unwrap();
        assert_eq!(
            sink.contents(),
            "[Info]: Info message 1[Error]: Error message 1[Fatal]: Fatal message"
        );
    }

    #[test]
    fn test_set_max_level_announces_change() {
        let (logger, sink) = memory_logger();
        logger.set_max_level(Level::Debug).unwrap();
        logger.log(Level::Debug, "now visible").unwrap();
        logger.close().unwrap();
        assert_eq!(
            sink.contents(),
            "[Info]: Setting max logging level to 'Debug'\n[Debug]: now visible"
        );
    }

    #[test]
    fn test_level_change_is_not_retroactive() {
        let sink = MemorySink::new();
        let logger = AsyncLogger::spawn(
            SlowSink {
                inner: sink.clone(),
                delay: Duration::from_millis(5),
            },
            Level::Debug,
            16,
            None,
        );
        logger.log(Level::Debug, "queued before;").unwrap();
        logger.set_max_level(Level::Fatal).unwrap();
        logger.log(Level::Debug, "submitted after;").unwrap();
        logger.close().unwrap();
        assert_eq!(sink.contents(), "[Debug]: queued before;");
    }

    #[test]
    fn test_close_is_idempotent() {
        let (logger, sink) = memory_logger();
        logger.log(Level::Info, "once").unwrap();
        logger.close().unwrap();
        assert_eq!(logger.state(), LoggerState::Closed);
        logger.close().unwrap();
        logger.close().unwrap();
        assert_eq!(logger.state(), LoggerState::Closed);
        assert_eq!(sink.contents(), "[Info]: once");
    }

    #[test]
    fn test_log_after_close_is_rejected() {
        let (logger, sink) = memory_logger();
        logger.close().unwrap();
        assert!(matches!(logger.log(Level::Info, "late"), Err(LogError::Closed)));
        assert!(matches!(logger.log(Level::Debug, "late"), Err(LogError::Closed)));
        assert!(matches!(
            logger.log_fmt(Level::Fatal, format_args!("late {}", 1)),
            Err(LogError::Closed)
        ));
        assert!(matches!(
            logger.set_max_level(Level::Debug),
            Err(LogError::Closed)
        ));
        assert_eq!(logger.max_level(), Level::Info);
        assert_eq!(sink.contents(), "");
    }

    #[test]
    fn test_backpressure_keeps_every_message() {
        let sink = MemorySink::new();
        let logger = AsyncLogger::spawn(
            SlowSink {
                inner: sink.clone(),
                delay: Duration::from_millis(1),
            },
            Level::Info,
            100,
            None,
        );
        for i in 0..150 {
            logger.log(Level::Info, format!("{i}\n")).unwrap();
        }
        logger.close().unwrap();
        let expected: String = (0..150).map(|i| format!("[Info]: {i}\n")).collect();
        assert_eq!(sink.contents(), expected);
    }

    #[test]
    fn test_write_failure_is_reported_on_close() {
        let logger = AsyncLogger::spawn(FailingSink, Level::Info, 4, None);
        for i in 0..10 {
            logger.log(Level::Info, format!("{i}")).unwrap();
        }
        match logger.close() {
            Err(LogError::Write { dropped, .. }) => assert_eq!(dropped, 10),
            other => panic!("expected write failure, got {other:?}"),
        }
        assert_eq!(logger.state(), LoggerState::Closed);
        logger.close().unwrap();
    }

    #[test]
    fn test_drop_closes_logger() {
        let sink = MemorySink::new();
        let logger = Arc::new(AsyncLogger::new(sink.clone(), Level::Info));
        let other = Arc::clone(&logger);
        std::thread::spawn(move || other.log(Level::Info, "from thread").unwrap())
            .join()
            .unwrap();
        drop(logger);
        assert_eq!(sink.contents(), "[Info]: from thread");
    }
}
