use std::{
    io,
    thread::{JoinHandle, ThreadId},
};

use colored::Colorize;
use crossbeam_channel::{Sender, bounded};

use crate::{error::LogError, level::Level, sink::LogSink};

/// A message accepted for output. Built on the caller's thread with its text
/// already formatted, consumed once by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub text: String,
}

impl LogRecord {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Line handed to the sink. No newline is appended.
    pub fn render(&self) -> String {
        format!("[{}]: {}", self.level.name(), self.text)
    }
}

/// Called on the worker thread when the sink fails to write.
pub type WriteFailureHook = Box<dyn Fn(&io::Error) + Send + 'static>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub written: u64,
    pub dropped: u64,
}

/// Handle on the background thread draining the queue.
pub struct LogWorker {
    handle: JoinHandle<Result<WorkerReport, LogError>>,
}

impl LogWorker {
    /// Waits for the worker to drain the queue and exit. Only returns once
    /// every sender has been dropped.
    pub fn join(self) -> Result<WorkerReport, LogError> {
        self.handle.join().map_err(|_| LogError::WorkerPanicked)?
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Id of the worker thread, which also runs the write-failure hook.
    pub fn thread_id(&self) -> ThreadId {
        self.handle.thread().id()
    }
}

/// Spawns the single consumer of a queue holding at most `capacity` records.
///
/// The worker writes records in arrival order until the channel is
/// disconnected and empty, then drops the sink. After the first write
/// failure nothing more is written; remaining records are drained and
/// counted so producers never stall, and the failure is returned by
/// [`LogWorker::join`].
pub fn spawn_log_thread<W: LogSink + 'static>(
    mut writer: W,
    capacity: usize,
    on_failure: Option<WriteFailureHook>,
) -> (Sender<LogRecord>, LogWorker) {
    let (sender, receiver) = bounded::<LogRecord>(capacity.max(1));
    let handle = std::thread::spawn(move || {
        let mut report = WorkerReport::default();
        let mut failure: Option<io::Error> = None;
        for record in receiver.iter() {
            if failure.is_some() {
                report.dropped += 1;
                continue;
            }
            match writer.write(&record.render()) {
                Ok(()) => report.written += 1,
                Err(err) => {
                    eprintln!("{} {err}", "sdrlog: log sink write failed:".red().bold());
                    if let Some(hook) = &on_failure {
                        hook(&err);
                    }
                    report.dropped += 1;
                    failure = Some(err);
                }
            }
        }
        drop(writer);
        match failure {
            Some(source) => Err(LogError::Write {
                source,
                dropped: report.dropped,
            }),
            None => Ok(report),
        }
    });
    (sender, LogWorker { handle })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::sink::MemorySink;

    struct BrokenSink {
        accept: usize,
    }

    impl LogSink for BrokenSink {
        fn write(&mut self, _line: &str) -> io::Result<()> {
            if self.accept == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink gone"));
            }
            self.accept -= 1;
            Ok(())
        }
    }

    #[test]
    fn test_render() {
        let record = LogRecord::new(Level::Error, "An error message");
        assert_eq!(record.render(), "[Error]: An error message");
        let record = LogRecord::new(Level::Info, "with newline\n");
        assert_eq!(record.render(), "[Info]: with newline\n");
    }

    #[test]
    fn test_worker_drains_in_order() {
        let sink = MemorySink::new();
        let (sender, worker) = spawn_log_thread(sink.clone(), 4, None);
        for i in 0..20 {
            sender.send(LogRecord::new(Level::Info, format!("{i};"))).unwrap();
        }
        drop(sender);
        let report = worker.join().unwrap();
        assert_eq!(report, WorkerReport { written: 20, dropped: 0 });
        let expected: String = (0..20).map(|i| format!("[Info]: {i};")).collect();
        assert_eq!(sink.contents(), expected);
    }

    #[test]
    fn test_worker_reports_write_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = calls.clone();
        let (sender, worker) = spawn_log_thread(
            BrokenSink { accept: 2 },
            8,
            Some(Box::new(move |_: &io::Error| {
                hook_calls.fetch_add(1, Ordering::SeqCst);
            })),
        );
        for i in 0..5 {
            sender.send(LogRecord::new(Level::Error, format!("{i}"))).unwrap();
        }
        drop(sender);
        match worker.join() {
            Err(LogError::Write { source, dropped }) => {
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
                assert_eq!(dropped, 3);
            }
            other => panic!("expected write failure, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
