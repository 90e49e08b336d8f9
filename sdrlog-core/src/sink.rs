use std::{
    fs::File,
    io::{self, Write},
    path::Path,
    sync::{Arc, Mutex},
};

use crate::error::LogError;

/// Destination for fully rendered log lines.
///
/// Each call must append exactly `line` to the destination, in call order.
/// Implementations do no buffering of their own.
pub trait LogSink: Send {
    fn write(&mut self, line: &str) -> io::Result<()>;
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn write(&mut self, line: &str) -> io::Result<()> {
        (**self).write(line)
    }
}

/// Log file, created or truncated on construction and closed when dropped.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, LogError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }
}

impl LogSink for FileSink {
    fn write(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())
    }
}

#[derive(Default, Debug)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&mut self, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.flush()
    }
}

/// In-memory sink. Clones share the same buffer, so a test can keep one
/// clone and hand the other to the logger.
#[derive(Default, Debug, Clone)]
pub struct MemorySink {
    buffer: Arc<Mutex<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.buffer.lock() {
            Ok(buffer) => buffer.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemorySink {
    fn write(&mut self, line: &str) -> io::Result<()> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("memory sink buffer poisoned"))?
            .push_str(line);
        Ok(())
    }
}

/// Sink chosen from a selector string: `stdout` (any case) or a file path.
#[derive(Debug)]
pub enum TargetSink {
    Stdout(StdoutSink),
    File(FileSink),
}

impl TargetSink {
    pub fn open(selector: &str) -> Result<Self, LogError> {
        if selector.eq_ignore_ascii_case("stdout") {
            Ok(TargetSink::Stdout(StdoutSink))
        } else {
            Ok(TargetSink::File(FileSink::new(selector)?))
        }
    }
}

impl LogSink for TargetSink {
    fn write(&mut self, line: &str) -> io::Result<()> {
        match self {
            TargetSink::Stdout(w) => w.write(line),
            TargetSink::File(w) => w.write(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sdrlog_test_{name}.log"))
    }

    #[test]
    fn test_file_sink_truncates() {
        let path = temp_path("file_sink_truncates");
        std::fs::write(&path, "stale content\n").unwrap();
        let mut sink = FileSink::new(&path).unwrap();
        sink.write("[Info]: first\n").unwrap();
        sink.write("[Error]: second").unwrap();
        drop(sink);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[Info]: first\n[Error]: second"
        );
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_sink_bad_path() {
        let path = std::env::temp_dir()
            .join("sdrlog_missing_dir")
            .join("nested")
            .join("out.log");
        match FileSink::new(&path) {
            Err(LogError::Open { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected open failure, got {other:?}"),
        }
    }

    #[test]
    fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.write("a").unwrap();
        writer.write("b").unwrap();
        assert_eq!(sink.contents(), "ab");
    }

    #[test]
    fn test_target_selector() {
        assert!(matches!(
            TargetSink::open("StdOut").unwrap(),
            TargetSink::Stdout(_)
        ));
        let path = temp_path("target_selector");
        let target = TargetSink::open(path.to_str().unwrap()).unwrap();
        assert!(matches!(target, TargetSink::File(_)));
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }
}
