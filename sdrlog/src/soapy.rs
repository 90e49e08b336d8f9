use std::sync::Arc;

use sdrlog_core::{Level, LogError};

use crate::AsyncLogger;

/// Log levels reported by the SoapySDR hardware library through its log
/// handler callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum SoapyLevel {
    Fatal = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
    Trace = 8,
    Ssi = 9,
}

impl SoapyLevel {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => SoapyLevel::Fatal,
            2 => SoapyLevel::Critical,
            3 => SoapyLevel::Error,
            4 => SoapyLevel::Warning,
            5 => SoapyLevel::Notice,
            6 => SoapyLevel::Info,
            7 => SoapyLevel::Debug,
            8 => SoapyLevel::Trace,
            9 => SoapyLevel::Ssi,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            SoapyLevel::Fatal => "Fatal",
            SoapyLevel::Critical => "Critical",
            SoapyLevel::Error => "Error",
            SoapyLevel::Warning => "Warning",
            SoapyLevel::Notice => "Notice",
            SoapyLevel::Info => "Info",
            SoapyLevel::Debug => "Debug",
            SoapyLevel::Trace => "Trace",
            SoapyLevel::Ssi => "SSI",
        }
    }

    /// Collapses the vendor scale onto the four logger levels.
    pub fn level(self) -> Level {
        match self {
            SoapyLevel::Fatal | SoapyLevel::Critical => Level::Fatal,
            SoapyLevel::Error | SoapyLevel::Warning => Level::Error,
            SoapyLevel::Notice | SoapyLevel::Info => Level::Info,
            SoapyLevel::Debug | SoapyLevel::Trace | SoapyLevel::Ssi => Level::Debug,
        }
    }
}

pub fn soapy_level_name(code: i32) -> &'static str {
    SoapyLevel::from_code(code).map_or("Unknown", SoapyLevel::name)
}

/// Forwards vendor library log callbacks into an [`AsyncLogger`].
#[derive(Debug, Clone)]
pub struct SoapyBridge {
    logger: Arc<AsyncLogger>,
}

impl SoapyBridge {
    pub fn new(logger: Arc<AsyncLogger>) -> Self {
        Self { logger }
    }

    /// Logs `message` as `[<vendor level>] <message>`. Unknown codes are
    /// logged at `Info`.
    pub fn handle(&self, code: i32, message: &str) -> Result<(), LogError> {
        let level = SoapyLevel::from_code(code).map_or(Level::Info, SoapyLevel::level);
        self.logger.log_fmt(
            level,
            format_args!("[{}] {message}\n", soapy_level_name(code)),
        )
    }
}
