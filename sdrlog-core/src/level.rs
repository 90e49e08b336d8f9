use std::{fmt, str::FromStr};

use crate::error::LogError;

/// Severity of a log record, ordered from least to most verbose.
///
/// Codes start at 1; 0 is kept free as the "undefined" level and only ever
/// shows up through [`level_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Fatal = 1,
    Error = 2,
    Info = 3,
    Debug = 4,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Fatal, Level::Error, Level::Info, Level::Debug];

    pub fn name(self) -> &'static str {
        match self {
            Level::Fatal => "Fatal",
            Level::Error => "Error",
            Level::Info => "Info",
            Level::Debug => "Debug",
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Level::Fatal),
            2 => Some(Level::Error),
            3 => Some(Level::Info),
            4 => Some(Level::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LogError::InvalidLevel(s.to_string()))
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error | log::Level::Warn => Level::Error,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}

/// Display name for a raw level code. Codes outside the scale render as
/// `Unknown:<code>` instead of failing.
pub fn level_name(code: u8) -> String {
    match Level::from_code(code) {
        Some(level) => level.name().to_string(),
        None => format!("Unknown:{code}"),
    }
}

/// Admission rule: a message passes when it is no more verbose than `max_level`.
pub fn should_log(max_level: Level, level: Level) -> bool {
    level <= max_level
}
