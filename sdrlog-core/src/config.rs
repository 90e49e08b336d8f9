use std::sync::LazyLock;

use derive_from_env::FromEnv;

use crate::level::Level;

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(FromEnv, Debug)]
#[from_env(prefix = "SDRLOG")]
#[allow(non_snake_case)]
pub struct SdrLogConfig {
    #[from_env(default = "100")]
    pub QUEUE_CAPACITY: usize,
    #[from_env(default = "Info")]
    pub LEVEL: String,
}

impl Default for SdrLogConfig {
    fn default() -> Self {
        Self {
            QUEUE_CAPACITY: DEFAULT_QUEUE_CAPACITY,
            LEVEL: Level::Info.name().to_string(),
        }
    }
}

impl SdrLogConfig {
    /// Configured default level; an unparsable `SDRLOG_LEVEL` means `Info`.
    pub fn level(&self) -> Level {
        self.LEVEL.parse().unwrap_or(Level::Info)
    }

    /// Configured queue capacity, never zero.
    pub fn queue_capacity(&self) -> usize {
        self.QUEUE_CAPACITY.max(1)
    }
}

pub static SDRLOG_CONFIG: LazyLock<SdrLogConfig> =
    LazyLock::new(|| SdrLogConfig::from_env().unwrap_or_default());
