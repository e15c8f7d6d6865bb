use crate::ledger;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// This struct aims to represent the configuration file as it appears on disk.
///
/// Every section and every value is optional here. Defaults are filled in a
/// dedicated step, see [`Settings`](super::Settings).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct File {
    pub bitcoin: Option<Bitcoin>,
    pub btsieve: Option<Btsieve>,
    pub logging: Option<Logging>,
}

impl File {
    pub fn read<P: AsRef<Path>>(config_file: P) -> Result<Self, ::config::ConfigError> {
        ::config::Config::builder()
            .add_source(::config::File::from(config_file.as_ref()))
            .build()?
            .try_deserialize()
    }

    pub fn from_toml(toml: &str) -> Result<Self, ::config::ConfigError> {
        ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Bitcoin {
    pub network: Option<ledger::Bitcoin>,
    /// In satoshi per virtual byte.
    pub fee_rate: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Btsieve {
    /// Maximum number of transactions fetched per request.
    pub batch_size: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Logging {
    pub level: Option<Level>,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => tracing::Level::ERROR,
            Level::Warn => tracing::Level::WARN,
            Level::Info => tracing::Level::INFO,
            Level::Debug => tracing::Level::DEBUG,
            Level::Trace => tracing::Level::TRACE,
        }
    }
}
