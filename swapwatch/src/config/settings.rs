use super::file::{self, File, Level};
use crate::{
    bitcoin::SatPerVbyte,
    btsieve::HISTORY_BATCH_SIZE,
    ledger,
};
use anyhow::Context;

/// The settings as they are used throughout the code.
///
/// Contrary to [`File`], nothing is optional here: absent values from the
/// configuration file are replaced by defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub network: ledger::Bitcoin,
    pub fee_rate: SatPerVbyte,
    pub history_batch_size: usize,
    pub log_level: Level,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: ledger::Bitcoin::default(),
            fee_rate: SatPerVbyte::from(1u64),
            history_batch_size: HISTORY_BATCH_SIZE,
            log_level: Level::Info,
        }
    }
}

impl Settings {
    pub fn from_config_file_and_defaults(config_file: File) -> anyhow::Result<Self> {
        let File {
            bitcoin,
            btsieve,
            logging,
        } = config_file;
        let defaults = Settings::default();

        let file::Bitcoin { network, fee_rate } = bitcoin.unwrap_or_default();
        let fee_rate = match fee_rate {
            Some(rate) => SatPerVbyte::new(rate).context("invalid bitcoin fee rate")?,
            None => defaults.fee_rate,
        };

        let history_batch_size = btsieve
            .and_then(|btsieve| btsieve.batch_size)
            .unwrap_or(defaults.history_batch_size);
        if history_batch_size == 0 {
            anyhow::bail!("btsieve batch size must be at least 1");
        }

        Ok(Self {
            network: network.unwrap_or(defaults.network),
            fee_rate,
            history_batch_size,
            log_level: logging
                .and_then(|logging| logging.level)
                .unwrap_or(defaults.log_level),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectral::prelude::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::from_config_file_and_defaults(File::default());

        assert_that(&settings).is_ok().is_equal_to(Settings {
            network: ledger::Bitcoin::Regtest,
            fee_rate: SatPerVbyte::from(1u64),
            history_batch_size: 100,
            log_level: Level::Info,
        });
    }

    #[test]
    fn values_from_file_take_precedence() {
        let file = File {
            bitcoin: Some(file::Bitcoin {
                network: Some(ledger::Bitcoin::Mainnet),
                fee_rate: Some(12.5),
            }),
            btsieve: Some(file::Btsieve {
                batch_size: Some(20),
            }),
            logging: None,
        };

        let settings = Settings::from_config_file_and_defaults(file).unwrap();

        assert_eq!(settings.network, ledger::Bitcoin::Mainnet);
        assert_eq!(settings.fee_rate.round_up(), 13);
        assert_eq!(settings.history_batch_size, 20);
        assert_eq!(settings.log_level, Level::Info);
    }

    #[test]
    fn negative_fee_rate_is_rejected() {
        let file = File {
            bitcoin: Some(file::Bitcoin {
                network: None,
                fee_rate: Some(-1.0),
            }),
            ..File::default()
        };

        assert_that(&Settings::from_config_file_and_defaults(file)).is_err();
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let file = File {
            btsieve: Some(file::Btsieve {
                batch_size: Some(0),
            }),
            ..File::default()
        };

        assert_that(&Settings::from_config_file_and_defaults(file)).is_err();
    }
}
