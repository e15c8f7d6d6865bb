use crate::asset;
use std::{convert::TryFrom, fmt};

/// Approximate serialized size of a signed pay-to-public-key-hash input.
pub const INPUT_SIZE: u64 = 148;
/// Approximate serialized size of an output.
pub const OUTPUT_SIZE: u64 = 34;
/// Version, locktime and the input/output counts.
pub const OVERHEAD: u64 = 10;

/// Estimates the fee of a transaction with the given number of inputs and
/// outputs.
///
/// The sizes are estimates, not exact serialized sizes. Callers validate
/// their arguments, this function does not.
pub fn estimate(inputs: usize, outputs: usize, sats_per_byte: u64) -> asset::Bitcoin {
    let bytes = (inputs as u64)
        .saturating_mul(INPUT_SIZE)
        .saturating_add((outputs as u64).saturating_mul(OUTPUT_SIZE))
        .saturating_add(OVERHEAD);

    asset::Bitcoin::from_sat(bytes.saturating_mul(sats_per_byte))
}

/// A fee rate in satoshi per virtual byte, possibly fractional.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct SatPerVbyte(f64);

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[error("fee rate must be a finite, non-negative number but was {0}")]
pub struct InvalidFeeRate(pub f64);

impl SatPerVbyte {
    pub fn new(rate: f64) -> Result<Self, InvalidFeeRate> {
        if !rate.is_finite() || rate.is_sign_negative() {
            return Err(InvalidFeeRate(rate));
        }

        Ok(Self(rate))
    }

    /// The rate rounded up to the next whole satoshi, as used for byte-cost
    /// arithmetic.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn round_up(self) -> u64 {
        // non-negative and finite by construction; saturates above u64::MAX
        self.0.ceil() as u64
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for SatPerVbyte {
    type Error = InvalidFeeRate;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<u64> for SatPerVbyte {
    #[allow(clippy::cast_precision_loss)]
    fn from(sats: u64) -> Self {
        Self(sats as f64)
    }
}

impl fmt::Display for SatPerVbyte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat/vB", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use spectral::prelude::*;

    #[test]
    fn one_input_two_outputs_at_one_sat_per_byte() {
        let fee = estimate(1, 2, 1);

        assert_eq!(fee, asset::Bitcoin::from_sat(226));
    }

    #[test]
    fn fractional_rates_round_up() {
        let rate = SatPerVbyte::new(1.2).unwrap();

        assert_eq!(rate.round_up(), 2);
        assert_eq!(SatPerVbyte::new(3.0).unwrap().round_up(), 3);
    }

    #[test]
    fn rejects_negative_and_nan_rates() {
        assert_that(&SatPerVbyte::new(-1.0)).is_err();
        assert_that(&SatPerVbyte::new(f64::NAN)).is_err();
        assert_that(&SatPerVbyte::new(f64::INFINITY)).is_err();
        assert_that(&SatPerVbyte::new(0.0)).is_ok();
    }

    proptest! {
        #[test]
        fn fee_follows_the_sizing_model(
            inputs in 0usize..1_000,
            outputs in 0usize..1_000,
            rate in 0.001f64..10_000.0,
        ) {
            let rate = SatPerVbyte::new(rate).unwrap();

            let fee = estimate(inputs, outputs, rate.round_up());

            let expected = (148 * inputs as u64 + 34 * outputs as u64 + 10) * rate.as_f64().ceil() as u64;
            prop_assert_eq!(fee.to_sat(), expected);
        }
    }
}
