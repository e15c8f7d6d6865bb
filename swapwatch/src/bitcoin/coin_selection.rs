use super::fee::{self, SatPerVbyte, INPUT_SIZE};
use crate::asset::{self, bitcoin::sats_as_string};
use bitcoin::{Address, OutPoint, Txid};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// An unspent output that can be used to fund a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: Txid,
    pub vout: u32,
    #[serde(with = "sats_as_string")]
    pub value: asset::Bitcoin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl Utxo {
    pub fn new(txid: Txid, vout: u32, value: asset::Bitcoin) -> Self {
        Self {
            txid,
            vout,
            value,
            address: None,
        }
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            vout: self.vout,
        }
    }
}

/// A payment the funding transaction has to make.
///
/// An `address` of `None` marks the change output added by [`select_coins`];
/// the caller decides where change goes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub address: Option<Address>,
    #[serde(with = "sats_as_string")]
    pub value: asset::Bitcoin,
}

impl Target {
    pub fn new(address: Address, value: asset::Bitcoin) -> Self {
        Self {
            address: Some(address),
            value,
        }
    }

    pub fn change(value: asset::Bitcoin) -> Self {
        Self {
            address: None,
            value,
        }
    }

    pub fn is_change(&self) -> bool {
        self.address.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub inputs: Vec<Utxo>,
    pub outputs: Vec<Target>,
    pub fee: asset::Bitcoin,
}

impl Selection {
    pub fn input_total(&self) -> asset::Bitcoin {
        asset::Bitcoin::from_sat(sum(&self.inputs, |utxo| utxo.value))
    }

    pub fn change(&self) -> Option<&Target> {
        self.outputs.iter().find(|output| output.is_change())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[error("insufficient funds: {required} required but only {available} available")]
pub struct InsufficientFunds {
    pub available: asset::Bitcoin,
    pub required: asset::Bitcoin,
}

/// Change below this value costs more to spend than it is worth.
pub fn dust_threshold(sats_per_byte: u64) -> asset::Bitcoin {
    asset::Bitcoin::from_sat(INPUT_SIZE.saturating_mul(sats_per_byte))
}

/// Selects inputs from `utxos` that pay for `targets` and the fee at
/// `fee_rate`.
///
/// Every UTXO in `fixed_inputs` ends up in the selection. They are spent first,
/// in the given order, and the remaining `utxos` are accumulated after them
/// until targets and fee are covered. Without fixed inputs, the selection
/// prefers few, large inputs.
///
/// A change output is appended whenever the leftover value exceeds the
/// [`dust_threshold`].
pub fn select_coins(
    utxos: &[Utxo],
    targets: &[Target],
    fee_rate: SatPerVbyte,
    fixed_inputs: &[Utxo],
) -> Result<Selection, InsufficientFunds> {
    let sats_per_byte = fee_rate.round_up();

    let selection = if fixed_inputs.is_empty() {
        size_optimizing(utxos, targets, sats_per_byte)
    } else {
        let candidates = fixed_inputs
            .iter()
            .chain(utxos.iter().filter(|utxo| {
                !fixed_inputs
                    .iter()
                    .any(|fixed| fixed.outpoint() == utxo.outpoint())
            }))
            .cloned()
            .collect::<Vec<_>>();

        accumulative(&candidates, fixed_inputs.len(), targets, sats_per_byte)
    }?;

    tracing::debug!(
        inputs = selection.inputs.len(),
        outputs = selection.outputs.len(),
        fee = selection.fee.to_sat(),
        "selected coins at {} sat/vB",
        sats_per_byte
    );

    Ok(selection)
}

/// Spends the candidates with the biggest effective value first. A pass that
/// avoids change altogether is tried before falling back to accumulating.
fn size_optimizing(
    utxos: &[Utxo],
    targets: &[Target],
    sats_per_byte: u64,
) -> Result<Selection, InsufficientFunds> {
    let input_cost = INPUT_SIZE.saturating_mul(sats_per_byte);

    let mut candidates = utxos.to_vec();
    candidates.sort_by_key(|utxo| Reverse(utxo.value.to_sat().saturating_sub(input_cost)));

    match blackjack(&candidates, targets, sats_per_byte) {
        Some(selection) => Ok(selection),
        None => accumulative(&candidates, 0, targets, sats_per_byte),
    }
}

/// Adds candidates that don't overshoot the targets by more than the dust
/// threshold, until the targets and the fee are covered.
fn blackjack(candidates: &[Utxo], targets: &[Target], sats_per_byte: u64) -> Option<Selection> {
    let target_total = sum(targets, |target| target.value);
    let threshold = dust_threshold(sats_per_byte).to_sat();

    let mut inputs = Vec::new();
    let mut input_total = 0u64;

    for utxo in candidates {
        let fee = fee::estimate(inputs.len() + 1, targets.len(), sats_per_byte).to_sat();
        let value = utxo.value.to_sat();

        let limit = target_total.saturating_add(fee).saturating_add(threshold);
        if input_total.saturating_add(value) > limit {
            continue;
        }

        inputs.push(utxo.clone());
        input_total = input_total.saturating_add(value);

        if input_total < target_total.saturating_add(fee) {
            continue;
        }

        return Some(finalize(inputs, targets, sats_per_byte));
    }

    None
}

/// Adds candidates in order until the targets and the fee for the inputs added
/// so far are covered. The first `mandatory` candidates are always added.
fn accumulative(
    candidates: &[Utxo],
    mandatory: usize,
    targets: &[Target],
    sats_per_byte: u64,
) -> Result<Selection, InsufficientFunds> {
    let target_total = sum(targets, |target| target.value);
    let input_cost = INPUT_SIZE.saturating_mul(sats_per_byte);

    let mut inputs = Vec::new();
    let mut input_total = 0u64;

    for (index, utxo) in candidates.iter().enumerate() {
        let value = utxo.value.to_sat();
        let is_mandatory = index < mandatory;

        if !is_mandatory && input_cost > value {
            tracing::trace!("skipping {} as it costs more to spend than it is worth", utxo.outpoint());
            continue;
        }

        inputs.push(utxo.clone());
        input_total = input_total.saturating_add(value);

        if index + 1 < mandatory {
            continue;
        }

        let fee = fee::estimate(inputs.len(), targets.len(), sats_per_byte).to_sat();
        if input_total < target_total.saturating_add(fee) {
            continue;
        }

        return Ok(finalize(inputs, targets, sats_per_byte));
    }

    let fee = fee::estimate(inputs.len(), targets.len(), sats_per_byte).to_sat();

    Err(InsufficientFunds {
        available: asset::Bitcoin::from_sat(sum(candidates, |utxo| utxo.value)),
        required: asset::Bitcoin::from_sat(target_total.saturating_add(fee)),
    })
}

fn finalize(inputs: Vec<Utxo>, targets: &[Target], sats_per_byte: u64) -> Selection {
    let input_total = sum(&inputs, |utxo| utxo.value);
    let target_total = sum(targets, |target| target.value);
    let mut outputs = targets.to_vec();

    let fee_with_change = fee::estimate(inputs.len(), outputs.len() + 1, sats_per_byte).to_sat();
    let required_with_change = target_total.saturating_add(fee_with_change);
    if let Some(remainder) = input_total.checked_sub(required_with_change) {
        if remainder > dust_threshold(sats_per_byte).to_sat() {
            outputs.push(Target::change(asset::Bitcoin::from_sat(remainder)));
        }
    }

    let fee = input_total.saturating_sub(sum(&outputs, |output| output.value));

    Selection {
        inputs,
        outputs,
        fee: asset::Bitcoin::from_sat(fee),
    }
}

fn sum<T>(items: &[T], value: impl Fn(&T) -> asset::Bitcoin) -> u64 {
    items
        .iter()
        .fold(0u64, |total, item| total.saturating_add(value(item).to_sat()))
}
