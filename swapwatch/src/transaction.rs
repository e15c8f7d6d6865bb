//! A chain-agnostic summary of a transaction, combining the chain-specific
//! payload with fee and confirmation data.

use crate::{
    asset::{self, Quantity},
    bitcoin,
};
use serde::{Deserialize, Serialize};

/// The block a transaction was confirmed in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub number: u64,
    /// Confirmations of the transaction at the time it was fetched.
    pub confirmations: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction<R> {
    pub hash: String,
    /// Total value of all outputs, in the smallest unit of the ledger.
    pub value: Quantity,
    pub raw: R,
    pub confirmations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Quantity>,
    /// Fee per virtual byte, rounded to the nearest integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl<R> Transaction<R> {
    /// An unconfirmed transaction with unknown fee.
    pub fn new(hash: String, value: Quantity, raw: R) -> Self {
        Self {
            hash,
            value,
            raw,
            confirmations: 0,
            fee: None,
            fee_price: None,
            block_hash: None,
            block_number: None,
        }
    }

    pub fn with_block(self, block: Block) -> Self {
        Self {
            confirmations: block.confirmations,
            block_hash: Some(block.hash),
            block_number: Some(block.number),
            ..self
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.block_hash.is_some()
    }
}

/// Summarizes a decoded bitcoin transaction.
///
/// `fee` and `block` are independent; leaving one out leaves the derived
/// fields absent.
pub fn normalize(
    transaction: bitcoin::Transaction,
    fee: Option<asset::Bitcoin>,
    block: Option<Block>,
) -> Transaction<bitcoin::Transaction> {
    let value = transaction
        .outputs
        .iter()
        .map(|output| Quantity::from(output.value.to_sat()))
        .sum();
    let fee_price = fee.and_then(|fee| rounded_div(fee.to_sat(), transaction.vsize as u64));

    let normalized = Transaction {
        fee: fee.map(|fee| Quantity::from(fee.to_sat())),
        fee_price,
        ..Transaction::new(transaction.id.to_string(), value, transaction)
    };

    match block {
        Some(block) => normalized.with_block(block),
        None => normalized,
    }
}

/// Integer division rounding halves up, `None` for a zero divisor.
fn rounded_div(dividend: u64, divisor: u64) -> Option<u64> {
    if divisor == 0 {
        return None;
    }

    let quotient = dividend / divisor;
    let remainder = dividend % divisor;

    if remainder >= divisor - remainder {
        Some(quotient + 1)
    } else {
        Some(quotient)
    }
}
