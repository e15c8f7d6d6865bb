//! This module is the home of the bitcoin funding-transaction primitives.
//!
//! This involves:
//!     - Estimating fees from input and output counts
//!     - Selecting coins for a set of payment targets
//!     - Decoding raw transactions into a canonical, serializable record
//!     - Serializing witness stacks

mod coin_selection;
mod fee;
mod transaction;
mod witness;

pub use self::{
    coin_selection::{dust_threshold, select_coins, InsufficientFunds, Selection, Target, Utxo},
    fee::{estimate as estimate_fee, InvalidFeeRate, SatPerVbyte, INPUT_SIZE, OUTPUT_SIZE, OVERHEAD},
    transaction::{
        decode, DecodeError, Input, OutPoint, Output, ScriptPubKey, ScriptSig, ScriptType,
        Transaction,
    },
    witness::serialize as serialize_witness,
};
pub use ::bitcoin::{Address, Network, Txid, Wtxid};
