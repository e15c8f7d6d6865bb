#![warn(
    unused_extern_crates,
    missing_debug_implementations,
    missing_copy_implementations,
    rust_2018_idioms,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::fallible_impl_from,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::print_stdout,
    clippy::dbg_macro
)]
#![forbid(unsafe_code)]

pub mod asset;
pub mod bitcoin;
pub mod btsieve;
pub mod config;
pub mod ledger;
pub mod poll;
pub mod program;
mod secret;
mod secret_hash;
pub mod swap;
pub mod trace;
pub mod transaction;

/// A module for exporting dependencies that appear in the public API of our
/// crate.
///
/// Types like `bitcoin::Address` and `num::BigUint` are part of the signatures
/// of the swap parameters and the funding primitives. Consumers can reach them
/// through here instead of declaring a dependency whose version would need to
/// be kept in sync with ours.
pub mod export {
    pub use ::bitcoin;
    pub use ::num;
}

pub use self::{
    secret::Secret,
    secret_hash::SecretHash,
    swap::{Event as SwapEvent, Params as SwapParams, Phase},
};
