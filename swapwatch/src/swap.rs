//! Discovery of the transactions that make up the phases of an atomic swap.
//!
//! Ledgers don't know that a transaction is part of a swap. Each phase is
//! recognized by the instruction embedded in the transaction's payload and,
//! for initiation and claim, by checking the payload against the parameters
//! both parties agreed on.

use crate::{
    asset::Quantity,
    btsieve::{self, AddressHistory, TransactionsByRef},
    transaction, Secret, SecretHash,
};
use num::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The phase of a swap; also the tag of the instruction that performs it.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Initiate,
    Claim,
    Refund,
}

/// Absolute expiry of a swap, a timestamp or a block height depending on the
/// ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Quantity", into = "Quantity")]
pub struct Expiry(BigUint);

impl From<BigUint> for Expiry {
    fn from(int: BigUint) -> Self {
        Expiry(int)
    }
}

impl From<u64> for Expiry {
    fn from(int: u64) -> Self {
        Expiry(BigUint::from(int))
    }
}

impl From<Quantity> for Expiry {
    fn from(quantity: Quantity) -> Self {
        Expiry(quantity.into())
    }
}

impl From<Expiry> for Quantity {
    fn from(expiry: Expiry) -> Self {
        Quantity::from(expiry.0)
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The parameters of a swap, fixed once it is initiated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params<A> {
    pub recipient_address: A,
    pub refund_address: A,
    pub secret_hash: SecretHash,
    pub value: Quantity,
    pub expiration: Expiry,
}

/// A swap instruction as found in a transaction payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "instruction", rename_all = "lowercase")]
pub enum Instruction<A> {
    Initiate(Initiate<A>),
    Claim(Claim),
    Refund,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiate<A> {
    pub buyer: A,
    pub seller: A,
    pub secret_hash: SecretHash,
    pub value: Quantity,
    pub expiration: Expiry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub secret: Secret,
}

impl<A> Instruction<A> {
    pub fn phase(&self) -> Phase {
        match self {
            Instruction::Initiate(_) => Phase::Initiate,
            Instruction::Claim(_) => Phase::Claim,
            Instruction::Refund => Phase::Refund,
        }
    }

    pub fn secret(&self) -> Option<Secret> {
        match self {
            Instruction::Claim(claim) => Some(claim.secret),
            _ => None,
        }
    }
}

/// Access to the swap-relevant parts of a chain-specific transaction payload.
///
/// Only ledgers that embed an instruction in the transaction implement this,
/// see [`program::Transaction`](crate::program::Transaction). On UTXO ledgers
/// a swap is a script-locked output and carries no instruction, so
/// [`bitcoin::Transaction`](crate::bitcoin::Transaction) is not matched here;
/// the secret of a claim is recovered with
/// [`find_secret`](crate::bitcoin::Transaction::find_secret) instead.
pub trait SwapPayload {
    type Address;

    fn instruction(&self) -> Option<&Instruction<Self::Address>>;

    /// The account whose history holds the claim and refund of the swap
    /// initiated by this transaction.
    fn swap_account(&self) -> Option<&Self::Address>;
}

/// A transaction that performed a phase of a swap.
///
/// `phase` always equals the tag of the instruction in the transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Event<R> {
    pub phase: Phase,
    pub transaction: transaction::Transaction<R>,
    /// The secret revealed by a claim.
    pub secret: Option<Secret>,
}

pub type Validation<A> = fn(&Params<A>, &Instruction<A>) -> bool;

/// Whether `instruction` initiates exactly the swap described by `params`.
pub fn initiate_matches<A>(params: &Params<A>, instruction: &Instruction<A>) -> bool
where
    A: PartialEq,
{
    match instruction {
        Instruction::Initiate(initiate) => {
            initiate.buyer == params.recipient_address
                && initiate.seller == params.refund_address
                && initiate.secret_hash == params.secret_hash
                && initiate.value == params.value
                && initiate.expiration == params.expiration
        }
        _ => false,
    }
}

/// Whether `instruction` claims the swap described by `params`, i.e. reveals
/// the preimage of its secret hash.
pub fn claim_matches<A>(params: &Params<A>, instruction: &Instruction<A>) -> bool {
    match instruction {
        Instruction::Claim(claim) => validate_secret(&params.secret_hash, &claim.secret),
        _ => false,
    }
}

pub fn validate_secret(secret_hash: &SecretHash, secret: &Secret) -> bool {
    SecretHash::new(*secret) == *secret_hash
}

#[derive(Debug, thiserror::Error)]
#[error("transaction {0} is not yet available")]
pub struct PendingTransaction(pub String);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransaction),
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

/// Scans the history of `address` for the transaction performing `phase` of
/// the swap described by `params`.
///
/// The history is scanned in the order the connector returns it and the first
/// match wins. A transaction matches if its instruction is tagged with `phase`
/// and, except for refunds, `validation` accepts it. Refunds are enforced by
/// the program on-chain, their tag is enough.
///
/// The history is fetched in batches of at most `batch_size` transactions, see
/// [`Settings::history_batch_size`](crate::config::Settings).
#[tracing::instrument(level = "debug", skip(connector, address, params, validation))]
pub async fn find_swap_event<C, A, R, T>(
    connector: &C,
    address: &A,
    params: &Params<A>,
    phase: Phase,
    validation: Option<Validation<A>>,
    batch_size: usize,
) -> Result<Option<Event<T>>, Error>
where
    C: AddressHistory<Address = A, TransactionRef = R>
        + TransactionsByRef<TransactionRef = R, Transaction = transaction::Transaction<T>>,
    A: Send + Sync,
    R: Clone + Send + Sync,
    T: SwapPayload<Address = A> + Send,
{
    let sieve = |transaction: &transaction::Transaction<T>| -> Option<Option<Secret>> {
        let instruction = transaction.raw.instruction()?;
        if instruction.phase() != phase {
            return None;
        }

        match validation {
            Some(validation) if phase != Phase::Refund && !validation(params, instruction) => {
                tracing::trace!("{} transaction {} does not match", phase, transaction.hash);
                None
            }
            _ => Some(instruction.secret()),
        }
    };

    let event = btsieve::matching_transaction(connector, address, batch_size, sieve)
        .await?
        .map(|(transaction, secret)| Event {
            phase,
            transaction,
            secret,
        });

    match &event {
        Some(event) => tracing::debug!("found {} transaction {}", phase, event.transaction.hash),
        None => tracing::debug!("no {} transaction found", phase),
    }

    Ok(event)
}

/// Finds the transaction initiating the swap in the history of the refund
/// address, i.e. the initiator.
#[tracing::instrument(level = "debug", skip(connector, params))]
pub async fn find_initiate<C, A, R, T>(
    connector: &C,
    params: &Params<A>,
    batch_size: usize,
) -> Result<Option<Event<T>>, Error>
where
    C: AddressHistory<Address = A, TransactionRef = R>
        + TransactionsByRef<TransactionRef = R, Transaction = transaction::Transaction<T>>,
    A: PartialEq + Send + Sync,
    R: Clone + Send + Sync,
    T: SwapPayload<Address = A> + Send,
{
    find_swap_event(
        connector,
        &params.refund_address,
        params,
        Phase::Initiate,
        Some(initiate_matches as Validation<A>),
        batch_size,
    )
    .await
}

/// Finds the transaction claiming the swap started by `initiation`.
///
/// Fails with [`PendingTransaction`] if the initiation is not available yet.
#[tracing::instrument(level = "debug", skip(connector, params, initiation), fields(initiation = %initiation))]
pub async fn find_claim<C, A, R, T>(
    connector: &C,
    params: &Params<A>,
    initiation: &R,
    batch_size: usize,
) -> Result<Option<Event<T>>, Error>
where
    C: AddressHistory<Address = A, TransactionRef = R>
        + TransactionsByRef<TransactionRef = R, Transaction = transaction::Transaction<T>>,
    A: Clone + Send + Sync,
    R: Clone + fmt::Display + Send + Sync,
    T: SwapPayload<Address = A> + Send,
{
    let swap_account = swap_account(connector, initiation).await?;

    find_swap_event(
        connector,
        &swap_account,
        params,
        Phase::Claim,
        Some(claim_matches as Validation<A>),
        batch_size,
    )
    .await
}

/// Finds the transaction refunding the swap started by `initiation`.
///
/// Fails with [`PendingTransaction`] if the initiation is not available yet.
#[tracing::instrument(level = "debug", skip(connector, params, initiation), fields(initiation = %initiation))]
pub async fn find_refund<C, A, R, T>(
    connector: &C,
    params: &Params<A>,
    initiation: &R,
    batch_size: usize,
) -> Result<Option<Event<T>>, Error>
where
    C: AddressHistory<Address = A, TransactionRef = R>
        + TransactionsByRef<TransactionRef = R, Transaction = transaction::Transaction<T>>,
    A: Clone + Send + Sync,
    R: Clone + fmt::Display + Send + Sync,
    T: SwapPayload<Address = A> + Send,
{
    let swap_account = swap_account(connector, initiation).await?;

    find_swap_event(
        connector,
        &swap_account,
        params,
        Phase::Refund,
        None,
        batch_size,
    )
    .await
}

async fn swap_account<C, A, R, T>(connector: &C, initiation: &R) -> Result<A, Error>
where
    C: TransactionsByRef<TransactionRef = R, Transaction = transaction::Transaction<T>>,
    A: Clone,
    R: Clone + fmt::Display + Send + Sync,
    T: SwapPayload<Address = A> + Send,
{
    let initiation_transactions = connector
        .transactions_by_ref(std::slice::from_ref(initiation))
        .await?;

    let swap_account = initiation_transactions
        .first()
        .and_then(|transaction| transaction.raw.swap_account())
        .cloned()
        .ok_or_else(|| PendingTransaction(initiation.to_string()))?;

    Ok(swap_account)
}
