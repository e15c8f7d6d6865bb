use async_trait::async_trait;
use futures::future;

/// Upper bound of transaction references per bulk-fetch request.
pub const HISTORY_BATCH_SIZE: usize = 100;

#[async_trait]
pub trait AddressHistory: Send + Sync + 'static {
    type Address: Send + Sync;
    type TransactionRef: Send + Sync;

    /// All transactions that touched `address`, most recent first.
    async fn address_history(
        &self,
        address: &Self::Address,
    ) -> anyhow::Result<Vec<Self::TransactionRef>>;
}

#[async_trait]
pub trait TransactionsByRef: Send + Sync + 'static {
    type TransactionRef: Send + Sync;
    type Transaction: Send;

    /// Fetches the parsed and confirmed transactions for the given references.
    ///
    /// References that cannot be found are left out of the result.
    async fn transactions_by_ref(
        &self,
        references: &[Self::TransactionRef],
    ) -> anyhow::Result<Vec<Self::Transaction>>;
}

/// Splits `history` into consecutive batches of at most `size` references,
/// preserving the order.
///
/// A `size` of zero is treated as one.
pub fn batch<T>(history: &[T], size: usize) -> Vec<Vec<T>>
where
    T: Clone,
{
    history.chunks(size.max(1)).map(<[T]>::to_vec).collect()
}

/// Fetches all transactions of `address`.
///
/// The batches are fetched concurrently; the result is in history order
/// regardless of which fetch finished first.
#[tracing::instrument(level = "debug", skip(connector, address))]
pub async fn fetch_history<C, A, R, T>(
    connector: &C,
    address: &A,
    batch_size: usize,
) -> anyhow::Result<Vec<T>>
where
    C: AddressHistory<Address = A, TransactionRef = R>
        + TransactionsByRef<TransactionRef = R, Transaction = T>,
    A: Send + Sync,
    R: Clone + Send + Sync,
    T: Send,
{
    let history = connector.address_history(address).await?;
    let batches = batch(&history, batch_size);

    tracing::trace!(
        "fetching {} transactions in {} batches",
        history.len(),
        batches.len()
    );

    let fetched = future::try_join_all(
        batches
            .iter()
            .map(|references| connector.transactions_by_ref(references)),
    )
    .await?;

    Ok(fetched.into_iter().flatten().collect())
}

/// Returns the first transaction in the history of `address` for which `sieve`
/// returns `Some`, together with what the sieve extracted.
pub async fn matching_transaction<C, A, R, T, S, M>(
    connector: &C,
    address: &A,
    batch_size: usize,
    sieve: S,
) -> anyhow::Result<Option<(T, M)>>
where
    C: AddressHistory<Address = A, TransactionRef = R>
        + TransactionsByRef<TransactionRef = R, Transaction = T>,
    A: Send + Sync,
    R: Clone + Send + Sync,
    T: Send,
    S: Fn(&T) -> Option<M>,
{
    let transactions = fetch_history(connector, address, batch_size).await?;

    for transaction in transactions {
        if let Some(result) = sieve(&transaction) {
            return Ok(Some((transaction, result)));
        }
    }

    Ok(None)
}
