use async_trait::async_trait;
use std::{collections::HashMap, sync::Mutex, time::Duration};
use swapwatch::{
    btsieve::{AddressHistory, TransactionsByRef},
    transaction::Transaction,
};

/// An in-memory ledger where addresses and transaction references are plain
/// strings.
pub struct ConnectorMock<T> {
    histories: HashMap<String, Vec<String>>,
    transactions: HashMap<String, Transaction<T>>,
    requested_batches: Mutex<Vec<Vec<String>>>,
    completed_batches: Mutex<Vec<Vec<String>>>,
    latency: Option<Duration>,
    unavailable: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("connection refused")]
pub struct ConnectionRefused;

impl<T> ConnectorMock<T> {
    pub fn new() -> Self {
        Self {
            histories: HashMap::new(),
            transactions: HashMap::new(),
            requested_batches: Mutex::new(Vec::new()),
            completed_batches: Mutex::new(Vec::new()),
            latency: None,
            unavailable: false,
        }
    }

    /// Records `transactions` as the history of `address`, most recent first.
    pub fn with_history(mut self, address: &str, transactions: Vec<Transaction<T>>) -> Self {
        let history = transactions
            .into_iter()
            .map(|transaction| {
                let reference = transaction.hash.clone();
                self.transactions.insert(reference.clone(), transaction);
                reference
            })
            .collect();
        self.histories.insert(address.to_owned(), history);

        self
    }

    /// Every request fails as if the node could not be reached.
    pub fn unavailable(self) -> Self {
        Self {
            unavailable: true,
            ..self
        }
    }

    /// The n-th request takes `latency / n` to answer, so later requests
    /// complete before earlier ones.
    pub fn with_latency(self, latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..self
        }
    }

    pub fn completed_batches(&self) -> Vec<Vec<String>> {
        self.completed_batches
            .lock()
            .expect("mutex is not poisoned")
            .clone()
    }

    pub fn requested_batches(&self) -> Vec<Vec<String>> {
        self.requested_batches
            .lock()
            .expect("mutex is not poisoned")
            .clone()
    }
}

#[async_trait]
impl<T> AddressHistory for ConnectorMock<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Address = String;
    type TransactionRef = String;

    async fn address_history(&self, address: &String) -> anyhow::Result<Vec<String>> {
        if self.unavailable {
            return Err(ConnectionRefused.into());
        }

        Ok(self.histories.get(address).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl<T> TransactionsByRef for ConnectorMock<T>
where
    T: Clone + Send + Sync + 'static,
{
    type TransactionRef = String;
    type Transaction = Transaction<T>;

    async fn transactions_by_ref(
        &self,
        references: &[String],
    ) -> anyhow::Result<Vec<Transaction<T>>> {
        if self.unavailable {
            return Err(ConnectionRefused.into());
        }

        let request = {
            let mut requested_batches = self
                .requested_batches
                .lock()
                .expect("mutex is not poisoned");
            requested_batches.push(references.to_vec());
            requested_batches.len()
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency / request as u32).await;
        }

        self.completed_batches
            .lock()
            .expect("mutex is not poisoned")
            .push(references.to_vec());

        Ok(references
            .iter()
            .filter_map(|reference| self.transactions.get(reference).cloned())
            .collect())
    }
}
