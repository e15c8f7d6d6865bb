//! Waiting for something to show up on a ledger, e.g. a counterparty's
//! transaction, without busy-looping and with a way out.

use futures::{
    future::{self, Either},
    pin_mut,
};
use std::{future::Future, time::Duration};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
        }
    }
}

impl Backoff {
    /// Doubles `current`, capped at `max`.
    pub fn next(&self, current: Duration) -> Duration {
        current
            .checked_mul(2)
            .map_or(self.max, |doubled| doubled.min(self.max))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("polling was cancelled")]
pub struct Cancelled;

/// Runs `check` until it yields a value, sleeping between attempts with
/// exponential backoff.
///
/// Resolving `cancel` aborts both a running check and a pending sleep.
pub async fn until<F, Fut, T, C>(mut check: F, backoff: Backoff, cancel: C) -> Result<T, Cancelled>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
    C: Future<Output = ()>,
{
    pin_mut!(cancel);
    let mut delay = backoff.initial;

    loop {
        let attempt = check();
        pin_mut!(attempt);

        match future::select(attempt, cancel.as_mut()).await {
            Either::Left((Some(value), _)) => return Ok(value),
            Either::Left((None, _)) => {}
            Either::Right(((), _)) => return Err(Cancelled),
        }

        tracing::trace!("nothing yet, checking again in {:?}", delay);

        let sleep = tokio::time::sleep(delay);
        pin_mut!(sleep);

        if let Either::Right(_) = future::select(sleep, cancel.as_mut()).await {
            return Err(Cancelled);
        }

        delay = backoff.next(delay);
    }
}
