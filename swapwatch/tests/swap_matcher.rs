#[macro_use]
mod helper;

use helper::{ConnectionRefused, ConnectorMock};
use spectral::prelude::*;
use std::time::Duration;
use swapwatch::{
    asset::Quantity,
    btsieve::{self, HISTORY_BATCH_SIZE},
    config::{File, Settings},
    program,
    swap::{self, Claim, Expiry, Initiate, Instruction, Phase, Validation},
    transaction::Transaction,
    Secret, SecretHash, SwapParams,
};

const ALICE: &str = "alice";
const BOB: &str = "bob";
const SWAP_ACCOUNT: &str = "swap-account";

type ProgramTransaction = Transaction<program::Transaction<String>>;

fn secret() -> Secret {
    Secret::from(*b"This is our favourite passphrase")
}

fn params() -> SwapParams<String> {
    SwapParams {
        recipient_address: BOB.to_owned(),
        refund_address: ALICE.to_owned(),
        secret_hash: SecretHash::new(secret()),
        value: Quantity::from(5_000_000u64),
        expiration: Expiry::from(1_700_000_000u64),
    }
}

fn initiate() -> Initiate<String> {
    Initiate {
        buyer: BOB.to_owned(),
        seller: ALICE.to_owned(),
        secret_hash: SecretHash::new(secret()),
        value: Quantity::from(5_000_000u64),
        expiration: Expiry::from(1_700_000_000u64),
    }
}

fn transaction(signature: &str, instruction: Option<Instruction<String>>) -> ProgramTransaction {
    Transaction::new(
        signature.to_owned(),
        Quantity::zero(),
        program::Transaction {
            signature: signature.to_owned(),
            program_id: SWAP_ACCOUNT.to_owned(),
            instruction,
        },
    )
}

fn initiation() -> ProgramTransaction {
    transaction("initiation", Some(Instruction::Initiate(initiate())))
}

fn claim(signature: &str, secret: Secret) -> ProgramTransaction {
    transaction(signature, Some(Instruction::Claim(Claim { secret })))
}

fn history_with_initiations_at(positions: &[usize]) -> Vec<ProgramTransaction> {
    (0..250)
        .map(|i| match positions.iter().position(|position| *position == i) {
            Some(0) => initiation(),
            Some(_) => transaction(
                &format!("older-initiation-{}", i),
                Some(Instruction::Initiate(initiate())),
            ),
            None => transaction(&format!("transfer-{}", i), None),
        })
        .collect()
}

fn reject_all(_: &SwapParams<String>, _: &Instruction<String>) -> bool {
    false
}

#[tokio::test]
async fn finds_initiation_in_history_of_refund_address() {
    let underfunded = Initiate {
        value: Quantity::from(4_999_999u64),
        ..initiate()
    };
    let connector = ConnectorMock::new().with_history(ALICE, vec![
        transaction("transfer", None),
        transaction("underfunded", Some(Instruction::Initiate(underfunded))),
        initiation(),
        claim("unrelated-claim", secret()),
        transaction("older-initiation", Some(Instruction::Initiate(initiate()))),
    ]);

    let event = swap::find_initiate(&connector, &params(), HISTORY_BATCH_SIZE)
        .await
        .unwrap();

    let event = event.expect("initiation to be found");
    assert_eq!(event.phase, Phase::Initiate);
    assert_eq!(event.transaction, initiation());
    assert_that(&event.secret).is_none();
}

#[tokio::test]
async fn history_without_matching_transaction_yields_nothing() {
    let other_buyer = Initiate {
        buyer: "eve".to_owned(),
        ..initiate()
    };
    let connector = ConnectorMock::new().with_history(ALICE, vec![
        transaction("transfer", None),
        transaction("other-buyer", Some(Instruction::Initiate(other_buyer))),
    ]);

    let event = swap::find_initiate(&connector, &params(), HISTORY_BATCH_SIZE).await;

    assert_that(&event.unwrap()).is_none();
}

#[tokio::test]
async fn unknown_address_has_empty_history() {
    let connector = ConnectorMock::<program::Transaction<String>>::new();

    let event = swap::find_initiate(&connector, &params(), HISTORY_BATCH_SIZE).await;

    assert_that(&event.unwrap()).is_none();
}

#[tokio::test]
async fn claim_reveals_the_secret() {
    let connector = ConnectorMock::new()
        .with_history(ALICE, vec![initiation()])
        .with_history(SWAP_ACCOUNT, vec![
            claim("wrong-secret", Secret::from(*b"This is not our passphrase at al")),
            claim("claim", secret()),
            initiation(),
        ]);

    let initiation_ref = "initiation".to_owned();
    let event = swap::find_claim(&connector, &params(), &initiation_ref, HISTORY_BATCH_SIZE)
        .await
        .unwrap()
        .expect("claim to be found");

    assert_eq!(event.phase, Phase::Claim);
    assert_eq!(event.transaction.hash, "claim");
    assert_that(&event.secret).is_some().is_equal_to(&secret());
}

#[tokio::test]
async fn refund_is_accepted_on_its_tag() {
    let connector = ConnectorMock::new()
        .with_history(ALICE, vec![initiation()])
        .with_history(SWAP_ACCOUNT, vec![
            claim("wrong-secret", Secret::from(*b"This is not our passphrase at al")),
            transaction("refund", Some(Instruction::Refund)),
            initiation(),
        ]);

    let initiation_ref = "initiation".to_owned();
    let event = swap::find_refund(&connector, &params(), &initiation_ref, HISTORY_BATCH_SIZE)
        .await
        .unwrap()
        .expect("refund to be found");

    assert_eq!(event.phase, Phase::Refund);
    assert_eq!(event.transaction.hash, "refund");
    assert_that(&event.secret).is_none();
}

#[tokio::test]
async fn refund_ignores_validation() {
    let connector = ConnectorMock::new().with_history(SWAP_ACCOUNT, vec![transaction(
        "refund",
        Some(Instruction::Refund),
    )]);

    let event = swap::find_swap_event(
        &connector,
        &SWAP_ACCOUNT.to_owned(),
        &params(),
        Phase::Refund,
        Some(reject_all as Validation<String>),
        HISTORY_BATCH_SIZE,
    )
    .await
    .unwrap();

    assert_that(&event).is_some();
}

#[tokio::test]
async fn without_validation_the_first_tagged_transaction_matches() {
    let connector = ConnectorMock::new().with_history(SWAP_ACCOUNT, vec![
        transaction("transfer", None),
        claim("wrong-secret", Secret::from(*b"This is not our passphrase at al")),
        claim("claim", secret()),
    ]);

    let event = swap::find_swap_event(
        &connector,
        &SWAP_ACCOUNT.to_owned(),
        &params(),
        Phase::Claim,
        None,
        HISTORY_BATCH_SIZE,
    )
    .await
    .unwrap()
    .expect("claim to be found");

    assert_eq!(event.transaction.hash, "wrong-secret");
}

#[tokio::test]
async fn claim_before_initiation_is_visible_is_pending() {
    let connector = ConnectorMock::new().with_history(SWAP_ACCOUNT, vec![claim("claim", secret())]);

    let initiation_ref = "initiation".to_owned();
    let result = swap::find_claim(&connector, &params(), &initiation_ref, HISTORY_BATCH_SIZE).await;

    match result {
        Err(swap::Error::PendingTransaction(pending)) => assert_eq!(pending.0, "initiation"),
        other => panic!("expected pending transaction but got {:?}", other),
    }
}

#[tokio::test]
async fn collaborator_errors_are_propagated() {
    let connector = ConnectorMock::new()
        .with_history(ALICE, vec![initiation()])
        .unavailable();

    let result = swap::find_initiate(&connector, &params(), HISTORY_BATCH_SIZE).await;

    match result {
        Err(swap::Error::Collaborator(e)) => {
            assert!(e.downcast_ref::<ConnectionRefused>().is_some())
        }
        other => panic!("expected collaborator error but got {:?}", other),
    }
}

#[tokio::test]
async fn long_history_is_fetched_in_batches_and_scanned_in_order() {
    let connector =
        ConnectorMock::new().with_history(ALICE, history_with_initiations_at(&[230, 240]));

    let event = swap::find_initiate(&connector, &params(), HISTORY_BATCH_SIZE)
        .await
        .unwrap()
        .expect("initiation to be found");

    assert_eq!(event.transaction.hash, "initiation");
    let batches = connector.requested_batches();
    assert_eq!(
        batches.iter().map(Vec::len).collect::<Vec<_>>(),
        vec![100, 100, 50]
    );
}

#[tokio::test]
async fn configured_batch_size_bounds_every_request() {
    let settings = Settings::from_config_file_and_defaults(
        File::from_toml("[btsieve]\nbatch_size = 20").unwrap(),
    )
    .unwrap();
    let connector =
        ConnectorMock::new().with_history(ALICE, history_with_initiations_at(&[230]));

    let event = swap::find_initiate(&connector, &params(), settings.history_batch_size)
        .await
        .unwrap();

    assert_that(&event).is_some();
    let batches = connector.requested_batches();
    assert_eq!(batches.len(), 13);
    assert!(batches.iter().all(|batch| batch.len() <= 20));
    assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 250);
}

#[tokio::test]
async fn batches_completing_out_of_order_do_not_change_the_result() {
    let connector = ConnectorMock::new()
        .with_history(ALICE, history_with_initiations_at(&[30, 230]))
        .with_latency(Duration::from_millis(60));

    let event = swap::find_initiate(&connector, &params(), HISTORY_BATCH_SIZE)
        .await
        .unwrap()
        .expect("initiation to be found");

    assert_eq!(event.transaction.hash, "initiation");
    let first_of_completed_batches = connector
        .completed_batches()
        .iter()
        .map(|batch| batch[0].clone())
        .collect::<Vec<_>>();
    assert_eq!(first_of_completed_batches, vec![
        "transfer-200",
        "transfer-100",
        "transfer-0"
    ]);
}

#[tokio::test]
async fn fetched_history_keeps_history_order() {
    let history = history_with_initiations_at(&[30, 230]);
    let expected = history
        .iter()
        .map(|transaction| transaction.hash.clone())
        .collect::<Vec<_>>();
    let connector = ConnectorMock::new()
        .with_history(ALICE, history)
        .with_latency(Duration::from_millis(60));

    let fetched = btsieve::fetch_history(&connector, &ALICE.to_owned(), HISTORY_BATCH_SIZE)
        .await
        .unwrap();

    assert_eq!(
        fetched
            .into_iter()
            .map(|transaction| transaction.hash)
            .collect::<Vec<_>>(),
        expected
    );
}
