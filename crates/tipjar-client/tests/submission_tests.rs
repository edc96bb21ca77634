use std::sync::atomic::Ordering;
use std::time::Duration;

use common::fixtures::*;
use common::helpers::MockWallet;
use futures::StreamExt;
use rstest::*;
use tipjar_client::submission::{TransferCall, TransferSubmitter};
use tipjar_client::wallet::WalletError;
use tipjar_primitives::alloy::primitives::{Address, TxHash};
use tipjar_primitives::chains::BASE_CHAIN_ID;
use tipjar_primitives::lifecycle::{LifecycleState, SubmissionHandle, FALLBACK_FAILURE_MESSAGE};
use tipjar_primitives::resolution::ErrorKind;
use tipjar_primitives::sponsorship::SponsorshipCapability;

mod common;

fn failure(state: &LifecycleState) -> (ErrorKind, String) {
    match state {
        LifecycleState::Error(failure) => (failure.kind, failure.message.clone()),
        other => panic!("expected error state, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn test_happy_path_passes_through_every_phase(funded_wallet: MockWallet, tip_call: TransferCall) {
    let submitter = TransferSubmitter::new(funded_wallet, BASE_CHAIN_ID);

    let states: Vec<_> = submitter.submit(Some(tip_call), None).collect().await;

    let names: Vec<_> = states.iter().map(LifecycleState::name).collect();
    assert_eq!(names, ["building", "pending", "success"]);
    assert_eq!(
        states[1],
        LifecycleState::Pending {
            handle: SubmissionHandle::Transaction(TxHash::repeat_byte(0x11))
        }
    );
    assert_eq!(submitter.state(), states[2]);
    assert_eq!(submitter.wallet().send_count(), 1);
}

#[rstest]
#[tokio::test]
async fn test_double_trigger_submits_once(funded_wallet: MockWallet, tip_call: TransferCall) {
    let submitter = TransferSubmitter::new(funded_wallet, BASE_CHAIN_ID);

    let first = submitter.submit(Some(tip_call.clone()), None);
    assert_eq!(submitter.state(), LifecycleState::Building);
    assert!(!submitter.can_submit(Some(&tip_call)));

    let second: Vec<_> = submitter.submit(Some(tip_call), None).collect().await;
    assert!(second.is_empty());

    let first: Vec<_> = first.collect().await;
    assert_eq!(first.len(), 3);
    assert_eq!(submitter.wallet().send_count(), 1);
}

#[rstest]
#[tokio::test]
async fn test_missing_call_stays_idle(funded_wallet: MockWallet) {
    let submitter = TransferSubmitter::new(funded_wallet, BASE_CHAIN_ID);
    assert!(!submitter.can_submit(None));

    let states: Vec<_> = submitter.submit(None, None).collect().await;

    assert!(states.is_empty());
    assert_eq!(submitter.state(), LifecycleState::Idle);
    assert_eq!(submitter.wallet().send_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_wrong_chain_never_signs(sender: Address, tip_call: TransferCall) {
    let wallet = MockWallet::new(sender, 1, ether("1"));
    let submitter = TransferSubmitter::new(wallet, BASE_CHAIN_ID);
    assert!(!submitter.chain_matches().await.unwrap());

    let states: Vec<_> = submitter.submit(Some(tip_call.clone()), None).collect().await;

    assert_eq!(states.len(), 2);
    let (kind, message) = failure(&states[1]);
    assert_eq!(kind, ErrorKind::ChainMismatch);
    assert!(message.contains("switch to Base"), "{message}");
    assert_eq!(submitter.wallet().send_count(), 0);

    submitter.switch_to_required_chain().await.unwrap();
    assert!(submitter.chain_matches().await.unwrap());
    assert!(submitter.reset());

    let states: Vec<_> = submitter.submit(Some(tip_call), None).collect().await;
    assert_eq!(states.last().map(LifecycleState::name), Some("success"));
    assert_eq!(submitter.wallet().switches.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn test_rejection_surfaces_wallet_reason(funded_wallet: MockWallet, tip_call: TransferCall) {
    let wallet = funded_wallet.with_send_outcome(Err(WalletError::Rejected(
        "User denied transaction signature".into(),
    )));
    let submitter = TransferSubmitter::new(wallet, BASE_CHAIN_ID);

    let states: Vec<_> = submitter.submit(Some(tip_call), None).collect().await;

    let names: Vec<_> = states.iter().map(LifecycleState::name).collect();
    assert_eq!(names, ["building", "error"]);
    assert_eq!(
        failure(&states[1]),
        (
            ErrorKind::UserRejected,
            "User denied transaction signature".to_string()
        )
    );
    assert!(!submitter.take_celebration());
}

#[rstest]
#[tokio::test]
async fn test_insufficient_funds_fails_before_send(sender: Address, tip_call: TransferCall) {
    let wallet = MockWallet::new(sender, BASE_CHAIN_ID, ether("0.001"));
    let submitter = TransferSubmitter::new(wallet, BASE_CHAIN_ID);

    let states: Vec<_> = submitter.submit(Some(tip_call), None).collect().await;

    let (kind, message) = failure(states.last().unwrap());
    assert_eq!(kind, ErrorKind::SubmissionFailed);
    assert!(message.starts_with("insufficient funds"), "{message}");
    assert_eq!(submitter.wallet().send_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_disconnected_wallet_errors(funded_wallet: MockWallet, tip_call: TransferCall) {
    let submitter = TransferSubmitter::new(funded_wallet.disconnected(), BASE_CHAIN_ID);

    let states: Vec<_> = submitter.submit(Some(tip_call), None).collect().await;

    let (_, message) = failure(states.last().unwrap());
    assert_eq!(message, "wallet not connected");
}

#[rstest]
#[tokio::test]
async fn test_confirmation_failure_uses_fallback_message(
    funded_wallet: MockWallet,
    tip_call: TransferCall,
) {
    let wallet = funded_wallet.with_confirm_outcome(Err(WalletError::Rpc(String::new())));
    let submitter = TransferSubmitter::new(wallet, BASE_CHAIN_ID);

    let states: Vec<_> = submitter.submit(Some(tip_call), None).collect().await;

    let names: Vec<_> = states.iter().map(LifecycleState::name).collect();
    assert_eq!(names, ["building", "pending", "error"]);
    assert_eq!(failure(&states[2]).1, FALLBACK_FAILURE_MESSAGE);
}

#[rstest]
#[tokio::test]
async fn test_celebration_fires_once_per_success(funded_wallet: MockWallet, tip_call: TransferCall) {
    let submitter = TransferSubmitter::new(funded_wallet, BASE_CHAIN_ID);
    assert!(!submitter.take_celebration());

    let _: Vec<_> = submitter.submit(Some(tip_call.clone()), None).collect().await;
    assert!(submitter.take_celebration());
    assert!(!submitter.take_celebration());

    assert!(submitter.reset());
    let _: Vec<_> = submitter.submit(Some(tip_call), None).collect().await;
    assert!(submitter.take_celebration());
}

#[rstest]
#[tokio::test]
async fn test_reset_only_from_terminal_states(funded_wallet: MockWallet, tip_call: TransferCall) {
    let submitter = TransferSubmitter::new(funded_wallet, BASE_CHAIN_ID);
    assert!(!submitter.reset());

    let mut stream = submitter.submit(Some(tip_call.clone()), None);
    assert_eq!(stream.next().await, Some(LifecycleState::Building));
    assert!(!submitter.reset());
    while stream.next().await.is_some() {}
    drop(stream);

    // terminal states hold until reset
    let empty: Vec<_> = submitter.submit(Some(tip_call.clone()), None).collect().await;
    assert!(empty.is_empty());
    assert_eq!(submitter.state().name(), "success");

    assert!(submitter.reset());
    assert_eq!(submitter.state(), LifecycleState::Idle);
    assert!(submitter.can_submit(Some(&tip_call)));
}

#[rstest]
#[tokio::test]
async fn test_dropped_stream_is_abandoned(funded_wallet: MockWallet, tip_call: TransferCall) {
    let wallet = funded_wallet.with_confirm_delay(Duration::from_secs(30));
    let submitter = TransferSubmitter::new(wallet, BASE_CHAIN_ID);

    let mut stream = submitter.submit(Some(tip_call.clone()), None);
    assert_eq!(stream.next().await.map(|s| s.name()), Some("building"));
    assert_eq!(stream.next().await.map(|s| s.name()), Some("pending"));
    drop(stream);

    assert_eq!(failure(&submitter.state()).1, "submission abandoned");
    assert!(submitter.reset());

    // never polled at all
    drop(submitter.submit(Some(tip_call), None));
    assert_eq!(failure(&submitter.state()).1, "submission abandoned");
}

#[rstest]
#[tokio::test]
async fn test_sponsorship_is_handed_to_wallet(
    funded_wallet: MockWallet,
    tip_call: TransferCall,
    sponsorship: SponsorshipCapability,
) {
    let wallet = funded_wallet
        .with_send_outcome(Ok(SubmissionHandle::CallBundle("bundle-1".into())));
    let submitter = TransferSubmitter::new(wallet, BASE_CHAIN_ID);

    let states: Vec<_> = submitter
        .submit(Some(tip_call), Some(sponsorship.clone()))
        .collect()
        .await;

    assert_eq!(
        states[1],
        LifecycleState::Pending {
            handle: SubmissionHandle::CallBundle("bundle-1".into())
        }
    );
    assert_eq!(submitter.wallet().last_capability(), Some(sponsorship));
}

#[rstest]
#[tokio::test]
async fn test_observers_see_transitions(funded_wallet: MockWallet, tip_call: TransferCall) {
    let submitter = TransferSubmitter::new(funded_wallet, BASE_CHAIN_ID);
    let mut observer = submitter.subscribe();
    assert_eq!(*observer.borrow_and_update(), LifecycleState::Idle);

    let _: Vec<_> = submitter.submit(Some(tip_call), None).collect().await;

    assert!(observer.has_changed().unwrap());
    assert_eq!(observer.borrow_and_update().name(), "success");
}
