//! End-to-end session lifecycles against the fake effect handlers
//!
//! Each test drives `initialize_checkout` and a scripted "user" in one
//! `futures::join!`, so the user acts only once the controller is suspended.

#![cfg(not(target_arch = "wasm32"))]
#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_matches::assert_matches;
use checkout_core::classifier::COMPLETE_TRANSACTION_CANCELLED;
use checkout_core::{
    CancellationSignal, CheckoutError, CheckoutOutcome, FailureStage, SdkRejection, SessionToken,
};
use checkout_session::{SessionController, SessionState};
use checkout_testkit::{
    close_event_message, close_source_message, default_token, session_token, unrelated_message,
    wait_until, AttachBehavior, TestHarness, CANCEL_DESTINATION, DEFAULT_DIGEST,
    DEFAULT_LOCATION,
};

fn controller(harness: &TestHarness) -> SessionController {
    SessionController::new(harness.effects(), harness.config()).unwrap()
}

fn user_cancelled() -> SdkRejection {
    SdkRejection::with_reason(COMPLETE_TRANSACTION_CANCELLED, "user closed the form")
}

#[tokio::test]
async fn test_successful_checkout_yields_transient_token() {
    let harness = TestHarness::new();
    let controller = controller(&harness);

    let token = default_token();
    let (outcome, ()) = futures::join!(controller.initialize_checkout(&token), async {
        wait_until(|| harness.sdk.has_pending_show()).await;
        assert_eq!(controller.state(), SessionState::AwaitingUserInput);
        assert!(controller.snapshot().bridge_armed);
        harness.sdk.resolve_show("tt-1");
    });

    let outcome = outcome.unwrap();
    assert_matches!(&outcome, CheckoutOutcome::Succeeded { token } if token.as_str() == "tt-1");
    assert_eq!(controller.state(), SessionState::Succeeded);

    let spec = harness.resources.last_spec().unwrap();
    assert_eq!(spec.location, DEFAULT_LOCATION);
    assert_eq!(spec.integrity, DEFAULT_DIGEST);
    assert_eq!(harness.sdk.tokens_seen(), vec![default_token().as_str().to_string()]);

    // Success keeps the entry surface until the caller resets
    let snapshot = controller.snapshot();
    assert!(snapshot.resource_loaded);
    assert!(snapshot.sdk_instance_alive);
    assert!(!snapshot.bridge_armed);
    assert!(!snapshot.awaiting_outcome);
    assert_eq!(harness.messages.listener_count(), 0);
    assert!(!harness.surface.is_blank());
    assert!(harness.router.navigations().is_empty());
}

#[tokio::test]
async fn test_cancellation_by_rejection_navigates_once() {
    let harness = TestHarness::new();
    let controller = controller(&harness);

    let token = default_token();
    let (outcome, ()) = futures::join!(controller.initialize_checkout(&token), async {
        wait_until(|| harness.sdk.has_pending_show()).await;
        harness.sdk.reject_show(user_cancelled());
    });

    assert_eq!(
        outcome.unwrap(),
        CheckoutOutcome::Cancelled {
            signal: CancellationSignal::ViaRejection {
                reason_code: COMPLETE_TRANSACTION_CANCELLED.to_string(),
            },
        }
    );
    assert_eq!(controller.state(), SessionState::Cancelled);
    assert_eq!(harness.router.navigations(), vec![CANCEL_DESTINATION.to_string()]);

    // Default cleanup releases everything on cancellation
    let snapshot = controller.snapshot();
    assert!(!snapshot.resource_loaded);
    assert!(!snapshot.sdk_instance_alive);
    assert_eq!(harness.resources.alive_count(), 0);
    assert_eq!(harness.sdk.disposed_count(), 1);
    assert!(harness.surface.is_blank());

    harness.messages.deliver(close_event_message());
    controller.reset();
    assert_eq!(harness.router.navigations().len(), 1);
}

#[tokio::test]
async fn test_single_segment_token_fails_before_loading() {
    let harness = TestHarness::new();
    let controller = controller(&harness);

    let outcome = controller
        .initialize_checkout(&SessionToken::new("onlyonepart"))
        .await
        .unwrap();

    assert_matches!(
        outcome,
        CheckoutOutcome::Failed {
            stage: FailureStage::Decode,
            ..
        }
    );
    assert_eq!(controller.state(), SessionState::Failed);
    assert_eq!(harness.resources.attach_count(), 0);
    assert_eq!(harness.sdk.initialize_calls(), 0);
    assert!(controller.snapshot().metadata.is_none());
}

#[tokio::test]
async fn test_decode_failure_touches_nothing() {
    let harness = TestHarness::new();
    let controller = controller(&harness);

    controller
        .initialize_checkout(&SessionToken::new("onlyonepart"))
        .await
        .unwrap();

    assert_eq!(controller.state(), SessionState::Failed);
    assert_eq!(harness.surface.clear_count(), 0);
    assert_eq!(harness.resources.attach_count(), 0);
    assert_eq!(harness.resources.alive_count(), 0);
    assert!(harness.resources.detached().is_empty());
    assert_eq!(harness.messages.subscribe_count(), 0);
}

#[tokio::test]
async fn test_integrity_mismatch_never_reaches_sdk() {
    let harness = TestHarness::new();
    harness
        .resources
        .set_behavior(DEFAULT_LOCATION, AttachBehavior::IntegrityMismatch);
    let controller = controller(&harness);

    let outcome = controller.initialize_checkout(&default_token()).await.unwrap();

    assert_matches!(
        outcome,
        CheckoutOutcome::Failed {
            stage: FailureStage::Load,
            ..
        }
    );
    assert_eq!(harness.resources.attach_count(), 1);
    assert_eq!(harness.resources.alive_count(), 0);
    assert_eq!(harness.sdk.initialize_calls(), 0);
    assert!(!controller.snapshot().resource_loaded);
}

#[tokio::test]
async fn test_network_failure_is_a_load_failure() {
    let harness = TestHarness::new();
    harness
        .resources
        .set_behavior(DEFAULT_LOCATION, AttachBehavior::NetworkFailure);
    let controller = controller(&harness);

    let outcome = controller.initialize_checkout(&default_token()).await.unwrap();
    assert_matches!(
        outcome,
        CheckoutOutcome::Failed {
            stage: FailureStage::Load,
            ..
        }
    );
}

#[tokio::test]
async fn test_sdk_rejections_map_to_stages() {
    let cases: [(fn(&TestHarness), FailureStage); 3] = [
        (
            |h| h.sdk.reject_initialize("session expired"),
            FailureStage::Initialize,
        ),
        (
            |h| h.sdk.reject_unified_payments("unsupported mode"),
            FailureStage::Initialize,
        ),
        (
            |h| h.sdk.reject_create_trigger("unknown container"),
            FailureStage::Render,
        ),
    ];

    for (script, expected) in cases {
        let harness = TestHarness::new();
        script(&harness);
        let controller = controller(&harness);

        let outcome = controller.initialize_checkout(&default_token()).await.unwrap();
        assert_matches!(outcome, CheckoutOutcome::Failed { stage, .. } if stage == expected);
        assert_eq!(harness.sdk.show_calls(), 0);
        assert_eq!(harness.resources.alive_count(), 0);
        assert_eq!(harness.sdk.live_instances(), 0);
    }
}

#[tokio::test]
async fn test_unrecognized_rejection_is_payment_failure() {
    let harness = TestHarness::new();
    let controller = controller(&harness);

    let token = default_token();
    let (outcome, ()) = futures::join!(controller.initialize_checkout(&token), async {
        wait_until(|| harness.sdk.has_pending_show()).await;
        harness
            .sdk
            .reject_show(SdkRejection::with_reason("CARD_DECLINED", "issuer declined"));
    });

    assert_eq!(
        outcome.unwrap(),
        CheckoutOutcome::failed(FailureStage::Payment, "issuer declined")
    );
    assert!(harness.router.navigations().is_empty());
}

#[tokio::test]
async fn test_close_message_cancels_pending_promise() {
    let harness = TestHarness::new();
    let controller = controller(&harness);

    let token = default_token();
    let (outcome, ()) = futures::join!(controller.initialize_checkout(&token), async {
        wait_until(|| harness.sdk.has_pending_show()).await;
        harness.messages.deliver(unrelated_message());
        harness.messages.deliver(close_source_message());
    });

    assert_eq!(
        outcome.unwrap(),
        CheckoutOutcome::Cancelled {
            signal: CancellationSignal::ViaMessage {
                raw: close_source_message(),
            },
        }
    );
    assert_eq!(harness.router.navigations().len(), 1);
}

#[tokio::test]
async fn test_failed_subscription_is_render_failure() {
    let harness = TestHarness::new();
    harness.messages.refuse_subscriptions();
    let controller = controller(&harness);

    let outcome = controller.initialize_checkout(&default_token()).await.unwrap();

    assert_matches!(
        outcome,
        CheckoutOutcome::Failed {
            stage: FailureStage::Render,
            ..
        }
    );
    assert_eq!(harness.sdk.show_calls(), 0);
    assert_eq!(harness.sdk.disposed_count(), 1);
    assert_eq!(harness.resources.alive_count(), 0);
}

#[tokio::test]
async fn test_sdk_parameters_follow_configuration() {
    let harness = TestHarness::new();
    let mut config = harness.config();
    config.sdk.embedded = true;
    config.sdk.entry_method = "CLICKTOPAY".to_string();
    let controller = SessionController::new(harness.effects(), config).unwrap();

    let token = default_token();
    let (_, ()) = futures::join!(controller.initialize_checkout(&token), async {
        wait_until(|| harness.sdk.has_pending_show()).await;
        harness.sdk.resolve_show("tt-1");
    });

    assert_eq!(harness.sdk.embedded_flags(), vec![true]);
    let triggers = harness.sdk.triggers();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].0, "CLICKTOPAY");
    assert_eq!(
        triggers[0].1.get("paymentScreen").map(String::as_str),
        Some("#embeddedPaymentContainer")
    );
}

#[tokio::test]
async fn test_cleanup_policy_can_keep_resources_after_cancel() {
    let harness = TestHarness::new();
    let mut config = harness.config();
    config.cleanup.on_cancel = false;
    let controller = SessionController::new(harness.effects(), config).unwrap();

    let token = default_token();
    let (outcome, ()) = futures::join!(controller.initialize_checkout(&token), async {
        wait_until(|| harness.sdk.has_pending_show()).await;
        harness.sdk.reject_show(user_cancelled());
    });
    assert_eq!(outcome.unwrap().kind(), checkout_core::OutcomeKind::Cancelled);

    let snapshot = controller.snapshot();
    assert!(snapshot.resource_loaded);
    assert!(snapshot.sdk_instance_alive);
    assert!(!snapshot.bridge_armed);

    controller.reset();
    assert_eq!(harness.resources.alive_count(), 0);
    assert_eq!(harness.sdk.live_instances(), 0);
}

#[tokio::test]
async fn test_no_navigation_without_destination() {
    let harness = TestHarness::new();
    let mut config = harness.config();
    config.navigation.cancel_destination = None;
    let controller = SessionController::new(harness.effects(), config).unwrap();

    let token = default_token();
    let (outcome, ()) = futures::join!(controller.initialize_checkout(&token), async {
        wait_until(|| harness.sdk.has_pending_show()).await;
        harness.messages.deliver(close_event_message());
    });

    assert_eq!(outcome.unwrap().kind(), checkout_core::OutcomeKind::Cancelled);
    assert!(harness.router.navigations().is_empty());
}

#[tokio::test]
async fn test_cleanup_failures_do_not_surface() {
    let harness = TestHarness::new();
    harness.surface.fail_clears();
    harness.sdk.fail_dispose();
    harness.router.fail_navigations();
    let controller = controller(&harness);

    let token = default_token();
    let (outcome, ()) = futures::join!(controller.initialize_checkout(&token), async {
        wait_until(|| harness.sdk.has_pending_show()).await;
        harness.sdk.reject_show(user_cancelled());
    });

    assert_eq!(outcome.unwrap().kind(), checkout_core::OutcomeKind::Cancelled);
    assert_eq!(harness.router.navigations().len(), 1);
    assert!(harness.surface.clear_count() > 0);

    controller.reset();
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(harness.resources.alive_count(), 0);
}

#[tokio::test]
async fn test_sdk_without_dispose_is_still_released() {
    let harness = TestHarness::new();
    harness.sdk.without_dispose();
    let controller = controller(&harness);

    let token = default_token();
    let (_, ()) = futures::join!(controller.initialize_checkout(&token), async {
        wait_until(|| harness.sdk.has_pending_show()).await;
        harness.sdk.resolve_show("tt-1");
    });
    controller.reset();

    assert_eq!(harness.sdk.disposed_count(), 0);
    assert_eq!(harness.sdk.live_instances(), 0);
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let harness = TestHarness::new();
    let mut config = harness.config();
    config.sdk.targets.clear();

    let result = SessionController::new(harness.effects(), config);
    assert!(matches!(result, Err(CheckoutError::Config { .. })));
}

#[tokio::test]
async fn test_token_without_metadata_fails_decode() {
    let harness = TestHarness::new();
    let controller = controller(&harness);
    let token = checkout_testkit::token_with_payload(&serde_json::json!({ "ctx": [] }));

    let outcome = controller.initialize_checkout(&token).await.unwrap();
    assert_matches!(
        outcome,
        CheckoutOutcome::Failed {
            stage: FailureStage::Decode,
            ..
        }
    );
    assert_eq!(harness.resources.attach_count(), 0);
}

#[tokio::test]
async fn test_sessions_get_distinct_ids() {
    let harness = TestHarness::new();
    harness
        .sdk
        .set_show(checkout_testkit::ShowBehavior::Resolve("tt-1".to_string()));
    let controller = controller(&harness);

    controller.initialize_checkout(&default_token()).await.unwrap();
    let first = controller.session_id().unwrap();
    let next = session_token("https://sdk.example.test/uc/v2/checkout.js", DEFAULT_DIGEST);
    controller.initialize_checkout(&next).await.unwrap();
    let second = controller.session_id().unwrap();

    assert_ne!(first, second);
    assert_eq!(harness.resources.alive_count(), 1);
    assert_eq!(harness.sdk.live_instances(), 1);
}
