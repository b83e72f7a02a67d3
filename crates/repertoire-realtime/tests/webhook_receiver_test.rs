//! Indexing webhook receiver behaviour against recording fakes.

use std::sync::Arc;
use std::time::Duration;

use repertoire_core::error::DomainError;
use repertoire_realtime::notifier::RealtimeNotifier;
use repertoire_realtime::webhook::{IndexingWebhookReceiver, TaskCallback, WebhookOutcome};
use repertoire_search::engine::TaskUid;
use repertoire_search::task_tracker::TaskTracker;
use repertoire_test_support::{FakeSearchEngine, RecordingBroker, StaticTokenIssuer};
use serde_json::json;
use uuid::Uuid;

struct Fixture {
    receiver: IndexingWebhookReceiver,
    tracker: Arc<TaskTracker>,
    broker: RecordingBroker,
}

fn fixture() -> Fixture {
    fixture_with_task_ttl(Duration::from_secs(300))
}

fn fixture_with_task_ttl(task_ttl: Duration) -> Fixture {
    let tracker = Arc::new(TaskTracker::new(task_ttl));
    let broker = RecordingBroker::new();
    let notifier = Arc::new(RealtimeNotifier::new(
        Arc::new(broker.clone()),
        Arc::new(StaticTokenIssuer::new("broker-token")),
        Duration::from_secs(3000),
    ));
    let receiver = IndexingWebhookReceiver::new(
        Arc::new(FakeSearchEngine::new()),
        tracker.clone(),
        notifier,
    );
    Fixture {
        receiver,
        tracker,
        broker,
    }
}

fn callback(uid: i64, status: &str) -> TaskCallback {
    TaskCallback {
        uid,
        status: status.to_owned(),
    }
}

#[tokio::test]
async fn test_succeeded_tracked_task_notifies_owner_once() {
    // Arrange
    let f = fixture();
    let user_id = Uuid::new_v4();
    f.tracker.track(TaskUid(41), user_id);

    // Act
    let outcome = f.receiver.receive(&callback(41, "succeeded")).await.unwrap();

    // Assert
    assert_eq!(outcome, WebhookOutcome::Notified(user_id));
    assert_eq!(
        f.broker.published(),
        vec![(
            format!("search:{user_id}"),
            json!({ "action": "SEARCH_CACHE_INVALIDATION" })
        )]
    );
    assert_eq!(f.broker.tokens(), vec!["broker-token".to_owned()]);
    assert_eq!(f.broker.disconnects(), 1);
}

#[tokio::test]
async fn test_succeeded_untracked_task_is_silent_no_op() {
    let f = fixture();

    let outcome = f.receiver.receive(&callback(7, "succeeded")).await.unwrap();

    assert_eq!(outcome, WebhookOutcome::Untracked);
    assert!(f.broker.published().is_empty());
}

#[tokio::test]
async fn test_failed_task_errors_with_task_id_and_does_not_publish() {
    // Arrange
    let f = fixture();
    f.tracker.track(TaskUid(99), Uuid::new_v4());

    // Act
    let err = f.receiver.receive(&callback(99, "failed")).await.unwrap_err();

    // Assert
    assert!(matches!(err, DomainError::TaskFailed { task_uid: 99, .. }));
    let message = err.to_string();
    assert!(message.contains("99"));
    assert!(message.contains("failed"));
    assert!(f.broker.published().is_empty());
}

#[tokio::test]
async fn test_expired_correlation_is_treated_as_untracked() {
    let f = fixture_with_task_ttl(Duration::from_millis(50));
    f.tracker.track(TaskUid(5), Uuid::new_v4());
    tokio::time::sleep(Duration::from_millis(120)).await;

    let outcome = f.receiver.receive(&callback(5, "succeeded")).await.unwrap();

    assert_eq!(outcome, WebhookOutcome::Untracked);
    assert!(f.broker.published().is_empty());
}

#[tokio::test]
async fn test_publish_failure_surfaces_as_error() {
    // Arrange
    let f = fixture();
    f.tracker.track(TaskUid(12), Uuid::new_v4());
    f.broker.reject_publishes();

    // Act
    let result = f.receiver.receive(&callback(12, "succeeded")).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    assert_eq!(f.broker.disconnects(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let f = fixture();

    let result = f.receiver.receive_body(br#"{"taskUid": "x"}"#).await;

    assert!(matches!(result, Err(DomainError::Serialization(_))));
}

#[tokio::test]
async fn test_raw_body_is_parsed_and_processed() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    f.tracker.track(TaskUid(8), user_id);

    let outcome = f
        .receiver
        .receive_body(br#"{"uid": 8, "status": "succeeded"}"#)
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Notified(user_id));
}
