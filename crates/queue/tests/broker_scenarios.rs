//! Round-trip scenarios from the broker specification (SPEC_FULL §8),
//! run against a live local Redis. `#[ignore]`d by default since CI/dev
//! boxes without a Redis instance would otherwise fail these; run with
//! `cargo test -- --ignored` against `redis://127.0.0.1:6379`.

use std::time::Duration;

use sqslite_queue::registry::QueueConfig;
use sqslite_queue::{Dispatcher, Store};

fn unique_queue(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

async fn dispatcher() -> std::sync::Arc<Dispatcher> {
    let store = Store::connect("redis://127.0.0.1:6379", 8).expect("valid redis url");
    let dispatcher = Dispatcher::new(store);
    dispatcher.recover_and_start().await.expect("recovery succeeds");
    dispatcher
}

#[tokio::test]
#[ignore]
async fn immediate_delivery() {
    let d = dispatcher().await;
    let q = unique_queue("q1");
    d.create_queue(QueueConfig {
        name: q.clone(),
        visibility_timeout_s: 30,
        retention_s: 0,
        default_delay_s: 0,
    })
    .await
    .unwrap();

    d.push(&q, "hello", None).await.unwrap();
    let body = d.pop(&q, 1).await.unwrap();
    assert_eq!(body, "hello");
}

#[tokio::test]
#[ignore]
async fn delayed_publication_then_timeout_then_delivery() {
    let d = dispatcher().await;
    let q = unique_queue("q2");
    d.create_queue(QueueConfig {
        name: q.clone(),
        visibility_timeout_s: 30,
        retention_s: 0,
        default_delay_s: 0,
    })
    .await
    .unwrap();

    d.push(&q, "m", Some(2)).await.unwrap();
    assert!(matches!(
        d.pop(&q, 1).await,
        Err(sqslite_queue::BrokerError::Timeout)
    ));

    tokio::time::sleep(Duration::from_secs(3)).await;
    let body = d.pop(&q, 1).await.unwrap();
    assert_eq!(body, "m");
}

#[tokio::test]
#[ignore]
async fn ack_prevents_redelivery() {
    let d = dispatcher().await;
    let q = unique_queue("q3");
    d.create_queue(QueueConfig {
        name: q.clone(),
        visibility_timeout_s: 2,
        retention_s: 0,
        default_delay_s: 0,
    })
    .await
    .unwrap();

    d.push(&q, "hello", None).await.unwrap();
    let body = d.pop(&q, 1).await.unwrap();
    d.delete_message(&q, &body).await.unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(matches!(
        d.pop(&q, 1).await,
        Err(sqslite_queue::BrokerError::Timeout)
    ));
}

#[tokio::test]
#[ignore]
async fn no_ack_causes_redelivery() {
    let d = dispatcher().await;
    let q = unique_queue("q4");
    d.create_queue(QueueConfig {
        name: q.clone(),
        visibility_timeout_s: 2,
        retention_s: 0,
        default_delay_s: 0,
    })
    .await
    .unwrap();

    d.push(&q, "x", None).await.unwrap();
    let first = d.pop(&q, 1).await.unwrap();
    assert_eq!(first, "x");

    tokio::time::sleep(Duration::from_secs(3)).await;
    let second = d.pop(&q, 1).await.unwrap();
    assert_eq!(second, "x");
}

#[tokio::test]
#[ignore]
async fn retention_purge_drops_unacked_message() {
    let d = dispatcher().await;
    let q = unique_queue("q6");
    d.create_queue(QueueConfig {
        name: q.clone(),
        visibility_timeout_s: 10,
        retention_s: 1,
        default_delay_s: 5,
    })
    .await
    .unwrap();

    // default_delay_s=5 places "y" in the delayed set with deadline now+5;
    // the janitor's retention cutoff (now-1) will pass that deadline well
    // before the promoter would otherwise make it ready.
    d.push(&q, "y", None).await.unwrap();

    tokio::time::sleep(Duration::from_secs(7)).await;
    assert!(matches!(
        d.pop(&q, 1).await,
        Err(sqslite_queue::BrokerError::Timeout)
    ));
}

#[tokio::test]
#[ignore]
async fn create_validation_rejects_zero_visibility_timeout() {
    let d = dispatcher().await;
    let q = unique_queue("q5");
    let result = d
        .create_queue(QueueConfig {
            name: q,
            visibility_timeout_s: 0,
            retention_s: 0,
            default_delay_s: 0,
        })
        .await;

    assert!(matches!(
        result,
        Err(sqslite_queue::BrokerError::InvalidArgument(_))
    ));
}

#[tokio::test]
#[ignore]
async fn extend_visibility_with_zero_falls_back_to_configured_timeout() {
    let d = dispatcher().await;
    let q = unique_queue("q7");
    d.create_queue(QueueConfig {
        name: q.clone(),
        visibility_timeout_s: 5,
        retention_s: 0,
        default_delay_s: 0,
    })
    .await
    .unwrap();

    d.push(&q, "m", None).await.unwrap();
    let body = d.pop(&q, 1).await.unwrap();

    // extra_s = 0 (what a missing `visibilityTime` form field coerces to)
    // must extend by the queue's configured visibility timeout, not
    // reinsert the entry with a deadline of `now`.
    d.extend_visibility(&q, &body, 0).await.unwrap();

    assert!(matches!(
        d.pop(&q, 1).await,
        Err(sqslite_queue::BrokerError::Timeout)
    ));

    tokio::time::sleep(Duration::from_secs(6)).await;
    let redelivered = d.pop(&q, 1).await.unwrap();
    assert_eq!(redelivered, "m");
}
