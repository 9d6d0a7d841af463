//! Tests for tokio runtime adapters

use std::time::Duration;

use prometheus_safe_io::core::Dispatch;
use prometheus_safe_io::runtime::{oneshot_call, TokioSpawner};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_dispatch() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner
        .dispatch(Box::new(move || {
            tx.send(123).unwrap();
        }))
        .unwrap();

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_try_current_outside_runtime() {
    assert!(TokioSpawner::try_current().is_err());
}

#[tokio::test]
async fn test_oneshot_call_is_non_blocking() {
    let (call, rx) = oneshot_call::<usize>();
    assert_eq!(call.mode_override(), Some(prometheus_safe_io::Mode::NonBlocking));
    assert!(call.has_callback());

    // Dropping an unused call drops the sender without a value.
    drop(call);
    let received = tokio::time::timeout(Duration::from_secs(1), rx).await.unwrap();
    assert!(received.is_err());
}
