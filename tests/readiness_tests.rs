use batts_portal::{
    AppConfig, BackendHandle, MockBackend, ReadinessGate,
    credentials::{CredentialSources, Credentials},
    init::initialize,
};
use std::{sync::Arc, time::Duration};

fn mock_handle() -> BackendHandle {
    Arc::new(MockBackend::new())
}

#[tokio::test]
async fn test_early_and_late_waiters_get_the_same_handle() {
    let gate = ReadinessGate::new();

    let early = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.await_ready().await })
    };
    tokio::task::yield_now().await;
    assert!(!gate.is_ready());

    let handle = mock_handle();
    assert!(gate.publish(handle.clone()));

    let early = early.await.unwrap();
    let late = gate.await_ready().await;

    assert!(Arc::ptr_eq(&early, &handle));
    assert!(Arc::ptr_eq(&late, &handle));
}

#[tokio::test]
async fn test_many_waiters_each_resolve_once() {
    let gate = ReadinessGate::new();
    let waiters: Vec<_> = (0..8)
        .map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move { gate.await_ready().await })
        })
        .collect();

    let handle = mock_handle();
    gate.publish(handle.clone());

    for waiter in waiters {
        let resolved = waiter.await.unwrap();
        assert!(Arc::ptr_eq(&resolved, &handle));
    }
}

#[tokio::test]
async fn test_second_publication_is_ignored() {
    let gate = ReadinessGate::new();
    let first = mock_handle();
    let second = mock_handle();

    assert!(gate.publish(first.clone()));
    assert!(!gate.publish(second));

    let resolved = gate.await_ready().await;
    assert!(Arc::ptr_eq(&resolved, &first));
}

#[tokio::test]
async fn test_unpublished_gate_keeps_waiting() {
    let gate = ReadinessGate::new();
    let outcome = tokio::time::timeout(Duration::from_millis(50), gate.await_ready()).await;
    assert!(outcome.is_err(), "await_ready must not resolve without a publication");
    assert!(gate.try_get().is_none());
}

#[tokio::test]
async fn test_initialize_publishes_client_for_resolved_credentials() {
    let config = AppConfig {
        credentials: CredentialSources {
            injected: Some(Credentials::new("https://abc.supabase.co/", "anon-key")),
            local_file: None,
        },
        ..AppConfig::default()
    };
    let gate = ReadinessGate::new();

    assert!(initialize(&config, &gate));
    let backend = gate.await_ready().await;
    assert_eq!(backend.endpoint(), "https://abc.supabase.co");

    // A second run resolves again but cannot replace the published handle.
    assert!(!initialize(&config, &gate));
    assert!(Arc::ptr_eq(&gate.await_ready().await, &backend));
}

#[tokio::test]
async fn test_initialize_failure_publishes_nothing() {
    let config = AppConfig {
        credentials: CredentialSources {
            injected: Some(Credentials::new("not a url", "anon-key")),
            local_file: None,
        },
        ..AppConfig::default()
    };
    let gate = ReadinessGate::new();

    assert!(!initialize(&config, &gate));
    assert!(!gate.is_ready());
}
