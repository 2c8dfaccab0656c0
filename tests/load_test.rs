//! Concurrent callers sharing one guard and breaker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use session_guard::session::RevocationGuard;
use session_guard::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

mod common;
use common::{Behavior, ScriptedProvider, ScriptedStore};

fn shared_guard(store: Arc<ScriptedStore>) -> Arc<RevocationGuard> {
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        name: "load".into(),
        failure_threshold: 5,
        cooldown: Duration::from_secs(60),
    }));
    Arc::new(RevocationGuard::new(breaker, ScriptedProvider::new(store)))
}

async fn flood(guard: Arc<RevocationGuard>, concurrency: usize, per_task: usize) -> Vec<bool> {
    let mut tasks = Vec::new();
    for t in 0..concurrency {
        let guard = guard.clone();
        tasks.push(tokio::spawn(async move {
            let mut results = Vec::with_capacity(per_task);
            for i in 0..per_task {
                results.push(guard.is_token_revoked(&format!("sess-{}-{}", t, i)).await);
            }
            results
        }));
    }

    let mut all = Vec::new();
    for task in tasks {
        all.extend(task.await.unwrap());
    }
    all
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failures_all_fail_closed() {
    let store = ScriptedStore::new(Behavior::Failing);
    let guard = shared_guard(store.clone());

    let start = Instant::now();
    let results = flood(guard.clone(), 20, 50).await;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 1000);
    assert!(results.iter().all(|revoked| *revoked), "every failure must read as revoked");
    assert_eq!(guard.breaker_state(), CircuitState::Open);
    assert!(store.calls() >= 5);
    assert!(store.calls() < 1000, "open circuit must shed load, got {} calls", store.calls());

    println!("1000 checks in {:?}, {} reached the store", elapsed, store.calls());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_healthy_checks() {
    let store = ScriptedStore::new(Behavior::Absent);
    let guard = shared_guard(store.clone());

    let results = flood(guard.clone(), 20, 50).await;

    assert!(results.iter().all(|revoked| !*revoked));
    assert_eq!(store.calls(), 1000);
    assert_eq!(guard.breaker_state(), CircuitState::Closed);
    assert_eq!(guard.breaker().failure_count(), 0);
}
