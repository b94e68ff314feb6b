//! End-to-end tests for the matchmaking SDK
//!
//! These tests run the SDK over real HTTP against the fake backend:
//! - Join, poll until matched, leave
//! - Give-up after repeated backend failures
//! - Pool stats subscription lifecycle
//! - Concurrent joins through one shared SDK
//! - Configuration driven construction

mod fixtures;

use axum::http::StatusCode;
use replay_matchmaking::config::AppConfig;
use replay_matchmaking::metrics::MetricsCollector;
use replay_matchmaking::polling::{PollCallbacks, PollOptions, PollPhase};
use replay_matchmaking::types::{JoinQueueRequest, QueuePreferences, SessionStatus};
use replay_matchmaking::MatchmakingSdk;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use fixtures::FakeBackend;

fn fast_options() -> PollOptions {
    PollOptions {
        initial_interval: Duration::from_millis(20),
        max_interval: Duration::from_millis(80),
        max_retries: 3,
    }
}

fn sdk_for(backend: &FakeBackend, metrics: Option<Arc<MetricsCollector>>) -> MatchmakingSdk {
    let mut config = AppConfig::default();
    config.api.base_url = backend.base_url.clone();
    config.api.auth_token = Some("integration-token".to_string());
    MatchmakingSdk::from_config(&config, metrics)
        .unwrap()
        .with_poll_options(fast_options())
}

fn searching_body(elapsed: u64, position: u32) -> serde_json::Value {
    json!({
        "session_id": "sess-1",
        "status": "searching",
        "elapsed_time": elapsed,
        "estimated_wait": 30,
        "queue_position": position
    })
}

#[tokio::test]
async fn test_complete_queue_workflow() {
    let backend = FakeBackend::start().await;
    backend.state.push_status(StatusCode::OK, searching_body(1, 5));
    backend.state.push_status(StatusCode::OK, searching_body(2, 2));
    backend.state.push_status(
        StatusCode::OK,
        json!({
            "session_id": "sess-1",
            "status": "matched",
            "elapsed_time": 3,
            "estimated_wait": 0,
            "match_id": "m-1"
        }),
    );
    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let sdk = sdk_for(&backend, Some(metrics.clone()));

    // Step 1: join
    let mut preferences = QueuePreferences::new("cs2", "competitive", "eu-west");
    preferences.tier = "pro".to_string();
    let session = sdk
        .join_queue(&JoinQueueRequest {
            player_id: "p1".to_string(),
            squad_id: Some("squad-9".to_string()),
            preferences,
            player_mmr: 2100,
        })
        .await
        .unwrap();
    assert_eq!(session.session_id, "sess-1");

    // Step 2: poll until a terminal status arrives
    let (tx, mut rx) = mpsc::unbounded_channel();
    sdk.start_polling(
        &session.session_id,
        PollCallbacks::new(move |update| {
            let _ = tx.send(update);
        }),
    )
    .unwrap();

    let mut statuses = Vec::new();
    while let Some(update) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
    {
        statuses.push(update.status);
        if update.status.is_terminal() {
            assert_eq!(update.match_id.as_deref(), Some("m-1"));
            break;
        }
    }
    assert_eq!(
        statuses,
        vec![
            SessionStatus::Searching,
            SessionStatus::Searching,
            SessionStatus::Matched
        ]
    );
    assert!(!sdk.is_polling());
    assert_eq!(sdk.poll_snapshot().phase, PollPhase::Stopped);

    // Step 3: leave
    sdk.leave_queue(&session.session_id).await.unwrap();
    assert_eq!(
        backend.state.left_sessions.lock().unwrap().clone(),
        vec!["sess-1".to_string()]
    );

    let body = backend.state.join_bodies.lock().unwrap()[0].clone();
    assert_eq!(body["squad_id"], "squad-9");
    assert_eq!(body["preferences"]["tier"], "pro");
    assert!(backend
        .state
        .auth_headers
        .lock()
        .unwrap()
        .iter()
        .all(|header| header.as_deref() == Some("Bearer integration-token")));
    assert_eq!(
        metrics
            .polling()
            .terminal_statuses_total
            .with_label_values(&["matched"])
            .get(),
        1
    );

    println!("✅ Complete queue workflow test passed");
}

#[tokio::test]
async fn test_polling_gives_up_on_failing_backend() {
    let backend = FakeBackend::start().await;
    for _ in 0..10 {
        backend
            .state
            .push_status(StatusCode::BAD_GATEWAY, json!({"error": "upstream"}));
    }
    let sdk = sdk_for(&backend, None);

    let (tx, mut rx) = mpsc::unbounded_channel();
    sdk.start_polling(
        "sess-1",
        PollCallbacks::new(|_| {}).on_error(move |err, retry_count| {
            let _ = tx.send((err.http_status(), retry_count));
        }),
    )
    .unwrap();

    // The sender lives in the loop's callbacks; closing means the loop ended
    let mut errors = Vec::new();
    while let Some(error) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
    {
        errors.push(error);
    }

    assert_eq!(errors, vec![(Some(502), 1), (Some(502), 2)]);
    assert!(!sdk.is_polling());
    let snapshot = sdk.poll_snapshot();
    assert_eq!(snapshot.phase, PollPhase::Stopped);
    assert_eq!(snapshot.retry_count, 3);
    assert_eq!(
        backend
            .state
            .status_requests
            .load(std::sync::atomic::Ordering::SeqCst),
        3
    );

    println!("✅ Polling give-up test passed");
}

#[tokio::test]
async fn test_pool_subscription_lifecycle() {
    let backend = FakeBackend::start().await;
    let sdk = sdk_for(&backend, None);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut subscription = sdk
        .subscribe_to_pool_updates_every(
            "cs2",
            Some("competitive"),
            None,
            Duration::from_millis(50),
            move |stats| {
                let _ = tx.send(stats);
            },
        )
        .unwrap();

    for _ in 0..2 {
        let stats = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.game_id, "cs2");
        assert_eq!(stats.game_mode, "competitive");
    }

    subscription.unsubscribe();
    assert!(!subscription.is_active());

    // The aborted task drops the callback and with it the sender
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while rx.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok());

    let queries = backend.state.pool_queries.lock().unwrap().clone();
    assert!(queries.len() >= 2);
    assert!(queries
        .iter()
        .all(|query| query.get("game_mode").map(String::as_str) == Some("competitive")));
}

#[tokio::test]
async fn test_concurrent_joins() {
    let backend = FakeBackend::start().await;
    let sdk = Arc::new(sdk_for(&backend, None));

    let mut handles = Vec::new();
    for i in 0..20 {
        let sdk = sdk.clone();
        handles.push(tokio::spawn(async move {
            sdk.join_queue(&JoinQueueRequest {
                player_id: format!("player-{}", i),
                squad_id: None,
                preferences: QueuePreferences::new("cs2", "competitive", "eu-west"),
                player_mmr: 1000 + i,
            })
            .await
        }));
    }

    let results = futures::future::join_all(handles).await;

    let successful = results
        .into_iter()
        .filter(|result| matches!(result, Ok(Ok(_))))
        .count();
    assert_eq!(successful, 20);
    assert_eq!(backend.state.join_bodies.lock().unwrap().len(), 20);

    println!("✅ Concurrent joins test passed: {} sessions", successful);
}

#[tokio::test]
async fn test_sdk_from_config_file() {
    let backend = FakeBackend::start().await;
    let dir = std::env::temp_dir().join(format!("replay-matchmaking-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("matchmaking.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[api]
base_url = "{}"
request_timeout_ms = 2500

[polling]
initial_interval_ms = 500
max_interval_ms = 4000
max_retries = 4
"#,
            backend.base_url
        ),
    )
    .unwrap();

    let config = AppConfig::from_file(&path).unwrap();
    let sdk = MatchmakingSdk::from_config(&config, None).unwrap();

    assert_eq!(
        sdk.poll_options(),
        PollOptions {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_millis(4_000),
            max_retries: 4,
        }
    );
    let stats = sdk.get_pool_stats("cs2", None, Some("eu-west")).await.unwrap();
    assert_eq!(stats.region, "eu-west");

    std::fs::remove_dir_all(&dir).unwrap();
}
