//! End-to-end: a live timer firing against a mock messaging service.

use std::time::Duration;

use rusqlite::Connection;
use wablast_scheduler::{Dispatcher, JobStore, NewJob, Scheduler};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store() -> JobStore {
    JobStore::new(Connection::open_in_memory().unwrap()).unwrap()
}

async fn accepting_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/message/send-message"))
        .and(header("WABLAST-SOURCE", "crond"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": true,
            "message": "queued",
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn per_second_job_fires_and_records_history() {
    let server = accepting_server().await;
    let store = store();
    store.create(&NewJob {
        name: "heartbeat".to_string(),
        trigger: "send_message".to_string(),
        target: "Budi|628123456789".to_string(),
        message: "ping".to_string(),
        // 6-field form: every second.
        cron_expression: "* * * * * *".to_string(),
    });

    let scheduler = Scheduler::new(
        store.clone(),
        Dispatcher::new(server.uri()),
        chrono_tz::UTC,
        Duration::from_secs(20),
    );
    scheduler.reconcile();
    assert_eq!(scheduler.scheduled_count(), 1);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.cancel(1);

    let requests = server.received_requests().await.unwrap();
    assert!(!requests.is_empty());

    let history = store.recent_history(10);
    assert!(!history.is_empty());
    let row = &history[0];
    assert_eq!(row.job_name, "heartbeat");
    assert!(row.error_message.is_none());
    assert!(!row.execute_time.is_empty());
    assert!(!row.complete_time.is_empty());
}

#[tokio::test]
async fn invalid_expression_never_fires_or_records() {
    let server = accepting_server().await;
    let store = store();
    store.create(&NewJob {
        name: "broken".to_string(),
        trigger: "send_message".to_string(),
        target: "Budi|628123456789".to_string(),
        message: "ping".to_string(),
        cron_expression: "99 * * * *".to_string(),
    });

    let scheduler = Scheduler::new(
        store.clone(),
        Dispatcher::new(server.uri()),
        chrono_tz::UTC,
        Duration::from_secs(20),
    );
    scheduler.reconcile();
    assert_eq!(scheduler.scheduled_count(), 0);

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(store.recent_history(10).is_empty());
}

#[tokio::test]
async fn cancel_during_inflight_delivery_still_records_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/message/send-message"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(1500))
                .set_body_json(serde_json::json!({
                    "status": true,
                    "message": "queued",
                })),
        )
        .mount(&server)
        .await;

    let store = store();
    store.create(&NewJob {
        name: "slow-delivery".to_string(),
        trigger: "send_message".to_string(),
        target: "Budi|628123456789".to_string(),
        message: "ping".to_string(),
        cron_expression: "* * * * * *".to_string(),
    });

    let scheduler = Scheduler::new(
        store.clone(),
        Dispatcher::new(server.uri()),
        chrono_tz::UTC,
        Duration::from_secs(20),
    );
    scheduler.reconcile();

    // Wait until a fire has reached the server, then cancel mid-flight.
    let mut waited = Duration::ZERO;
    while server.received_requests().await.unwrap().is_empty() {
        assert!(waited < Duration::from_secs(3), "job never fired");
        tokio::time::sleep(Duration::from_millis(50)).await;
        waited += Duration::from_millis(50);
    }
    assert!(scheduler.cancel(1));
    assert_eq!(scheduler.scheduled_count(), 0);

    // The in-flight fire must run to completion and record its row.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    let history = store.recent_history(10);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].job_name, "slow-delivery");
    assert!(history[0].error_message.is_none());
}

#[tokio::test]
async fn shutdown_tears_down_armed_timers() {
    let server = accepting_server().await;
    let store = store();
    store.create(&NewJob {
        name: "daily".to_string(),
        trigger: "send_message".to_string(),
        target: "Budi|628123456789".to_string(),
        message: "ping".to_string(),
        cron_expression: "0 9 * * *".to_string(),
    });

    let scheduler = Scheduler::new(
        store,
        Dispatcher::new(server.uri()),
        chrono_tz::UTC,
        Duration::from_millis(50),
    );
    let (tx, rx) = tokio::sync::watch::channel(false);
    let probe = scheduler.clone();
    let run = tokio::spawn(scheduler.run(rx));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(probe.scheduled_count(), 1);

    tx.send(true).unwrap();
    run.await.unwrap();
    assert_eq!(probe.scheduled_count(), 0);
}
