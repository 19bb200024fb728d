//! End-to-end submission tests against a mock chain service.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use carbon_chain_bridge::ledger::{LedgerStatus, LedgerStore};

mod common;

#[tokio::test]
async fn test_submit_records_pending_and_forwards_payload() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_by_chain = seen.clone();
    let chain = common::start_programmable_chain(move |body| {
        seen_by_chain.lock().unwrap().push(body);
        async { (200, json!({"ok": true, "txHash": "0x1"}).to_string()) }
    })
    .await;
    let bridge = common::start_bridge(&format!("http://{}", chain), Some(common::SECRET)).await;

    let res = bridge
        .client
        .post(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .expect("Bridge unreachable");
    assert_eq!(res.status(), 202);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["emission_id"], 42);
    assert_eq!(body["chain_response"]["txHash"], "0x1");

    let sent = seen.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["emission_id"], 42);
    let payload = &sent[0]["payload"];
    assert_eq!(payload["product_id"], 3);
    assert_eq!(payload["organization_id"], 11);
    assert_eq!(payload["quantity"], 12.5);
    assert_eq!(payload["product_name"], "Oat milk 1L");
    assert_eq!(payload["tag_id"], Value::Null);
    assert_eq!(payload["timestamp"], "2024-03-01T08:30:00");

    // The bridge never learns the hash from the synchronous answer.
    let res = bridge
        .client
        .get(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let record: Value = res.json().await.unwrap();
    assert_eq!(record["emission_id"], 42);
    assert_eq!(record["status"], "pending");
    assert_eq!(record["tx_hash"], Value::Null);
}

#[tokio::test]
async fn test_upstream_rejection_leaves_record_pending() {
    let chain = common::start_programmable_chain(|_| async {
        (503, "maintenance".to_string())
    })
    .await;
    let bridge = common::start_bridge(&format!("http://{}", chain), Some(common::SECRET)).await;

    let res = bridge
        .client
        .post(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "chain-service HTTP error");
    assert_eq!(body["upstream_status"], 503);
    assert_eq!(body["body"], "maintenance");

    let record: Value = bridge
        .client
        .get(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(record["status"], "pending");
}

#[tokio::test]
async fn test_unreachable_chain_service() {
    let chain_url = common::closed_port_url().await;
    let bridge = common::start_bridge(&chain_url, Some(common::SECRET)).await;

    let res = bridge
        .client
        .post(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "chain-service unreachable");
    assert!(body["details"].is_string());

    // Pending was written before the network call.
    assert_eq!(bridge.ledger_rows(), 1);
}

#[tokio::test]
async fn test_stalled_chain_service_times_out_and_leaves_pending() {
    let chain = common::start_programmable_chain(|_| async {
        tokio::time::sleep(Duration::from_secs(4)).await;
        (200, json!({"ok": true}).to_string())
    })
    .await;
    let mut config = common::bridge_config(&format!("http://{}", chain), Some(common::SECRET));
    config.chain_service.read_timeout_secs = 1;
    let bridge = common::start_bridge_with(config).await;

    let start = Instant::now();
    let res = bridge
        .client
        .post(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    assert!(start.elapsed() < Duration::from_secs(3));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "chain-service unreachable");

    let record = bridge.ledger.get_status(42).unwrap().unwrap();
    assert_eq!(record.status, LedgerStatus::Pending);
    assert_eq!(record.tx_hash, None);
}

#[tokio::test]
async fn test_busy_database_does_not_stall_other_requests() {
    let chain_url = common::closed_port_url().await;
    let bridge = common::start_bridge(&chain_url, Some(common::SECRET)).await;

    // Another writer holds the connection for a while.
    let conn = bridge.conn.clone();
    let (locked_tx, locked_rx) = mpsc::channel();
    let holder = std::thread::spawn(move || {
        let _guard = conn.lock().unwrap();
        locked_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(1500));
    });
    locked_rx.recv().unwrap();

    let start = Instant::now();
    let waiting = tokio::spawn({
        let client = bridge.client.clone();
        let url = bridge.url("/onchain/emissions/42");
        async move { client.get(url).send().await.unwrap().status() }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let res = bridge.client.get(bridge.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(
        start.elapsed() < Duration::from_millis(1000),
        "health waited {:?} on the database lock",
        start.elapsed()
    );

    assert_eq!(waiting.await.unwrap(), 404);
    holder.join().unwrap();
}

#[tokio::test]
async fn test_unknown_emission_is_not_found() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let chain = common::start_programmable_chain(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { (200, "{}".to_string()) }
    })
    .await;
    let bridge = common::start_bridge(&format!("http://{}", chain), Some(common::SECRET)).await;

    let res = bridge
        .client
        .post(bridge.url("/onchain/emissions/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "emission not found");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(bridge.ledger_rows(), 0);
}

#[tokio::test]
async fn test_status_without_record_is_not_found() {
    let chain_url = common::closed_port_url().await;
    let bridge = common::start_bridge(&chain_url, Some(common::SECRET)).await;

    let res = bridge
        .client
        .get(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "no onchain record");
}

#[tokio::test]
async fn test_resubmission_resets_failed_record() {
    let chain = common::start_programmable_chain(|_| async {
        (200, json!({"ok": true}).to_string())
    })
    .await;
    let bridge = common::start_bridge(&format!("http://{}", chain), Some(common::SECRET)).await;

    let res = bridge
        .client
        .post(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 202);

    let res = bridge
        .callback(
            Some(common::SECRET),
            json!({"emission_id": 42, "status": "failed", "error_msg": "out of gas"}),
        )
        .await;
    assert_eq!(res.status(), 200);

    let first: Value = bridge
        .client
        .get(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["status"], "failed");
    assert_eq!(first["error_msg"], "out of gas");

    let res = bridge
        .client
        .post(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 202);

    let second: Value = bridge
        .client
        .get(bridge.url("/onchain/emissions/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["status"], "pending");
    assert_eq!(second["error_msg"], Value::Null);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(bridge.ledger_rows(), 1);
}

#[tokio::test]
async fn test_concurrent_submissions_keep_one_record() {
    let chain = common::start_programmable_chain(|_| async {
        (200, json!({"ok": true}).to_string())
    })
    .await;
    let bridge = common::start_bridge(&format!("http://{}", chain), Some(common::SECRET)).await;

    let requests = (0..10).map(|_| {
        bridge
            .client
            .post(bridge.url("/onchain/emissions/42"))
            .send()
    });
    let results = futures_util::future::join_all(requests).await;

    for res in results {
        assert_eq!(res.unwrap().status(), 202);
    }
    assert_eq!(bridge.ledger_rows(), 1);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let chain_url = common::closed_port_url().await;
    let bridge = common::start_bridge(&chain_url, None).await;

    let res = bridge.client.get(bridge.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["ok"], true);

    let res = bridge
        .client
        .get(bridge.url("/onchain/emissions/42"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.headers()["x-request-id"], "trace-me");
}
