//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

use carbon_chain_bridge::config::BridgeConfig;
use carbon_chain_bridge::emissions::SqliteEmissionSource;
use carbon_chain_bridge::http::HttpServer;
use carbon_chain_bridge::ledger::SqliteLedgerStore;
use carbon_chain_bridge::lifecycle::{assemble, Shutdown};
use carbon_chain_bridge::storage::{self, SharedConnection};

pub const SECRET: &str = "test-webhook-secret";

#[allow(dead_code)]
type Reply = Pin<Box<dyn Future<Output = (u16, String)> + Send>>;
#[allow(dead_code)]
type Handler = Arc<dyn Fn(Value) -> Reply + Send + Sync>;

/// Start a mock chain service whose `/send` answers with `f(request body)`.
#[allow(dead_code)]
pub async fn start_programmable_chain<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let handler: Handler = Arc::new(move |body| -> Reply { Box::pin(f(body)) });

    async fn send(State(handler): State<Handler>, Json(body): Json<Value>) -> (StatusCode, String) {
        let (status, body) = handler(body).await;
        (StatusCode::from_u16(status).unwrap(), body)
    }

    let app = Router::new().route("/send", post(send)).with_state(handler);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A base URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// In-memory database with the emissions tables and two emissions (42, 43).
pub fn seeded_database() -> SharedConnection {
    let conn = storage::in_memory().unwrap();
    {
        let c = conn.lock().unwrap();
        c.execute_batch(
            "CREATE TABLE products (
                 id INTEGER PRIMARY KEY,
                 organization_id INTEGER NOT NULL,
                 type_id INTEGER,
                 name TEXT NOT NULL
             );
             CREATE TABLE emissions (
                 id INTEGER PRIMARY KEY,
                 product_id INTEGER NOT NULL REFERENCES products(id),
                 stage_id INTEGER NOT NULL,
                 factor_id INTEGER NOT NULL,
                 tag_id INTEGER,
                 quantity REAL NOT NULL,
                 created_by INTEGER NOT NULL,
                 sort_order INTEGER NOT NULL DEFAULT 0,
                 created_at TEXT
             );
             INSERT INTO products VALUES (3, 11, 2, 'Oat milk 1L');
             INSERT INTO emissions VALUES (42, 3, 1, 9, NULL, 12.5, 7, 0, '2024-03-01 08:30:00');
             INSERT INTO emissions VALUES (43, 3, 2, 9, 4, 3.25, 7, 1, NULL);",
        )
        .unwrap();
    }
    conn
}

/// A running bridge plus direct handles on its storage.
pub struct TestBridge {
    pub base_url: String,
    pub conn: SharedConnection,
    pub ledger: Arc<SqliteLedgerStore>,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestBridge {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn ledger_rows(&self) -> i64 {
        let c = self.conn.lock().unwrap();
        c.query_row("SELECT COUNT(*) FROM emissions_onchain", [], |r| r.get(0))
            .unwrap()
    }

    pub async fn callback(&self, secret: Option<&str>, body: Value) -> reqwest::Response {
        let mut req = self.client.put(self.url("/onchain/callback")).json(&body);
        if let Some(secret) = secret {
            req = req.header("X-Chain-Secret", secret);
        }
        req.send().await.expect("Bridge unreachable")
    }
}

impl Drop for TestBridge {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Test configuration pointing at `chain_base_url`, with short timeouts.
pub fn bridge_config(chain_base_url: &str, secret: Option<&str>) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.chain_service.base_url = chain_base_url.to_string();
    config.chain_service.connect_timeout_secs = 1;
    config.chain_service.read_timeout_secs = 5;
    config.webhook.secret = secret.map(str::to_string);
    config
}

/// Start the bridge against `chain_base_url` with the given webhook secret.
pub async fn start_bridge(chain_base_url: &str, secret: Option<&str>) -> TestBridge {
    start_bridge_with(bridge_config(chain_base_url, secret)).await
}

/// Start the bridge over a seeded database with an explicit configuration.
pub async fn start_bridge_with(config: BridgeConfig) -> TestBridge {
    let conn = seeded_database();
    let ledger = Arc::new(SqliteLedgerStore::new(conn.clone()).unwrap());
    let emissions = Arc::new(SqliteEmissionSource::new(conn.clone()));
    let state = assemble(&config, emissions, ledger.clone()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, state);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    TestBridge {
        base_url: format!("http://{}", addr),
        conn,
        ledger,
        client: reqwest::Client::builder().no_proxy().build().unwrap(),
        shutdown,
    }
}
