//! Wallet API Client Integration Tests
//!
//! Runs the reqwest client and the wallet store against a throwaway HTTP
//! server on localhost that answers from a fixed route table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use memetrader::adapters::http::WalletApiClient;
use memetrader::application::{StoreError, WalletStore};
use memetrader::domain::{ExportFormat, NewWallet, TradeRequest, TradeSide, WalletUpdate};
use memetrader::ports::mocks::RecordingNotifier;
use memetrader::ports::{ApiError, NoticeLevel, WalletApi};

// ============================================================================
// Canned backend
// ============================================================================

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    body: String,
}

impl Recorded {
    fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }
}

#[derive(Debug, Clone)]
struct Reply {
    status: u16,
    reason: &'static str,
    content_type: &'static str,
    body: String,
}

impl Reply {
    fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            reason: reason(status),
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    fn text(status: u16, content_type: &'static str, body: &str) -> Self {
        Self {
            status,
            reason: reason(status),
            content_type,
            body: body.to_string(),
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

struct Backend {
    base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Backend {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn client(&self) -> WalletApiClient {
        WalletApiClient::with_base_url(self.base_url.clone()).unwrap()
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(Recorded {
        method,
        target,
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    })
}

/// Start a backend. Routes are keyed by `"METHOD /path"` without the query.
async fn backend(routes: Vec<(&str, Reply)>) -> Backend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<String, Reply>> = Arc::new(
        routes
            .into_iter()
            .map(|(key, reply)| (key.to_string(), reply))
            .collect(),
    );
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = Arc::clone(&requests);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            let recorded = Arc::clone(&recorded);
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let key = format!("{} {}", request.method, request.path());
                recorded.lock().unwrap().push(request);

                let reply = routes
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| Reply::json(404, r#"{"error":"No such route"}"#));
                let head = format!(
                    "HTTP/1.1 {} {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    reply.status,
                    reply.reason,
                    reply.content_type,
                    reply.body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(reply.body.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Backend {
        base_url: format!("http://{}/api", addr),
        requests,
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn wallet_json(id: &str, name: &str, active: bool) -> String {
    format!(
        r#"{{"id":"{}","address":"0x{:0>40}","name":"{}","isActive":{},"createdAt":"2024-03-01T10:00:00Z","updatedAt":"2024-03-02T10:00:00Z"}}"#,
        id, id.len(), name, active
    )
}

const STATS_JSON: &str = r#"{"totalWallets":2,"activeWallets":1,"totalVolume":1520.5,"totalProfitLoss":-12.25,"totalTransactions":87}"#;

// ============================================================================
// Client
// ============================================================================

#[tokio::test]
async fn test_list_wallets_decodes_array() {
    let body = format!(
        "[{},{}]",
        wallet_json("w-1", "Whale", true),
        wallet_json("w-2", "Degen", false)
    );
    let server = backend(vec![("GET /api/wallets", Reply::json(200, &body))]).await;

    let wallets = server.client().list_wallets().await.unwrap();

    assert_eq!(wallets.len(), 2);
    assert_eq!(wallets[0].name, "Whale");
    assert!(!wallets[1].is_active);
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/api/wallets");
}

#[tokio::test]
async fn test_create_wallet_sends_camel_case_body() {
    let server = backend(vec![(
        "POST /api/wallets",
        Reply::json(201, &wallet_json("w-9", "Sniper", true)),
    )])
    .await;

    let created = server
        .client()
        .create_wallet(&NewWallet::new("0xabc", "Sniper"))
        .await
        .unwrap();
    assert_eq!(created.id, "w-9");

    let sent: serde_json::Value = serde_json::from_str(&server.requests()[0].body).unwrap();
    assert_eq!(sent["address"], "0xabc");
    assert_eq!(sent["name"], "Sniper");
    assert!(sent.get("description").is_none());
}

#[tokio::test]
async fn test_update_sends_only_set_fields() {
    let server = backend(vec![(
        "PUT /api/wallets/w-1",
        Reply::json(200, &wallet_json("w-1", "Whale", false)),
    )])
    .await;

    let update = WalletUpdate {
        is_active: Some(false),
        ..WalletUpdate::default()
    };
    server.client().update_wallet("w-1", &update).await.unwrap();

    let sent: serde_json::Value = serde_json::from_str(&server.requests()[0].body).unwrap();
    assert_eq!(sent, serde_json::json!({ "isActive": false }));
}

#[tokio::test]
async fn test_error_field_becomes_message() {
    let server = backend(vec![(
        "GET /api/wallets/missing",
        Reply::json(404, r#"{"error":"Wallet not found"}"#),
    )])
    .await;

    let err = server.client().get_wallet("missing").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Http {
            status: 404,
            message: "Wallet not found".into()
        }
    );
    assert_eq!(err.user_message(), "Wallet not found");
}

#[tokio::test]
async fn test_plain_and_empty_error_bodies() {
    let server = backend(vec![
        (
            "GET /api/dashboard/stats",
            Reply::text(500, "text/plain", "database offline"),
        ),
        ("DELETE /api/wallets/w-1", Reply::text(500, "text/plain", "")),
    ])
    .await;
    let client = server.client();

    let err = client.dashboard_stats().await.unwrap_err();
    assert_eq!(err.user_message(), "database offline");

    let err = client.delete_wallet("w-1").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Http {
            status: 500,
            message: "Internal Server Error".into()
        }
    );
}

#[tokio::test]
async fn test_query_parameters_pass_through() {
    let server = backend(vec![
        ("GET /api/wallets/search", Reply::json(200, "[]")),
        (
            "GET /api/wallets/w-1/transactions",
            Reply::json(200, r#"{"transactions":[],"nextCursor":null}"#),
        ),
        (
            "GET /api/wallets/w-1/performance",
            Reply::json(200, r#"{"period":"7d","profitLoss":4.5,"roi":12.0,"trades":9,"winRate":66.6}"#),
        ),
        ("GET /api/recent-trades", Reply::json(200, "[]")),
    ])
    .await;
    let client = server.client();

    client.search_wallets("pepe whale").await.unwrap();
    client
        .wallet_transactions("w-1", Some("opaque:abc"), Some(20))
        .await
        .unwrap();
    let perf = client.wallet_performance("w-1", Some("7d")).await.unwrap();
    client.recent_trades(Some(5)).await.unwrap();

    assert_eq!(perf.trades, 9);
    let targets: Vec<String> = server.requests().into_iter().map(|r| r.target).collect();
    assert_eq!(
        targets,
        vec![
            "/api/wallets/search?q=pepe+whale",
            "/api/wallets/w-1/transactions?cursor=opaque%3Aabc&limit=20",
            "/api/wallets/w-1/performance?period=7d",
            "/api/recent-trades?limit=5",
        ]
    );
}

#[tokio::test]
async fn test_export_returns_raw_bytes() {
    let csv = "id,name,address\nw-1,Whale,0xabc\n";
    let server = backend(vec![(
        "GET /api/wallets/export",
        Reply::text(200, "text/csv", csv),
    )])
    .await;

    let bytes = server.client().export_wallets(ExportFormat::Csv).await.unwrap();
    assert_eq!(bytes, csv.as_bytes());
    assert_eq!(server.requests()[0].target, "/api/wallets/export?format=csv");
}

#[tokio::test]
async fn test_trade_round_trip() {
    let server = backend(vec![(
        "POST /api/trade",
        Reply::json(
            200,
            r#"{"id":"t-1","tokenSymbol":"PEPE","side":"buy","amount":1000.0,"price":0.0000011,"timestamp":"2024-03-01T10:00:00Z"}"#,
        ),
    )])
    .await;

    let request = TradeRequest::new("0xpepe", TradeSide::Buy, 1000.0).from_wallet("0xme");
    let record = server.client().execute_trade(&request).await.unwrap();
    assert_eq!(record.side, TradeSide::Buy);

    let sent: serde_json::Value = serde_json::from_str(&server.requests()[0].body).unwrap();
    assert_eq!(sent["tokenAddress"], "0xpepe");
    assert_eq!(sent["walletAddress"], "0xme");
    assert_eq!(sent["side"], "buy");
}

#[tokio::test]
async fn test_invalid_trade_never_sent() {
    let server = backend(vec![]).await;
    let request = TradeRequest::new("0xpepe", TradeSide::Sell, 0.0);
    let err = server.client().execute_trade(&request).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_undecodable_body() {
    let server = backend(vec![("GET /api/wallets", Reply::json(200, "{\"not\":\"a list\"}"))]).await;
    let err = server.client().list_wallets().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = WalletApiClient::with_base_url(format!("http://{}/api", addr)).unwrap();
    let err = client.list_wallets().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

// ============================================================================
// Store over HTTP
// ============================================================================

#[tokio::test]
async fn test_store_lifecycle_over_http() {
    let list = format!("[{}]", wallet_json("w-1", "Whale", true));
    let server = backend(vec![
        ("GET /api/wallets", Reply::json(200, &list)),
        ("GET /api/dashboard/stats", Reply::json(200, STATS_JSON)),
        (
            "POST /api/wallets",
            Reply::json(201, &wallet_json("w-2", "Degen", true)),
        ),
        ("DELETE /api/wallets/w-1", Reply::text(204, "text/plain", "")),
    ])
    .await;
    let notifier = RecordingNotifier::new();
    let store = WalletStore::new(server.client(), notifier.clone());

    store.load().await.unwrap();
    let state = store.snapshot().await;
    assert_eq!(state.wallets.len(), 1);
    assert_eq!(state.stats.unwrap().total_transactions, 87);
    assert!(!state.loading);

    store.add_wallet(NewWallet::new("0xdegen", "Degen")).await.unwrap();
    store.delete_wallet("w-1").await.unwrap();

    let ids: Vec<String> = store.wallets().await.into_iter().map(|w| w.id).collect();
    assert_eq!(ids, vec!["w-2"]);
    assert!(store.error().await.is_none());

    let mut paths: Vec<String> = server
        .requests()
        .iter()
        .map(|r| format!("{} {}", r.method, r.path()))
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "DELETE /api/wallets/w-1",
            "GET /api/dashboard/stats",
            "GET /api/wallets",
            "POST /api/wallets",
        ]
    );
    assert_eq!(notifier.notices().len(), 2);
}

#[tokio::test]
async fn test_store_surfaces_backend_error() {
    let server = backend(vec![(
        "POST /api/wallets",
        Reply::json(400, r#"{"error":"Address already tracked"}"#),
    )])
    .await;
    let notifier = RecordingNotifier::new();
    let store = WalletStore::new(server.client(), notifier.clone());

    let err = store
        .add_wallet(NewWallet::new("0xabc", "Dup"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Api(ApiError::Http { status: 400, .. })));
    assert_eq!(store.error().await.as_deref(), Some("Address already tracked"));
    assert!(store.wallets().await.is_empty());
    assert!(!store.is_loading().await);

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].body.as_deref(), Some("Address already tracked"));
}
