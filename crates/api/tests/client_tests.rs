use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use hudl_api::{EndpointConfig, InferenceClient, InferenceTransport, TransportError};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<(String, HeaderMap, Option<Value>)>>>,
}

async fn probe_handler(State(recorded): State<Recorded>, headers: HeaderMap) -> Json<Value> {
    recorded.requests.lock().unwrap().push(("GET".into(), headers, None));
    Json(json!({ "body": { "output": "warm" } }))
}

async fn predict_handler(State(recorded): State<Recorded>, headers: HeaderMap, Json(payload): Json<Value>) -> Json<Value> {
    recorded
        .requests
        .lock()
        .unwrap()
        .push(("POST".into(), headers, Some(payload.clone())));
    Json(json!({
        "statusCode": 200,
        "body": { "output": { "sentiment": [["positive", 87.3], ["negative", 12.7]], "echo": payload } }
    }))
}

async fn spawn_server(app: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });
    (addr, handle)
}

fn client_for(addr: SocketAddr, path: &str, api_key: Option<&str>) -> InferenceClient {
    let config = EndpointConfig::new(&format!("http://{addr}{path}"), api_key.map(str::to_string)).expect("config");
    InferenceClient::new(&config).expect("client")
}

#[tokio::test]
async fn probe_and_predict_send_expected_headers_and_unwrap_envelope() {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/predict", get(probe_handler).post(predict_handler))
        .with_state(recorded.clone());
    let (addr, handle) = spawn_server(app).await;
    let client = client_for(addr, "/predict", Some("key-123"));

    let probe_body = client.probe().await.expect("probe succeeds");
    assert_eq!(probe_body["body"]["output"], "warm");

    let output = client.predict(&json!("great day")).await.expect("predict succeeds");
    assert_eq!(output["sentiment"], json!([["positive", 87.3], ["negative", 12.7]]));
    assert_eq!(output["echo"], "great day");

    let requests = recorded.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    for (_, headers, _) in &requests {
        assert_eq!(headers.get("content-type").and_then(|v| v.to_str().ok()), Some("application/json"));
        assert_eq!(headers.get("accept").and_then(|v| v.to_str().ok()), Some("application/json"));
        assert_eq!(headers.get("x-api-key").and_then(|v| v.to_str().ok()), Some("key-123"));
    }
    assert_eq!(requests[0].0, "GET");
    assert_eq!(requests[1].0, "POST");
    assert_eq!(requests[1].2, Some(json!("great day")));

    handle.abort();
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let app = Router::new().route(
        "/predict",
        get(|| async { (StatusCode::FORBIDDEN, "denied") }).post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );
    let (addr, handle) = spawn_server(app).await;
    let client = client_for(addr, "/predict", None);

    let probe_error = client.probe().await.unwrap_err();
    assert!(matches!(probe_error, TransportError::Status { status: 403, ref message } if message.contains("HUDL_API_KEY")));

    let predict_error = client.predict(&json!({})).await.unwrap_err();
    assert_eq!(predict_error, TransportError::status(500, "model crashed"));

    handle.abort();
}

#[tokio::test]
async fn malformed_json_and_missing_output_are_errors() {
    let app = Router::new()
        .route("/broken", get(|| async { "not json" }).post(|| async { "{ \"body\": " }))
        .route("/bare", get(|| async { Json(json!({})) }).post(|| async { Json(json!({ "output": [1] })) }));
    let (addr, handle) = spawn_server(app).await;

    let broken = client_for(addr, "/broken", None);
    assert!(matches!(broken.probe().await, Err(TransportError::Decode { .. })));
    assert!(matches!(broken.predict(&json!({})).await, Err(TransportError::Decode { .. })));

    let bare = client_for(addr, "/bare", None);
    assert!(bare.probe().await.is_ok());
    assert_eq!(bare.predict(&json!({})).await, Err(TransportError::MissingOutput));

    handle.abort();
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, "/predict", None);
    assert!(matches!(client.predict(&json!({})).await, Err(TransportError::Network { .. })));
}
