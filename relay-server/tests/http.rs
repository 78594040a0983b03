use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use relay_core::RelayConfig;
use relay_server::{build, spawn_reaper};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "relay-http-boundary";

fn upload_request(payload: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"report.docx\"\r\n\
         Content-Type: application/vnd.openxmlformats-officedocument.wordprocessingml.document\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn one_second_config() -> RelayConfig {
    RelayConfig::default()
        .with_public_base_url("http://localhost:3000")
        .with_ttl(Duration::from_secs(1))
}

#[tokio::test]
async fn one_second_ttl_upload_expires() {
    let ax = build(one_second_config());

    let res = ax.router.clone().oneshot(upload_request(&[0xAB; 1024])).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let id = json_body(res).await["id"].as_str().unwrap().to_string();

    let res = ax.router.clone().oneshot(get(&format!("/f/{id}"))).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers()["content-length"], "1024");
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.len(), 1024);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let res = ax.router.clone().oneshot(get(&format!("/f/{id}"))).await.unwrap();
    assert_eq!(res.status().as_u16(), 404);
    assert_eq!(json_body(res).await, json!({"error": "not_found"}));

    let res = ax.router.clone().oneshot(get(&format!("/progress/{id}"))).await.unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn reaper_retires_blobs_nobody_reads() {
    let config = one_second_config().with_sweep_interval(Duration::from_secs(1));
    let ax = build(config);
    let reaper = spawn_reaper(&ax.state);

    let res = ax.router.clone().oneshot(upload_request(b"unread")).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(ax.state.adapter.store().len(), 1);

    tokio::time::sleep(Duration::from_millis(2200)).await;
    reaper.abort();

    assert!(ax.state.adapter.store().is_empty());
    assert!(ax.state.adapter.tracker().is_empty());
}

#[tokio::test]
async fn config_reflects_ttl_in_whole_minutes() {
    let ax = build(RelayConfig::default().with_ttl(Duration::from_secs(150)));

    let res = ax.router.clone().oneshot(get("/config")).await.unwrap();
    let body = json_body(res).await;
    assert_eq!(body["ttlMinutes"], 2);
    assert_eq!(body["maxFileMb"], 5);
}
