//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::TimeZone;
use http_body_util::BodyExt;
use repertoire_api::auth::AuthenticatedUser;
use repertoire_api::pipeline::{Collaborators, Pipeline, PipelineSettings};
use repertoire_api::routes;
use repertoire_api::state::AppState;
use repertoire_bus::BusConfig;
use repertoire_core::storage::DirectoryLayout;
use repertoire_test_support::{
    FakeSearchEngine, InMemoryCatalog, RecordingBroker, StaticTokenIssuer,
};
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "hook-secret";

/// A running pipeline with the router in front of it and handles on every
/// fake it talks to.
pub struct TestApp {
    pub router: Router,
    pub pipeline: Pipeline,
    pub catalog: Arc<InMemoryCatalog>,
    pub engine: Arc<FakeSearchEngine>,
    pub broker: RecordingBroker,
}

/// Fixed timestamp used across all integration tests.
pub fn fixed_time() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Builds the app with the same wiring as `main.rs`, backed by fakes.
/// Must be called inside a Tokio runtime.
pub fn spawn_app() -> TestApp {
    let catalog = Arc::new(InMemoryCatalog::new());
    let engine = Arc::new(FakeSearchEngine::new());
    let broker = RecordingBroker::new();

    let deps = Collaborators {
        artists: catalog.clone(),
        albums: catalog.clone(),
        songs: catalog.clone(),
        engine: engine.clone(),
        broker: Arc::new(broker.clone()),
        issuer: Arc::new(StaticTokenIssuer::new("broker-token")),
        paths: Arc::new(DirectoryLayout::default()),
    };
    let settings = PipelineSettings {
        bus: BusConfig {
            workers_per_queue: 2,
            max_deliveries: 10,
            redelivery_delay: Duration::from_millis(20),
        },
        ..PipelineSettings::default()
    };
    let pipeline = Pipeline::start(deps, settings).unwrap();
    let state = AppState::new(engine.clone(), pipeline.webhook.clone(), WEBHOOK_SECRET);

    TestApp {
        router: routes::router(state),
        pipeline,
        catalog,
        engine,
        broker,
    }
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within two seconds");
}

/// Send a GET request, optionally as `user`, and return the response.
pub async fn get_json(
    app: Router,
    uri: &str,
    user: Option<AuthenticatedUser>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.extension(user);
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// POST a webhook body with optional bearer `secret` and `content-encoding`.
pub async fn post_webhook(
    app: Router,
    body: Vec<u8>,
    secret: Option<&str>,
    encoding: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/search/index-webhook")
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header("authorization", format!("Bearer {secret}"));
    }
    if let Some(encoding) = encoding {
        builder = builder.header("content-encoding", encoding);
    }
    let request = builder.body(Body::from(body)).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Wraps `data` in a gzip member holding one stored deflate block.
pub fn gzip_stored(data: &[u8]) -> Vec<u8> {
    let len = u16::try_from(data.len()).unwrap();
    let mut out = vec![0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0xff];
    out.push(0x01);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(&crc32(data).to_le_bytes());
    out.extend_from_slice(&u32::from(len).to_le_bytes());
    out
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}
