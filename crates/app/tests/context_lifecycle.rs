//! Integration tests for AppContext lifecycle
//!
//! Each test runs the real adapters against a wiremock backend: auth check,
//! scheduler start, the first reconciliation and shutdown.

use std::time::Duration;

use serde_json::json;
use taskboard_app::AppContext;
use taskboard_core::SnapshotStore;
use taskboard_domain::{Board, ColumnId, Config};
use taskboard_infra::SqliteSnapshotRepository;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn backend(authenticated: bool) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authenticated": authenticated
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(header("authorization", "Bearer sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "title": "Write report", "status": "needsAction"},
            {"id": "t2", "title": "File taxes", "status": "completed"}
        ])))
        .mount(&server)
        .await;

    server
}

fn config_for(server: &MockServer, token: Option<&str>) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout_seconds = 5;
    config.api.session_token = token.map(str::to_string);
    config
}

async fn wait_for_items(ctx: &AppContext, count: usize) -> Board {
    let mut renders = ctx.board.subscribe();
    let board = tokio::time::timeout(
        Duration::from_secs(5),
        renders.wait_for(|board| board.len() == count),
    )
    .await
    .expect("board should render in time")
    .expect("board channel open")
    .clone();
    board
}

#[tokio::test(flavor = "multi_thread")]
async fn test_signed_in_context_syncs_on_start() {
    let server = backend(true).await;
    let ctx = AppContext::new_with_config(config_for(&server, Some("sess-1"))).unwrap();

    ctx.start().await.expect("start should succeed");
    assert!(ctx.board.is_authenticated());
    assert!(ctx.is_scheduler_running().await);

    let board = wait_for_items(&ctx, 2).await;
    assert_eq!(board.column(ColumnId::Todo).len(), 1);
    assert_eq!(board.column(ColumnId::Done).len(), 1);
    assert_eq!(board.column(ColumnId::Todo)[0].title, "Write report");

    ctx.shutdown().await.expect("shutdown should succeed");
    assert!(!ctx.is_scheduler_running().await);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_token_starts_signed_out() {
    let server = backend(true).await;
    let ctx = AppContext::new_with_config(config_for(&server, None)).unwrap();

    ctx.start().await.expect("start should succeed");

    assert!(!ctx.board.is_authenticated());
    assert!(ctx.board.board().is_empty());
    assert!(ctx.is_scheduler_running().await);

    ctx.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_reporting_signed_out() {
    let server = backend(false).await;
    let ctx = AppContext::new_with_config(config_for(&server, Some("sess-1"))).unwrap();

    assert!(!ctx.refresh_auth().await.unwrap());
    assert!(!ctx.board.is_authenticated());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_backend_does_not_block_start() {
    let mut config = Config::default();
    // Nothing listens on the discard port.
    config.api.base_url = "http://127.0.0.1:9".into();
    config.api.timeout_seconds = 1;
    config.api.session_token = Some("sess-1".into());

    let ctx = AppContext::new_with_config(config).unwrap();

    ctx.start().await.expect("start should tolerate a failed auth check");
    assert!(!ctx.board.is_authenticated());

    ctx.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sign_in_then_sign_out() {
    let server = backend(true).await;
    let ctx = AppContext::new_with_config(config_for(&server, None)).unwrap();
    ctx.start().await.unwrap();

    assert!(ctx.sign_in("sess-1").await.unwrap());
    wait_for_items(&ctx, 2).await;

    ctx.sign_out();
    assert!(!ctx.board.is_authenticated());
    assert!(ctx.board.board().is_empty());

    ctx.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_snapshot_written_while_signed_in_and_cleared_on_sign_out() {
    let server = backend(true).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("board.db");

    let mut config = config_for(&server, Some("sess-1"));
    config.storage.snapshot_path = Some(db_path.to_string_lossy().to_string());
    let key = config.storage.snapshot_key.clone();

    let ctx = AppContext::new_with_config(config).unwrap();
    ctx.start().await.unwrap();
    wait_for_items(&ctx, 2).await;

    let repo = SqliteSnapshotRepository::open(&db_path).unwrap();
    let mut saved = None;
    for _ in 0..50 {
        saved = repo.load(&key).unwrap();
        if saved.as_ref().is_some_and(|board| board.len() == 2) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(saved.map(|board| board.len()), Some(2));

    ctx.sign_out();
    assert_eq!(repo.load(&key).unwrap(), None);

    ctx.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shutdown_is_idempotent() {
    let server = backend(true).await;
    let ctx = AppContext::new_with_config(config_for(&server, Some("sess-1"))).unwrap();

    ctx.shutdown().await.expect("shutdown before start is fine");
    ctx.start().await.unwrap();
    ctx.shutdown().await.unwrap();
    ctx.shutdown().await.expect("second shutdown is fine");
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let mut config = Config::default();
    config.api.base_url = "ftp://example.com".into();

    assert!(AppContext::new_with_config(config).is_err());
}
