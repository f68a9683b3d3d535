#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use axum::http::StatusCode;

use common::{file_config, get, post, post_json};
use metrix_server::{app_state::AppState, persistence::RestoreReport, router};

async fn boot(cfg: metrix_server::config::ServerConfig) -> (AppState, axum::Router, RestoreReport) {
    let state = AppState::new(cfg).unwrap();
    let report = state.restore_if_enabled().await;
    let app = router::build_router(state.clone());
    (state, app, report)
}

#[tokio::test]
async fn synchronous_policy_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.json");
    let cfg = file_config(&path, 0, true);

    let (_, app, report) = boot(cfg.clone()).await;
    assert_eq!(report, RestoreReport::default());

    post(&app, "/update/counter/hits/5").await;
    post(&app, "/update/counter/hits/3").await;
    post(&app, "/update/gauge/temp/37.1").await;
    post_json(&app, "/update/", r#"{"id":"load","type":"gauge","value":0.5}"#).await;
    let before = get(&app, "/").await.1;

    // written on every mutation, no flush needed
    assert!(path.exists());
    drop(app);

    let (_, app, report) = boot(cfg).await;
    assert_eq!(report, RestoreReport { gauges: 2, counters: 1, skipped: 0 });
    assert_eq!(get(&app, "/").await, (StatusCode::OK, before));
    assert_eq!(get(&app, "/value/counter/hits").await.1, "8");

    // restored counters keep accumulating from the restored value
    post(&app, "/update/counter/hits/2").await;
    assert_eq!(get(&app, "/value/counter/hits").await.1, "10");
}

#[tokio::test]
async fn periodic_policy_flushes_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.json");
    let cfg = file_config(&path, 3600, true);

    let (state, app, _) = boot(cfg.clone()).await;
    post(&app, "/update/gauge/temp/36.6").await;
    // no per-write snapshot under the periodic policy
    assert!(!path.exists());

    state.persistence().flush().await;
    assert!(path.exists());
    drop((state, app));

    let (_, app, _) = boot(cfg).await;
    assert_eq!(get(&app, "/value/gauge/temp").await.1, "36.6");
}

#[tokio::test]
async fn restore_disabled_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.json");

    let (_, app, _) = boot(file_config(&path, 0, true)).await;
    post(&app, "/update/counter/hits/5").await;
    drop(app);

    let (_, app, report) = boot(file_config(&path, 0, false)).await;
    assert_eq!(report, RestoreReport::default());
    assert_eq!(get(&app, "/value/counter/hits").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn corrupt_snapshot_keeps_valid_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.json");
    std::fs::write(
        &path,
        concat!(
            "{\"id\":\"hits\",\"type\":\"counter\",\"delta\":42}\n",
            "{\"id\":\"half\",\"type\":\"gau\n",
            "{\"id\":\"temp\",\"type\":\"gauge\"}\n",
            "{\"id\":\"load\",\"type\":\"gauge\",\"value\":0.25}\n",
        ),
    )
    .unwrap();

    let (_, app, report) = boot(file_config(&path, 0, true)).await;
    assert_eq!(report, RestoreReport { gauges: 1, counters: 1, skipped: 2 });
    assert_eq!(get(&app, "/").await.1, "hits: 42\n\nload: 0.25");
}

#[tokio::test]
async fn unwritable_target_does_not_fail_requests() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let path = blocker.join("metrics.json");

    let (_, app, report) = boot(file_config(&path, 0, true)).await;
    assert_eq!(report, RestoreReport::default());

    assert_eq!(post(&app, "/update/counter/hits/1").await.0, StatusCode::OK);
    assert_eq!(get(&app, "/value/counter/hits").await.1, "1");
    assert_eq!(get(&app, "/ping").await.0, StatusCode::INTERNAL_SERVER_ERROR);
}
