use std::fs;

use anyhow::{Result, anyhow};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use imgest_app::{AppError, build_api};
use imgest_config::IngestConfig;
use imgest_config::defaults::UPLOAD_DIR_VAR;
use imgest_telemetry::Metrics;
use imgest_test_support::fixtures::temp_root;
use tower::ServiceExt;

fn config_for(upload_dir: String) -> Result<IngestConfig> {
    Ok(IngestConfig::from_lookup(|name| {
        (name == UPLOAD_DIR_VAR).then(|| upload_dir.clone())
    })?)
}

#[tokio::test]
async fn build_api_prepares_the_ingestion_root() -> Result<()> {
    let temp = temp_root()?;
    let root = temp.path().join("uploads");
    let config = config_for(root.display().to_string())?;

    let api = build_api(&config, Metrics::new()?)?;

    assert!(root.is_dir());
    let request = Request::builder().uri("/health").body(Body::empty())?;
    let response = api.router().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[test]
fn build_api_fails_when_the_root_is_a_file() -> Result<()> {
    let temp = temp_root()?;
    let blocker = temp.path().join("uploads");
    fs::write(&blocker, b"not a directory")?;
    let config = config_for(blocker.display().to_string())?;

    let err = build_api(&config, Metrics::new()?)
        .err()
        .ok_or_else(|| anyhow!("expected fsops failure"))?;

    assert!(matches!(
        err,
        AppError::FsOps {
            operation: "layout.ensure",
            ..
        }
    ));
    Ok(())
}
