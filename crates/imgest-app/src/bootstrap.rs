use std::sync::Arc;

use imgest_api::ApiServer;
use imgest_config::{IngestConfig, LogFormatSetting};
use imgest_drive::{DriveClient, LinkParser};
use imgest_fsops::IngestLayout;
use imgest_ingest::IngestService;
use imgest_telemetry::{LogFormat, LoggingConfig, Metrics};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

const BUILD_SHA: &str = match option_env!("IMGEST_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Dependencies required to bootstrap the service.
pub(crate) struct BootstrapDependencies {
    config: IngestConfig,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the process environment.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            IngestConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self { config, telemetry })
    }
}

/// Entry point for the boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, logging, dependency construction, or the
/// listener fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence over injected dependencies.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies { config, telemetry } = dependencies;
    let logging = logging_config(&config);
    imgest_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    info!(
        upload_dir = %config.upload_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        isolate_destinations = config.isolate_destinations,
        "imgest bootstrap starting"
    );

    let api = build_api(&config, telemetry)?;
    let addr = config.socket_addr();
    info!(addr = %addr, "launching upload api listener");
    api.serve_with_shutdown(addr, shutdown_signal())
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("upload api shutdown complete");
    Ok(())
}

/// Wire the ingestion root, Drive client, link parser, and router.
///
/// # Errors
///
/// Returns an error if the ingestion root cannot be created, the Drive client
/// rejects its settings, or the link patterns fail to compile.
pub fn build_api(config: &IngestConfig, telemetry: Metrics) -> AppResult<ApiServer> {
    let layout = IngestLayout::new(config.upload_dir.clone());
    layout
        .ensure()
        .map_err(|err| AppError::fsops("layout.ensure", err))?;

    if config.drive.api_key.is_none() {
        warn!("no drive api key configured; folder listings will be refused upstream");
    }
    let drive =
        DriveClient::new(&config.drive).map_err(|err| AppError::drive("drive.client", err))?;
    let links = LinkParser::new().map_err(|err| AppError::link("links.compile", err))?;

    let ingest = IngestService::new(layout, Arc::new(drive), links, telemetry.clone())
        .with_isolated_destinations(config.isolate_destinations);
    Ok(ApiServer::new(ingest, telemetry, config.max_upload_bytes))
}

fn logging_config(config: &IngestConfig) -> LoggingConfig<'_> {
    let format = match config.logging.format {
        Some(LogFormatSetting::Json) => LogFormat::Json,
        Some(LogFormatSetting::Pretty) => LogFormat::Pretty,
        None => LogFormat::infer(),
    };
    LoggingConfig {
        level: &config.logging.level,
        format,
        build_sha: BUILD_SHA,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to capture Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("ctrl-c received; draining"),
        () = terminate => info!("sigterm received; draining"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgest_config::defaults::{LOG_FORMAT_VAR, LOG_LEVEL_VAR};

    fn config(format: Option<&'static str>) -> AppResult<IngestConfig> {
        IngestConfig::from_lookup(|name| match name {
            LOG_LEVEL_VAR => Some("debug".to_string()),
            LOG_FORMAT_VAR => format.map(str::to_string),
            _ => None,
        })
        .map_err(|err| AppError::config("test.config", err))
    }

    #[test]
    fn logging_config_honours_explicit_format() -> AppResult<()> {
        let json = config(Some("json"))?;
        let logging = logging_config(&json);
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.build_sha, BUILD_SHA);

        let inferred = config(None)?;
        assert_eq!(logging_config(&inferred).format, LogFormat::infer());
        Ok(())
    }
}
