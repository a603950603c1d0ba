//! Wires configuration, files and the dispatcher into one validation run

use crate::config::RunConfig;
use crate::dispatcher::{DispatchSummary, Dispatcher};
use crate::error::ConfigError;
use crate::proxy::prober::ProxyProber;
use crate::sink::ResultSink;
use crate::Result;
use log::info;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::BufReader;

/// Run one validation cycle, printing results to stdout
pub async fn run(config: RunConfig) -> Result<DispatchSummary> {
    run_with_console(config, io::stdout()).await
}

/// Run one validation cycle, printing results to `console`.
///
/// Configuration problems are returned before any proxy is probed.
pub async fn run_with_console<C>(config: RunConfig, console: C) -> Result<DispatchSummary>
where
    C: Write + Send + 'static,
{
    config.validate()?;

    let proxies = tokio::fs::File::open(&config.proxy_list_path)
        .await
        .map_err(|source| ConfigError::ProxyList {
            path: config.proxy_list_path.clone(),
            source,
        })?;

    let output = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.output_path)
        .map_err(|source| ConfigError::Output {
            path: config.output_path.clone(),
            source,
        })?;

    let sink = Arc::new(ResultSink::new(console, output, config.echo_body));
    let prober = ProxyProber::from_config(&config);
    info!(
        "probing {} through proxies from {:?} (timeout {:?})",
        prober.target_url(),
        config.proxy_list_path,
        config.timeout
    );
    let dispatcher = Dispatcher::new(Arc::new(prober), sink, config.max_concurrency);
    info!("admitting up to {} probes at a time", dispatcher.max_concurrency());

    let summary = dispatcher.run(BufReader::new(proxies)).await;
    info!("results appended to {:?}", config.output_path);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_url_aborts_before_files() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output.txt");
        let config = RunConfig::default()
            .with_proxy_list(dir.path().join("proxy.txt"))
            .with_output(&output);

        let err = run_with_console(config, io::sink()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingUrl)
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_proxy_list_aborts() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output.txt");
        let config = RunConfig::new("http://example.com")
            .with_proxy_list(dir.path().join("absent.txt"))
            .with_output(&output);

        let err = run_with_console(config, io::sink()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ProxyList { .. })
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_unwritable_output_aborts() {
        let dir = TempDir::new().unwrap();
        let proxies = dir.path().join("proxy.txt");
        fs::write(&proxies, "socks5://u:p@127.0.0.1:1\n").unwrap();
        let config = RunConfig::new("http://example.com")
            .with_proxy_list(&proxies)
            .with_output(dir.path().join("missing-dir").join("output.txt"));

        let err = run_with_console(config, io::sink()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Output { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_list_creates_output_file() {
        let dir = TempDir::new().unwrap();
        let proxies = dir.path().join("proxy.txt");
        let output = dir.path().join("output.txt");
        fs::write(&proxies, "").unwrap();
        let config = RunConfig::new("http://example.com")
            .with_proxy_list(&proxies)
            .with_output(&output);

        let summary = run_with_console(config, io::sink()).await.unwrap();
        assert_eq!(summary, DispatchSummary::default());
        assert!(output.exists());
    }
}
