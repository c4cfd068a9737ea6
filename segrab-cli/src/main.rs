use std::{path::Path, sync::Arc, time::Duration, time::Instant};

use clap::Parser;
use error::AppError;
use segrab_engine::{DownloaderConfig, HlsProtocolBuilder, ProxyConfig, ProxyMode};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::writer::MakeWriterExt;

mod cli;
mod error;
mod utils;

use cli::CliArgs;
use utils::progress::ProgressManager;
use utils::{format_bytes, format_duration, parse_headers};

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        error!(error = ?e, "Download failed");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), AppError> {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false);

    let result = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            let subscriber = builder
                .with_writer(MakeWriterExt::and(std::io::stderr, Arc::new(file)))
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };
    result.map_err(|e| AppError::Initialization(e.to_string()))
}

fn proxy_from_args(args: &CliArgs) -> Result<ProxyMode, AppError> {
    let Some(proxy_url) = args.proxy.as_ref() else {
        if args.no_proxy {
            info!("All proxy settings disabled (--no-proxy flag)");
            return Ok(ProxyMode::Disabled);
        }
        return Ok(ProxyMode::System);
    };

    let proxy = match (&args.proxy_user, &args.proxy_pass) {
        (Some(username), Some(password)) => {
            ProxyConfig::new(proxy_url).with_credentials(username, password)
        }
        (None, None) => ProxyConfig::new(proxy_url),
        _ => {
            return Err(AppError::InvalidInput(
                "--proxy-user and --proxy-pass must be given together".to_string(),
            ));
        }
    };

    info!(
        proxy_url = %proxy_url,
        has_auth = proxy.credentials.is_some(),
        "Using explicit proxy configuration for downloads"
    );
    Ok(ProxyMode::Explicit(proxy))
}

/// CLI timeouts are whole seconds where 0 means unset.
fn seconds(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    let args = CliArgs::parse();

    init_logging(args.verbose, args.log_file.as_deref())?;

    info!(
        url = %args.url,
        output = %args.output.display(),
        concurrency = args.concurrency,
        "Starting HLS download"
    );

    let mut download_config = DownloaderConfig {
        request_timeout: seconds(args.timeout),
        connect_timeout: seconds(args.connect_timeout),
        read_timeout: seconds(args.read_timeout),
        proxy: proxy_from_args(&args)?,
        ..Default::default()
    }
    .with_headers(parse_headers(&args.headers));
    if let Some(user_agent) = &args.user_agent {
        download_config.user_agent = user_agent.clone();
    }

    let progress_manager = if args.show_progress {
        ProgressManager::new()
    } else {
        ProgressManager::new_disabled()
    };
    let progress = progress_manager.clone();

    let downloader = HlsProtocolBuilder::new()
        .with_base_config(download_config)
        .download_concurrency(args.concurrency as usize)
        .max_variant_depth(args.max_depth as usize)
        .on_progress(Arc::new(move |event| progress.handle_event(event)))
        .build()?;

    let start_time = Instant::now();
    let summary = match downloader.download(&args.url, &args.output).await {
        Ok(summary) => summary,
        Err(e) => {
            progress_manager.abandon();
            if matches!(e, segrab_engine::DownloadError::SegmentFetch { .. }) {
                error!(
                    output = %args.output.display(),
                    "Output file is incomplete and should be discarded"
                );
            }
            return Err(e.into());
        }
    };

    info!(
        url = %args.url,
        output = %args.output.display(),
        segments = summary.segments,
        size = %format_bytes(summary.bytes),
        elapsed = %format_duration(start_time.elapsed()),
        "HLS download complete"
    );
    Ok(())
}
