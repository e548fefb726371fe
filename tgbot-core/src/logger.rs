//! Tracing initialization for bot binaries.
//!
//! Console output always; when a log file path is given, the same fmt
//! output is teed to an append-mode file as well.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan,
    fmt::writer::MakeWriterExt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Installs the global tracing subscriber.
///
/// The level filter comes from RUST_LOG (e.g. info, debug, trace); unset
/// defaults to info. Load .env (dotenvy) before calling this, or RUST_LOG
/// from the file will not take effect. With `log_file_path` set, parent
/// directories are created and output goes to stdout and the file.
pub fn init_tracing(log_file_path: Option<&str>) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match log_file_path {
        Some(path) => {
            if let Some(dir) = Path::new(path).parent() {
                if !dir.as_os_str().is_empty() {
                    std::fs::create_dir_all(dir)?;
                }
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stdout.and(Arc::new(file)))
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_level(true);
            Registry::default().with(env_filter).with(fmt_layer).try_init()
        }
        None => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_level(true);
            Registry::default().with(env_filter).with(fmt_layer).try_init()
        }
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
