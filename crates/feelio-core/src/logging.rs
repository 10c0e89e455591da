//! Tracing setup shared by the session binary and the gateway.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber: console on stderr plus an optional plain-text file sink.
///
/// `RUST_LOG` overrides `level` when set. Keep the returned guard alive for the life of the
/// process or buffered file lines are lost. Calling twice is a no-op.
pub fn init_logging(level: &str, log_file: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = if log_file.trim().is_empty() {
        (None, None)
    } else {
        let path = Path::new(log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "feelio.log".to_string());
        let _ = std::fs::create_dir_all(dir);
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
        (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        )
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        guard
    } else {
        None
    }
}
