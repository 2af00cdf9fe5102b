use std::path::{Path, PathBuf};

use algoviz::app::{App, Config};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log to a file, the terminal belongs to the visualization.
/// The returned guard flushes pending lines when dropped.
fn init_logging(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(log_dir, "algoviz.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

fn main() -> std::io::Result<()> {
    let log_dir = std::env::var_os(Config::ENV_LOG_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| Config::default().log_dir);
    let _guard = init_logging(&log_dir);
    let config = Config::from_env();
    tracing::info!("Starting algoviz, seed {:?}", config.seed);

    let app = App::default();
    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let result = app.run(&mut stdout, config);
    App::restore_terminal(&mut stdout)?;
    if let Err(e) = &result {
        tracing::error!("App exited with an error: {}", e);
    }
    result
}
