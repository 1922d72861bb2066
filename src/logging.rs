use once_cell::sync::OnceCell;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Routes `tracing` output to `<data dir>/<app_name>/logs/<app_name>.log`.
/// Only the first call installs a subscriber.
pub fn init_logging(app_name: &str) {
    if GUARD.get().is_some() {
        return;
    }
    let base = dirs_next::data_dir().unwrap_or_else(std::env::temp_dir);
    let log_dir = base.join(app_name).join("logs");
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log dir {:?}: {}", log_dir, e);
        return;
    }
    let file_appender = tracing_appender::rolling::never(&log_dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    if GUARD.set(guard).is_err() {
        return;
    }
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(false)
        .with_writer(non_blocking);
    if let Err(e) = subscriber.try_init() {
        eprintln!("Failed to init tracing subscriber: {e}");
        return;
    }

    tracing::debug!("logging initialized: log_dir={:?}", log_dir);
}
