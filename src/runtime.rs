use ratewatch::config::LoggingConfig;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::EnvFilter;

pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.level)));

    let file_writer = file_writer_from_env();

    if config.json {
        let file_layer = file_writer.map(|w| {
            tracing_subscriber::fmt::layer()
                .with_writer(w)
                .with_ansi(false)
                .with_target(true)
        });
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .with(file_layer)
            .init();
    } else {
        let file_layer = file_writer.map(|w| {
            tracing_subscriber::fmt::layer()
                .with_writer(w)
                .with_ansi(false)
                .with_target(true)
        });
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(file_layer)
            .init();
    }
}

/// Optional daily-rotating file output, enabled by RATEWATCH_LOG_DIR.
///
/// Important: `tracing_appender::rolling::daily` will panic (and in our
/// release build, abort) if it can't create the initial log file. So we
/// must preflight writability.
fn file_writer_from_env() -> Option<NonBlocking> {
    let log_dir = std::env::var("RATEWATCH_LOG_DIR").ok()?;

    if std::fs::create_dir_all(&log_dir).is_err() {
        eprintln!(
            "Warning: Could not create log directory {}, file logging disabled",
            log_dir
        );
        return None;
    }

    let test_path = std::path::Path::new(&log_dir).join(".ratewatch_write_test");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&test_path)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&test_path);

            let file_appender = tracing_appender::rolling::daily(&log_dir, "ratewatch.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keep the guard alive by leaking it (acceptable for long-running process)
            Box::leak(Box::new(guard));

            eprintln!("Logging to: {}/ratewatch.log", log_dir);
            Some(non_blocking)
        }
        Err(e) => {
            eprintln!(
                "Warning: Could not write to log directory {} ({}), file logging disabled",
                log_dir, e
            );
            None
        }
    }
}

pub fn init_logging_simple() {
    // Minimal logging for CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
