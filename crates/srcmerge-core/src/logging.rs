use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize logging to stderr and, when `log_dir` is given, to
/// `srcmerge.log` inside it. stdout is left alone since it may carry the
/// merged source.
///
/// `RUST_LOG` takes precedence over `level`. The returned guard must be held
/// for the lifetime of the process so buffered file output is flushed.
pub fn init_logging(
    level: &str,
    log_dir: Option<&Path>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer())
            .try_init()?;
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)?;
    let file_appender = rolling::never(log_dir, "srcmerge.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(stderr_layer())
        .try_init()?;

    Ok(Some(guard))
}

fn stderr_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_layer_writes_into_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let guard = init_logging("debug", Some(&logs)).unwrap();
        tracing::info!("logging initialised");
        drop(guard);
        assert!(logs.join("srcmerge.log").exists());
    }
}
