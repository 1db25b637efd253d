use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

const FALLBACK_LEVEL: &str = "warn";

/// Фильтр из строки директив (`LOG_LEVEL`/`RUST_LOG`); некорректная строка
/// заменяется на `warn`.
fn build_filter(directives: &str) -> EnvFilter {
    let directives = directives.trim();
    if directives.is_empty() {
        return EnvFilter::new(FALLBACK_LEVEL);
    }
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Логи идут в stderr: stdout занят таблицами и JSON.
pub fn init_logging(directives: &str) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}
