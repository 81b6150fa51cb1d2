use crate::config::types::Config;
use crate::ConfigError;

/// Validates a parsed configuration
///
/// Rejects values the crawler cannot run with: a zero-width worker pool,
/// a zero retry budget, inverted delay ranges, or an empty user-agent pool.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.crawl.worker_count == 0 {
        return Err(ConfigError::Validation(
            "crawl.worker-count must be at least 1".to_string(),
        ));
    }

    if config.crawl.fetch_retries == 0 {
        return Err(ConfigError::Validation(
            "crawl.fetch-retries must be at least 1".to_string(),
        ));
    }

    for (name, range) in [
        ("crawl.page-delay", config.crawl.page_delay),
        ("crawl.retry-delay", config.crawl.retry_delay),
    ] {
        if range.min_ms > range.max_ms {
            return Err(ConfigError::Validation(format!(
                "{name}: min-ms ({}) exceeds max-ms ({})",
                range.min_ms, range.max_ms
            )));
        }
    }

    if config.session.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "session.user-agents must contain at least one entry".to_string(),
        ));
    }

    if config.session.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "session.request-timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.output.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output.data-dir must not be empty".to_string(),
        ));
    }

    Ok(())
}
