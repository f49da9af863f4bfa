use crate::config::types::{Config, CrawlerConfig, ExtractionConfig, OutputConfig, Site};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_extraction_config(&config.extraction)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_iterations < 1 {
        return Err(ConfigError::Validation(format!(
            "max-iterations must be >= 1, got {}",
            config.max_iterations
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be >= 1".to_string(),
        ));
    }

    for ext in &config.exclude_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "exclude-extensions entries must look like '.png', got '{}'",
                ext
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (key, path) in [
        ("scrape-dir", &config.scrape_dir),
        ("process-dir", &config.process_dir),
        ("credentials-dir", &config.credentials_dir),
        ("results-dir", &config.results_dir),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    Ok(())
}

/// Validates extraction service configuration
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid extraction base-url: {}", e)))?;

    if config.model.is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    if config.max_input_chars == 0 {
        return Err(ConfigError::Validation(
            "max-input-chars must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the `[[site]]` entries
fn validate_sites(sites: &[Site]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] entry is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for site in sites {
        validate_site_name(&site.name)?;

        if !seen.insert(site.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name '{}'",
                site.name
            )));
        }

        let url = Url::parse(&site.domain).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid domain for site '{}': {}", site.name, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Domain '{}' must use http or https",
                site.domain
            )));
        }
    }

    Ok(())
}

/// Site names become file names, so they are restricted to a safe alphabet
fn validate_site_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "site name must contain only ASCII letters, digits, '-' or '_', got '{}'",
            name
        )));
    }

    Ok(())
}
