use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, RegionFilter, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Upper bound for the detail worker pool
const MAX_DETAIL_CONCURRENCY: u32 = 16;

/// Validates the entire configuration
///
/// Region and province codes are passed through untouched; only the
/// remote registry knows what they mean.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    validate_regions(&config.regions)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.list_timeout_ms == Some(0) {
        return Err(ConfigError::Validation(
            "list_timeout_ms must be > 0 when set".to_string(),
        ));
    }

    if config.detail_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "detail_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.detail_concurrency < 1 || config.detail_concurrency > MAX_DETAIL_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "detail_concurrency must be between 1 and {}, got {}",
            MAX_DETAIL_CONCURRENCY, config.detail_concurrency
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates both registry endpoints
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_endpoint("list_url", &config.list_url)?;
    validate_endpoint("detail_url", &config.detail_url)?;
    Ok(())
}

fn validate_endpoint(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the filter catalogue
fn validate_regions(regions: &[RegionFilter]) -> Result<(), ConfigError> {
    if regions.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[region]] must be configured".to_string(),
        ));
    }

    for region in regions {
        if region.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "region name cannot be empty".to_string(),
            ));
        }

        if region.provinces.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Region '{}' must have at least one province",
                region.name
            )));
        }

        let mut abbreviations = HashSet::new();
        for province in &region.provinces {
            if province.abbreviation.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Province '{}' in region '{}' has an empty abbreviation",
                    province.name, region.name
                )));
            }

            if !abbreviations.insert(province.abbreviation.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate province abbreviation '{}' in region '{}'",
                    province.abbreviation, region.name
                )));
            }
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| ConfigError::Validation(format!("Invalid email format: '{}'", email)))?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
