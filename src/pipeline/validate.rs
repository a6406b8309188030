// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::utils::console;

/// Validate the configuration and report the values a run would use.
pub fn run_validate(config: &Config) -> Result<()> {
    console::header("Validating configuration");

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    log::info!("Config OK");
    console::sub_item(&format!("User agent: {}", config.crawler.user_agent));
    console::sub_item(&format!("Timeout: {}s", config.crawler.timeout_secs));
    console::sub_item(&format!(
        "Max concurrent room fetches: {}",
        config.crawler.max_concurrent
    ));
    console::sub_item(&format!(
        "Attempts per room: {}",
        config.crawler.max_attempts
    ));
    console::sub_item(&format!("Base URL: {}", config.site.base_url));
    console::sub_item(&format!("Cities: {}", config.site.cities.join(", ")));
    Ok(())
}
