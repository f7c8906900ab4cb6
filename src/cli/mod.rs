use clap::Parser;
use std::time::Duration;
use crate::config::{ resolve_base_url, ApiConfig, ConfigError, DEFAULT_TIMEOUT_SECS };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- API Location Args ---
    /// Explicit API base URL (e.g., https://planner.example.com). Takes precedence over --page-url.
    #[arg(long, env = "MEAL_PLANNER_API_URL")]
    pub api_url: Option<String>,

    /// Location of the page hosting the chat. Same-origin or proxied API URLs are derived from it.
    #[arg(long, env = "MEAL_PLANNER_PAGE_URL")]
    pub page_url: Option<String>,

    /// Request timeout in seconds for every API call.
    #[arg(long, env = "MEAL_PLANNER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    // --- Chat Args ---
    /// Ask the API for shopping links alongside meal plans and recipes.
    #[arg(
        long,
        env = "MEAL_PLANNER_SHOPPING_LINKS",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub shopping_links: bool,

    /// Optional HTML file rewritten with the whole conversation after every turn.
    #[arg(long, env = "MEAL_PLANNER_TRANSCRIPT")]
    pub transcript: Option<String>,

    /// Skip the startup health check.
    #[arg(long, env = "MEAL_PLANNER_SKIP_HEALTH_CHECK", default_value = "false")]
    pub skip_health_check: bool,
}

impl Args {
    pub fn base_url(&self) -> String {
        resolve_base_url(self.api_url.as_deref(), self.page_url.as_deref())
    }

    pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        ApiConfig::new(&self.base_url(), Duration::from_secs(self.timeout_secs))
    }
}
