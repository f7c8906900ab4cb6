pub mod api;
pub mod chat;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod formatter;
pub mod models;
pub mod repl;

use chat::ChatController;
use cli::Args;
use log::info;
use repl::Repl;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = args.api_config()?;

    info!("--- Core Configuration ---");
    info!("API Base URL: {}", config.base_url);
    info!("Page URL: {}", args.page_url.as_deref().unwrap_or("not set"));
    info!("Request Timeout: {}s", config.timeout.as_secs());
    info!("Shopping Links: {}", args.shopping_links);
    info!("Transcript: {}", args.transcript.as_deref().unwrap_or("disabled"));
    info!("-------------------------");

    let api = api::new_client(&config)?;
    let controller = Arc::new(ChatController::new(api, args.shopping_links));
    if !args.skip_health_check {
        controller.check_health().await;
    }

    let repl = Repl::new(controller, args.transcript.clone());
    repl.run().await
}
