pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod tools;

use finsight_agent::InvestmentAssistant;
use finsight_config::AppConfig;

/// Load configuration and build the assistant once for this process.
///
/// Missing environment configuration is fatal.
pub async fn bootstrap() -> Result<InvestmentAssistant, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let assistant = InvestmentAssistant::from_config(&config)
        .await
        .map_err(|e| format!("Failed to initialize assistant: {e}"))?;
    Ok(assistant)
}
