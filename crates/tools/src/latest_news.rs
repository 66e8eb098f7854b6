//! Latest news tool.

use crate::market_data::{MarketData, TickerArgs, ticker_schema};
use async_trait::async_trait;
use finsight_core::error::ToolError;
use finsight_core::tool::{Tool, ToolResult, parse_args};
use std::sync::Arc;

pub struct LatestNewsTool {
    market: Arc<dyn MarketData>,
}

impl LatestNewsTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for LatestNewsTool {
    fn name(&self) -> &str {
        "get_latest_news"
    }

    fn description(&self) -> &str {
        "This tool will provide the latest news related to stock market.\n\
         The input parameter is stock ticker prices and output will be\n\
         latest news related to stock market"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        ticker_schema()
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: TickerArgs = parse_args(arguments)?;
        let ticker = args.normalized(self.name())?;
        let news = self.market.latest_news(&ticker).await?;

        let output = news
            .iter()
            .map(|n| format!("[{}] {} ({})", n.published, n.headline, n.publisher))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: Some(serde_json::json!({ "ticker": ticker, "news": news })),
        })
    }
}
