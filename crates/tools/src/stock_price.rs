//! Current stock price tool.

use crate::market_data::{MarketData, TickerArgs, ticker_schema};
use async_trait::async_trait;
use finsight_core::error::ToolError;
use finsight_core::tool::{Tool, ToolResult, parse_args};
use std::sync::Arc;

pub struct StockPriceTool {
    market: Arc<dyn MarketData>,
}

impl StockPriceTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "StockPrice"
    }

    fn description(&self) -> &str {
        "Use this tool when you need to retrieve current stock price and historical price."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        ticker_schema()
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: TickerArgs = parse_args(arguments)?;
        let ticker = args.normalized(self.name())?;

        let quote = self.market.quote(&ticker).await?;
        let recent = self.market.price_history(&ticker, 1).await?;

        let data = serde_json::json!({
            "quote": quote,
            "recent_closes": recent,
        });

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: format!("{} last traded at {:.2} {} on {}", quote.ticker, quote.price, quote.currency, quote.as_of),
            data: Some(data),
        })
    }
}
