//! Six-month end-of-day price history tool.

use crate::market_data::{MarketData, TickerArgs, ticker_schema};
use async_trait::async_trait;
use finsight_core::error::ToolError;
use finsight_core::tool::{Tool, ToolResult, parse_args};
use std::sync::Arc;

const HISTORY_MONTHS: u32 = 6;

pub struct PriceHistoryTool {
    market: Arc<dyn MarketData>,
}

impl PriceHistoryTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for PriceHistoryTool {
    fn name(&self) -> &str {
        "get_price_history"
    }

    fn description(&self) -> &str {
        "This tool will provide the stock prices of past 6 months.\n\
         The input parameter is stock ticker prices and output will be\n\
         history of end of the day price for past 6 months"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        ticker_schema()
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: TickerArgs = parse_args(arguments)?;
        let ticker = args.normalized(self.name())?;
        let history = self.market.price_history(&ticker, HISTORY_MONTHS).await?;

        let output = history
            .iter()
            .map(|d| format!("{}: {:.2}", d.date, d.close))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: Some(serde_json::json!({ "ticker": ticker, "closes": history })),
        })
    }
}
