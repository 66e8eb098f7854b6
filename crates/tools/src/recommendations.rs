//! Analyst recommendations tool.

use crate::market_data::{MarketData, TickerArgs, ticker_schema};
use async_trait::async_trait;
use finsight_core::error::ToolError;
use finsight_core::tool::{Tool, ToolResult, parse_args};
use std::sync::Arc;

pub struct RecommendationsTool {
    market: Arc<dyn MarketData>,
}

impl RecommendationsTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for RecommendationsTool {
    fn name(&self) -> &str {
        "get_recommendations"
    }

    fn description(&self) -> &str {
        "This tool will provide the recommendations based on the investment analysis.\n\
         The input parameter is stock ticker prices and output will be\n\
         recommendations based on the investment analysis"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        ticker_schema()
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: TickerArgs = parse_args(arguments)?;
        let ticker = args.normalized(self.name())?;
        let recs = self.market.recommendations(&ticker).await?;

        let output = recs
            .iter()
            .map(|r| format!("{}: {} (target {:.2})", r.firm, r.rating, r.target_price))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: Some(serde_json::json!({ "ticker": ticker, "recommendations": recs })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::MockMarketData;

    #[tokio::test]
    async fn one_line_per_firm() {
        let tool = RecommendationsTool::new(Arc::new(MockMarketData::new()));
        let result = tool.execute(serde_json::json!({"ticker": "GOOGL"})).await.unwrap();
        assert_eq!(result.output.lines().count(), 3);
        assert!(result.output.contains("target"));
    }
}
