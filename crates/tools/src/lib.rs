//! Investment tools for FinSight.
//!
//! The registry is composed at startup for a tool-using agent mode. The
//! conversational and single-shot entry points do not call these tools.

pub mod knowledge_base;
pub mod latest_news;
pub mod market_data;
pub mod price_history;
pub mod recommendations;
pub mod stock_price;

use finsight_core::retriever::Retriever;
use finsight_core::tool::ToolRegistry;
use std::sync::Arc;

pub use market_data::{MarketData, MockMarketData};

/// Create the registry with every investment tool.
pub fn default_registry(
    retriever: Arc<dyn Retriever>,
    market: Arc<dyn MarketData>,
    kb_top_k: usize,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(knowledge_base::SearchKnowledgeBaseTool::new(retriever, kb_top_k)));
    registry.register(Box::new(price_history::PriceHistoryTool::new(market.clone())));
    registry.register(Box::new(recommendations::RecommendationsTool::new(market.clone())));
    registry.register(Box::new(latest_news::LatestNewsTool::new(market.clone())));
    registry.register(Box::new(stock_price::StockPriceTool::new(market)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_core::tool::ToolCall;
    use finsight_retrieval::StaticRetriever;

    fn registry() -> ToolRegistry {
        default_registry(
            Arc::new(StaticRetriever::new()),
            Arc::new(MockMarketData::new()),
            3,
        )
    }

    #[test]
    fn registers_all_five_tools() {
        let registry = registry();
        assert_eq!(
            registry.names(),
            vec![
                "StockPrice",
                "get_latest_news",
                "get_price_history",
                "get_recommendations",
                "search_knowledge_base",
            ]
        );
        assert!(registry.definitions().iter().all(|d| !d.description.is_empty()));
    }

    #[tokio::test]
    async fn dispatch_by_name() {
        let call = ToolCall {
            id: "call-1".into(),
            name: "get_recommendations".into(),
            arguments: serde_json::json!({"ticker": "AMZN"}),
        };
        let result = registry().execute(&call).await.unwrap();
        assert_eq!(result.call_id, "call-1");
        assert!(result.success);
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let call = ToolCall {
            id: "call-2".into(),
            name: "place_trade".into(),
            arguments: serde_json::json!({}),
        };
        assert!(registry().execute(&call).await.is_err());
    }
}
