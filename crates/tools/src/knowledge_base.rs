//! Knowledge base search tool: passages from the hosted corpus.

use async_trait::async_trait;
use finsight_core::error::ToolError;
use finsight_core::retriever::Retriever;
use finsight_core::tool::{Tool, ToolResult, parse_args};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

pub struct SearchKnowledgeBaseTool {
    retriever: Arc<dyn Retriever>,
    top_k: usize,
}

impl SearchKnowledgeBaseTool {
    pub fn new(retriever: Arc<dyn Retriever>, top_k: usize) -> Self {
        Self { retriever, top_k }
    }
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

#[async_trait]
impl Tool for SearchKnowledgeBaseTool {
    fn name(&self) -> &str {
        "search_knowledge_base"
    }

    fn description(&self) -> &str {
        "This tool provides the historical news related to stock market.\n\
         Use this tool to get information about sector, to know the key players in a sector\n\
         or to understand the policies and what other companies are doing."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search the financial news corpus for"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: SearchArgs = parse_args(arguments)?;
        if args.query.trim().is_empty() {
            return Err(ToolError::InvalidArguments("Missing 'query' argument".into()));
        }

        let passages = self
            .retriever
            .retrieve(&args.query, self.top_k)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;
        debug!(query = %args.query, retrieved = passages.len(), "Knowledge base tool search");

        let output = passages
            .iter()
            .map(|p| p.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: Some(serde_json::to_value(&passages).map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?),
        })
    }
}
