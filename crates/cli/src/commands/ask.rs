//! `finsight ask`: Single-shot knowledge base question, printed as JSON.

use finsight_core::message::SessionId;
use tracing::warn;

pub async fn run(query: String, session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let assistant = super::bootstrap().await?;
    let session = session.map(|s| SessionId::from(&s)).unwrap_or_default();

    match assistant.query_knowledge_base_rag(&query, &session).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            warn!(session = %session, error = %e, "Knowledge base query failed");
            Err(e.user_message().into())
        }
    }
}
