//! End-to-end behavior of the two query entry points.

mod common;

use common::*;
use finsight_agent::{InvestmentAssistant, AssistantSettings, NO_DOCUMENTS_MESSAGE};
use finsight_core::error::{Error, RetrievalError};
use finsight_core::history::HistoryStore;
use finsight_core::message::{Role, SessionId, Speaker};
use finsight_memory::{InMemoryHistory, NoopHistory, SqliteHistory};
use finsight_retrieval::StaticRetriever;
use std::sync::Arc;

#[tokio::test]
async fn semiconductor_scenario_cites_both_passages() {
    let provider = Arc::new(CountingProvider::new());
    let assistant = build(provider.clone(), semiconductor_passages(), Arc::new(NoopHistory));

    let result = assistant
        .query_knowledge_base_rag("What is the outlook for semiconductor stocks?", &SessionId::new())
        .await
        .unwrap();

    assert_eq!(result.retrieved_count, 2);
    assert_eq!(result.citations.len(), 2);
    assert_eq!(result.citations[0].score, 0.91);
    assert_eq!(result.citations[1].score, 0.77);
    for (citation, passage) in result.citations.iter().zip(semiconductor_passages()) {
        assert_eq!(citation.source, passage.source);
    }
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn gibberish_never_reaches_the_model() {
    let provider = Arc::new(CountingProvider::new());
    let corpus = StaticRetriever::new()
        .with_document("s3://kb/semis.pdf", "Semiconductor stocks rallied on foundry demand.");
    let assistant = InvestmentAssistant::new(
        provider.clone(),
        Arc::new(corpus),
        Arc::new(NoopHistory),
        AssistantSettings::new("m"),
    );

    let result = assistant
        .query_knowledge_base_rag("asdkjasdj random gibberish", &SessionId::new())
        .await
        .unwrap();

    assert_eq!(result.answer, NO_DOCUMENTS_MESSAGE);
    assert!(result.citations.is_empty());
    assert_eq!(result.retrieved_count, 0);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn rag_retrieval_failure_is_an_error() {
    let provider = Arc::new(CountingProvider::new());
    let assistant = InvestmentAssistant::new(
        provider.clone(),
        Arc::new(FixedRetriever(Err(RetrievalError::Unavailable("connection refused".into())))),
        Arc::new(NoopHistory),
        AssistantSettings::new("m"),
    );

    let err = assistant.query_knowledge_base_rag("chips", &SessionId::new()).await.unwrap_err();
    assert!(matches!(err, Error::Retrieval(_)));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn history_accumulates_in_order() {
    let provider = Arc::new(CountingProvider::new());
    let history = Arc::new(InMemoryHistory::new());
    let assistant = build(provider.clone(), semiconductor_passages(), history.clone());
    let session = SessionId::from("conn-42");

    for i in 1..=3 {
        assistant.chat_investment(&format!("Question {i}"), &session).await.unwrap();
    }

    // The fourth prompt carries exactly the three prior exchanges.
    assistant.chat_investment("Question 4", &session).await.unwrap();
    let prompt = &provider.prompts()[3];
    let body: Vec<(Role, &str)> = prompt[1..].iter().map(|m| (m.role, m.content.as_str())).collect();
    assert_eq!(
        body,
        vec![
            (Role::User, "Question 1"),
            (Role::Assistant, "Answer 1"),
            (Role::User, "Question 2"),
            (Role::Assistant, "Answer 2"),
            (Role::User, "Question 3"),
            (Role::Assistant, "Answer 3"),
            (Role::User, "Question 4"),
        ]
    );

    let turns = history.load(&session).await.unwrap();
    assert_eq!(turns.len(), 8);
    assert_eq!(turns[7].speaker, Speaker::Assistant);
}

#[tokio::test]
async fn fresh_sessions_get_identical_prompts() {
    let provider = Arc::new(CountingProvider::new());
    let assistant = build(provider.clone(), semiconductor_passages(), Arc::new(InMemoryHistory::new()));

    assistant.chat_investment("How are chips doing?", &SessionId::new()).await.unwrap();
    assistant.chat_investment("How are chips doing?", &SessionId::new()).await.unwrap();

    let prompts = provider.prompts();
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let provider = Arc::new(CountingProvider::new());
    let assistant = build(provider.clone(), Vec::new(), Arc::new(InMemoryHistory::new()));

    assistant.chat_investment("About AMZN", &SessionId::from("a")).await.unwrap();
    assistant.chat_investment("About NVDA", &SessionId::from("b")).await.unwrap();

    assert_eq!(provider.prompts()[1].len(), 2);
}

#[tokio::test]
async fn double_send_on_sqlite_keeps_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let history: Arc<dyn HistoryStore> = Arc::new(
        SqliteHistory::open(&dir.path().join("history.db"), "ChatHistory").await.unwrap(),
    );
    let provider = Arc::new(CountingProvider::new());
    let assistant = Arc::new(build(provider, semiconductor_passages(), history.clone()));
    let session = SessionId::from("double-send");

    let a = {
        let assistant = assistant.clone();
        let session = session.clone();
        tokio::spawn(async move { assistant.chat_investment("first", &session).await })
    };
    let b = {
        let assistant = assistant.clone();
        let session = session.clone();
        tokio::spawn(async move { assistant.chat_investment("second", &session).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let turns = history.load(&session).await.unwrap();
    assert_eq!(turns.len(), 4);
    for pair in turns.chunks(2) {
        assert_eq!(pair[0].speaker, Speaker::Human);
        assert_eq!(pair[1].speaker, Speaker::Assistant);
    }
}
