//! `finsight chat`: Interactive or single-message conversational mode.

use finsight_core::message::SessionId;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>, session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let assistant = super::bootstrap().await?;
    let session = session.map(|s| SessionId::from(&s)).unwrap_or_default();

    if let Some(msg) = message {
        println!("{}", assistant.reply(&msg, &session).await);
        return Ok(());
    }

    println!();
    println!("  FinSight investment assistant");
    println!("  Model:    {}", assistant.settings().model_id);
    println!("  History:  {}", assistant.history().name());
    println!("  Session:  {session}");
    println!();
    println!("  Type your question and press Enter. Type 'exit' to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let html = assistant.reply(line, &session).await;
        println!();
        for l in html.lines() {
            println!("  Assistant > {l}");
        }
        println!();
    }

    println!();
    Ok(())
}
