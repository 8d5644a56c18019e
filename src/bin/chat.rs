use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use ayur_assist::core::config::{AppPaths, ConfigService};
use ayur_assist::core::logging;
use ayur_assist::llm::{ChatCompletionsClient, ConversationTurn};
use ayur_assist::pipeline::QueryPipeline;
use ayur_assist::rag::RagContext;

const GREETING: &str = "Ayurvedic Assistant. Type /reset to start over, /quit to exit.";

#[tokio::main]
async fn main() -> Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, "chat.log", "warn");

    let settings = ConfigService::new(paths.clone())
        .load_app_config()
        .context("failed to load configuration")?;
    let completion = ChatCompletionsClient::from_config(&settings.completion)
        .context("failed to build completion client")?;
    let context = RagContext::from_config(&paths, &settings)
        .await
        .context("failed to open vector store")?;
    if context.store.count().await? == 0 {
        eprintln!("warning: vector store is empty; run ayur-ingest first");
    }
    let pipeline = QueryPipeline::from_config(context, Arc::new(completion), &settings);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Vec<ConversationTurn> = Vec::new();

    println!("{}", GREETING);
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        match message {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                history.clear();
                println!("(conversation cleared)");
                continue;
            }
            _ => {}
        }

        let (answer, updated) = pipeline.answer(std::mem::take(&mut history), message).await;
        history = updated;
        println!("{}\n", answer.text());
    }

    Ok(())
}
