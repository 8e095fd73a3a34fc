use anyhow::Result;
use jarvis::integration::{AssistantConfig, InputOutcome, OrchestratorBuilder};
use jarvis::JarvisError;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jarvis=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting JARVIS assistant");

    let config = AssistantConfig::from_env()?;
    let orchestrator = OrchestratorBuilder::new().with_config(config).build()?;
    orchestrator.start().await;

    println!("Type a request. Prefix with 'voice:' to simulate a transcript.");
    println!("Commands: /clear, /actions, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        let outcome = match line {
            "" => continue,
            "/quit" => break,
            "/clear" => {
                orchestrator.clear_history();
                continue;
            }
            "/actions" => {
                for action in orchestrator.router().list() {
                    println!("  {} - {}", action.name, action.description);
                }
                continue;
            }
            _ => match line.strip_prefix("voice:") {
                Some(transcript) => orchestrator.process_voice(transcript.trim()).await,
                None => orchestrator.process_text(line).await,
            },
        };

        match outcome {
            Ok(InputOutcome::Ignored) => println!("(no wake word heard)"),
            Ok(_) => {}
            Err(JarvisError::Busy) => println!("{}", JarvisError::Busy),
            Err(e) => warn!("{}", e.user_message()),
        }
    }

    info!("Shutting down");
    Ok(())
}
