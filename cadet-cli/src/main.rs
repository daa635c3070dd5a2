use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use cadet_cli::logging::log_filter;
use cadet_cli::{AvailabilityState, GatewayClient, Orchestrator, Presenter, Role};
use cadet_knowledge::KnowledgeStore;

const HELP: &str = "Commands: /continue, /clear, /status, /quit";

/// Prints the conversation to stdout.
struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn on_message(&mut self, role: Role, text: &str) {
        match role {
            Role::User => {}
            Role::Assistant => println!("\n{}\n", text),
        }
    }

    fn on_availability_changed(&mut self, state: &AvailabilityState) {
        println!("[{}]", state.hint);
    }

    fn on_continuation_available(&mut self, available: bool) {
        if available {
            println!("(answer was cut off, type /continue for more)");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    cadet_core::load_dotenv();
    let settings = cadet_core::Settings::load()?;

    // Logs go to stderr so they never interleave with answers
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&settings.logging))
        .with_writer(std::io::stderr)
        .init();

    info!("Settings loaded, using {}", settings.client.gateway_url);

    let channel = Arc::new(GatewayClient::from_settings(&settings.client)?);
    let knowledge = Arc::new(KnowledgeStore::from_settings(&settings.knowledge));
    let mut orchestrator = Orchestrator::new(channel, knowledge, settings.limits, TerminalPresenter);

    println!("{}", HELP);
    orchestrator.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => orchestrator.clear_conversation(),
            "/status" => {
                orchestrator.probe_availability().await;
            }
            "/continue" => {
                if !orchestrator.continuation_available() {
                    println!("Nothing to continue.");
                } else {
                    orchestrator.request_continuation().await;
                }
            }
            "/help" => println!("{}", HELP),
            question => {
                if let Err(e) = orchestrator.submit_question(question).await {
                    println!("{}", e);
                }
            }
        }
    }

    Ok(())
}
