use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cadet_gateway::advisory::AdvisoryService;
use cadet_gateway::providers::Provider;
use cadet_gateway::providers::openai_responses::OpenAiResponsesClient;
use cadet_gateway::server;
use cadet_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = cadet_core::Config::load()?;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.as_str().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Configuration loaded (model: {})", config.model_id());

    let model_settings = &config.settings.model;
    let provider: Option<Arc<dyn Provider>> = match config.openai_api_key() {
        Some(api_key) => {
            let client = OpenAiResponsesClient::new(
                &model_settings.base_url,
                api_key,
                config.model_id(),
                Duration::from_secs(model_settings.timeout_seconds),
            )?
            .with_max_output_tokens(model_settings.max_output_tokens)
            .with_temperature(model_settings.temperature);
            info!(
                "OpenAI Responses client created for model: {}",
                config.model_id()
            );
            Some(Arc::new(client))
        }
        None => {
            warn!("OPENAI_API_KEY not set; chat requests will answer 501");
            None
        }
    };

    let state = AppState::new(AdvisoryService::new(provider, config.limits()));

    if config.settings.gateway.host != "127.0.0.1" && config.settings.gateway.host != "localhost" {
        warn!(
            "Gateway binding to non-localhost address: {}. This may expose the API to remote access.",
            config.settings.gateway.host
        );
    }

    let bind_addr = config.bind_addr();
    info!("Starting Cadet Compass gateway on {}", bind_addr);

    server::run(state, &bind_addr).await
}
