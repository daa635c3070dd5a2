pub mod advisory;
pub mod prompt;
pub mod providers;
pub mod server;
pub mod state;

pub use advisory::{AdvisoryService, NO_REPLY, RemoteError};
pub use prompt::{AdvisoryPrompt, SAFETY_PREAMBLE};
pub use providers::openai_responses::OpenAiResponsesClient;
pub use providers::provider::{
    Provider, ProviderContentBlock, ProviderError, ProviderResponse, ProviderUsage,
    extract_all_text,
};
pub use server::{CHAT_PATH, create_router};
pub use state::AppState;
