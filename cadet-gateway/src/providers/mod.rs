pub mod openai_responses;
pub mod provider;

pub use provider::{
    Provider, ProviderContentBlock, ProviderError, ProviderResponse, ProviderUsage,
    extract_all_text,
};
