pub mod config;
pub mod message;
pub mod text;

// Config re-exports
pub use config::{
    ClientSettings, Config, ConfigError, GatewaySettings, KnowledgeSettings, LimitSettings,
    LoggingSettings, ModelSettings, Secrets, Settings, SettingsError, load_dotenv,
};

// Message re-exports
pub use message::{
    AdvisoryMode, AdvisoryReply, AdvisoryRequest, ChatErrorBody, ChatReplyBody, ChatRequestBody,
    SourceChannel,
};

pub use text::{head_chars, tail_chars};
