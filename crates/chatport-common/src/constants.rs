//! Common constants used across chatport

/// Version tag of the canonical export document
pub const CURRENT_EXPORT_VERSION: u64 = 4;

/// Prefix of exported file names, followed by `<month>-<day>.json`
pub const EXPORT_FILE_PREFIX: &str = "chatbot_ui_history_";

/// Store keys holding the JSON-encoded application state
pub mod keys {
    pub const HISTORY: &str = "conversationHistory";
    pub const FOLDERS: &str = "folders";
    pub const PROMPTS: &str = "prompts";
    pub const SELECTED_CONVERSATION: &str = "selectedConversation";
}

/// Defaults applied to conversations that lack chat settings
pub mod conversation {
    pub const DEFAULT_NAME: &str = "New Conversation";
    pub const DEFAULT_MODEL_ID: &str = "gpt-3.5-turbo";
    pub const DEFAULT_MODEL_NAME: &str = "GPT-3.5";
    pub const DEFAULT_MODEL_MAX_LENGTH: u32 = 12000;
    pub const DEFAULT_MODEL_TOKEN_LIMIT: u32 = 4000;
    pub const DEFAULT_SYSTEM_PROMPT: &str = "You are ChatGPT, a large language model trained by OpenAI. Follow the user's instructions carefully. Respond using markdown.";
    pub const DEFAULT_TEMPERATURE: f64 = 1.0;
}

/// Storage defaults
pub mod storage {
    pub const DEFAULT_DATA_DIR: &str = "./data";
    pub const DEFAULT_NAMESPACE: &str = "chatport";
}
