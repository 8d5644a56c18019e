pub mod chat_completions;
pub mod provider;
pub mod types;

pub use chat_completions::ChatCompletionsClient;
pub use provider::CompletionProvider;
pub use types::{ConversationTurn, PromptRequest, Role};
