pub mod api_types;
pub mod error;
pub mod intensity;
pub mod llm;
pub mod logger;
pub mod prompts;
pub mod providers;
pub mod retry;
pub mod session;

pub use error::{ChatError, GenerationError};
pub use intensity::IntensityEstimator;
pub use llm::{CompletionParams, LlmClient};
pub use logger::ConversationLogger;
pub use session::{ChatSession, SessionState, TurnOutcome};
