use thiserror::Error;

/// Failures from a text-generation endpoint.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{provider} API error (status {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Api {
        provider: String,
        status: u16,
        /// Machine-readable message from the upstream error body, when present.
        message: Option<String>,
    },

    #[error("completion response contained no choices")]
    EmptyChoices,
}

/// Failures of a chat turn that the user gets to see.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("reply generation failed: {0:#}")]
    Generation(anyhow::Error),

    #[error("reply generation returned no text")]
    EmptyReply,
}

pub const FALLBACK_ERROR_MESSAGE: &str = "Sorry, I couldn't respond just now. Please try again.";

impl ChatError {
    /// Text for the user-facing error notification.
    ///
    /// Prefers the upstream machine message when the endpoint sent one.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::EmptyMessage => "Please type a message first.".to_string(),
            ChatError::Generation(err) => err
                .chain()
                .find_map(|cause| match cause.downcast_ref::<GenerationError>() {
                    Some(GenerationError::Api {
                        message: Some(m), ..
                    }) if !m.trim().is_empty() => Some(m.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()),
            ChatError::EmptyReply => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}
