use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SereneConfig {
    pub llm: LlmConfig,
    pub intensity: IntensityConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
}

impl SereneConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse TOML config")
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SERENE_LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("SERENE_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("SERENE_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("SERENE_LLM_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY")) {
            self.llm.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("SERENE_LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("SERENE_LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("SERENE_API_BASE_URL") {
            self.api.base_url = v;
        }
        if let Ok(v) = std::env::var("SERENE_API_TOKEN") {
            self.api.auth_token = Some(v);
        }
        if let Ok(v) = std::env::var("SERENE_USER_ID") {
            self.session.user_id = v;
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

/// Text-generation endpoint used for conversational replies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "openai" for any OpenAI-compatible endpoint, "mock" for offline replies.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
    /// Total attempts per request, including the first.
    pub retry_attempts: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 1.0,
            timeout_secs: 60,
            retry_attempts: 3,
        }
    }
}

/// Sampling used when asking the model for a mood intensity score.
/// Kept near-deterministic with a tiny output budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntensityConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for IntensityConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 5,
            top_p: 1.0,
        }
    }
}

/// Remote persistence API (chat, mood and exercise logs).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub user_id: String,
    pub system_prompt: String,
    /// Seed the transcript from stored chat history when the session opens.
    pub seed_history: bool,
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Serene, a warm and supportive wellness companion. \
Listen carefully, respond with empathy, and keep replies short and conversational. \
Encourage healthy habits and small positive steps. You are not a therapist: if the user \
mentions self-harm or a crisis, gently encourage them to contact local emergency services \
or a crisis line.";

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            seed_history: true,
        }
    }
}
