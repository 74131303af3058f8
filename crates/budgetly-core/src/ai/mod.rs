//! Pluggable AI advisor backend abstraction
//!
//! # Architecture
//!
//! - `AdvisorBackend` trait: defines the interface for all advisor operations
//! - `AdvisorClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = AppConfig::from_env()?;
//! if let Some(advisor) = AdvisorClient::from_config(&config) {
//!     let tips = advisor.quick_tips(&snapshot).await?;
//! }
//! ```
//!
//! Configuration comes from `AI_BACKEND` and the `OPENAI_COMPATIBLE_*`
//! variables, see [`crate::config`].

mod mock;
mod openai_compatible;
pub mod parsing;
pub mod prompts;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::FinancialSnapshot;

/// Maximum number of quick tips returned to callers
pub const MAX_TIPS: usize = 5;

/// Tips shown when the advisor is unavailable or fails
pub fn fallback_tips() -> Vec<String> {
    vec![
        "Track your spending regularly to stay within your budgets".to_string(),
        "Set realistic spending limits for each category".to_string(),
        "Review your recurring transactions monthly and cancel what you don't use".to_string(),
    ]
}

/// Text shown in place of insights when the advisor is unavailable or fails
pub const FALLBACK_INSIGHTS: &str = "AI insights are unavailable right now. \
     Keep logging your transactions and check back later for personalized advice.";

/// Trait defining the interface for all advisor backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AdvisorBackend: Send + Sync {
    /// Free-form analysis of the snapshot, optionally answering a question
    async fn financial_insights(
        &self,
        snapshot: &FinancialSnapshot,
        question: Option<&str>,
    ) -> Result<String>;

    /// Up to [`MAX_TIPS`] short actionable tips
    async fn quick_tips(&self, snapshot: &FinancialSnapshot) -> Result<Vec<String>>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete advisor client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AdvisorClient {
    /// Any server implementing the OpenAI chat completions API
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AdvisorClient {
    /// Create an advisor from configuration
    ///
    /// Returns None when no backend is configured.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let ai = config.ai.as_ref()?;

        match ai.backend.as_str() {
            "mock" => Some(AdvisorClient::Mock(MockBackend::new())),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => Some(
                AdvisorClient::OpenAICompatible(OpenAICompatibleBackend::from_config(ai)),
            ),
            other => {
                tracing::warn!(
                    backend = %other,
                    "Unknown AI_BACKEND, falling back to openai_compatible"
                );
                Some(AdvisorClient::OpenAICompatible(
                    OpenAICompatibleBackend::from_config(ai),
                ))
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AdvisorClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl AdvisorBackend for AdvisorClient {
    async fn financial_insights(
        &self,
        snapshot: &FinancialSnapshot,
        question: Option<&str>,
    ) -> Result<String> {
        match self {
            AdvisorClient::OpenAICompatible(b) => b.financial_insights(snapshot, question).await,
            AdvisorClient::Mock(b) => b.financial_insights(snapshot, question).await,
        }
    }

    async fn quick_tips(&self, snapshot: &FinancialSnapshot) -> Result<Vec<String>> {
        match self {
            AdvisorClient::OpenAICompatible(b) => b.quick_tips(snapshot).await,
            AdvisorClient::Mock(b) => b.quick_tips(snapshot).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AdvisorClient::OpenAICompatible(b) => b.health_check().await,
            AdvisorClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AdvisorClient::OpenAICompatible(b) => b.model(),
            AdvisorClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AdvisorClient::OpenAICompatible(b) => b.host(),
            AdvisorClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;

    #[test]
    fn test_fallback_tips() {
        let tips = fallback_tips();
        assert_eq!(tips.len(), 3);
        assert!(tips[0].starts_with("Track your spending"));
    }

    #[test]
    fn test_from_config_none_when_unconfigured() {
        assert!(AdvisorClient::from_config(&AppConfig::default()).is_none());
    }

    #[test]
    fn test_from_config_selects_backend() {
        let mut config = AppConfig {
            ai: Some(AiConfig {
                backend: "openai_compatible".to_string(),
                host: "http://localhost:8080/".to_string(),
                model: "llama3.2".to_string(),
                api_key: None,
            }),
            ..AppConfig::default()
        };
        let client = AdvisorClient::from_config(&config).unwrap();
        assert!(matches!(client, AdvisorClient::OpenAICompatible(_)));
        assert_eq!(client.host(), "http://localhost:8080");
        assert_eq!(client.model(), "llama3.2");

        if let Some(ai) = config.ai.as_mut() {
            ai.backend = "mock".to_string();
        }
        let client = AdvisorClient::from_config(&config).unwrap();
        assert!(matches!(client, AdvisorClient::Mock(_)));
    }
}
