pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

use acemock_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
pub fn create_provider(llm_config: &LlmConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
    let timeout = llm_config.timeout();
    match llm_config.provider.as_str() {
        "gemini" | "google" => {
            let api_key = llm_config
                .gemini_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("GEMINI_API_KEY not set".into()))?;
            Ok(Box::new(gemini::GeminiProvider::new(
                api_key.clone(),
                llm_config.gemini_model.clone(),
                timeout,
            )?))
        }
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = llm_config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Box::new(openai::OpenAiProvider::new(
                api_key.clone(),
                llm_config.openai_model.clone(),
                base_url.to_string(),
                timeout,
            )?))
        }
        "anthropic" | "claude" => {
            let api_key = llm_config
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Box::new(claude::ClaudeProvider::new(
                api_key.clone(),
                llm_config.anthropic_model.clone(),
                timeout,
            )?))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            llm_config.ollama_url.clone(),
            llm_config.ollama_model.clone(),
            timeout,
        )?)),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> LlmConfig {
        let mut c = LlmConfig::default();
        c.provider = provider.into();
        c.gemini_api_key = None;
        c
    }

    #[test]
    fn missing_key_is_not_configured() {
        let err = create_provider(&config("gemini")).err().unwrap();
        assert!(matches!(err, LlmError::NotConfigured(msg) if msg.contains("GEMINI_API_KEY")));
    }

    #[test]
    fn unknown_provider_rejected() {
        assert!(matches!(
            create_provider(&config("palm")),
            Err(LlmError::NotConfigured(_))
        ));
    }

    #[test]
    fn ollama_needs_no_key() {
        let p = create_provider(&config("ollama")).unwrap();
        assert_eq!(p.provider_name(), "ollama");
    }

    #[test]
    fn gemini_with_key() {
        let mut c = config("gemini");
        c.gemini_api_key = Some("k".into());
        assert_eq!(create_provider(&c).unwrap().provider_name(), "gemini");
    }
}
