use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub llm: LlmConfig,
    pub execution: ExecutionConfig,
    pub interview: InterviewConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ACEMOCK_PROFILE`. When set (e.g. `DEV`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ACEMOCK_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            llm: LlmConfig::from_env_profiled(p),
            execution: ExecutionConfig::from_env_profiled(p),
            interview: InterviewConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  llm:         provider={}, model={}, configured={}",
            self.llm.provider,
            self.llm.active_model(),
            self.llm.is_configured()
        );
        tracing::info!(
            "  execution:   piston={}, timeout={}s, sandbox={}s",
            self.execution.piston_url,
            self.execution.timeout_secs,
            self.execution.sandbox_timeout_secs
        );
        tracing::info!(
            "  interview:   aptitude={}x{}s, hr={}s/question",
            self.interview.aptitude_questions,
            self.interview.aptitude_secs_per_question,
            self.interview.hr_secs_per_question
        );
    }

    /// Return a redacted view safe for printing (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "llm": {
                "provider": self.llm.provider,
                "model": self.llm.active_model(),
                "configured": self.llm.is_configured(),
                "temperature": self.llm.temperature,
                "max_tokens": self.llm.max_tokens,
                "timeout_secs": self.llm.timeout_secs,
            },
            "execution": {
                "piston_url": self.execution.piston_url,
                "timeout_secs": self.execution.timeout_secs,
                "sandbox_timeout_secs": self.execution.sandbox_timeout_secs,
                "sandbox_node_bin": self.execution.sandbox_node_bin,
            },
            "interview": {
                "aptitude_questions": self.interview.aptitude_questions,
                "aptitude_secs_per_question": self.interview.aptitude_secs_per_question,
                "hr_secs_per_question": self.interview.hr_secs_per_question,
            },
        })
    }
}

// ── LLM ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini", "openai", "anthropic", "ollama"
    pub provider: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::from_env_profiled("")
    }
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "gemini"),
            gemini_api_key: profiled_env_opt(p, "GEMINI_API_KEY"),
            gemini_model: profiled_env_or(p, "GEMINI_MODEL", "gemini-2.5-flash"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", "gpt-4o"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            ollama_url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            ollama_model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
            temperature: profiled_env_or(p, "LLM_TEMPERATURE", "0.7")
                .parse()
                .unwrap_or(0.7),
            max_tokens: profiled_env_u32(p, "LLM_MAX_TOKENS", 8192),
            timeout_secs: profiled_env_u64(p, "LLM_TIMEOUT_SECS", 60),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "gemini" | "google" => self.gemini_api_key.is_some(),
            "openai" => self.openai_api_key.is_some(),
            "anthropic" | "claude" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }

    /// Model name for the selected provider.
    pub fn active_model(&self) -> &str {
        match self.provider.as_str() {
            "openai" => &self.openai_model,
            "anthropic" | "claude" => &self.anthropic_model,
            "ollama" => &self.ollama_model,
            _ => &self.gemini_model,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Code execution ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Base URL of the Piston API, without the trailing `/runtimes` etc.
    pub piston_url: String,
    pub timeout_secs: u64,
    pub sandbox_timeout_secs: u64,
    /// Node binary for the local script sandbox; `none` disables it.
    pub sandbox_node_bin: String,
}

pub const DEFAULT_PISTON_URL: &str = "https://piston-api.bun.sh/api/v2";

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            piston_url: DEFAULT_PISTON_URL.to_string(),
            timeout_secs: 15,
            sandbox_timeout_secs: 10,
            sandbox_node_bin: "node".to_string(),
        }
    }
}

impl ExecutionConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            piston_url: profiled_env_or(p, "PISTON_URL", &d.piston_url),
            timeout_secs: profiled_env_u64(p, "EXECUTION_TIMEOUT_SECS", d.timeout_secs),
            sandbox_timeout_secs: profiled_env_u64(p, "SANDBOX_TIMEOUT_SECS", d.sandbox_timeout_secs),
            sandbox_node_bin: profiled_env_or(p, "SANDBOX_NODE_BIN", &d.sandbox_node_bin),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sandbox_timeout(&self) -> Duration {
        Duration::from_secs(self.sandbox_timeout_secs)
    }

    pub fn sandbox_enabled(&self) -> bool {
        !self.sandbox_node_bin.is_empty() && self.sandbox_node_bin != "none"
    }
}

// ── Interview pacing ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    pub aptitude_questions: usize,
    pub aptitude_secs_per_question: u32,
    pub hr_secs_per_question: u32,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            aptitude_questions: 5,
            aptitude_secs_per_question: 90,
            hr_secs_per_question: 120,
        }
    }
}

impl InterviewConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            aptitude_questions: profiled_env_usize(p, "APTITUDE_QUESTIONS", d.aptitude_questions),
            aptitude_secs_per_question: profiled_env_u32(
                p,
                "APTITUDE_SECS_PER_QUESTION",
                d.aptitude_secs_per_question,
            ),
            hr_secs_per_question: profiled_env_u32(p, "HR_SECS_PER_QUESTION", d.hr_secs_per_question),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unique key names keep these tests independent of each other and of
    // whatever the developer's shell exports.

    #[test]
    fn profiled_lookup_prefers_prefixed_key() {
        env::set_var("ACEMOCK_TEST_KEY_A", "plain");
        env::set_var("QA_ACEMOCK_TEST_KEY_A", "profiled");
        assert_eq!(profiled_env_or("QA", "ACEMOCK_TEST_KEY_A", "x"), "profiled");
        assert_eq!(profiled_env_or("", "ACEMOCK_TEST_KEY_A", "x"), "plain");
        assert_eq!(profiled_env_or("OTHER", "ACEMOCK_TEST_KEY_A", "x"), "plain");
    }

    #[test]
    fn unparsable_numbers_fall_back_to_default() {
        env::set_var("ACEMOCK_TEST_KEY_B", "ninety");
        assert_eq!(profiled_env_u32("", "ACEMOCK_TEST_KEY_B", 90), 90);
        env::set_var("ACEMOCK_TEST_KEY_B", "");
        assert_eq!(profiled_env_or("", "ACEMOCK_TEST_KEY_B", "d"), "d");
    }

    #[test]
    fn interview_defaults() {
        let c = InterviewConfig::default();
        assert_eq!(c.aptitude_questions, 5);
        assert_eq!(c.aptitude_secs_per_question, 90);
        assert_eq!(c.hr_secs_per_question, 120);
    }

    #[test]
    fn active_model_follows_provider() {
        let mut c = LlmConfig::default();
        c.provider = "ollama".into();
        c.ollama_model = "qwen".into();
        assert_eq!(c.active_model(), "qwen");
        assert!(c.is_configured());
        c.provider = "unknown".into();
        assert!(!c.is_configured());
    }

    #[test]
    fn redacted_summary_has_no_keys() {
        let mut config = Config::for_profile("");
        config.llm.gemini_api_key = Some("secret-key".into());
        let text = config.redacted_summary().to_string();
        assert!(!text.contains("secret-key"));
        assert_eq!(config.profile_label(), "default");
    }
}
