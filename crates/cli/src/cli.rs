use clap::Parser;

/// Practice a full technical interview from the terminal.
///
/// Walks through self-introduction, aptitude test, technical Q&A, a coding
/// challenge and an HR round, then prints a scored report.
#[derive(Parser, Debug)]
#[command(name = "acemock", about = "Mock technical interviews in the terminal")]
pub struct CliArgs {
    /// LLM provider: gemini, openai, anthropic, or ollama
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name override (uses provider default if not set)
    #[arg(long)]
    pub model: Option<String>,

    /// API key (overrides env var and config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Path to config file (default: ~/.config/acemock/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Skip the picker and interview for this language, framework or track
    #[arg(long)]
    pub selection: Option<String>,

    /// Disable the aptitude and HR countdowns
    #[arg(long)]
    pub no_timer: bool,

    /// Print the final results as JSON instead of the formatted report
    #[arg(long)]
    pub json: bool,

    /// List every selectable language, framework and track
    #[arg(long)]
    pub list_selections: bool,

    /// List languages available on the code execution service
    #[arg(long)]
    pub list_runtimes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = CliArgs::parse_from([
            "acemock",
            "--provider",
            "openai",
            "--selection",
            "Spring Boot",
            "--no-timer",
            "--json",
        ]);
        assert_eq!(args.provider.as_deref(), Some("openai"));
        assert_eq!(args.selection.as_deref(), Some("Spring Boot"));
        assert!(args.no_timer);
        assert!(args.json);
        assert!(!args.list_runtimes);
    }
}
