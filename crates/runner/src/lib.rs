pub mod catalog;
pub mod error;
pub mod piston;
pub mod runtime;
pub mod sandbox;

use std::sync::Arc;

use acemock_core::config::ExecutionConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

pub use catalog::{Catalog, CatalogSource, RuntimeCatalog};
pub use error::RunnerError;
pub use piston::{PistonClient, RunResult};
pub use runtime::resolve_runtime;
pub use sandbox::{HostMessage, NodeSandboxHost, SandboxHost, SandboxResult, ScriptSandbox};

/// Remove a single wrapping markdown fence (```` ```lang\n...\n``` ````).
///
/// Only a fence enclosing the whole text is stripped; anything else is
/// returned trimmed and otherwise untouched.
pub fn strip_code_fences(code: &str) -> &str {
    let trimmed = code.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let (lang, body) = (&rest[..newline], &rest[newline + 1..]);
    if !lang.chars().all(|c| c.is_ascii_alphanumeric()) {
        return trimmed;
    }
    match body.strip_suffix("\n```") {
        Some(inner) => inner,
        None if body == "```" => "",
        None => trimmed,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExecutionOutcome {
    Completed(RunResult),
    Sandboxed(SandboxResult),
    Unsupported { selection: String, reason: String },
}

impl ExecutionOutcome {
    pub fn output_text(&self) -> String {
        match self {
            ExecutionOutcome::Completed(r) => r.output_text(),
            ExecutionOutcome::Sandboxed(r) => r.output_text(),
            ExecutionOutcome::Unsupported { reason, .. } => reason.clone(),
        }
    }
}

/// Runs candidate code for a selection: the local sandbox for plain
/// scripts when one is configured, Piston for everything else.
pub struct CodeRunner {
    piston: PistonClient,
    catalog: RuntimeCatalog,
    sandbox: Option<ScriptSandbox>,
}

impl CodeRunner {
    pub fn new(piston: PistonClient, catalog: RuntimeCatalog, sandbox: Option<ScriptSandbox>) -> Self {
        Self {
            piston,
            catalog,
            sandbox,
        }
    }

    pub fn from_config(config: &ExecutionConfig) -> Result<Self, RunnerError> {
        let piston = PistonClient::new(&config.piston_url, config.timeout())?;
        let sandbox = config.sandbox_enabled().then(|| {
            let host = NodeSandboxHost::new(&config.sandbox_node_bin, config.sandbox_timeout());
            ScriptSandbox::new(Arc::new(host), config.sandbox_timeout())
        });
        info!(
            piston = %config.piston_url,
            sandbox = config.sandbox_enabled(),
            "Code runner ready"
        );
        Ok(Self::new(piston, RuntimeCatalog::new(), sandbox))
    }

    pub fn catalog(&self) -> &RuntimeCatalog {
        &self.catalog
    }

    pub fn piston(&self) -> &PistonClient {
        &self.piston
    }

    pub async fn available_languages(&self) -> Vec<String> {
        self.catalog.available_languages(&self.piston).await
    }

    pub async fn run(
        &self,
        selection: &str,
        code: &str,
        stdin: &str,
    ) -> Result<ExecutionOutcome, RunnerError> {
        let source = strip_code_fences(code);

        let Some(runtime) = resolve_runtime(selection) else {
            return Ok(ExecutionOutcome::Unsupported {
                selection: selection.to_string(),
                reason: format!("No execution runtime is mapped for {selection}."),
            });
        };

        if runtime == "javascript" {
            if let Some(sandbox) = &self.sandbox {
                match sandbox.run(source, stdin).await {
                    Ok(result) => return Ok(ExecutionOutcome::Sandboxed(result)),
                    Err(RunnerError::SandboxUnavailable(reason)) => {
                        warn!(%reason, "Sandbox unavailable, falling back to Piston");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let Some(version) = self.catalog.latest_version(&self.piston, runtime).await else {
            return Ok(ExecutionOutcome::Unsupported {
                selection: selection.to_string(),
                reason: format!("Runtime {runtime} is not available on the execution service."),
            });
        };

        debug!(selection, runtime, %version, "Executing code");
        let result = self.piston.execute(runtime, &version, source, stdin).await?;
        Ok(ExecutionOutcome::Completed(result))
    }
}
