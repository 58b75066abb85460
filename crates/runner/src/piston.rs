//! Client for the Piston code-execution API.
//!
//! `GET {base}/runtimes` lists installed languages, `POST {base}/execute`
//! runs a single-file program.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::RunnerError;

/// Output of a program that ran to completion (successfully or not).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub signal: Option<String>,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && self.signal.is_none()
    }

    /// Combined text for an output panel.
    pub fn output_text(&self) -> String {
        let content = if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n--- stderr ---\n{}", self.stdout, self.stderr)
        };
        match (&self.signal, self.exit_code) {
            (Some(sig), _) => format!("{content}\n(killed by {sig})"),
            (None, Some(code)) if content.is_empty() => format!("(exit code {code})"),
            _ => content,
        }
    }
}

/// One entry of the `/runtimes` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PistonRuntime {
    pub language: String,
    pub version: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StageOutput {
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    signal: Option<String>,
}

impl From<StageOutput> for RunResult {
    fn from(s: StageOutput) -> Self {
        RunResult {
            stdout: s.stdout.unwrap_or_default(),
            stderr: s.stderr.unwrap_or_default(),
            exit_code: s.code,
            signal: s.signal,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    run: Option<StageOutput>,
    #[serde(default)]
    compile: Option<StageOutput>,
}

pub struct PistonClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl PistonClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RunnerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RunnerError::Unreachable)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn send_error(&self, err: reqwest::Error) -> RunnerError {
        if err.is_timeout() {
            RunnerError::Timeout(self.timeout)
        } else {
            RunnerError::Unreachable(err)
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RunnerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or_default().to_string());
        Err(RunnerError::Api {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn fetch_runtimes(&self) -> Result<Vec<PistonRuntime>, RunnerError> {
        let url = format!("{}/runtimes", self.base_url);
        debug!("Piston runtimes request to {}", url);
        let response = self.client.get(&url).send().await.map_err(|e| self.send_error(e))?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| RunnerError::Malformed(e.to_string()))
    }

    /// Run `source` as a single file named `Main`.
    pub async fn execute(
        &self,
        language: &str,
        version: &str,
        source: &str,
        stdin: &str,
    ) -> Result<RunResult, RunnerError> {
        let url = format!("{}/execute", self.base_url);
        let body = json!({
            "language": language,
            "version": version,
            "files": [{ "name": "Main", "content": source }],
            "stdin": stdin,
        });

        debug!(language, version, "Piston execute request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let response = Self::check(response).await?;
        let parsed: ExecuteResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                RunnerError::Timeout(self.timeout)
            } else {
                RunnerError::Malformed(e.to_string())
            }
        })?;

        // A failed compile never reaches the run stage; report the compiler.
        if let Some(compile) = parsed.compile {
            if compile.code.is_some_and(|c| c != 0) {
                return Ok(compile.into());
            }
        }
        Ok(parsed.run.unwrap_or_default().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_text_combines_streams() {
        let r = RunResult {
            stdout: "3\n".into(),
            stderr: "warning".into(),
            exit_code: Some(0),
            signal: None,
        };
        assert_eq!(r.output_text(), "3\n\n--- stderr ---\nwarning");
        assert!(r.success());

        let empty = RunResult { exit_code: Some(1), ..Default::default() };
        assert_eq!(empty.output_text(), "(exit code 1)");
        assert!(!empty.success());
    }

    #[test]
    fn missing_run_fields_default() {
        let parsed: ExecuteResponse = serde_json::from_str(r#"{"run": {"stdout": "hi"}}"#).unwrap();
        let r: RunResult = parsed.run.unwrap().into();
        assert_eq!(r.stdout, "hi");
        assert_eq!(r.stderr, "");
        assert_eq!(r.exit_code, None);
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let c = PistonClient::new("http://localhost:2000/api/v2/", Duration::from_secs(1)).unwrap();
        assert_eq!(c.base_url(), "http://localhost:2000/api/v2");
    }
}
