//! The evaluation gateway: one prompt + schema pair per interview
//! operation, with strict parsing of whatever comes back.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use acemock_core::config::LlmConfig;
use acemock_core::feedback::{
    AptitudeFeedback, CodingFeedback, Feedback, HRFeedback, SelfIntroductionFeedback,
    TechnicalQAFeedback,
};
use acemock_core::profile;
use acemock_core::question::{AptitudeQuestion, CodingChallenge, HRQuestion};

use crate::json::extract_json;
use crate::prompts;
use crate::provider::{LlmError, LlmProvider, Message};
use crate::providers::create_provider;
use crate::schema::ResponseSchema;

pub const MIN_TECHNICAL_QUESTIONS: usize = 8;
pub const MAX_TECHNICAL_QUESTIONS: usize = 10;
pub const HR_QUESTION_COUNT: usize = 5;
pub const APTITUDE_OPTION_COUNT: usize = 4;

/// Failure of a single gateway call. Both kinds are retryable from the
/// caller's point of view.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("invalid {operation} response: {reason}")]
    InvalidResponse {
        operation: &'static str,
        reason: String,
    },
}

impl EvaluationError {
    fn invalid(operation: &'static str, reason: impl std::fmt::Display) -> Self {
        EvaluationError::InvalidResponse {
            operation,
            reason: reason.to_string(),
        }
    }
}

pub struct EvaluationGateway {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl EvaluationGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(config)?);
        Ok(Self::new(provider, config.temperature, config.max_tokens))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    async fn request<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        messages: Vec<Message>,
        schema: ResponseSchema,
    ) -> Result<T, EvaluationError> {
        debug!(operation, provider = self.provider.provider_name(), "LLM request");
        let raw = self
            .provider
            .complete_json(messages, &schema, self.temperature, self.max_tokens)
            .await
            .inspect_err(|e| warn!(operation, error = %e, "LLM call failed"))?;
        serde_json::from_str(extract_json(&raw)).map_err(|e| {
            warn!(operation, error = %e, "LLM response did not match the expected shape");
            EvaluationError::invalid(operation, e)
        })
    }

    fn check<E: std::fmt::Display>(
        operation: &'static str,
        result: Result<(), E>,
    ) -> Result<(), EvaluationError> {
        result.map_err(|e| {
            warn!(operation, error = %e, "LLM response failed validation");
            EvaluationError::invalid(operation, e)
        })
    }

    pub async fn analyze_self_introduction(
        &self,
        introduction: &str,
    ) -> Result<SelfIntroductionFeedback, EvaluationError> {
        const OP: &str = "self-introduction";
        let feedback: Feedback = self
            .request(OP, prompts::self_introduction(introduction), ResponseSchema::feedback())
            .await?;
        Self::check(OP, feedback.validate())?;
        Ok(feedback)
    }

    pub async fn generate_aptitude_questions(
        &self,
        count: usize,
    ) -> Result<Vec<AptitudeQuestion>, EvaluationError> {
        const OP: &str = "aptitude questions";
        let questions: Vec<AptitudeQuestion> = self
            .request(OP, prompts::aptitude_questions(count), ResponseSchema::aptitude_questions())
            .await?;
        if questions.len() != count {
            return Err(EvaluationError::invalid(
                OP,
                format!("expected {count} questions, got {}", questions.len()),
            ));
        }
        for (i, q) in questions.iter().enumerate() {
            if q.question.trim().is_empty() {
                return Err(EvaluationError::invalid(OP, format!("question {i} is empty")));
            }
            if q.options.len() != APTITUDE_OPTION_COUNT {
                return Err(EvaluationError::invalid(
                    OP,
                    format!("question {i} has {} options", q.options.len()),
                ));
            }
            if !q.options.contains(&q.answer) {
                return Err(EvaluationError::invalid(
                    OP,
                    format!("answer to question {i} is not one of its options"),
                ));
            }
        }
        Ok(questions)
    }

    /// Grading is local and exact; only the qualitative part comes from the model.
    pub async fn evaluate_aptitude(
        &self,
        questions: &[AptitudeQuestion],
        answers: &[String],
    ) -> Result<AptitudeFeedback, EvaluationError> {
        const OP: &str = "aptitude evaluation";
        let results = AptitudeFeedback::grade_answers(questions, answers);
        let base: Feedback = self
            .request(OP, prompts::aptitude_evaluation(&results), ResponseSchema::feedback())
            .await?;
        let feedback = AptitudeFeedback::from_results(results, base);
        Self::check(OP, feedback.validate())?;
        Ok(feedback)
    }

    pub async fn generate_technical_questions(
        &self,
        selection: &str,
    ) -> Result<Vec<String>, EvaluationError> {
        const OP: &str = "technical questions";
        let resolved = profile::resolve(selection);
        let questions: Vec<String> = self
            .request(OP, prompts::technical_questions(&resolved), ResponseSchema::question_list())
            .await?;
        let questions: Vec<String> = questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();
        if !(MIN_TECHNICAL_QUESTIONS..=MAX_TECHNICAL_QUESTIONS).contains(&questions.len()) {
            return Err(EvaluationError::invalid(
                OP,
                format!(
                    "expected {MIN_TECHNICAL_QUESTIONS} to {MAX_TECHNICAL_QUESTIONS} questions, got {}",
                    questions.len()
                ),
            ));
        }
        Ok(questions)
    }

    pub async fn evaluate_technical_answers(
        &self,
        questions: &[String],
        answers: &[String],
        selection: &str,
    ) -> Result<TechnicalQAFeedback, EvaluationError> {
        const OP: &str = "technical evaluation";
        let feedback: TechnicalQAFeedback = self
            .request(
                OP,
                prompts::technical_evaluation(questions, answers, selection),
                ResponseSchema::technical_feedback(),
            )
            .await?;
        Self::check(OP, feedback.validate(questions.len()))?;
        Ok(feedback)
    }

    /// The starter template stands in when the model returns no code, and
    /// the code is always returned fenced with the profile's language tag.
    pub async fn generate_coding_challenge(
        &self,
        selection: &str,
    ) -> Result<CodingChallenge, EvaluationError> {
        const OP: &str = "coding challenge";
        let resolved = profile::resolve(selection);
        let mut challenge: CodingChallenge = self
            .request(
                OP,
                prompts::coding_challenge(&resolved),
                ResponseSchema::coding_challenge(selection),
            )
            .await?;
        if challenge.title.trim().is_empty() || challenge.description.trim().is_empty() {
            return Err(EvaluationError::invalid(OP, "missing title or description"));
        }
        if challenge.default_code.trim().is_empty() {
            challenge.default_code = resolved.starter_template.clone();
        }
        challenge.default_code = fence_code(&challenge.default_code, &resolved.code_fence_language);
        Ok(challenge)
    }

    pub async fn evaluate_code(
        &self,
        problem: &str,
        selection: &str,
        code: &str,
    ) -> Result<CodingFeedback, EvaluationError> {
        const OP: &str = "code evaluation";
        let feedback: CodingFeedback = self
            .request(
                OP,
                prompts::code_evaluation(problem, selection, code),
                ResponseSchema::coding_feedback(),
            )
            .await?;
        Self::check(OP, feedback.validate())?;
        Ok(feedback)
    }

    pub async fn generate_hr_questions(&self) -> Result<Vec<HRQuestion>, EvaluationError> {
        const OP: &str = "HR questions";
        let questions: Vec<HRQuestion> = self
            .request(OP, prompts::hr_questions(HR_QUESTION_COUNT), ResponseSchema::hr_questions())
            .await?;
        if questions.len() != HR_QUESTION_COUNT {
            return Err(EvaluationError::invalid(
                OP,
                format!("expected {HR_QUESTION_COUNT} questions, got {}", questions.len()),
            ));
        }
        if questions.iter().any(|q| q.question.trim().is_empty()) {
            return Err(EvaluationError::invalid(OP, "empty question text"));
        }
        Ok(questions)
    }

    pub async fn evaluate_hr_responses(
        &self,
        questions: &[HRQuestion],
        responses: &[String],
    ) -> Result<HRFeedback, EvaluationError> {
        const OP: &str = "HR evaluation";
        let feedback: HRFeedback = self
            .request(OP, prompts::hr_evaluation(questions, responses), ResponseSchema::hr_feedback())
            .await?;
        Self::check(OP, feedback.validate(questions.len()))?;
        Ok(feedback)
    }
}

/// Wrap code in a markdown fence tagged `language`, unless it is already fenced.
pub fn fence_code(code: &str, language: &str) -> String {
    if code.starts_with("```") {
        code.to_string()
    } else {
        format!("```{language}\n{code}\n```")
    }
}
