//! Drives one interview from welcome to the final report.

use std::sync::Arc;

use acemock_core::config::InterviewConfig;
use acemock_core::feedback::StageFeedback;
use acemock_core::results::ResultsAggregate;
use acemock_core::session::{InterviewSession, StageResult};
use acemock_core::stage::Stage;
use acemock_llm::EvaluationGateway;
use acemock_runner::CodeRunner;
use tracing::info;

use crate::error::StageError;
use crate::stages::{AptitudeStage, CodingStage, HRStage, SelfIntroductionStage, TechnicalQAStage};

pub struct InterviewController {
    session: InterviewSession,
    gateway: Arc<EvaluationGateway>,
    runner: Arc<CodeRunner>,
    config: InterviewConfig,
}

impl InterviewController {
    pub fn new(
        gateway: Arc<EvaluationGateway>,
        runner: Arc<CodeRunner>,
        config: InterviewConfig,
    ) -> Self {
        Self {
            session: InterviewSession::new(),
            gateway,
            runner,
            config,
        }
    }

    pub fn session(&self) -> &InterviewSession {
        &self.session
    }

    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    pub fn selection(&self) -> &str {
        self.session.selection()
    }

    pub fn results(&self) -> &ResultsAggregate {
        self.session.results()
    }

    pub fn gateway(&self) -> &EvaluationGateway {
        &self.gateway
    }

    pub fn runner(&self) -> &CodeRunner {
        &self.runner
    }

    pub fn config(&self) -> &InterviewConfig {
        &self.config
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn start(&mut self) -> Result<Stage, StageError> {
        Ok(self.session.advance(StageResult::Start)?)
    }

    pub fn select(&mut self, selection: &str) -> Result<Stage, StageError> {
        let stage = self
            .session
            .advance(StageResult::Selection(selection.trim().to_string()))?;
        info!(session = %self.session.id(), selection = self.session.selection(), "Selection made");
        Ok(stage)
    }

    /// Record a stage's feedback and move to the next stage.
    pub fn complete(&mut self, feedback: StageFeedback) -> Result<Stage, StageError> {
        Ok(self.session.advance(StageResult::Feedback(feedback))?)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn self_introduction(&self) -> SelfIntroductionStage {
        SelfIntroductionStage::new()
    }

    pub async fn load_aptitude(&self) -> Result<AptitudeStage, StageError> {
        AptitudeStage::load(&self.gateway, &self.config).await
    }

    pub async fn load_technical(&self) -> Result<TechnicalQAStage, StageError> {
        TechnicalQAStage::load(&self.gateway, self.session.selection()).await
    }

    pub async fn load_coding(&self) -> Result<CodingStage, StageError> {
        CodingStage::load(&self.gateway, self.session.selection()).await
    }

    pub async fn load_hr(&self) -> Result<HRStage, StageError> {
        HRStage::load(&self.gateway, &self.config).await
    }
}
