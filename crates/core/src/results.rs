use serde::{Deserialize, Serialize};

use crate::feedback::{
    AptitudeFeedback, CodingFeedback, HRFeedback, SelfIntroductionFeedback, StageFeedback,
    TechnicalQAFeedback,
};
use crate::stage::StageKey;

/// One optional feedback slot per evaluated stage.
///
/// A slot is populated exactly when its stage has completed in the current
/// session. The overall score is derived on demand and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsAggregate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_introduction: Option<SelfIntroductionFeedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aptitude: Option<AptitudeFeedback>,
    #[serde(default, rename = "technicalQA", skip_serializing_if = "Option::is_none")]
    pub technical_qa: Option<TechnicalQAFeedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coding: Option<CodingFeedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hr_round: Option<HRFeedback>,
}

impl ResultsAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with the slot named by `feedback`'s stage set. Other
    /// slots are left untouched.
    pub fn merge(mut self, feedback: StageFeedback) -> Self {
        match feedback {
            StageFeedback::SelfIntroduction(f) => self.self_introduction = Some(f),
            StageFeedback::Aptitude(f) => self.aptitude = Some(f),
            StageFeedback::TechnicalQA(f) => self.technical_qa = Some(f),
            StageFeedback::Coding(f) => self.coding = Some(f),
            StageFeedback::HrRound(f) => self.hr_round = Some(f),
        }
        self
    }

    pub fn get(&self, key: StageKey) -> Option<StageFeedback> {
        match key {
            StageKey::SelfIntroduction => self.self_introduction.clone().map(StageFeedback::SelfIntroduction),
            StageKey::Aptitude => self.aptitude.clone().map(StageFeedback::Aptitude),
            StageKey::TechnicalQA => self.technical_qa.clone().map(StageFeedback::TechnicalQA),
            StageKey::Coding => self.coding.clone().map(StageFeedback::Coding),
            StageKey::HrRound => self.hr_round.clone().map(StageFeedback::HrRound),
        }
    }

    fn score_of(&self, key: StageKey) -> Option<u8> {
        match key {
            StageKey::SelfIntroduction => self.self_introduction.as_ref().map(|f| f.score),
            StageKey::Aptitude => self.aptitude.as_ref().map(|f| f.base.score),
            StageKey::TechnicalQA => self.technical_qa.as_ref().map(|f| f.base.score),
            StageKey::Coding => self.coding.as_ref().map(|f| f.base.score),
            StageKey::HrRound => self.hr_round.as_ref().map(|f| f.base.score),
        }
    }

    pub fn contains(&self, key: StageKey) -> bool {
        self.score_of(key).is_some()
    }

    /// Populated slots in stage order.
    pub fn iter(&self) -> impl Iterator<Item = StageFeedback> + '_ {
        StageKey::ALL.into_iter().filter_map(|k| self.get(k))
    }

    pub fn populated(&self) -> usize {
        StageKey::ALL.iter().filter(|k| self.contains(**k)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated() == 0
    }

    /// Arithmetic mean of populated slot scores; 0 when nothing is populated.
    pub fn overall_score(&self) -> f64 {
        let scores: Vec<u8> = StageKey::ALL.iter().filter_map(|k| self.score_of(*k)).collect();
        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64
    }

    /// Flatten the aggregate into one record per completed stage.
    pub fn report_records(&self) -> Vec<ReportRecord> {
        self.iter()
            .map(|fb| ReportRecord {
                stage: fb.key(),
                score: fb.score(),
                summary: summarize(&fb),
            })
            .collect()
    }
}

/// Per-stage row handed to an external report store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub stage: StageKey,
    pub score: u8,
    pub summary: String,
}

fn summarize(fb: &StageFeedback) -> String {
    let base = fb.base();
    let headline = match fb {
        StageFeedback::Aptitude(a) => format!("{}/{} correct", a.correct_count, a.total_questions),
        StageFeedback::TechnicalQA(t) => format!("{} questions", t.question_count),
        StageFeedback::Coding(c) => format!("logic: {}", c.logic),
        StageFeedback::HrRound(h) => format!(
            "communication {}, problem solving {}, cultural fit {}, leadership {}",
            h.communication, h.problem_solving, h.cultural_fit, h.leadership
        ),
        StageFeedback::SelfIntroduction(_) => String::new(),
    };
    let strengths = base.strengths.first().map(String::as_str).unwrap_or("");
    match (headline.is_empty(), strengths.is_empty()) {
        (true, true) => format!("score {}/10", base.score),
        (true, false) => strengths.to_string(),
        (false, true) => headline,
        (false, false) => format!("{headline}; {strengths}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Feedback;

    fn base(score: u8) -> Feedback {
        Feedback {
            strengths: vec!["Confident".into()],
            weaknesses: vec![],
            suggestions: vec![],
            score,
        }
    }

    fn coding(score: u8) -> StageFeedback {
        StageFeedback::Coding(CodingFeedback {
            base: base(score),
            logic: "correct".into(),
            syntax: "clean".into(),
            efficiency: "linear".into(),
        })
    }

    #[test]
    fn empty_aggregate_scores_zero() {
        let agg = ResultsAggregate::new();
        assert_eq!(agg.overall_score(), 0.0);
        assert!(agg.is_empty());
        assert!(agg.report_records().is_empty());
    }

    #[test]
    fn merge_sets_only_the_named_slot() {
        let agg = ResultsAggregate::new().merge(StageFeedback::SelfIntroduction(base(8)));
        assert!(agg.contains(StageKey::SelfIntroduction));
        assert!(!agg.contains(StageKey::Coding));

        let agg = agg.merge(coding(5));
        assert_eq!(agg.populated(), 2);
        assert_eq!(agg.self_introduction.as_ref().map(|f| f.score), Some(8));
    }

    #[test]
    fn overall_score_is_mean_of_populated() {
        let agg = ResultsAggregate::new()
            .merge(StageFeedback::SelfIntroduction(base(8)))
            .merge(coding(5));
        assert!((agg.overall_score() - 6.5).abs() < f64::EPSILON);

        // Recomputed after each merge, never cached.
        let agg = agg.merge(coding(9));
        assert!((agg.overall_score() - 8.5).abs() < f64::EPSILON);
    }

    #[test]
    fn iter_follows_stage_order() {
        let agg = ResultsAggregate::new()
            .merge(coding(5))
            .merge(StageFeedback::SelfIntroduction(base(8)));
        let keys: Vec<_> = agg.iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec![StageKey::SelfIntroduction, StageKey::Coding]);
    }

    #[test]
    fn report_records_summarize_each_stage() {
        let agg = ResultsAggregate::new()
            .merge(StageFeedback::SelfIntroduction(base(8)))
            .merge(coding(5));
        let records = agg.report_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].summary, "Confident");
        assert_eq!(records[1].summary, "logic: correct; Confident");
        assert_eq!(records[1].score, 5);
    }

    #[test]
    fn serializes_with_slot_names() {
        let agg = ResultsAggregate::new().merge(coding(5));
        let json = serde_json::to_value(&agg).unwrap();
        assert!(json.get("coding").is_some());
        assert!(json.get("technicalQA").is_none());
    }
}
