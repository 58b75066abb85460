//! Structured evaluation results, one variant per evaluated stage.
//!
//! Every variant shares the [`Feedback`] base shape and may add
//! stage-specific fields. [`StageFeedback`] is the tagged union the results
//! aggregate stores; the tag is the stage, never the presence of a field.

use serde::{Deserialize, Serialize};

use crate::question::{AptitudeQuestion, HRQuestion};
use crate::stage::StageKey;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackError {
    #[error("{field} = {value} is outside [1, 10]")]
    ScoreOutOfRange { field: String, value: u8 },
    #[error("expected {expected} per-question results, got {actual}")]
    DetailCountMismatch { expected: usize, actual: usize },
    #[error("question count {reported} does not match the {expected} questions asked")]
    QuestionCountMismatch { expected: usize, reported: usize },
    #[error("correct count {reported} does not match {actual} correct answers out of {total}")]
    CorrectCountMismatch {
        reported: usize,
        actual: usize,
        total: usize,
    },
}

fn check_score(field: impl Into<String>, value: u8) -> Result<(), FeedbackError> {
    if (MIN_SCORE..=MAX_SCORE).contains(&value) {
        Ok(())
    } else {
        Err(FeedbackError::ScoreOutOfRange {
            field: field.into(),
            value,
        })
    }
}

fn check_len(expected: usize, actual: usize) -> Result<(), FeedbackError> {
    if expected == actual {
        Ok(())
    } else {
        Err(FeedbackError::DetailCountMismatch { expected, actual })
    }
}

/// The base shape shared by every stage's feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    /// Overall score, 1 to 10 inclusive.
    pub score: u8,
}

impl Feedback {
    pub fn validate(&self) -> Result<(), FeedbackError> {
        check_score("score", self.score)
    }
}

pub type SelfIntroductionFeedback = Feedback;

// ── Aptitude ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AptitudeResult {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AptitudeFeedback {
    #[serde(flatten)]
    pub base: Feedback,
    pub correct_count: usize,
    pub total_questions: usize,
    pub detailed_results: Vec<AptitudeResult>,
}

impl AptitudeFeedback {
    /// Grade answers against the answer keys by exact string match.
    ///
    /// `answers` is positional; missing trailing answers count as empty.
    pub fn grade_answers(questions: &[AptitudeQuestion], answers: &[String]) -> Vec<AptitudeResult> {
        questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let user_answer = answers.get(i).cloned().unwrap_or_default();
                AptitudeResult {
                    question: q.question.clone(),
                    is_correct: user_answer == q.answer,
                    user_answer,
                    correct_answer: q.answer.clone(),
                }
            })
            .collect()
    }

    /// Assemble the stage feedback from locally graded results and the
    /// qualitative part returned by the evaluator.
    pub fn from_results(detailed_results: Vec<AptitudeResult>, base: Feedback) -> Self {
        let correct_count = detailed_results.iter().filter(|r| r.is_correct).count();
        Self {
            base,
            correct_count,
            total_questions: detailed_results.len(),
            detailed_results,
        }
    }

    pub fn validate(&self) -> Result<(), FeedbackError> {
        self.base.validate()?;
        check_len(self.total_questions, self.detailed_results.len())?;
        let actual = self
            .detailed_results
            .iter()
            .filter(|r| r.is_correct && r.user_answer == r.correct_answer)
            .count();
        if actual != self.correct_count || self.correct_count > self.total_questions {
            return Err(FeedbackError::CorrectCountMismatch {
                reported: self.correct_count,
                actual,
                total: self.total_questions,
            });
        }
        Ok(())
    }
}

// ── Technical Q&A ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalQAResult {
    pub question: String,
    pub answer: String,
    pub evaluation: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalQAFeedback {
    #[serde(flatten)]
    pub base: Feedback,
    pub question_count: usize,
    pub detailed_results: Vec<TechnicalQAResult>,
}

impl TechnicalQAFeedback {
    /// Validate against the number of questions that were actually asked.
    pub fn validate(&self, questions_asked: usize) -> Result<(), FeedbackError> {
        self.base.validate()?;
        if self.question_count != questions_asked {
            return Err(FeedbackError::QuestionCountMismatch {
                expected: questions_asked,
                reported: self.question_count,
            });
        }
        check_len(questions_asked, self.detailed_results.len())?;
        for (i, r) in self.detailed_results.iter().enumerate() {
            check_score(format!("detailedResults[{i}].score"), r.score)?;
        }
        Ok(())
    }
}

// ── Coding ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingFeedback {
    #[serde(flatten)]
    pub base: Feedback,
    pub logic: String,
    pub syntax: String,
    pub efficiency: String,
}

impl CodingFeedback {
    pub fn validate(&self) -> Result<(), FeedbackError> {
        self.base.validate()
    }
}

// ── HR round ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HRResult {
    pub question: String,
    pub response: String,
    pub evaluation: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HRFeedback {
    #[serde(flatten)]
    pub base: Feedback,
    pub communication: u8,
    pub problem_solving: u8,
    pub cultural_fit: u8,
    pub leadership: u8,
    pub detailed_results: Vec<HRResult>,
}

impl HRFeedback {
    /// Deterministic feedback used when the evaluator cannot be reached, so
    /// the HR round can always complete.
    pub fn fallback(questions: &[HRQuestion], responses: &[String]) -> Self {
        let detailed_results = questions
            .iter()
            .enumerate()
            .map(|(i, q)| HRResult {
                question: q.question.clone(),
                response: responses.get(i).cloned().unwrap_or_default(),
                evaluation: "Good response with room for improvement".to_string(),
                score: 7,
            })
            .collect();
        Self {
            base: Feedback {
                strengths: vec![
                    "Good communication skills".to_string(),
                    "Professional demeanor".to_string(),
                ],
                weaknesses: vec![
                    "Could provide more specific examples".to_string(),
                    "Consider expanding on experiences".to_string(),
                ],
                suggestions: vec![
                    "Practice STAR method responses".to_string(),
                    "Prepare more detailed examples".to_string(),
                ],
                score: 7,
            },
            communication: 7,
            problem_solving: 6,
            cultural_fit: 7,
            leadership: 6,
            detailed_results,
        }
    }

    pub fn validate(&self, questions_asked: usize) -> Result<(), FeedbackError> {
        self.base.validate()?;
        check_score("communication", self.communication)?;
        check_score("problemSolving", self.problem_solving)?;
        check_score("culturalFit", self.cultural_fit)?;
        check_score("leadership", self.leadership)?;
        check_len(questions_asked, self.detailed_results.len())?;
        for (i, r) in self.detailed_results.iter().enumerate() {
            check_score(format!("detailedResults[{i}].score"), r.score)?;
        }
        Ok(())
    }
}

// ── Tagged union ──────────────────────────────────────────────

/// Feedback for one completed stage, tagged by the stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "camelCase")]
pub enum StageFeedback {
    SelfIntroduction(SelfIntroductionFeedback),
    Aptitude(AptitudeFeedback),
    #[serde(rename = "technicalQA")]
    TechnicalQA(TechnicalQAFeedback),
    Coding(CodingFeedback),
    HrRound(HRFeedback),
}

impl StageFeedback {
    pub fn key(&self) -> StageKey {
        match self {
            StageFeedback::SelfIntroduction(_) => StageKey::SelfIntroduction,
            StageFeedback::Aptitude(_) => StageKey::Aptitude,
            StageFeedback::TechnicalQA(_) => StageKey::TechnicalQA,
            StageFeedback::Coding(_) => StageKey::Coding,
            StageFeedback::HrRound(_) => StageKey::HrRound,
        }
    }

    pub fn base(&self) -> &Feedback {
        match self {
            StageFeedback::SelfIntroduction(f) => f,
            StageFeedback::Aptitude(f) => &f.base,
            StageFeedback::TechnicalQA(f) => &f.base,
            StageFeedback::Coding(f) => &f.base,
            StageFeedback::HrRound(f) => &f.base,
        }
    }

    pub fn score(&self) -> u8 {
        self.base().score
    }

    /// Range and consistency checks that need no outside context. Detail
    /// counts are checked against their own `question_count` / result length.
    pub fn validate(&self) -> Result<(), FeedbackError> {
        match self {
            StageFeedback::SelfIntroduction(f) => f.validate(),
            StageFeedback::Aptitude(f) => f.validate(),
            StageFeedback::TechnicalQA(f) => f.validate(f.question_count),
            StageFeedback::Coding(f) => f.validate(),
            StageFeedback::HrRound(f) => f.validate(f.detailed_results.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::HRCategory;

    fn base(score: u8) -> Feedback {
        Feedback {
            strengths: vec!["clear".into()],
            weaknesses: vec![],
            suggestions: vec!["practice".into()],
            score,
        }
    }

    fn aptitude_questions(n: usize) -> Vec<AptitudeQuestion> {
        (0..n)
            .map(|i| AptitudeQuestion {
                question: format!("Q{i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                answer: "b".into(),
            })
            .collect()
    }

    #[test]
    fn aptitude_three_of_five_correct() {
        let questions = aptitude_questions(5);
        let answers: Vec<String> = ["b", "b", "a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let results = AptitudeFeedback::grade_answers(&questions, &answers);
        let feedback = AptitudeFeedback::from_results(results, base(6));

        assert_eq!(feedback.correct_count, 3);
        assert_eq!(feedback.total_questions, 5);
        assert!(feedback.validate().is_ok());
    }

    #[test]
    fn aptitude_missing_answers_are_empty_and_wrong() {
        let questions = aptitude_questions(5);
        let answers = vec!["b".to_string(), "a".to_string()];
        let results = AptitudeFeedback::grade_answers(&questions, &answers);

        assert_eq!(results.len(), 5);
        assert!(results[2..].iter().all(|r| r.user_answer.is_empty() && !r.is_correct));
        let feedback = AptitudeFeedback::from_results(results, base(3));
        assert_eq!(feedback.correct_count, 1);
    }

    #[test]
    fn aptitude_inconsistent_count_rejected() {
        let questions = aptitude_questions(2);
        let answers = vec!["b".to_string(), "b".to_string()];
        let results = AptitudeFeedback::grade_answers(&questions, &answers);
        let mut feedback = AptitudeFeedback::from_results(results, base(9));
        feedback.correct_count = 1;
        assert!(matches!(
            feedback.validate(),
            Err(FeedbackError::CorrectCountMismatch { reported: 1, actual: 2, total: 2 })
        ));
    }

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(base(1).validate().is_ok());
        assert!(base(10).validate().is_ok());
        assert!(matches!(
            base(0).validate(),
            Err(FeedbackError::ScoreOutOfRange { value: 0, .. })
        ));
        assert!(base(11).validate().is_err());
    }

    #[test]
    fn technical_counts_must_match_questions_asked() {
        let fb = TechnicalQAFeedback {
            base: base(7),
            question_count: 2,
            detailed_results: vec![TechnicalQAResult {
                question: "What is ownership?".into(),
                answer: "".into(),
                evaluation: "Missing".into(),
                score: 1,
            }],
        };
        assert!(matches!(
            fb.validate(2),
            Err(FeedbackError::DetailCountMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            fb.validate(3),
            Err(FeedbackError::QuestionCountMismatch { expected: 3, reported: 2 })
        ));
    }

    #[test]
    fn hr_fallback_covers_every_question() {
        let questions: Vec<HRQuestion> = HRCategory::ALL
            .iter()
            .map(|c| HRQuestion {
                question: format!("{c} question"),
                category: *c,
            })
            .collect();
        let responses = vec!["I led a project".to_string()];
        let fb = HRFeedback::fallback(&questions, &responses);

        assert_eq!(fb.detailed_results.len(), 5);
        assert_eq!(fb.detailed_results[0].response, "I led a project");
        assert_eq!(fb.detailed_results[4].response, "");
        assert_eq!((fb.communication, fb.problem_solving, fb.cultural_fit, fb.leadership), (7, 6, 7, 6));
        assert!(fb.validate(5).is_ok());
    }

    #[test]
    fn hr_sub_scores_checked() {
        let mut fb = HRFeedback::fallback(&[], &[]);
        fb.cultural_fit = 0;
        match fb.validate(0) {
            Err(FeedbackError::ScoreOutOfRange { field, value }) => {
                assert_eq!(field, "culturalFit");
                assert_eq!(value, 0);
            }
            other => panic!("expected out-of-range error, got {other:?}"),
        }
    }

    #[test]
    fn stage_feedback_is_tagged_by_stage() {
        let fb = StageFeedback::Coding(CodingFeedback {
            base: base(8),
            logic: "sound".into(),
            syntax: "idiomatic".into(),
            efficiency: "O(n)".into(),
        });
        let json = serde_json::to_value(&fb).unwrap();
        assert_eq!(json["stage"], "coding");
        assert_eq!(json["score"], 8);
        assert_eq!(fb.key(), StageKey::Coding);

        let back: StageFeedback = serde_json::from_value(json).unwrap();
        assert_eq!(back, fb);
    }

    #[test]
    fn camel_case_wire_names_parse() {
        let raw = r#"{
            "strengths": ["a"], "weaknesses": [], "suggestions": [], "score": 7,
            "communication": 8, "problemSolving": 6, "culturalFit": 7, "leadership": 5,
            "detailedResults": [{"question": "q", "response": "r", "evaluation": "e", "score": 6}]
        }"#;
        let fb: HRFeedback = serde_json::from_str(raw).unwrap();
        assert_eq!(fb.problem_solving, 6);
        assert_eq!(fb.base.score, 7);
        assert!(fb.validate(1).is_ok());
    }
}
