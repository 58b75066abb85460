use serde::{Deserialize, Serialize};

/// One step of the fixed interview sequence.
///
/// The derived ordering is the progression order; the session only ever
/// moves forward through it, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Welcome,
    LanguageSelection,
    SelfIntroduction,
    Aptitude,
    TechnicalQA,
    Coding,
    HR,
    Feedback,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Welcome,
        Stage::LanguageSelection,
        Stage::SelfIntroduction,
        Stage::Aptitude,
        Stage::TechnicalQA,
        Stage::Coding,
        Stage::HR,
        Stage::Feedback,
    ];

    /// The stage that follows this one, `None` for the terminal `Feedback` stage.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Welcome => Some(Stage::LanguageSelection),
            Stage::LanguageSelection => Some(Stage::SelfIntroduction),
            Stage::SelfIntroduction => Some(Stage::Aptitude),
            Stage::Aptitude => Some(Stage::TechnicalQA),
            Stage::TechnicalQA => Some(Stage::Coding),
            Stage::Coding => Some(Stage::HR),
            Stage::HR => Some(Stage::Feedback),
            Stage::Feedback => None,
        }
    }

    /// The results slot this stage fills when it completes.
    pub fn feedback_slot(self) -> Option<StageKey> {
        match self {
            Stage::SelfIntroduction => Some(StageKey::SelfIntroduction),
            Stage::Aptitude => Some(StageKey::Aptitude),
            Stage::TechnicalQA => Some(StageKey::TechnicalQA),
            Stage::Coding => Some(StageKey::Coding),
            Stage::HR => Some(StageKey::HrRound),
            Stage::Welcome | Stage::LanguageSelection | Stage::Feedback => None,
        }
    }

    /// Zero-based position in the progression.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Welcome => write!(f, "Welcome"),
            Stage::LanguageSelection => write!(f, "Language Selection"),
            Stage::SelfIntroduction => write!(f, "Self-Introduction"),
            Stage::Aptitude => write!(f, "Aptitude Test"),
            Stage::TechnicalQA => write!(f, "Technical Q&A"),
            Stage::Coding => write!(f, "Coding Challenge"),
            Stage::HR => write!(f, "HR Round"),
            Stage::Feedback => write!(f, "Feedback"),
        }
    }
}

/// Identifies one feedback slot of the results aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageKey {
    SelfIntroduction,
    Aptitude,
    #[serde(rename = "technicalQA")]
    TechnicalQA,
    Coding,
    HrRound,
}

impl StageKey {
    pub const ALL: [StageKey; 5] = [
        StageKey::SelfIntroduction,
        StageKey::Aptitude,
        StageKey::TechnicalQA,
        StageKey::Coding,
        StageKey::HrRound,
    ];

    /// The stage that produces feedback for this slot.
    pub fn stage(self) -> Stage {
        match self {
            StageKey::SelfIntroduction => Stage::SelfIntroduction,
            StageKey::Aptitude => Stage::Aptitude,
            StageKey::TechnicalQA => Stage::TechnicalQA,
            StageKey::Coding => Stage::Coding,
            StageKey::HrRound => Stage::HR,
        }
    }
}

impl std::fmt::Display for StageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.stage().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_the_whole_order_without_skipping() {
        let mut visited = vec![Stage::Welcome];
        let mut stage = Stage::Welcome;
        while let Some(next) = stage.next() {
            assert!(next > stage, "{next:?} must come after {stage:?}");
            assert_eq!(next.index(), stage.index() + 1);
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited, Stage::ALL.to_vec());
    }

    #[test]
    fn only_evaluated_stages_have_slots() {
        let with_slot: Vec<_> = Stage::ALL
            .iter()
            .filter_map(|s| s.feedback_slot())
            .collect();
        assert_eq!(with_slot, StageKey::ALL.to_vec());
        for key in StageKey::ALL {
            assert_eq!(key.stage().feedback_slot(), Some(key));
        }
    }

    #[test]
    fn stage_key_wire_names() {
        assert_eq!(
            serde_json::to_string(&StageKey::TechnicalQA).unwrap(),
            "\"technicalQA\""
        );
        assert_eq!(serde_json::to_string(&StageKey::HrRound).unwrap(), "\"hrRound\"");
    }
}
