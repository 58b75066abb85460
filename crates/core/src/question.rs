use serde::{Deserialize, Serialize};

/// A multiple-choice aptitude question with its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AptitudeQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Must equal one of `options` exactly; grading is an exact string match.
    pub answer: String,
}

/// Category of an HR round question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HRCategory {
    #[serde(alias = "Behavioral")]
    Behavioral,
    #[serde(alias = "Situational")]
    Situational,
    #[serde(alias = "Motivational")]
    Motivational,
    #[serde(alias = "Teamwork")]
    Teamwork,
    #[serde(alias = "Leadership")]
    Leadership,
}

impl HRCategory {
    pub const ALL: [HRCategory; 5] = [
        HRCategory::Behavioral,
        HRCategory::Situational,
        HRCategory::Motivational,
        HRCategory::Teamwork,
        HRCategory::Leadership,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HRCategory::Behavioral => "behavioral",
            HRCategory::Situational => "situational",
            HRCategory::Motivational => "motivational",
            HRCategory::Teamwork => "teamwork",
            HRCategory::Leadership => "leadership",
        }
    }
}

impl std::fmt::Display for HRCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HRQuestion {
    pub question: String,
    pub category: HRCategory,
}

/// A generated coding challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingChallenge {
    pub title: String,
    pub description: String,
    /// Starter code, wrapped in a markdown fence tagged with the code language.
    pub default_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hr_category_parses_lowercase() {
        let q: HRQuestion =
            serde_json::from_str(r#"{"question":"Tell me about a conflict.","category":"teamwork"}"#)
                .unwrap();
        assert_eq!(q.category, HRCategory::Teamwork);
        assert_eq!(
            serde_json::from_str::<HRCategory>("\"Leadership\"").unwrap(),
            HRCategory::Leadership
        );
        assert!(serde_json::from_str::<HRCategory>("\"gossip\"").is_err());
    }

    #[test]
    fn coding_challenge_uses_camel_case() {
        let c: CodingChallenge = serde_json::from_str(
            r#"{"title":"Two Sum","description":"Find a pair.","defaultCode":"def solve(input):\n    pass"}"#,
        )
        .unwrap();
        assert_eq!(c.title, "Two Sum");
        assert!(c.default_code.starts_with("def solve"));
    }
}
