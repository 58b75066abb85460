//! Prompt builders, one per gateway operation.
//!
//! Each returns the system instruction plus the user turn. Unanswered items
//! are rendered as "Not Answered" here and nowhere else.

use serde_json::json;

use acemock_core::profile::ResolvedProfile;
use acemock_core::question::HRQuestion;
use acemock_core::AptitudeResult;

use crate::provider::Message;

pub const NOT_ANSWERED: &str = "Not Answered";

fn or_not_answered(answer: Option<&String>) -> &str {
    match answer {
        Some(a) if !a.trim().is_empty() => a.as_str(),
        _ => NOT_ANSWERED,
    }
}

fn pair(system: impl Into<String>, user: impl Into<String>) -> Vec<Message> {
    vec![Message::system(system), Message::user(user)]
}

pub fn self_introduction(introduction: &str) -> Vec<Message> {
    pair(
        "You are an expert HR manager and interview coach evaluating a candidate's self-introduction.",
        format!(
            "Analyze the following self-introduction: \"{introduction}\". Evaluate it based on clarity, confidence, and structure. Provide a score out of 10."
        ),
    )
}

pub fn aptitude_questions(count: usize) -> Vec<Message> {
    pair(
        "You are an expert test creator. Generate clear and unambiguous questions and answers.",
        format!(
            "Generate {count} unique, medium-difficulty quantitative and logical reasoning aptitude questions suitable for a pre-employment screening test. Each question must have exactly 4 multiple-choice options. Ensure one option is the correct answer."
        ),
    )
}

pub fn aptitude_evaluation(results: &[AptitudeResult]) -> Vec<Message> {
    let rendered: Vec<_> = results
        .iter()
        .map(|r| {
            json!({
                "question": r.question,
                "userAnswer": if r.user_answer.is_empty() { NOT_ANSWERED } else { r.user_answer.as_str() },
                "correctAnswer": r.correct_answer,
                "isCorrect": r.is_correct,
            })
        })
        .collect();
    pair(
        "You are an expert test evaluator. Analyze the user's performance and provide constructive feedback.",
        format!(
            "A candidate took an aptitude test. Here are their results:\n{}\n\nProvide an overall evaluation of their performance. Give a score from 1-10. Identify strengths (e.g., strong logical reasoning) and weaknesses (e.g., difficulty with percentages). Offer suggestions for improvement.",
            serde_json::Value::Array(rendered)
        ),
    )
}

pub fn technical_questions(profile: &ResolvedProfile) -> Vec<Message> {
    let count_line = "Generate 8 to 10 unique, foundational technical interview questions.";
    let quality_line = "Keep each question concise and unambiguous. Avoid trick questions and multi-part scenarios. Do not repeat or rephrase questions.";
    pair(
        format!(
            "Generate high-quality technical questions tailored to {}. Ensure coverage breadth across the specified topics. Output JSON array of strings only.",
            profile.selection
        ),
        format!(
            "{} {count_line} {} {quality_line}",
            profile.role_line(),
            profile.topics_line()
        ),
    )
}

pub fn technical_evaluation(questions: &[String], answers: &[String], selection: &str) -> Vec<Message> {
    let qa_pairs: Vec<_> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| json!({ "question": q, "answer": or_not_answered(answers.get(i)) }))
        .collect();
    pair(
        format!(
            "You are a senior software engineer and tech interviewer with deep expertise in {selection}. Provide a critical and fair evaluation for each answer and an overall summary."
        ),
        format!(
            "Language context: {selection}\n\nHere are the candidate's answers to a series of technical questions:\n\n{}\n\nFirst, for each question/answer pair, provide a specific evaluation and a score from 1-10. Then, provide an overall summary of performance: overall score, strengths, weaknesses, and suggestions. Set questionCount to {}.",
            serde_json::Value::Array(qa_pairs),
            questions.len()
        ),
    )
}

pub fn coding_challenge(profile: &ResolvedProfile) -> Vec<Message> {
    pair(
        "You are an expert problem setter for coding interviews.",
        format!(
            "Generate a unique, medium-difficulty coding challenge for a {} candidate. The problem should be solvable within 15–20 minutes. Style: {}\n\nYou MUST return JSON with keys: title, description, defaultCode. For defaultCode, use the following starter EXACTLY as the starting point (do not alter surrounding structure, only fill TODO when the candidate writes their solution):\n\n---STARTER-BEGIN---\n{}\n---STARTER-END---\n\nDo NOT include test cases or I/O code in defaultCode.",
            profile.selection, profile.challenge_style, profile.starter_template
        ),
    )
}

pub fn code_evaluation(problem: &str, selection: &str, code: &str) -> Vec<Message> {
    pair(
        "You are an expert code reviewer and competitive programming judge. Be precise and constructive in your feedback.",
        format!(
            "Coding Challenge: \"{problem}\"\n\nLanguage: \"{selection}\"\n\nCandidate's Code:\n```{selection}\n{code}\n```\n\nEvaluate the code for logic, syntax, efficiency, and adherence to the problem description."
        ),
    )
}

pub fn hr_questions(count: usize) -> Vec<Message> {
    pair(
        "You are an expert HR manager creating interview questions for software developer candidates. Generate questions that assess soft skills, communication, and cultural fit.",
        format!(
            "Generate {count} diverse HR interview questions covering different categories: behavioral, situational, motivational, teamwork, and leadership. These should be relevant for entry-level software developer positions."
        ),
    )
}

pub fn hr_evaluation(questions: &[HRQuestion], responses: &[String]) -> Vec<Message> {
    let qa_pairs: Vec<_> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            json!({
                "question": q.question,
                "category": q.category.as_str(),
                "response": or_not_answered(responses.get(i)),
            })
        })
        .collect();
    pair(
        "You are an expert HR manager evaluating interview responses. Assess communication, problem-solving, cultural fit, and leadership potential. Be fair and constructive.",
        format!(
            "Here are the candidate's responses to HR interview questions:\n\n{}\n\nEvaluate each response individually and provide an overall assessment. Consider communication skills, problem-solving approach, cultural fit, and leadership potential.",
            serde_json::Value::Array(qa_pairs)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use acemock_core::profile;
    use acemock_core::question::HRCategory;

    #[test]
    fn technical_prompt_uses_profile_topics() {
        let messages = technical_questions(&profile::resolve("Python"));
        assert!(messages[0].content.contains("tailored to Python"));
        assert!(messages[1]
            .content
            .contains("entry-level language candidate in Python"));
        assert!(messages[1].content.contains("decorators, generators/iterators"));
    }

    #[test]
    fn technical_prompt_falls_back_for_unknown_selection() {
        let messages = technical_questions(&profile::resolve("Elixir"));
        assert!(messages[1]
            .content
            .contains("Focus on core language/framework fundamentals."));
    }

    #[test]
    fn unanswered_items_render_as_not_answered() {
        let questions = vec![
            HRQuestion { question: "Why us?".into(), category: HRCategory::Motivational },
            HRQuestion { question: "A conflict?".into(), category: HRCategory::Teamwork },
        ];
        let responses = vec!["Because".to_string()];
        let messages = hr_evaluation(&questions, &responses);
        assert!(messages[1].content.contains("\"response\":\"Because\""));
        assert!(messages[1].content.contains("\"response\":\"Not Answered\""));
        assert!(messages[1].content.contains("\"category\":\"teamwork\""));
    }

    #[test]
    fn coding_prompt_embeds_starter() {
        let messages = coding_challenge(&profile::resolve("Go"));
        assert!(messages[1].content.contains("---STARTER-BEGIN---\npackage main"));
        assert!(messages[1].content.contains("Style: Function with clear signature"));
    }
}
