//! Response-shape descriptors sent alongside each prompt.
//!
//! One typed tree renders to both standard JSON Schema (OpenAI, Ollama, the
//! prompt-embedded fallback) and Gemini's upper-case type dialect.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Integer,
    Array(Box<ResponseSchema>),
    /// Every property is required.
    Object(Vec<(&'static str, ResponseSchema)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub node: SchemaNode,
    pub description: Option<String>,
}

#[derive(Clone, Copy)]
enum Dialect {
    JsonSchema,
    Gemini,
}

impl ResponseSchema {
    pub fn string() -> Self {
        Self { node: SchemaNode::String, description: None }
    }

    pub fn integer() -> Self {
        Self { node: SchemaNode::Integer, description: None }
    }

    pub fn array(items: ResponseSchema) -> Self {
        Self { node: SchemaNode::Array(Box::new(items)), description: None }
    }

    pub fn object(properties: Vec<(&'static str, ResponseSchema)>) -> Self {
        Self { node: SchemaNode::Object(properties), description: None }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append properties to an object schema; no-op for other nodes.
    fn extend(mut self, extra: Vec<(&'static str, ResponseSchema)>) -> Self {
        if let SchemaNode::Object(props) = &mut self.node {
            props.extend(extra);
        }
        self
    }

    pub fn to_json_schema(&self) -> Value {
        self.render(Dialect::JsonSchema)
    }

    pub fn to_gemini(&self) -> Value {
        self.render(Dialect::Gemini)
    }

    fn render(&self, dialect: Dialect) -> Value {
        let type_name = |lower: &str| match dialect {
            Dialect::JsonSchema => lower.to_string(),
            Dialect::Gemini => lower.to_uppercase(),
        };
        let mut out = match &self.node {
            SchemaNode::String => json!({ "type": type_name("string") }),
            SchemaNode::Integer => json!({ "type": type_name("integer") }),
            SchemaNode::Array(items) => json!({
                "type": type_name("array"),
                "items": items.render(dialect),
            }),
            SchemaNode::Object(props) => {
                let mut properties = Map::new();
                for (name, schema) in props {
                    properties.insert((*name).to_string(), schema.render(dialect));
                }
                let required: Vec<&str> = props.iter().map(|(n, _)| *n).collect();
                let mut obj = json!({
                    "type": type_name("object"),
                    "properties": properties,
                    "required": required,
                });
                if matches!(dialect, Dialect::JsonSchema) {
                    obj["additionalProperties"] = json!(false);
                }
                obj
            }
        };
        if let Some(d) = &self.description {
            out["description"] = json!(d);
        }
        out
    }

    // ── Stage schemas ────────────────────────────────────────

    /// Strengths, weaknesses, suggestions and an overall score.
    pub fn feedback() -> Self {
        Self::object(vec![
            (
                "strengths",
                Self::array(Self::string()).describe("Positive aspects of the response."),
            ),
            (
                "weaknesses",
                Self::array(Self::string()).describe("Areas that need improvement."),
            ),
            (
                "suggestions",
                Self::array(Self::string()).describe("Actionable tips for improvement."),
            ),
            (
                "score",
                Self::integer().describe("A score from 1 to 10 evaluating the overall performance."),
            ),
        ])
    }

    pub fn aptitude_questions() -> Self {
        Self::array(Self::object(vec![
            ("question", Self::string().describe("The aptitude question text.")),
            (
                "options",
                Self::array(Self::string()).describe("An array of 4 multiple-choice options."),
            ),
            (
                "answer",
                Self::string().describe("The correct answer from the options array."),
            ),
        ]))
    }

    pub fn question_list() -> Self {
        Self::array(Self::string()).describe("A list of technical interview questions")
    }

    pub fn technical_feedback() -> Self {
        Self::feedback().extend(vec![
            ("questionCount", Self::integer()),
            (
                "detailedResults",
                Self::array(Self::object(vec![
                    ("question", Self::string()),
                    ("answer", Self::string()),
                    (
                        "evaluation",
                        Self::string().describe(
                            "Specific feedback on this answer's technical accuracy and clarity.",
                        ),
                    ),
                    (
                        "score",
                        Self::integer().describe("A score from 1 to 10 for this specific answer."),
                    ),
                ])),
            ),
        ])
    }

    pub fn coding_challenge(selection: &str) -> Self {
        Self::object(vec![
            ("title", Self::string()),
            ("description", Self::string()),
            (
                "defaultCode",
                Self::string().describe(format!("Function signature or class structure in {selection}")),
            ),
        ])
    }

    pub fn coding_feedback() -> Self {
        Self::feedback().extend(vec![
            (
                "logic",
                Self::string()
                    .describe("Evaluation of the logical approach and correctness of the algorithm."),
            ),
            (
                "syntax",
                Self::string().describe("Comments on code style, syntax, and readability."),
            ),
            (
                "efficiency",
                Self::string().describe("Analysis of the time and space complexity."),
            ),
        ])
    }

    pub fn hr_questions() -> Self {
        Self::array(Self::object(vec![
            ("question", Self::string().describe("The HR interview question text.")),
            (
                "category",
                Self::string().describe(
                    "Category of the question: behavioral, situational, motivational, teamwork, or leadership.",
                ),
            ),
        ]))
    }

    pub fn hr_feedback() -> Self {
        Self::feedback().extend(vec![
            (
                "communication",
                Self::integer().describe("Score from 1-10 for communication skills"),
            ),
            (
                "problemSolving",
                Self::integer().describe("Score from 1-10 for problem-solving approach"),
            ),
            (
                "culturalFit",
                Self::integer().describe("Score from 1-10 for cultural fit and values alignment"),
            ),
            (
                "leadership",
                Self::integer().describe("Score from 1-10 for leadership potential"),
            ),
            (
                "detailedResults",
                Self::array(Self::object(vec![
                    ("question", Self::string()),
                    ("response", Self::string()),
                    (
                        "evaluation",
                        Self::string().describe("Specific feedback on this response"),
                    ),
                    (
                        "score",
                        Self::integer().describe("Score from 1-10 for this response"),
                    ),
                ])),
            ),
        ])
    }
}
