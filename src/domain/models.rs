use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::domain::answer_key::AnswerMap;
use crate::domain::types::{ExamModule, ScoringMode, SessionStatus};

/// A test definition tree as handed over by the authoring layer. The
/// per-type answer specs (`correct_answers`, `extra`) stay loosely typed
/// here; each grader converts them to its canonical representation at its
/// own boundary.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TestDefinition {
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub module: ExamModule,
    #[validate(length(min = 1, message = "test must have at least one part"), nested)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Part {
    #[serde(alias = "partNumber")]
    pub part_number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[validate(length(min = 1, message = "part must have at least one question"), nested)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Question {
    #[validate(length(min = 1, message = "question id must not be empty"))]
    pub id: String,
    #[serde(alias = "type", alias = "questionType")]
    #[validate(length(min = 1, message = "question_type must not be empty"))]
    pub question_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionItem>,
    #[serde(default, alias = "correctAnswers", alias = "correct_answer_spec")]
    pub correct_answers: Value,
    #[serde(default, alias = "extraMetadata", alias = "extra_metadata")]
    pub extra: Value,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default, alias = "scoringMode")]
    pub scoring_mode: Option<ScoringMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionItem {
    pub label: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "isCorrect")]
    pub is_correct: bool,
}

/// A student's run through one test. Answers stay mutable until the submit
/// path locks the session and grades it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSession {
    pub id: String,
    pub test_id: String,
    pub student_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub answers: AnswerMap,
}
