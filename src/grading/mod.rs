use serde_json::Value;
use thiserror::Error;

use crate::domain::answer_key::AnswerMap;
use crate::domain::models::Question;
use crate::domain::types::{QuestionKind, ScoringMode};
use crate::grading::normalize::{normalize_str, normalize_value};
use crate::schemas::breakdown::SubQuestionResult;

pub mod assembler;
pub mod bands;
pub mod gap_fill;
pub mod matching;
pub mod multiple_response;
pub mod normalize;
pub mod render;
pub mod single_choice;
pub mod table;

/// Per-question grading failure. Always degrades to a zero-width
/// placeholder at the assembler boundary; one malformed question must not
/// block grading of the rest of the test.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradingAnomaly {
    #[error("unsupported question type: {0}")]
    UnsupportedType(String),
    #[error("question {question_id} is missing its {expected} spec")]
    MissingSpec { question_id: String, expected: &'static str },
    #[error("question {question_id} has a malformed {expected} spec: {detail}")]
    MalformedSpec { question_id: String, expected: &'static str, detail: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraderOutput {
    pub correct: u32,
    pub total: u32,
    pub subs: Vec<SubQuestionResult>,
}

/// Dispatches a question to the grader for its type family.
pub fn grade_question(
    question: &Question,
    answers: &AnswerMap,
) -> Result<GraderOutput, GradingAnomaly> {
    match QuestionKind::classify(&question.question_type) {
        Some(QuestionKind::GapFill) => gap_fill::grade(question, answers),
        Some(QuestionKind::Table) => table::grade(question, answers),
        Some(QuestionKind::MultipleResponse) => multiple_response::grade(question, answers),
        Some(QuestionKind::SingleChoice) => single_choice::grade(question, answers),
        Some(QuestionKind::Matching) => matching::grade(question, answers),
        None => Err(GradingAnomaly::UnsupportedType(question.question_type.clone())),
    }
}

/// Boolean-like "selected" test shared by the choice graders: boolean
/// `true`, anything normalizing to `TRUE`, or an echo of the label itself.
pub(crate) fn is_affirmative(value: &Value, label: &str) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        _ => {
            let normalized = normalize_value(value);
            normalized == "TRUE" || (!normalized.is_empty() && normalized == normalize_str(label))
        }
    }
}

/// Raw stored value rendered for review output. `None` for absent/null.
pub(crate) fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(raw) => Some(raw.clone()),
        other => Some(other.to_string()),
    }
}

/// Scoring policy shared by the set-valued graders (multiple response and
/// matching): explicit mode wins, otherwise `points > 1` means per-option
/// partial credit and everything else is all-or-nothing.
pub(crate) fn effective_scoring_mode(question: &Question) -> ScoringMode {
    if let Some(mode) = question.scoring_mode {
        return mode;
    }
    match question.points {
        Some(points) if points > 1 => ScoringMode::PerOption,
        _ => ScoringMode::AllOrNothing,
    }
}

pub(crate) fn answer_text(item: &Value) -> String {
    match item {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}
