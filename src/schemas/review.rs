use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schemas::breakdown::SubQuestionResult;

/// Displayable test content interleaved with per-sub-question correctness,
/// for review screens. Derived from the same grader outputs as the scores;
/// there is no second grading path to diverge from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewProjection {
    pub parts: Vec<ReviewPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPart {
    pub part_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub questions: Vec<ReviewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewQuestion {
    pub id: String,
    pub question_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub options: Vec<ReviewOption>,
    /// Table grid or other display metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub display: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub correct_sub_questions: u32,
    pub total_sub_questions: u32,
    pub sub_results: Vec<SubQuestionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOption {
    pub label: String,
    pub text: String,
    pub is_correct_option: bool,
    pub is_selected: bool,
}
