use serde::{Deserialize, Serialize};

/// One individually gradable unit inside a question: a gap, a table cell,
/// an option in a multi-select, a matching pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQuestionResult {
    pub sub_id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub is_answered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBreakdown {
    pub question_id: String,
    pub question_type: String,
    pub correct_sub_questions: u32,
    pub total_sub_questions: u32,
    /// Set only for zero-width placeholders (unknown type, degraded spec).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub sub_questions: Vec<SubQuestionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartBreakdown {
    pub part_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub correct: u32,
    pub total: u32,
    pub questions: Vec<QuestionBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub parts: Vec<PartBreakdown>,
    pub raw_score: u32,
    pub total_score: u32,
}

/// The persisted grading output. Deliberately timestamp-free: regrading an
/// unchanged session must reproduce this record byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRecord {
    pub raw_score: u32,
    pub total_score: u32,
    pub band_score: f64,
    pub breakdown: Breakdown,
}
