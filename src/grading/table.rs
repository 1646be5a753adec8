use serde_json::Value;

use crate::domain::answer_key::{AnswerMap, SubKey};
use crate::domain::models::Question;
use crate::grading::normalize::{normalize_str, normalize_value};
use crate::grading::{answer_text, display_value, GraderOutput, GradingAnomaly};
use crate::schemas::breakdown::SubQuestionResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnswerCell {
    pub(crate) row: usize,
    pub(crate) col: usize,
    pub(crate) answer: String,
}

fn grid(question: &Question) -> Option<&Vec<Value>> {
    if let Some(cells) = question.extra.get("cells").and_then(Value::as_array) {
        return Some(cells);
    }
    if let Some(cells) = question.extra.as_array() {
        return Some(cells);
    }
    match question.correct_answers.as_array() {
        Some(rows) if !rows.is_empty() && rows.iter().all(Value::is_array) => Some(rows),
        _ => None,
    }
}

fn cell_is_answer(cell: &Value) -> bool {
    cell.get("isAnswer")
        .or_else(|| cell.get("is_answer"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Canonicalizes the 2-D cell grid down to the answer-flagged cells; every
/// other cell is display-only.
pub(crate) fn answer_cells(question: &Question) -> Result<Vec<AnswerCell>, GradingAnomaly> {
    let rows = grid(question).ok_or_else(|| GradingAnomaly::MissingSpec {
        question_id: question.id.clone(),
        expected: "table",
    })?;

    let mut cells = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        let row = row.as_array().ok_or_else(|| GradingAnomaly::MalformedSpec {
            question_id: question.id.clone(),
            expected: "table",
            detail: format!("row {row_index} is not a list of cells"),
        })?;
        for (col_index, cell) in row.iter().enumerate() {
            if !cell_is_answer(cell) {
                continue;
            }
            let answer = match cell.get("answer") {
                Some(Value::Null) | None => None,
                Some(value) => Some(answer_text(value)).filter(|answer| !answer.trim().is_empty()),
            };
            let answer = answer.ok_or_else(|| GradingAnomaly::MalformedSpec {
                question_id: question.id.clone(),
                expected: "table",
                detail: format!("answer cell ({row_index}, {col_index}) has no answer"),
            })?;
            cells.push(AnswerCell { row: row_index, col: col_index, answer });
        }
    }
    Ok(cells)
}

pub(crate) fn grade(
    question: &Question,
    answers: &AnswerMap,
) -> Result<GraderOutput, GradingAnomaly> {
    let cells = answer_cells(question)?;
    let mut subs = Vec::with_capacity(cells.len());
    let mut correct = 0;

    for cell in &cells {
        let key = SubKey::Cell { row: cell.row, col: cell.col };
        let stored = answers.get(&question.id, &key);
        let user = stored.map(normalize_value).unwrap_or_default();
        let is_answered = !user.is_empty();
        let is_correct = is_answered && user == normalize_str(&cell.answer);
        if is_correct {
            correct += 1;
        }
        subs.push(SubQuestionResult {
            sub_id: key.storage_key(&question.id),
            label: format!("Cell ({}, {})", cell.row, cell.col),
            user_answer: stored.and_then(display_value),
            correct_answer: cell.answer.clone(),
            is_correct,
            is_answered,
        });
    }

    Ok(GraderOutput { correct, total: cells.len() as u32, subs })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn table_question(extra: Value) -> Question {
        Question {
            id: "10".to_string(),
            question_type: "table_completion".to_string(),
            text: None,
            options: Vec::new(),
            correct_answers: Value::Null,
            extra,
            points: None,
            scoring_mode: None,
        }
    }

    fn answers(entries: &[(&str, Value)]) -> AnswerMap {
        entries.iter().map(|(key, value)| (key.to_string(), value.clone())).collect()
    }

    #[test]
    fn answer_cell_graded_after_normalization() {
        let question = table_question(json!({"cells": [[
            {"text": "Harbour", "isAnswer": false},
            {"isAnswer": true, "answer": "port"},
        ]]}));
        let output = grade(&question, &answers(&[("10__r0c1", json!("Port "))])).expect("grades");

        assert_eq!(output.correct, 1);
        assert_eq!(output.total, 1);
        assert_eq!(output.subs[0].sub_id, "10__r0c1");
    }

    #[test]
    fn only_flagged_cells_count() {
        let question = table_question(json!({"cells": [
            [{"text": "header"}, {"isAnswer": true, "answer": "one"}],
            [{"isAnswer": true, "answer": "two"}, {"text": "filler"}],
        ]}));
        let output = grade(&question, &AnswerMap::new()).unwrap();

        assert_eq!(output.total, 2);
        assert_eq!(output.correct, 0);
        assert_eq!(output.subs[0].sub_id, "10__r0c1");
        assert_eq!(output.subs[1].sub_id, "10__r1c0");
    }

    #[test]
    fn bare_array_extra_is_accepted_as_grid() {
        let question = table_question(json!([[{"is_answer": true, "answer": "tide"}]]));
        let output = grade(&question, &answers(&[("10__r0c0", json!("TIDE"))])).unwrap();

        assert_eq!(output.correct, 1);
    }

    #[test]
    fn missing_grid_is_an_anomaly() {
        let question = table_question(Value::Null);
        assert!(matches!(
            grade(&question, &AnswerMap::new()),
            Err(GradingAnomaly::MissingSpec { .. })
        ));
    }

    #[test]
    fn malformed_row_is_an_anomaly() {
        let question = table_question(json!({"cells": ["not-a-row"]}));
        assert!(matches!(
            grade(&question, &AnswerMap::new()),
            Err(GradingAnomaly::MalformedSpec { .. })
        ));
    }
}
