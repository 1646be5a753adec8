use serde_json::Value;

use crate::domain::answer_key::{AnswerMap, SubKey};
use crate::domain::models::Question;
use crate::grading::normalize::{answer_matches, normalize_value};
use crate::grading::{answer_text, display_value, GraderOutput, GradingAnomaly};
use crate::schemas::breakdown::SubQuestionResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GapAnswer {
    pub(crate) number: u32,
    pub(crate) answer: String,
}

/// Canonicalizes the accepted gap-spec shapes: explicit `gaps` metadata, a
/// list of objects carrying `number`/`answer`, a flat answer list zipped
/// with 1-based positions, or a bare string treated as a single gap.
pub(crate) fn gap_answers(question: &Question) -> Result<Vec<GapAnswer>, GradingAnomaly> {
    if let Some(gaps) = question.extra.get("gaps").and_then(Value::as_array) {
        return from_objects(question, gaps);
    }

    match &question.correct_answers {
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            from_objects(question, items)
        }
        Value::Array(items) if !items.is_empty() => Ok(items
            .iter()
            .enumerate()
            .map(|(index, item)| GapAnswer { number: index as u32 + 1, answer: answer_text(item) })
            .collect()),
        Value::String(answer) if !answer.trim().is_empty() => {
            Ok(vec![GapAnswer { number: 1, answer: answer.clone() }])
        }
        _ => Err(GradingAnomaly::MissingSpec { question_id: question.id.clone(), expected: "gap" }),
    }
}

fn from_objects(question: &Question, items: &[Value]) -> Result<Vec<GapAnswer>, GradingAnomaly> {
    let mut gaps = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let number = item
            .get("number")
            .and_then(Value::as_u64)
            .map(|number| number as u32)
            .unwrap_or(index as u32 + 1);
        let answer = match item.get("answer") {
            Some(Value::Null) | None => None,
            Some(value) => Some(answer_text(value)).filter(|answer| !answer.trim().is_empty()),
        };
        let answer = answer.ok_or_else(|| GradingAnomaly::MalformedSpec {
            question_id: question.id.clone(),
            expected: "gap",
            detail: format!("gap {number} has no answer"),
        })?;
        gaps.push(GapAnswer { number, answer });
    }
    Ok(gaps)
}

pub(crate) fn grade(
    question: &Question,
    answers: &AnswerMap,
) -> Result<GraderOutput, GradingAnomaly> {
    let gaps = gap_answers(question)?;
    let mut subs = Vec::with_capacity(gaps.len());
    let mut correct = 0;

    for gap in &gaps {
        let key = SubKey::Gap(gap.number);
        let stored = answers.get(&question.id, &key);
        let user = stored.map(normalize_value).unwrap_or_default();
        let is_answered = !user.is_empty();
        let is_correct = answer_matches(&user, &gap.answer);
        if is_correct {
            correct += 1;
        }
        subs.push(SubQuestionResult {
            sub_id: key.storage_key(&question.id),
            label: format!("Gap {}", gap.number),
            user_answer: stored.and_then(display_value),
            correct_answer: gap.answer.clone(),
            is_correct,
            is_answered,
        });
    }

    Ok(GraderOutput { correct, total: gaps.len() as u32, subs })
}
