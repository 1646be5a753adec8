use serde_json::Value;

use crate::domain::answer_key::{AnswerMap, SubKey};
use crate::domain::models::Question;
use crate::domain::types::ScoringMode;
use crate::grading::normalize::{normalize_str, normalize_value};
use crate::grading::{
    answer_text, display_value, effective_scoring_mode, GraderOutput, GradingAnomaly,
};
use crate::schemas::breakdown::SubQuestionResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchPair {
    pub(crate) number: u32,
    pub(crate) answer: String,
}

/// Canonicalizes the pair spec: explicit `pairs` metadata, a list of
/// objects carrying `number`/`answer`, or a flat list zipped with 1-based
/// positions. The left-hand side is addressed as `{id}__left{N}`.
pub(crate) fn match_pairs(question: &Question) -> Result<Vec<MatchPair>, GradingAnomaly> {
    if let Some(pairs) = question.extra.get("pairs").and_then(Value::as_array) {
        return from_objects(question, pairs);
    }

    match &question.correct_answers {
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            from_objects(question, items)
        }
        Value::Array(items) if !items.is_empty() => Ok(items
            .iter()
            .enumerate()
            .map(|(index, item)| MatchPair { number: index as u32 + 1, answer: answer_text(item) })
            .collect()),
        _ => Err(GradingAnomaly::MissingSpec {
            question_id: question.id.clone(),
            expected: "matching",
        }),
    }
}

fn from_objects(question: &Question, items: &[Value]) -> Result<Vec<MatchPair>, GradingAnomaly> {
    let mut pairs = Vec::with_capacity(items.len());
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
            expected: "matching",
            detail: format!("pair {number} has no answer"),
        })?;
        pairs.push(MatchPair { number, answer });
    }
    Ok(pairs)
}

pub(crate) fn grade(
    question: &Question,
    answers: &AnswerMap,
) -> Result<GraderOutput, GradingAnomaly> {
    let pairs = match_pairs(question)?;
    if pairs.is_empty() {
        return Err(GradingAnomaly::MissingSpec {
            question_id: question.id.clone(),
            expected: "matching",
        });
    }
    let mut subs = Vec::with_capacity(pairs.len());
    let mut matched = 0;

    for pair in &pairs {
        let key = SubKey::Left(pair.number);
        let stored = answers.get(&question.id, &key);
        let user = stored.map(normalize_value).unwrap_or_default();
        let is_answered = !user.is_empty();
        let is_correct = is_answered && user == normalize_str(&pair.answer);
        if is_correct {
            matched += 1;
        }
        subs.push(SubQuestionResult {
            sub_id: key.storage_key(&question.id),
            label: format!("Item {}", pair.number),
            user_answer: stored.and_then(display_value),
            correct_answer: pair.answer.clone(),
            is_correct,
            is_answered,
        });
    }

    let (correct, total) = match effective_scoring_mode(question) {
        ScoringMode::AllOrNothing => (u32::from(matched == pairs.len() as u32), 1),
        ScoringMode::PerOption => (matched, pairs.len() as u32),
    };

    Ok(GraderOutput { correct, total, subs })
}
