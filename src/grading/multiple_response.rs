use std::collections::BTreeSet;

use serde_json::Value;

use crate::domain::answer_key::{AnswerMap, SubKey};
use crate::domain::models::Question;
use crate::domain::types::ScoringMode;
use crate::grading::normalize::normalize_str;
use crate::grading::{
    answer_text, display_value, effective_scoring_mode, is_affirmative, GraderOutput,
    GradingAnomaly,
};
use crate::schemas::breakdown::SubQuestionResult;

/// Correct label set: a list of labels, a list of objects carrying
/// `label`/`answer`, or option labels flagged correct as the fallback.
pub(crate) fn correct_labels(question: &Question) -> Result<Vec<String>, GradingAnomaly> {
    match &question.correct_answers {
        Value::Array(items) if !items.is_empty() => {
            let mut labels = Vec::with_capacity(items.len());
            for item in items {
                let label = match item {
                    Value::Object(map) => map
                        .get("label")
                        .or_else(|| map.get("answer"))
                        .map(answer_text)
                        .filter(|label| !label.trim().is_empty()),
                    other => Some(answer_text(other)).filter(|label| !label.trim().is_empty()),
                };
                let label = label.ok_or_else(|| GradingAnomaly::MalformedSpec {
                    question_id: question.id.clone(),
                    expected: "choice",
                    detail: "correct answer entry has no label".to_string(),
                })?;
                labels.push(label);
            }
            Ok(labels)
        }
        _ => {
            let flagged: Vec<String> = question
                .options
                .iter()
                .filter(|option| option.is_correct)
                .map(|option| option.label.clone())
                .collect();
            if flagged.is_empty() {
                Err(GradingAnomaly::MissingSpec {
                    question_id: question.id.clone(),
                    expected: "choice",
                })
            } else {
                Ok(flagged)
            }
        }
    }
}

/// Labels the student has affirmatively selected. Candidates come from the
/// options list when present, otherwise from every key stored under the
/// question.
fn selected_labels(question: &Question, answers: &AnswerMap) -> BTreeSet<String> {
    if question.options.is_empty() {
        return answers
            .entries_for(&question.id)
            .filter_map(|(sub, value)| match sub {
                SubKey::Label(label) if is_affirmative(value, &label) => {
                    Some(normalize_str(&label))
                }
                _ => None,
            })
            .collect();
    }

    question
        .options
        .iter()
        .filter(|option| {
            answers
                .get(&question.id, &SubKey::Label(option.label.clone()))
                .map(|value| is_affirmative(value, &option.label))
                .unwrap_or(false)
        })
        .map(|option| normalize_str(&option.label))
        .collect()
}

pub(crate) fn grade(
    question: &Question,
    answers: &AnswerMap,
) -> Result<GraderOutput, GradingAnomaly> {
    let labels = correct_labels(question)?;
    let correct_set: BTreeSet<String> = labels.iter().map(|label| normalize_str(label)).collect();
    let selected = selected_labels(question, answers);
    let hits = correct_set.intersection(&selected).count() as u32;

    let mut subs = Vec::with_capacity(labels.len());
    for label in &labels {
        let key = SubKey::Label(label.clone());
        let stored = answers.get(&question.id, &key);
        subs.push(SubQuestionResult {
            sub_id: key.storage_key(&question.id),
            label: label.clone(),
            user_answer: stored.and_then(display_value),
            correct_answer: label.clone(),
            is_correct: selected.contains(&normalize_str(label)),
            is_answered: !selected.is_empty(),
        });
    }

    let (correct, total) = match effective_scoring_mode(question) {
        // Exact set match: extra selections are penalized.
        ScoringMode::AllOrNothing => (u32::from(selected == correct_set), 1),
        // Partial credit per correct selection; extras are not penalized.
        ScoringMode::PerOption => (hits, correct_set.len() as u32),
    };

    Ok(GraderOutput { correct, total, subs })
}
