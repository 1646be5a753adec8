use serde_json::Value;

use crate::domain::answer_key::{AnswerMap, SubKey};
use crate::domain::models::Question;
use crate::grading::normalize::normalize_value;
use crate::grading::{answer_text, display_value, is_affirmative, GraderOutput, GradingAnomaly};
use crate::schemas::breakdown::SubQuestionResult;

/// Resolves the single canonical label/answer: first element of a list, a
/// bare string, or the option flagged correct as the fallback.
pub(crate) fn correct_label(question: &Question) -> Result<String, GradingAnomaly> {
    let resolved = match &question.correct_answers {
        Value::Array(items) => items.first().map(answer_text),
        Value::Null => None,
        other => Some(answer_text(other)),
    };
    let resolved = resolved.filter(|label| !label.trim().is_empty()).or_else(|| {
        question
            .options
            .iter()
            .find(|option| option.is_correct)
            .map(|option| option.label.clone())
    });

    resolved.ok_or_else(|| GradingAnomaly::MissingSpec {
        question_id: question.id.clone(),
        expected: "answer",
    })
}

/// The stored contract writes the selection under the graded label's key,
/// so the lookup is always `{id}__{correct_label}`; `total` is 1 always.
pub(crate) fn grade(
    question: &Question,
    answers: &AnswerMap,
) -> Result<GraderOutput, GradingAnomaly> {
    let label = correct_label(question)?;
    let key = SubKey::Label(label.clone());
    let stored = answers.get(&question.id, &key);
    let is_answered = stored.map(|value| !normalize_value(value).is_empty()).unwrap_or(false);
    let is_correct = stored.map(|value| is_affirmative(value, &label)).unwrap_or(false);

    let subs = vec![SubQuestionResult {
        sub_id: key.storage_key(&question.id),
        label: label.clone(),
        user_answer: stored.and_then(display_value),
        correct_answer: label,
        is_correct,
        is_answered,
    }];

    Ok(GraderOutput { correct: u32::from(is_correct), total: 1, subs })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::models::OptionItem;

    use super::*;

    fn choice_question(correct: Value) -> Question {
        Question {
            id: "4".to_string(),
            question_type: "multiple_choice".to_string(),
            text: None,
            options: Vec::new(),
            correct_answers: correct,
            extra: Value::Null,
            points: None,
            scoring_mode: None,
        }
    }

    fn answers(entries: &[(&str, Value)]) -> AnswerMap {
        entries.iter().map(|(key, value)| (key.to_string(), value.clone())).collect()
    }

    #[test]
    fn boolean_true_under_correct_label_scores() {
        let question = choice_question(json!("B"));
        let output = grade(&question, &answers(&[("4__B", json!(true))])).expect("grades");

        assert_eq!(output.correct, 1);
        assert_eq!(output.total, 1);
        assert!(output.subs[0].is_answered);
    }

    #[test]
    fn unanswered_when_key_is_absent() {
        let question = choice_question(json!("B"));
        let output = grade(&question, &AnswerMap::new()).unwrap();

        assert_eq!(output.correct, 0);
        assert_eq!(output.total, 1);
        assert!(!output.subs[0].is_answered);
        assert!(!output.subs[0].is_correct);
    }

    #[test]
    fn first_list_element_is_the_canonical_label() {
        let question = choice_question(json!(["C", "ignored"]));
        let output = grade(&question, &answers(&[("4__C", json!("true"))])).unwrap();
        assert_eq!(output.correct, 1);
    }

    #[test]
    fn typed_short_answer_compares_normalized() {
        let mut question = choice_question(json!("freezing point"));
        question.question_type = "short_answer".to_string();

        let hit = grade(&question, &answers(&[("4__freezing point", json!(" Freezing POINT. "))]));
        assert_eq!(hit.unwrap().correct, 1);

        let miss = grade(&question, &answers(&[("4__freezing point", json!("boiling point"))]));
        let miss = miss.unwrap();
        assert_eq!(miss.correct, 0);
        assert!(miss.subs[0].is_answered);
    }

    #[test]
    fn flagged_option_is_the_fallback_spec() {
        let mut question = choice_question(Value::Null);
        question.options = vec![
            OptionItem { label: "A".to_string(), text: String::new(), is_correct: false },
            OptionItem { label: "B".to_string(), text: String::new(), is_correct: true },
        ];
        let output = grade(&question, &answers(&[("4__B", json!(true))])).unwrap();
        assert_eq!(output.correct, 1);
    }

    #[test]
    fn empty_spec_is_an_anomaly() {
        let question = choice_question(json!(""));
        assert!(matches!(
            grade(&question, &AnswerMap::new()),
            Err(GradingAnomaly::MissingSpec { .. })
        ));
    }
}
