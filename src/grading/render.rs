use serde_json::Value;

use crate::domain::answer_key::{AnswerMap, SubKey};
use crate::domain::models::{Question, TestDefinition};
use crate::grading::is_affirmative;
use crate::grading::normalize::normalize_str;
use crate::schemas::breakdown::{Breakdown, QuestionBreakdown};
use crate::schemas::review::{ReviewOption, ReviewPart, ReviewProjection, ReviewQuestion};

/// Interleaves displayable question content with the correctness data of an
/// already-computed breakdown. Review screens consume this instead of
/// re-deriving correctness, so score and display can never diverge.
pub fn render_review(
    test: &TestDefinition,
    answers: &AnswerMap,
    breakdown: &Breakdown,
) -> ReviewProjection {
    let parts = test
        .parts
        .iter()
        .enumerate()
        .map(|(part_index, part)| {
            let graded_part = breakdown.parts.get(part_index);
            let questions = part
                .questions
                .iter()
                .enumerate()
                .map(|(question_index, question)| {
                    let entry =
                        graded_part.and_then(|graded| graded.questions.get(question_index));
                    review_question(question, answers, entry)
                })
                .collect();
            ReviewPart {
                part_number: part.part_number,
                title: part.title.clone(),
                instructions: part.instructions.clone(),
                questions,
            }
        })
        .collect();

    ReviewProjection { parts }
}

fn review_question(
    question: &Question,
    answers: &AnswerMap,
    entry: Option<&QuestionBreakdown>,
) -> ReviewQuestion {
    let options = question
        .options
        .iter()
        .map(|option| {
            let stored = answers.get(&question.id, &SubKey::Label(option.label.clone()));
            ReviewOption {
                label: option.label.clone(),
                text: option.text.clone(),
                is_correct_option: option.is_correct
                    || entry.is_some_and(|entry| {
                        entry.sub_questions.iter().any(|sub| {
                            normalize_str(&sub.correct_answer) == normalize_str(&option.label)
                        })
                    }),
                is_selected: stored
                    .map(|value| is_affirmative(value, &option.label))
                    .unwrap_or(false),
            }
        })
        .collect();

    ReviewQuestion {
        id: question.id.clone(),
        question_type: question.question_type.clone(),
        text: question.text.clone(),
        options,
        display: display_metadata(question),
        note: entry.and_then(|entry| entry.note.clone()),
        correct_sub_questions: entry.map(|entry| entry.correct_sub_questions).unwrap_or(0),
        total_sub_questions: entry.map(|entry| entry.total_sub_questions).unwrap_or(0),
        sub_results: entry.map(|entry| entry.sub_questions.clone()).unwrap_or_default(),
    }
}

fn display_metadata(question: &Question) -> Value {
    if question.extra.is_null() {
        Value::Null
    } else {
        question.extra.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::models::{OptionItem, Part};
    use crate::domain::types::ExamModule;
    use crate::grading::assembler::assemble;

    use super::*;

    fn choice_test() -> TestDefinition {
        TestDefinition {
            id: "t1".to_string(),
            title: "Listening mock".to_string(),
            module: ExamModule::Listening,
            parts: vec![Part {
                part_number: 1,
                title: None,
                instructions: Some("Choose the correct letter.".to_string()),
                questions: vec![Question {
                    id: "4".to_string(),
                    question_type: "multiple_choice".to_string(),
                    text: Some("What does the speaker recommend?".to_string()),
                    options: vec![
                        OptionItem {
                            label: "A".to_string(),
                            text: "The museum".to_string(),
                            is_correct: false,
                        },
                        OptionItem {
                            label: "B".to_string(),
                            text: "The harbour".to_string(),
                            is_correct: false,
                        },
                    ],
                    correct_answers: json!("B"),
                    extra: Value::Null,
                    points: None,
                    scoring_mode: None,
                }],
            }],
        }
    }

    #[test]
    fn options_carry_correctness_and_selection() {
        let test = choice_test();
        let answers: AnswerMap =
            [("4__B".to_string(), json!(true))].into_iter().collect();
        let breakdown = assemble(&test, &answers);
        let review = render_review(&test, &answers, &breakdown);

        let question = &review.parts[0].questions[0];
        assert_eq!(question.options.len(), 2);
        assert!(!question.options[0].is_correct_option);
        assert!(!question.options[0].is_selected);
        assert!(question.options[1].is_correct_option);
        assert!(question.options[1].is_selected);
        assert_eq!(question.sub_results, breakdown.parts[0].questions[0].sub_questions);
    }

    #[test]
    fn review_mirrors_breakdown_counts() {
        let test = choice_test();
        let answers = AnswerMap::new();
        let breakdown = assemble(&test, &answers);
        let review = render_review(&test, &answers, &breakdown);

        let question = &review.parts[0].questions[0];
        assert_eq!(question.correct_sub_questions, 0);
        assert_eq!(question.total_sub_questions, 1);
        assert_eq!(question.text.as_deref(), Some("What does the speaker recommend?"));
        assert_eq!(review.parts[0].instructions.as_deref(), Some("Choose the correct letter."));
    }
}
