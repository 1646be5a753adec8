use crate::domain::answer_key::AnswerMap;
use crate::domain::models::{Question, TestDefinition};
use crate::grading::{grade_question, GraderOutput, GradingAnomaly};
use crate::schemas::breakdown::{Breakdown, PartBreakdown, QuestionBreakdown};

/// Walks the part → question tree in stored order, grades each question,
/// and aggregates `(correct, total)` per part and for the whole test. A
/// pure function of (definition, answers); safe to recompute at will.
pub fn assemble(test: &TestDefinition, answers: &AnswerMap) -> Breakdown {
    let mut parts = Vec::with_capacity(test.parts.len());
    let mut raw_score = 0;
    let mut total_score = 0;

    for part in &test.parts {
        let mut questions = Vec::with_capacity(part.questions.len());
        let mut correct = 0;
        let mut total = 0;

        for question in &part.questions {
            let entry = match grade_question(question, answers) {
                Ok(output) => graded_entry(question, output),
                Err(anomaly) => placeholder_entry(question, anomaly),
            };
            correct += entry.correct_sub_questions;
            total += entry.total_sub_questions;
            questions.push(entry);
        }

        raw_score += correct;
        total_score += total;
        parts.push(PartBreakdown {
            part_number: part.part_number,
            title: part.title.clone(),
            correct,
            total,
            questions,
        });
    }

    Breakdown { parts, raw_score, total_score }
}

fn graded_entry(question: &Question, output: GraderOutput) -> QuestionBreakdown {
    QuestionBreakdown {
        question_id: question.id.clone(),
        question_type: question.question_type.clone(),
        correct_sub_questions: output.correct,
        total_sub_questions: output.total,
        note: None,
        sub_questions: output.subs,
    }
}

/// Zero-width stand-in for a question that could not be graded. It
/// contributes nothing to either score so the rest of the test still
/// grades normally.
fn placeholder_entry(question: &Question, anomaly: GradingAnomaly) -> QuestionBreakdown {
    tracing::warn!(
        question_id = %question.id,
        question_type = %question.question_type,
        anomaly = %anomaly,
        "Degrading question to zero-width placeholder"
    );
    QuestionBreakdown {
        question_id: question.id.clone(),
        question_type: question.question_type.clone(),
        correct_sub_questions: 0,
        total_sub_questions: 0,
        note: Some(anomaly.to_string()),
        sub_questions: Vec::new(),
    }
}
