use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamModule {
    Listening,
    Reading,
}

impl ExamModule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Listening => "listening",
            Self::Reading => "reading",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    AllOrNothing,
    PerOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Submitted,
    Graded,
}

/// Grading family for a stored `question_type` string. Authoring tools have
/// produced several spellings per family over time; all of them grade the
/// same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    GapFill,
    Table,
    MultipleResponse,
    SingleChoice,
    Matching,
}

impl QuestionKind {
    pub fn classify(question_type: &str) -> Option<Self> {
        match question_type.trim().to_ascii_lowercase().as_str() {
            "gap_fill" | "sentence_completion" | "summary_completion" | "note_completion"
            | "flow_chart" => Some(Self::GapFill),
            "table" | "table_completion" | "tablecompletion" | "form" | "form_completion" => {
                Some(Self::Table)
            }
            "multiple_response" | "checkbox" | "multi_select" => Some(Self::MultipleResponse),
            "multiple_choice" | "single_choice" | "radio" | "true_false" | "short_answer"
            | "true_false_not_given" | "shortanswer" => Some(Self::SingleChoice),
            "matching" => Some(Self::Matching),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_every_known_spelling() {
        let gap = ["gap_fill", "sentence_completion", "summary_completion", "note_completion", "flow_chart"];
        for spelling in gap {
            assert_eq!(QuestionKind::classify(spelling), Some(QuestionKind::GapFill));
        }
        let table = ["table", "table_completion", "tablecompletion", "form", "form_completion"];
        for spelling in table {
            assert_eq!(QuestionKind::classify(spelling), Some(QuestionKind::Table));
        }
        for spelling in ["multiple_response", "checkbox", "multi_select"] {
            assert_eq!(QuestionKind::classify(spelling), Some(QuestionKind::MultipleResponse));
        }
        let single = ["multiple_choice", "single_choice", "radio", "true_false", "short_answer",
            "true_false_not_given", "shortanswer"];
        for spelling in single {
            assert_eq!(QuestionKind::classify(spelling), Some(QuestionKind::SingleChoice));
        }
        assert_eq!(QuestionKind::classify("matching"), Some(QuestionKind::Matching));
    }

    #[test]
    fn classify_tolerates_case_and_padding() {
        assert_eq!(QuestionKind::classify(" Table_Completion "), Some(QuestionKind::Table));
    }

    #[test]
    fn classify_rejects_unknown_types() {
        assert_eq!(QuestionKind::classify("essay"), None);
        assert_eq!(QuestionKind::classify(""), None);
    }
}
