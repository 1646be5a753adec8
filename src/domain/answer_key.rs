use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured form of a composite sub-question address. On the wire and in
/// storage the address is always `{question_id}__{suffix}`; review UIs and
/// the sync endpoints depend on that exact scheme, so it is formatted and
/// parsed here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubKey {
    Gap(u32),
    Cell { row: usize, col: usize },
    Label(String),
    Left(u32),
}

impl SubKey {
    pub fn suffix(&self) -> String {
        match self {
            Self::Gap(number) => format!("gap{number}"),
            Self::Cell { row, col } => format!("r{row}c{col}"),
            Self::Label(label) => label.clone(),
            Self::Left(number) => format!("left{number}"),
        }
    }

    pub fn storage_key(&self, question_id: &str) -> String {
        format!("{question_id}__{}", self.suffix())
    }

    /// Labels are the fallback: any suffix that does not match a structured
    /// scheme is treated as an option label or answer echo.
    pub fn parse(suffix: &str) -> Self {
        if let Some(rest) = suffix.strip_prefix("gap") {
            if let Ok(number) = rest.parse() {
                return Self::Gap(number);
            }
        }
        if let Some(rest) = suffix.strip_prefix("left") {
            if let Ok(number) = rest.parse() {
                return Self::Left(number);
            }
        }
        if let Some(rest) = suffix.strip_prefix('r') {
            if let Some((row, col)) = rest.split_once('c') {
                if let (Ok(row), Ok(col)) = (row.parse(), col.parse()) {
                    return Self::Cell { row, col };
                }
            }
        }
        Self::Label(suffix.to_string())
    }
}

/// Splits a stored key into its question id and structured sub-key. Returns
/// `None` for keys without the `__` separator.
pub fn split_storage_key(key: &str) -> Option<(&str, SubKey)> {
    let (question_id, suffix) = key.split_once("__")?;
    Some((question_id, SubKey::parse(suffix)))
}

/// Sparse session answer state keyed by composite sub-question keys. Absent
/// keys mean "unanswered", never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, Value>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get(&self, question_id: &str, sub: &SubKey) -> Option<&Value> {
        self.0.get(&sub.storage_key(question_id))
    }

    /// All stored entries addressed to `question_id`, in key order.
    pub fn entries_for<'a>(
        &'a self,
        question_id: &'a str,
    ) -> impl Iterator<Item = (SubKey, &'a Value)> + 'a {
        let prefix = format!("{question_id}__");
        self.0.iter().filter_map(move |(key, value)| {
            key.strip_prefix(&prefix).map(|suffix| (SubKey::parse(suffix), value))
        })
    }

    /// Key-wise merge of a partial update. Values that are JSON objects on
    /// both sides merge field-by-field recursively; anything else is
    /// replaced. A late partial sync can therefore never erase answers for
    /// other sub-questions of the same question.
    pub fn merge(&mut self, patch: AnswerMap) {
        for (key, incoming) in patch.0 {
            match self.0.get_mut(&key) {
                Some(existing) => merge_value(existing, incoming),
                None => {
                    self.0.insert(key, incoming);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn merge_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(base), Value::Object(update)) => {
            for (field, value) in update {
                match base.get_mut(&field) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base.insert(field, value);
                    }
                }
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn storage_key_round_trips_every_scheme() {
        let keys = [
            SubKey::Gap(3),
            SubKey::Cell { row: 1, col: 2 },
            SubKey::Label("B".to_string()),
            SubKey::Left(4),
        ];
        for key in keys {
            let stored = key.storage_key("17");
            let (question_id, parsed) = split_storage_key(&stored).expect("separator");
            assert_eq!(question_id, "17");
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn unstructured_suffix_parses_as_label() {
        assert_eq!(SubKey::parse("gapless"), SubKey::Label("gapless".to_string()));
        assert_eq!(SubKey::parse("r1x2"), SubKey::Label("r1x2".to_string()));
    }

    #[test]
    fn merge_keeps_answers_for_other_keys() {
        let mut answers = AnswerMap::new();
        answers.merge([("5__gap1".to_string(), json!("x"))].into_iter().collect());
        answers.merge([("5__gap2".to_string(), json!("y"))].into_iter().collect());

        assert_eq!(answers.get_raw("5__gap1"), Some(&json!("x")));
        assert_eq!(answers.get_raw("5__gap2"), Some(&json!("y")));
    }

    #[test]
    fn merge_nested_objects_field_by_field() {
        let mut answers = AnswerMap::new();
        answers.merge([("9__meta".to_string(), json!({"a": 1, "inner": {"x": 1}}))].into_iter().collect());
        answers.merge([("9__meta".to_string(), json!({"b": 2, "inner": {"y": 2}}))].into_iter().collect());

        assert_eq!(
            answers.get_raw("9__meta"),
            Some(&json!({"a": 1, "b": 2, "inner": {"x": 1, "y": 2}}))
        );
    }

    #[test]
    fn merge_replaces_scalar_values() {
        let mut answers = AnswerMap::new();
        answers.insert("5__gap1", json!("draft"));
        answers.merge([("5__gap1".to_string(), json!("final"))].into_iter().collect());

        assert_eq!(answers.get_raw("5__gap1"), Some(&json!("final")));
    }

    #[test]
    fn entries_for_scopes_to_question_prefix() {
        let mut answers = AnswerMap::new();
        answers.insert("12__gap1", json!("a"));
        answers.insert("12__gap2", json!("b"));
        answers.insert("120__gap1", json!("other"));

        let entries: Vec<_> = answers.entries_for("12").collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, SubKey::Gap(1));
        assert_eq!(entries[1].0, SubKey::Gap(2));
    }
}
