use serde_json::Value;

/// Canonical comparable form of an answer string: keep letters, digits and
/// spaces, collapse internal whitespace to single spaces, trim, upper-case.
/// This is the sole equality authority for grading — two answers are the
/// same iff their normalized forms are equal, and a value that normalizes
/// to the empty string is always "unanswered".
pub fn normalize_str(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if !ch.is_alphanumeric() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        for upper in ch.to_uppercase() {
            out.push(upper);
        }
    }
    out
}

/// Extends `normalize_str` to any raw stored value. Objects and nulls are
/// malformed-or-absent entries and normalize to "unanswered"; arrays join
/// their non-empty normalized elements with single spaces.
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::Null | Value::Object(_) => String::new(),
        Value::Bool(flag) => {
            if *flag {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        Value::Number(number) => normalize_str(&number.to_string()),
        Value::String(raw) => normalize_str(raw),
        Value::Array(items) => {
            let parts: Vec<String> =
                items.iter().map(normalize_value).filter(|part| !part.is_empty()).collect();
            parts.join(" ")
        }
    }
}

/// `expected` may encode alternates separated by `|` (e.g. `Kings|King's`);
/// each alternate is normalized independently and matching any of them
/// counts. `user` must already be normalized.
pub fn answer_matches(user: &str, expected: &str) -> bool {
    !user.is_empty() && expected.split('|').any(|alternate| normalize_str(alternate) == user)
}
