use serde_json::{Map, Value};

/// Resolve a dotted path such as `dominantColors.colors`.
pub fn lookup_path<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = fields.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// First of `keys` present in `entry`, regardless of its type.
pub fn first_field<'a>(entry: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| entry.get(*key))
}

/// Finite number under the first present key. A present key holding a
/// non-number yields `None`; later keys are not consulted.
pub fn finite_number(entry: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    first_field(entry, keys)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

/// Confidence under the first present key, clamped into [0,1].
pub fn confidence(entry: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    finite_number(entry, keys).map(|n| n.clamp(0.0, 1.0))
}

/// Text under the first present key; missing or non-string text is empty.
pub fn text(entry: &Map<String, Value>, keys: &[&str]) -> String {
    first_field(entry, keys)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Parse every entry of a list section, dropping entries `parse` rejects.
/// Returns the kept entries in input order and the number dropped.
pub fn parse_entries<T>(
    section: &str,
    items: &[Value],
    parse: impl Fn(&Map<String, Value>) -> Option<T>,
) -> (Vec<T>, usize) {
    let mut kept = Vec::with_capacity(items.len());
    let mut dropped = 0;
    for (index, item) in items.iter().enumerate() {
        match item.as_object().and_then(&parse) {
            Some(parsed) => kept.push(parsed),
            None => {
                log::warn!("{}: dropping malformed entry {}", section, index);
                dropped += 1;
            }
        }
    }
    (kept, dropped)
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn lookup_nested_path() {
        let fields = obj(json!({"a": {"b": {"c": 3}}}));
        assert_eq!(lookup_path(&fields, "a.b.c"), Some(&json!(3)));
        assert_eq!(lookup_path(&fields, "a.x"), None);
        assert_eq!(lookup_path(&fields, "a.b.c.d"), None);
    }

    #[test]
    fn finite_number_uses_first_present_key() {
        let entry = obj(json!({"score": "high", "confidence": 0.4}));
        assert_eq!(finite_number(&entry, &["score", "confidence"]), None);
        assert_eq!(finite_number(&entry, &["confidence", "score"]), Some(0.4));
        assert_eq!(finite_number(&entry, &["missing"]), None);
    }

    #[test]
    fn confidence_is_clamped() {
        let entry = obj(json!({"high": 1.5, "low": -0.2, "ok": 0.25}));
        assert_eq!(confidence(&entry, &["high"]), Some(1.0));
        assert_eq!(confidence(&entry, &["low"]), Some(0.0));
        assert_eq!(confidence(&entry, &["ok"]), Some(0.25));
    }

    #[test]
    fn text_defaults_to_empty() {
        let entry = obj(json!({"name": "cat", "label": 3}));
        assert_eq!(text(&entry, &["name"]), "cat");
        assert_eq!(text(&entry, &["label"]), "");
        assert_eq!(text(&entry, &["description"]), "");
    }

    #[test]
    fn parse_entries_isolates_bad_entries() {
        let items = vec![json!({"v": 1}), json!("junk"), json!({"w": 2}), json!({"v": 3})];
        let (kept, dropped) = parse_entries("test", &items, |e| finite_number(e, &["v"]));
        assert_eq!(kept, vec![1.0, 3.0]);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn type_names() {
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
