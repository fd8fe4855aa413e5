//! Clause value formatting.
//!
//! Values bound into conditions, field lists and update pairs are
//! rendered here so every command quotes the same way.

use crate::rid::{Rid, RidPolicy};
use serde_json::Value;

/// Placeholder substituted by [`bind`]
pub const PLACEHOLDER: char = '?';

/// Render a value as a statement literal.
///
/// Strings are double-quoted with `\` and `"` escaped, except `#`-prefixed
/// record identifiers which stay bare so they compare as links.
///
/// Values always use the strict identifier form regardless of the
/// configured [`RidPolicy`]: a bare `12:0` is ordinary text here, since a
/// value cannot say which one the caller meant.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if Rid::is_rid(s, RidPolicy::Strict) => s.trim().to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), format_value(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

/// Double-quote a string literal
pub fn quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Substitute `?` placeholders in `condition`.
///
/// An array whose length matches the placeholder count fills them in
/// order; any other value fills every placeholder.
pub fn bind(condition: &str, value: Option<&Value>) -> String {
    let Some(value) = value else {
        return condition.to_string();
    };

    let count = condition.matches(PLACEHOLDER).count();
    if count == 0 {
        return condition.to_string();
    }

    let replacements: Vec<String> = match value {
        Value::Array(items) if count > 1 && items.len() == count => {
            items.iter().map(format_value).collect()
        }
        other => vec![format_value(other); count],
    };

    let mut out = String::with_capacity(condition.len());
    let mut replacements = replacements.into_iter();
    for c in condition.chars() {
        if c == PLACEHOLDER {
            out.push_str(&replacements.next().unwrap_or_default());
        } else {
            out.push(c);
        }
    }
    out
}
