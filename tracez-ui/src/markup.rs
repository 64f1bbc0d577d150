//! HTML fragments shared by the cell renderers.

use serde_json::{Map, Value};

/// Nesting depth past which structured values collapse to `…`
pub const MAX_JSON_DEPTH: usize = 8;

const ELIDED: &str = "…";

pub const NOT_SET: &str = "<span class='empty'>(not set)</span>";
pub const EMPTY: &str = "<span class='empty'>Empty</span>";

/// Simple HTML escape for text taken from span records
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escaped text, or the `(not set)` marker when blank.
pub fn text_or_not_set(text: &str) -> String {
    if text.trim().is_empty() {
        NOT_SET.to_string()
    } else {
        html_escape(text)
    }
}

/// Pretty-prints any JSON value with two-space indentation. Object keys come
/// out sorted because `serde_json::Map` is ordered by key.
pub fn pretty_json(value: &Value) -> String {
    let bounded = bound_depth(value, 0);
    serde_json::to_string_pretty(&bounded).unwrap_or_else(|_| bounded.to_string())
}

/// Replaces non-empty containers nested [`MAX_JSON_DEPTH`] levels deep with `…`.
fn bound_depth(value: &Value, depth: usize) -> Value {
    match value {
        Value::Array(items) if items.is_empty() => Value::Array(Vec::new()),
        Value::Object(map) if map.is_empty() => Value::Object(Map::new()),
        Value::Array(_) | Value::Object(_) if depth >= MAX_JSON_DEPTH => {
            Value::String(ELIDED.to_string())
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| bound_depth(item, depth + 1))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), bound_depth(item, depth + 1)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// A structured value as an escaped `<pre><code>` block.
pub fn code_block(value: &Value) -> String {
    format!("<pre><code>{}</code></pre>", html_escape(&pretty_json(value)))
}
