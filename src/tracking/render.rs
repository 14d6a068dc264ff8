//! Push-queue call formatting for Piwik/Matomo.

use serde_json::{Map, Value};

use super::resolver::ResolvedDimension;

/// Custom variables are always recorded with page scope.
const CUSTOM_VARIABLE_SCOPE: &str = "page";

/// Encode a value as a double-quoted JavaScript string literal.
///
/// JSON string escaping covers quotes and control characters; `</` is also
/// escaped so a value can never close the surrounding script element.
pub fn js_string(value: &str) -> String {
    escape_script_close(&Value::String(value.to_string()).to_string())
}

/// Encode a value for a single-quoted JavaScript string literal, without the quotes.
pub fn js_single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    escape_script_close(&out)
}

fn escape_script_close(js: &str) -> String {
    js.replace("</", "<\\/")
}

pub fn custom_dimension_call(id: &str, value: &str) -> String {
    format!(
        "_paq.push([\"setCustomDimension\", customDimensionId = {}, customDimensionValue = {}]);\n",
        id,
        js_string(value)
    )
}

pub fn custom_variable_call(index: u8, name: &str, value: &str) -> String {
    format!(
        "_paq.push([\"setCustomVariable\", {}, {}, {}, {}]);\n",
        index,
        js_string(name),
        js_string(value),
        js_string(CUSTOM_VARIABLE_SCOPE)
    )
}

/// One `setCustomDimension` call per resolved dimension, in order.
pub fn render_action_scope(dimensions: &[ResolvedDimension]) -> String {
    dimensions
        .iter()
        .map(|dimension| custom_dimension_call(&dimension.id, &dimension.value))
        .collect()
}

/// A single `trackPageView` call carrying every resolved dimension.
///
/// Keys keep first-insertion order; a repeated id overwrites the earlier value.
pub fn render_visit_scope(track_url: &str, dimensions: &[ResolvedDimension]) -> String {
    let mut content = vec![
        Value::String("trackPageView".to_string()),
        Value::String(track_url.to_string()),
    ];

    if !dimensions.is_empty() {
        let mut object = Map::new();
        for dimension in dimensions {
            object.insert(
                format!("dimension{}", dimension.id),
                Value::String(dimension.value.clone()),
            );
        }
        content.push(Value::Object(object));
    }

    format!(
        "_paq.push({});\n",
        escape_script_close(&Value::Array(content).to_string())
    )
}
