use serde_json::Value;

use crate::domain::Params;

/// Flatten call parameters into form pairs.
///
/// Arrays and objects are replaced by their JSON text; strings go out verbatim,
/// numbers as their JSON token and booleans as `true`/`false`. `null` entries are
/// skipped since a form field cannot carry "no value".
pub fn encode_params(params: Option<&Params>) -> Vec<(String, String)> {
    let Some(params) = params else {
        return Vec::new();
    };

    params
        .iter()
        .filter_map(|(name, value)| encode_value(value).map(|value| (name.clone(), value)))
        .collect()
}

fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
