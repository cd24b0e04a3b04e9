use serde_json::Value;

use crate::timestamp::{self, DateParseError};

/// Rewrite every wrapper-format date in a payload as RFC 3339, in place.
///
/// Strings that merely look like wrappers but fail to parse are errors, not
/// passthroughs. Returns the number of values converted.
pub fn normalize_dates(value: &mut Value) -> Result<usize, DateParseError> {
    match value {
        Value::String(text) if timestamp::is_wrapper(text.as_str()) => {
            let date = timestamp::parse(text)?;
            *text = date.to_rfc3339();
            Ok(1)
        }
        Value::Array(items) => items.iter_mut().try_fold(0, |n, item| {
            normalize_dates(item).map(|converted| n + converted)
        }),
        Value::Object(fields) => fields.values_mut().try_fold(0, |n, item| {
            normalize_dates(item).map(|converted| n + converted)
        }),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(0),
    }
}
