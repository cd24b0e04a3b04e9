use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::timestamp::format_date;
use crate::validate::ValidationError;

/// A single value substituted into an endpoint template.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Calendar date, rendered as `YYYY-MM-DD`.
    Date(NaiveDate),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => f.write_str(&format_date(*d)),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value.date_naive())
    }
}

/// Per-call placeholder values, keyed by placeholder name.
///
/// Omitted keys are how callers skip optional placeholders; the URL
/// builder strips whatever is left unresolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten a typed input struct into parameters.
    ///
    /// `None` fields are skipped so they behave as omitted optional
    /// placeholders. Nested arrays or objects are rejected.
    pub fn from_serialize<T: Serialize>(input: &T) -> Result<Self, ValidationError> {
        let value = serde_json::to_value(input)
            .map_err(|e| ValidationError::new(format!("cannot serialize parameters: {e}")))?;

        let Value::Object(fields) = value else {
            return Err(ValidationError::new("parameters must serialize to an object"));
        };

        let mut params = Self::new();
        for (key, value) in fields {
            let param = match value {
                Value::Null => continue,
                Value::Bool(b) => ParamValue::Bool(b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => ParamValue::Integer(i),
                    None => ParamValue::Float(n.as_f64().unwrap_or_default()),
                },
                Value::String(s) => ParamValue::Text(s),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ValidationError::new(format!(
                        "parameter {key:?} must be a scalar value"
                    ))
                    .at(key));
                }
            };
            params.0.insert(key, param);
        }
        Ok(params)
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct AlertSearch {
        state_route: String,
        starting_milepost: Option<f64>,
        search_time_start: Option<NaiveDate>,
        include_closed: bool,
    }

    #[test]
    fn display_formats_each_kind() {
        assert_eq!(ParamValue::from(2482).to_string(), "2482");
        assert_eq!(ParamValue::from(true).to_string(), "true");
        assert_eq!(ParamValue::from(1.5).to_string(), "1.5");
        assert_eq!(
            ParamValue::from(NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()).to_string(),
            "2024-07-04"
        );
    }

    #[test]
    fn from_serialize_skips_none_fields() {
        let input = AlertSearch {
            state_route: "005".into(),
            starting_milepost: None,
            search_time_start: Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            include_closed: false,
        };
        let params = Params::from_serialize(&input).unwrap();

        assert_eq!(params.len(), 3);
        assert_eq!(params.get("stateRoute"), Some(&ParamValue::Text("005".into())));
        assert_eq!(params.get("startingMilepost"), None);
        assert_eq!(
            params.get("searchTimeStart").map(ToString::to_string).as_deref(),
            Some("2024-01-02")
        );
        assert_eq!(params.get("includeClosed"), Some(&ParamValue::Bool(false)));
    }

    #[test]
    fn from_serialize_rejects_non_objects() {
        assert!(Params::from_serialize(&[1, 2, 3]).is_err());
        assert!(Params::from_serialize(&serde_json::json!({"ids": [1, 2]})).is_err());
    }

    #[test]
    fn collects_from_pairs() {
        let params: Params = [("vesselId", 18), ("routeId", 9)].into_iter().collect();
        assert_eq!(params.get("vesselId"), Some(&ParamValue::Integer(18)));
        assert_eq!(params.len(), 2);
    }
}
