// Narrow seam between the pipeline and whatever schema layer describes an
// endpoint's output. The pipeline only ever calls `validate`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", .path.as_deref().map(|p| format!("at {p}: ")).unwrap_or_default())]
pub struct ValidationError {
    message: String,
    path: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    /// Attach the field path the failure refers to.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// Validates (and usually converts) a parsed JSON payload.
pub trait Validate {
    type Output;

    fn validate(&self, value: Value) -> Result<Self::Output, ValidationError>;
}

/// Validation by deserializing into a serde type.
pub struct SerdeSchema<T>(PhantomData<fn() -> T>);

impl<T> SerdeSchema<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for SerdeSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Validate for SerdeSchema<T> {
    type Output = T;

    fn validate(&self, value: Value) -> Result<T, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::new(e.to_string()))
    }
}

impl<F, T> Validate for F
where
    F: Fn(Value) -> Result<T, ValidationError>,
{
    type Output = T;

    fn validate(&self, value: Value) -> Result<T, ValidationError> {
        self(value)
    }
}
