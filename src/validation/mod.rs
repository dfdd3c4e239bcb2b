//! Rule based validation of JSON request payloads.
//!
//! Rules are written as pipe separated strings such as `required|string|max:255`.
//! Supported rules are `required`, `string`, `boolean`, `max:N` and `path`;
//! unknown rules are ignored.

use std::fmt::Display;

use http::StatusCode;
use serde_json::{json, Map, Value};

use crate::{Error, HttpError};

pub const MESSAGE: &str = "Validation failed.";

/// Messages per field, in the order the rules were checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationError {
    errors: Map<String, Value>,
}

impl ValidationError {
    fn push(&mut self, field: &str, message: String) {
        if let Value::Array(messages) = self
            .errors
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            messages.push(Value::String(message));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &Map<String, Value> {
        &self.errors
    }

    pub fn messages(&self, field: &str) -> Vec<&str> {
        self.errors
            .get(field)
            .and_then(Value::as_array)
            .map(|messages| messages.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        MESSAGE.fmt(f)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for HttpError {
    fn from(value: ValidationError) -> Self {
        HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, MESSAGE)
            .with_payload(json!({ "error": MESSAGE, "errors": value.errors }))
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Error::Http(value.into())
    }
}

pub struct Validator;

impl Validator {
    /// Checks `data` field by field and returns the fields that were present.
    ///
    /// A missing field only fails when it is `required`. A `null` value fails
    /// `required` and skips every other rule.
    pub fn validate(
        data: &Value,
        rules: &[(&str, &str)],
    ) -> std::result::Result<Map<String, Value>, ValidationError> {
        let empty = Map::new();
        let data = data.as_object().unwrap_or(&empty);
        let mut errors = ValidationError::default();
        let mut validated = Map::new();
        for (field, rule_string) in rules {
            let rule_list = rule_string.split('|').collect::<Vec<_>>();
            let Some(value) = data.get(*field) else {
                if rule_list.contains(&"required") {
                    errors.push(field, "The field is required.".to_string());
                }
                continue;
            };
            for rule in &rule_list {
                if let Some(message) = check(rule, value) {
                    errors.push(field, message);
                }
            }
            validated.insert(field.to_string(), value.clone());
        }
        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors)
        }
    }
}

fn check(rule: &str, value: &Value) -> Option<String> {
    let (name, parameter) = match rule.split_once(':') {
        Some((name, parameter)) => (name, Some(parameter)),
        None => (rule, None),
    };
    if name == "required" {
        let blank = match value {
            Value::Null => true,
            Value::String(text) => text.trim().is_empty(),
            _ => false,
        };
        return blank.then(|| "The field is required.".to_string());
    }
    if value.is_null() {
        return None;
    }
    match name {
        "string" if !value.is_string() => Some("The field must be a string.".to_string()),
        "boolean" if !value.is_boolean() => Some("The field must be a boolean.".to_string()),
        "max" => {
            let (text, parameter) = (value.as_str()?, parameter?);
            let limit = parameter.trim().parse::<usize>().unwrap_or(0);
            (text.len() > limit).then(|| {
                format!("The field may not be greater than {parameter} characters.")
            })
        }
        "path" if !value.as_str().is_some_and(|text| text.starts_with('/')) => {
            Some(r#"The field must be an absolute path starting with "/"."#.to_string())
        }
        _ => None,
    }
}
