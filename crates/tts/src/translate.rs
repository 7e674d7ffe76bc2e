use std::str::FromStr;

use serde_json::{Map, Value};

use crate::{
    error::ValidationError,
    types::{ResponseFormat, SpeechRequest},
};

/// Default `speed` when a job omits it
pub const DEFAULT_SPEED: f64 = 1.0;

const KNOWN_FIELDS: [&str; 6] = ["model", "input", "voice", "response_format", "speed", "stream"];

/// Converts untyped job input into a [`SpeechRequest`]
#[derive(Debug, Clone)]
pub struct Translator {
    default_format: ResponseFormat,
}

impl Translator {
    pub const fn new(default_format: ResponseFormat) -> Self {
        Self { default_format }
    }

    /// Build a translator from the configured default format name
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedFormat`] for an unknown format
    pub fn from_format_name(name: &str) -> Result<Self, ValidationError> {
        parse_format(name).map(Self::new)
    }

    /// Validate job input and map it to the backend request shape
    ///
    /// Performs no I/O. Fields other than the known ones are carried in
    /// [`SpeechRequest::extra`] and forwarded to the backend unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first problem found
    pub fn translate(&self, raw: &Value) -> Result<SpeechRequest, ValidationError> {
        let Some(fields) = raw.as_object() else {
            return Err(ValidationError::InvalidJob(format!(
                "job input must be a JSON object, got {}",
                type_name(raw)
            )));
        };

        if optional_bool(fields, "stream")?.unwrap_or(false) {
            return Err(ValidationError::StreamingNotSupported);
        }

        let model = required_string(fields, "model")?;
        let input = required_string(fields, "input")?;
        let voice = required_string(fields, "voice")?;

        let response_format = match optional_string(fields, "response_format")? {
            Some(name) => parse_format(name)?,
            None => self.default_format,
        };

        let speed = match fields.get("speed") {
            None | Some(Value::Null) => DEFAULT_SPEED,
            Some(Value::Number(number)) => {
                let speed = number.as_f64().unwrap_or(f64::NAN);
                if !speed.is_finite() || speed <= 0.0 {
                    return Err(ValidationError::InvalidSpeed(number.to_string()));
                }
                speed
            }
            Some(other) => return Err(ValidationError::InvalidSpeed(other.to_string())),
        };

        let extra = fields
            .iter()
            .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(SpeechRequest {
            model: model.to_string(),
            input: input.to_string(),
            voice: voice.to_string(),
            response_format,
            speed,
            extra,
        })
    }
}

fn parse_format(name: &str) -> Result<ResponseFormat, ValidationError> {
    ResponseFormat::from_str(name.trim()).map_err(|_| ValidationError::UnsupportedFormat(name.to_string()))
}

fn required_string<'a>(fields: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, ValidationError> {
    optional_string(fields, field)?
        .filter(|value| !value.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

fn optional_string<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a string, got {}", type_name(other)),
        }),
    }
}

fn optional_bool(fields: &Map<String, Value>, field: &'static str) -> Result<Option<bool>, ValidationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a boolean, got {}", type_name(other)),
        }),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
