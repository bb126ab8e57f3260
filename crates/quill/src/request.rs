//! Turning untyped tool arguments into a validated conversion request.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ConvertError;
use crate::format::Format;

/// A validated `convert-contents` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub contents: String,
    pub input_format: Format,
    pub output_format: Format,
    pub output_file: Option<PathBuf>,
}

/// JSON body sent to the pandoc host.
#[derive(Debug, Serialize)]
pub struct BackendPayload<'a> {
    pub contents: &'a str,
    pub input_format: Format,
    pub output_format: Format,
}

impl ConversionRequest {
    /// Validate tool-call arguments.
    ///
    /// Formats are matched case-insensitively and default to markdown.
    /// `output_file` set to an empty string counts as absent. `input_file` is
    /// accepted for compatibility and ignored.
    pub fn from_arguments(arguments: &Value) -> Result<Self, ConvertError> {
        let args = arguments
            .as_object()
            .ok_or_else(|| ConvertError::Validation("Tool arguments must be a JSON object.".to_string()))?;

        let contents = match args.get("contents") {
            Some(Value::String(s)) => s.clone(),
            _ => {
                return Err(ConvertError::Validation(
                    "Invalid or missing 'contents' argument.".to_string(),
                ))
            }
        };

        let input_format = parse_format(args, "input_format")?;
        let output_format = parse_format(args, "output_format")?;

        let output_file = match args.get("output_file") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(PathBuf::from(s)),
            Some(_) => {
                return Err(ConvertError::Validation(
                    "Invalid 'output_file' argument: expected a string path.".to_string(),
                ))
            }
        };

        if let Some(input_file) = args.get("input_file").filter(|v| !v.is_null()) {
            warn!(input_file = %input_file, "Ignoring unsupported input_file argument; using contents");
        }

        Ok(Self {
            contents,
            input_format,
            output_format,
            output_file,
        })
    }

    pub fn payload(&self) -> BackendPayload<'_> {
        BackendPayload {
            contents: &self.contents,
            input_format: self.input_format,
            output_format: self.output_format,
        }
    }
}

fn parse_format(args: &Map<String, Value>, field: &'static str) -> Result<Format, ConvertError> {
    let unsupported = |value: String| ConvertError::UnsupportedFormat {
        field,
        value,
        supported: Format::supported_list(),
    };

    match args.get(field) {
        None | Some(Value::Null) => Ok(Format::default()),
        Some(Value::String(s)) => s.parse().map_err(|_| unsupported(s.clone())),
        Some(other) => Err(unsupported(other.to_string())),
    }
}
