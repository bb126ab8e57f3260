//! The `convert-contents` tool descriptor.
//!
//! The input schema is written by hand so the advertised defaults and the
//! `input_file` caveat read exactly as clients should see them.

use baton::{Tool, ToolAnnotations, ToolSchema};
use serde_json::{json, Value};

use crate::format::Format;

pub const TOOL_NAME: &str = "convert-contents";

const DESCRIPTION: &str = "\
Converts content between different formats using Pandoc. Transforms the given \
content into the specified output format.

REQUIREMENTS:
1. Host Service: the separate pandoc host service MUST be running and reachable.
2. Pandoc Installation (on Host): Pandoc MUST be installed on the host.
3. PDF Conversion (on Host): a TeX distribution MUST be installed on the host for PDF output.
4. File Paths: provide a COMPLETE absolute path for 'output_file' (a path on the machine running this server).

Supported formats: markdown, html, pdf, docx, rst, latex, epub, txt

Binary formats (pdf, docx, epub, ...) are returned as files and need 'output_file'. \
'input_file' is NOT supported; pass the text in 'contents'.";

/// JSON Schema for the tool's arguments.
pub fn input_schema() -> Value {
    let formats: Vec<&str> = Format::ALL.iter().map(|f| f.as_str()).collect();

    json!({
        "type": "object",
        "properties": {
            "contents": {
                "type": "string",
                "description": "The content to be converted (required, input_file not supported)"
            },
            "input_file": {
                "type": "string",
                "description": "NOT SUPPORTED. Use 'contents' instead."
            },
            "input_format": {
                "type": "string",
                "description": "Source format of the content (defaults to markdown)",
                "default": "markdown",
                "enum": formats
            },
            "output_format": {
                "type": "string",
                "description": "Desired output format (defaults to markdown)",
                "default": "markdown",
                "enum": formats
            },
            "output_file": {
                "type": "string",
                "description": "Complete absolute path where the output is saved. Required for binary formats such as pdf and docx."
            }
        },
        "required": ["contents"]
    })
}

/// Build the descriptor advertised on `tools/list`.
pub fn descriptor() -> Tool {
    Tool::new(TOOL_NAME, DESCRIPTION)
        .with_title("Convert document contents")
        .with_input_schema(ToolSchema::from_value(input_schema()))
        .with_annotations(ToolAnnotations {
            title: Some("Convert document contents".to_string()),
            read_only_hint: Some(false),
            destructive_hint: Some(true),
            idempotent_hint: Some(true),
            open_world_hint: Some(true),
        })
}
