//! Turning a host reply into the tool's text result.
//!
//! Decision order:
//! 1. binary content: save to `output_file` (required), or fail
//! 2. text content: save to `output_file` if given, else return it inline
//! 3. neither: the host broke its contract

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::backend::BackendReply;
use crate::error::ConvertError;
use crate::persist::persist;
use crate::request::ConversionRequest;

/// Hosts may wrap base64 at 76 columns or drop the `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn decode_file_content(data_base64: &str) -> Result<Vec<u8>, ConvertError> {
    let compact: String = data_base64.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT
        .decode(compact)
        .map_err(|e| ConvertError::InvalidBackendReply(format!("file content is not valid base64: {}", e)))
}

/// Produce the final message for a successful host reply, writing at most
/// one file.
pub async fn reconcile(reply: BackendReply, request: &ConversionRequest) -> Result<String, ConvertError> {
    match (reply, request.output_file.as_deref()) {
        (
            BackendReply::Binary {
                data_base64,
                declared_format,
            },
            Some(path),
        ) => {
            let bytes = decode_file_content(&data_base64)?;
            persist(path, &bytes).await?;

            let format = declared_format.unwrap_or_else(|| request.output_format.to_string());
            Ok(format!(
                "Content successfully converted to {} and saved to: {}",
                format,
                path.display()
            ))
        }

        (BackendReply::Binary { declared_format, .. }, None) => Err(ConvertError::MissingOutputPath {
            format: declared_format.unwrap_or_else(|| request.output_format.to_string()),
        }),

        (BackendReply::Text { content }, Some(path)) => {
            persist(path, content.as_bytes()).await?;
            Ok(format!(
                "Content successfully converted and saved to: {}",
                path.display()
            ))
        }

        (BackendReply::Text { content }, None) => Ok(content),

        (BackendReply::Empty, _) => Err(ConvertError::EmptyBackendReply),
    }
}
