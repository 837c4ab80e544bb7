//! Error types for schema transcoding

use thiserror::Error;

/// Result type for transcoding operations
pub type Result<T> = std::result::Result<T, TranscodeError>;

/// Transcoding errors
///
/// Every variant carries a stable wire code (see [`TranscodeError::code`])
/// that activities prefix onto the `errorMessage` output.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// The host delivered an unreadable input object.
    #[error("failed to read activity input: {0}")]
    InvalidInput(String),

    /// A required input was absent, blank, or of the wrong type.
    #[error("input '{name}' is required and cannot be empty")]
    MissingInput { name: &'static str },

    #[error("invalid JSON Schema provided: {0}")]
    SchemaParse(#[source] serde_json::Error),

    #[error("invalid XSD provided: {0}")]
    XsdParse(String),

    /// J→X: the input is well-formed but has no faithful XSD mapping.
    #[error("could not convert to XSD: {0}")]
    XsdConversion(String),

    /// X→J: the input is well-formed but has no faithful JSON Schema mapping.
    #[error("conversion failed: {0}")]
    Conversion(String),

    #[error("failed to generate JSON string: {0}")]
    JsonMarshal(#[source] serde_json::Error),
}

impl TranscodeError {
    /// Wire code delivered to the host alongside the message.
    ///
    /// Field-specific input errors fold the input's wire name into the code,
    /// capitalised: `INVALID_INPUT_XsdString`, `INVALID_INPUT_JsonSchemaString`.
    pub fn code(&self) -> String {
        match self {
            TranscodeError::InvalidInput(_) => "INVALID_INPUT".to_string(),
            TranscodeError::MissingInput { name } => {
                format!("INVALID_INPUT_{}", capitalize(name))
            }
            TranscodeError::SchemaParse(_) => "SCHEMA_PARSE_ERROR".to_string(),
            TranscodeError::XsdParse(_) => "XSD_PARSE_ERROR".to_string(),
            TranscodeError::XsdConversion(_) => "XSD_CONVERSION_ERROR".to_string(),
            TranscodeError::Conversion(_) => "CONVERSION_ERROR".to_string(),
            TranscodeError::JsonMarshal(_) => "JSON_MARSHAL_ERROR".to_string(),
        }
    }

    /// The `"[<CODE>] <text>"` rendering set on the `errorMessage` output.
    pub fn formatted(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl From<roxmltree::Error> for TranscodeError {
    fn from(err: roxmltree::Error) -> Self {
        TranscodeError::XsdParse(err.to_string())
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
