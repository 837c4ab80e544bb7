//! Schema Transcoding Activities
//!
//! Plug-in activities for a flow-based host runtime, built around a
//! bidirectional transcoder between a JSON Schema draft 2020-12 subset and an
//! XSD 1.0 subset. The host stays opaque: it supplies named string inputs and
//! receives named outputs (see [`activity`]).
//!
//! ## Data flow
//!
//! ```text
//! bytes ──parse──▶ JSON Schema tree ──lower──▶ XSD tree ──emit──▶ bytes
//! bytes ──parse──▶ XSD tree ──lift──▶ JSON Schema object ──emit──▶ bytes
//! ```
//!
//! Each call builds its trees fresh, transforms them, and discards them on
//! return; failures short-circuit into [`TranscodeError`] and surface to the
//! host as a `[CODE] message` string.

pub mod activity;
pub mod convert;
pub mod emit;
pub mod error;
pub mod json_schema;
pub mod typemap;
pub mod xsd;

pub use error::{Result, TranscodeError};

/// Convert a JSON Schema document to its XSD rendering.
pub fn json_schema_to_xsd(
    json_schema_text: &str,
    root_element: &str,
    target_namespace: Option<&str>,
) -> Result<String> {
    let schema = json_schema::parse(json_schema_text)?;
    let document = convert::lower(&schema, root_element, target_namespace)?;
    Ok(emit::to_xml(&document))
}

/// Convert an XSD document to its JSON Schema rendering.
pub fn xsd_to_json_schema(xsd_text: &str) -> Result<String> {
    let document = xsd::parse(xsd_text)?;
    let lifted = convert::lift(&document)?;
    emit::to_json(&lifted)
}
