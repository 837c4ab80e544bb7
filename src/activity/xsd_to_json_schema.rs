//! XSD → JSON Schema activity
//!
//! Input: `xsdString` (required). Outputs: `jsonSchemaString`, `error`,
//! `errorMessage`.

use serde_json::Value;
use tracing::{debug, info};

use super::{required_string_input, set_error_outputs, Activity, ActivityContext};
use crate::error::Result;
use crate::{convert, emit, xsd};

const IV_XSD_STRING: &str = "xsdString";
const OV_JSON_SCHEMA_STRING: &str = "jsonSchemaString";

/// The XSD to JSON Schema transformer activity
pub struct XsdToJsonSchema;

impl Activity for XsdToJsonSchema {
    fn id(&self) -> &'static str {
        "xsd-to-json-schema"
    }

    fn eval(&self, ctx: &mut dyn ActivityContext) -> Result<bool> {
        debug!("executing XSD to JSON Schema transform");

        let xsd_string = match required_string_input(ctx, IV_XSD_STRING) {
            Ok(text) => text,
            Err(err) => {
                set_error_outputs(ctx, OV_JSON_SCHEMA_STRING, &err);
                return Ok(true);
            }
        };

        let document = match xsd::parse(&xsd_string) {
            Ok(document) => document,
            Err(err) => {
                set_error_outputs(ctx, OV_JSON_SCHEMA_STRING, &err);
                return Ok(true);
            }
        };

        let lifted = match convert::lift(&document) {
            Ok(lifted) => lifted,
            Err(err) => {
                set_error_outputs(ctx, OV_JSON_SCHEMA_STRING, &err);
                return Ok(true);
            }
        };

        let rendered = match emit::to_json(&lifted) {
            Ok(rendered) => rendered,
            Err(err) => {
                set_error_outputs(ctx, OV_JSON_SCHEMA_STRING, &err);
                return Ok(true);
            }
        };

        info!("successfully converted XSD to JSON Schema");
        ctx.set_output(OV_JSON_SCHEMA_STRING, Value::String(rendered));
        ctx.set_output("error", Value::Bool(false));
        ctx.set_output("errorMessage", Value::String(String::new()));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::MapContext;
    use serde_json::json;

    fn eval(ctx: &mut MapContext) -> bool {
        XsdToJsonSchema.eval(ctx).unwrap()
    }

    #[test]
    fn test_successful_conversion_sets_all_outputs() {
        let mut ctx = MapContext::with_inputs([(
            IV_XSD_STRING,
            json!(
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                     <xs:element name="person" type="xs:string"/>
                   </xs:schema>"#
            ),
        )]);
        assert!(eval(&mut ctx));
        assert!(!ctx.output_bool("error"));
        assert_eq!(ctx.output_str("errorMessage"), "");

        let parsed: Value =
            serde_json::from_str(ctx.output_str(OV_JSON_SCHEMA_STRING)).unwrap();
        assert_eq!(
            parsed,
            json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "type": "string"
            })
        );
    }

    #[test]
    fn test_missing_input_reports_field_specific_code() {
        let mut ctx = MapContext::default();
        assert!(eval(&mut ctx));
        assert!(ctx.output_bool("error"));
        assert!(ctx
            .output_str("errorMessage")
            .starts_with("[INVALID_INPUT_XsdString]"));
        assert_eq!(ctx.output_str(OV_JSON_SCHEMA_STRING), "");
    }

    #[test]
    fn test_malformed_xml_reports_parse_error() {
        let mut ctx = MapContext::with_inputs([(IV_XSD_STRING, json!("<schema><broken"))]);
        assert!(eval(&mut ctx));
        assert!(ctx
            .output_str("errorMessage")
            .starts_with("[XSD_PARSE_ERROR]"));
    }

    #[test]
    fn test_empty_choice_reports_conversion_error() {
        let mut ctx = MapContext::with_inputs([(
            IV_XSD_STRING,
            json!(
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                     <xs:element name="root"><xs:complexType><xs:choice/></xs:complexType></xs:element>
                   </xs:schema>"#
            ),
        )]);
        assert!(eval(&mut ctx));
        let message = ctx.output_str("errorMessage");
        assert!(message.starts_with("[CONVERSION_ERROR]"));
        assert!(message.contains("choice must contain at least one element"));
    }
}
