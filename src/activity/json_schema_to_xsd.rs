//! JSON Schema → XSD activity
//!
//! Inputs: `jsonSchemaString` (required), `rootElementName` (required),
//! `targetNamespace` (optional). Outputs: `xsdString`, `error`,
//! `errorMessage`.

use serde_json::Value;
use tracing::{debug, info};

use super::{
    required_string_input, set_error_outputs, string_input, Activity, ActivityContext,
};
use crate::error::Result;
use crate::{convert, emit, json_schema};

const IV_JSON_SCHEMA_STRING: &str = "jsonSchemaString";
const IV_ROOT_ELEMENT_NAME: &str = "rootElementName";
const IV_TARGET_NAMESPACE: &str = "targetNamespace";
const OV_XSD_STRING: &str = "xsdString";

/// The JSON Schema to XSD transformer activity
pub struct JsonSchemaToXsd;

struct Inputs {
    json_schema: String,
    root_element_name: String,
    target_namespace: Option<String>,
}

impl Inputs {
    fn read(ctx: &dyn ActivityContext) -> Result<Self> {
        Ok(Inputs {
            json_schema: required_string_input(ctx, IV_JSON_SCHEMA_STRING)?,
            root_element_name: required_string_input(ctx, IV_ROOT_ELEMENT_NAME)?,
            target_namespace: string_input(ctx, IV_TARGET_NAMESPACE),
        })
    }
}

impl Activity for JsonSchemaToXsd {
    fn id(&self) -> &'static str {
        "json-schema-to-xsd"
    }

    fn eval(&self, ctx: &mut dyn ActivityContext) -> Result<bool> {
        debug!("executing JSON Schema to XSD transform");

        let inputs = match Inputs::read(ctx) {
            Ok(inputs) => inputs,
            Err(err) => {
                set_error_outputs(ctx, OV_XSD_STRING, &err);
                return Ok(true);
            }
        };

        let schema = match json_schema::parse(&inputs.json_schema) {
            Ok(schema) => schema,
            Err(err) => {
                set_error_outputs(ctx, OV_XSD_STRING, &err);
                return Ok(true);
            }
        };

        let document = match convert::lower(
            &schema,
            &inputs.root_element_name,
            inputs.target_namespace.as_deref(),
        ) {
            Ok(document) => document,
            Err(err) => {
                set_error_outputs(ctx, OV_XSD_STRING, &err);
                return Ok(true);
            }
        };

        info!("successfully converted JSON Schema to XSD");
        ctx.set_output(OV_XSD_STRING, Value::String(emit::to_xml(&document)));
        ctx.set_output("error", Value::Bool(false));
        ctx.set_output("errorMessage", Value::String(String::new()));
        Ok(true)
    }
}
