//! End-to-end conversion scenarios
//!
//! Exercises both converter directions through the public API, including the
//! properties the transcoder guarantees: declaration-order preservation,
//! required/optional mapping, choice well-formedness, group flattening
//! idempotence, and loud failures where no faithful mapping exists.

use rstest::rstest;
use serde_json::{json, Value};

use schema_transcode::{json_schema_to_xsd, xsd_to_json_schema, TranscodeError};

const XS: &str = "http://www.w3.org/2001/XMLSchema";
const DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

fn lift(xsd: &str) -> Value {
    serde_json::from_str(&xsd_to_json_schema(xsd).unwrap()).unwrap()
}

// =============================================================================
// JSON Schema → XSD
// =============================================================================

#[test]
fn test_simple_typed_object() {
    let xsd = json_schema_to_xsd(
        r#"{"type":"object","properties":{"name":{"type":"string"},"age":{"type":"integer"}},"required":["name"]}"#,
        "Person",
        None,
    )
    .unwrap();

    assert_eq!(
        xsd,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <xs:schema elementFormDefault=\"qualified\" xmlns:xs=\"http://www.w3.org/2001/XMLSchema\">\n\
         \x20 <xs:element name=\"Person\">\n\
         \x20   <xs:complexType>\n\
         \x20     <xs:sequence>\n\
         \x20       <xs:element name=\"name\" type=\"xs:string\"/>\n\
         \x20       <xs:element name=\"age\" type=\"xs:integer\" minOccurs=\"0\"/>\n\
         \x20     </xs:sequence>\n\
         \x20   </xs:complexType>\n\
         \x20 </xs:element>\n\
         </xs:schema>\n"
    );
}

#[test]
fn test_array_of_strings() {
    let xsd = json_schema_to_xsd(
        r#"{"type":"object","properties":{"items":{"type":"array","items":{"type":"string"}}}}"#,
        "ItemList",
        None,
    )
    .unwrap();
    assert!(xsd.contains(
        "<xs:element name=\"items\" type=\"xs:string\" minOccurs=\"0\" maxOccurs=\"unbounded\"/>"
    ));
}

#[test]
fn test_property_order_is_preserved_in_the_sequence() {
    let xsd = json_schema_to_xsd(
        r#"{"type":"object","properties":{"a":{"type":"string"},"b":{"type":"string"},"c":{"type":"string"}}}"#,
        "Ordered",
        None,
    )
    .unwrap();
    let a = xsd.find("name=\"a\"").unwrap();
    let b = xsd.find("name=\"b\"").unwrap();
    let c = xsd.find("name=\"c\"").unwrap();
    assert!(a < b && b < c);
}

#[test]
fn test_nested_objects_nest_complex_types() {
    let xsd = json_schema_to_xsd(
        r#"{"type":"object","properties":{"address":{"type":"object","properties":{"street":{"type":"string"}},"required":["street"]}},"required":["address"]}"#,
        "Customer",
        None,
    )
    .unwrap();
    assert!(xsd.contains("<xs:element name=\"address\">"));
    assert!(xsd.contains("<xs:element name=\"street\" type=\"xs:string\"/>"));
}

#[test]
fn test_one_of_lowers_to_choice_wrappers() {
    let xsd = json_schema_to_xsd(
        r#"{"type":"object","properties":{"id":{"oneOf":[{"type":"string"},{"type":"integer"}]}},"required":["id"]}"#,
        "Record",
        None,
    )
    .unwrap();
    assert!(xsd.contains("<xs:choice>"));
    assert!(xsd.contains("<xs:element name=\"id_choice_1\" type=\"xs:string\"/>"));
    assert!(xsd.contains("<xs:element name=\"id_choice_2\" type=\"xs:integer\"/>"));
}

#[rstest]
#[case(r#"{"type":"string"}"#, "root of JSON schema must be of type 'object'")]
#[case(
    r#"{"type":"object","properties":{"xs":{"type":"array"}}}"#,
    "array 'xs' must have an 'items' definition"
)]
#[case(
    r#"{"type":"object","properties":{"x":{"type":"date"}}}"#,
    "unsupported JSON schema type: date for property x"
)]
fn test_lowering_failures(#[case] schema: &str, #[case] expected: &str) {
    let err = json_schema_to_xsd(schema, "Root", None).unwrap_err();
    assert_eq!(err.code(), "XSD_CONVERSION_ERROR");
    assert!(
        err.to_string().contains(expected),
        "message '{}' should contain '{}'",
        err,
        expected
    );
}

// =============================================================================
// XSD → JSON Schema
// =============================================================================

#[test]
fn test_simple_xsd_element() {
    let lifted = lift(&format!(
        r#"<xs:schema xmlns:xs="{}"><xs:element name="person" type="xs:string"/></xs:schema>"#,
        XS
    ));
    assert_eq!(lifted, json!({"$schema": DIALECT, "type": "string"}));
}

#[test]
fn test_choice_lifts_to_closed_one_of_options() {
    let lifted = lift(&format!(
        r#"<xs:schema xmlns:xs="{}">
             <xs:element name="contact">
               <xs:complexType>
                 <xs:choice>
                   <xs:element name="email" type="xs:string"/>
                   <xs:element name="phone" type="xs:string"/>
                 </xs:choice>
               </xs:complexType>
             </xs:element>
           </xs:schema>"#,
        XS
    ));
    assert_eq!(
        lifted,
        json!({
            "$schema": DIALECT,
            "oneOf": [
                {
                    "type": "object",
                    "properties": {"email": {"type": "string"}},
                    "required": ["email"],
                    "additionalProperties": false
                },
                {
                    "type": "object",
                    "properties": {"phone": {"type": "string"}},
                    "required": ["phone"],
                    "additionalProperties": false
                }
            ]
        })
    );
}

#[test]
fn test_pattern_and_length_restriction() {
    let lifted = lift(&format!(
        r#"<xs:schema xmlns:xs="{}">
             <xs:element name="code">
               <xs:simpleType>
                 <xs:restriction base="xs:string">
                   <xs:pattern value="[A-Z]{{2}}[0-9]{{4}}"/>
                   <xs:minLength value="6"/>
                   <xs:maxLength value="6"/>
                 </xs:restriction>
               </xs:simpleType>
             </xs:element>
           </xs:schema>"#,
        XS
    ));
    assert_eq!(
        lifted,
        json!({
            "$schema": DIALECT,
            "type": "string",
            "pattern": "[A-Z]{2}[0-9]{4}",
            "minLength": 6,
            "maxLength": 6
        })
    );
}

#[test]
fn test_group_reference_flattens_into_the_sequence() {
    let lifted = lift(&format!(
        r#"<xs:schema xmlns:xs="{}">
             <xs:group name="personGroup">
               <xs:sequence>
                 <xs:element name="firstName" type="xs:string"/>
                 <xs:element name="lastName" type="xs:string"/>
               </xs:sequence>
             </xs:group>
             <xs:element name="employee">
               <xs:complexType>
                 <xs:sequence>
                   <xs:element name="employeeId" type="xs:integer"/>
                   <xs:group ref="personGroup"/>
                 </xs:sequence>
               </xs:complexType>
             </xs:element>
           </xs:schema>"#,
        XS
    ));
    let properties = lifted["properties"].as_object().unwrap();
    for name in ["employeeId", "firstName", "lastName"] {
        assert!(properties.contains_key(name), "missing property {}", name);
    }
    let required = lifted["required"].as_array().unwrap();
    assert_eq!(required.len(), 3);
}

#[test]
fn test_group_flattening_is_idempotent_with_hand_inlining() {
    let with_group = lift(&format!(
        r#"<xs:schema xmlns:xs="{}">
             <xs:group name="nameGroup">
               <xs:sequence>
                 <xs:element name="first" type="xs:string"/>
                 <xs:element name="last" type="xs:string" minOccurs="0"/>
               </xs:sequence>
             </xs:group>
             <xs:element name="person">
               <xs:complexType>
                 <xs:sequence><xs:group ref="nameGroup"/></xs:sequence>
               </xs:complexType>
             </xs:element>
           </xs:schema>"#,
        XS
    ));
    let inlined = lift(&format!(
        r#"<xs:schema xmlns:xs="{}">
             <xs:element name="person">
               <xs:complexType>
                 <xs:sequence>
                   <xs:element name="first" type="xs:string"/>
                   <xs:element name="last" type="xs:string" minOccurs="0"/>
                 </xs:sequence>
               </xs:complexType>
             </xs:element>
           </xs:schema>"#,
        XS
    ));
    assert_eq!(with_group, inlined);
}

#[rstest]
#[case("0", false)]
#[case("1", true)]
#[case("", true)]
fn test_min_occurs_drives_requiredness(#[case] min_occurs: &str, #[case] required: bool) {
    let attr = if min_occurs.is_empty() {
        String::new()
    } else {
        format!(r#" minOccurs="{}""#, min_occurs)
    };
    let lifted = lift(&format!(
        r#"<xs:schema xmlns:xs="{}">
             <xs:element name="root">
               <xs:complexType>
                 <xs:sequence>
                   <xs:element name="field" type="xs:string"{}/>
                 </xs:sequence>
               </xs:complexType>
             </xs:element>
           </xs:schema>"#,
        XS, attr
    ));
    let listed = lifted
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.contains(&json!("field")))
        .unwrap_or(false);
    assert_eq!(listed, required);
}

#[test]
fn test_builtin_type_formats_survive_lifting() {
    let lifted = lift(&format!(
        r#"<xs:schema xmlns:xs="{}">
             <xs:element name="root">
               <xs:complexType>
                 <xs:sequence>
                   <xs:element name="born" type="xs:date"/>
                   <xs:element name="seen" type="xs:dateTime"/>
                   <xs:element name="site" type="xs:anyURI"/>
                   <xs:element name="blob" type="xs:base64Binary"/>
                 </xs:sequence>
               </xs:complexType>
             </xs:element>
           </xs:schema>"#,
        XS
    ));
    let properties = lifted["properties"].as_object().unwrap();
    assert_eq!(properties["born"], json!({"type": "string", "format": "date"}));
    assert_eq!(
        properties["seen"],
        json!({"type": "string", "format": "date-time"})
    );
    assert_eq!(properties["site"], json!({"type": "string", "format": "uri"}));
    assert_eq!(properties["blob"], json!({"type": "string", "format": "byte"}));
}

#[rstest]
#[case(
    r#"<xs:element name="r"><xs:complexType><xs:choice/></xs:complexType></xs:element>"#,
    "XSD choice must contain at least one element"
)]
#[case(
    r#"<xs:element name="r"><xs:complexType><xs:all/></xs:complexType></xs:element>"#,
    "XSD all must contain at least one element"
)]
#[case(
    r#"<xs:element name="r"><xs:complexType><xs:sequence><xs:group ref="nope"/></xs:sequence></xs:complexType></xs:element>"#,
    "group reference 'nope' not found in schema"
)]
fn test_lifting_failures(#[case] body: &str, #[case] expected: &str) {
    let err = xsd_to_json_schema(&format!(r#"<xs:schema xmlns:xs="{}">{}</xs:schema>"#, XS, body))
        .unwrap_err();
    assert_eq!(err.code(), "CONVERSION_ERROR");
    assert!(
        err.to_string().contains(expected),
        "message '{}' should contain '{}'",
        err,
        expected
    );
}

#[test]
fn test_error_formatting_carries_the_wire_code() {
    let err = xsd_to_json_schema("not xml at all").unwrap_err();
    assert!(matches!(err, TranscodeError::XsdParse(_)));
    assert!(err.formatted().starts_with("[XSD_PARSE_ERROR] "));
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_lowered_schema_lifts_back_to_equivalent_structure() {
    let xsd = json_schema_to_xsd(
        r#"{"type":"object","properties":{"name":{"type":"string"},"age":{"type":"integer"},"tags":{"type":"array","items":{"type":"string"}}},"required":["name"]}"#,
        "Person",
        None,
    )
    .unwrap();
    let lifted = lift(&xsd);
    assert_eq!(
        lifted,
        json!({
            "$schema": DIALECT,
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer"},
                "tags": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["name"]
        })
    );
}
