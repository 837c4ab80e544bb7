//! Plug-in surface for the flow-based host runtime
//!
//! The host is abstracted to the two operations it performs around an
//! evaluation: supplying named inputs and collecting named outputs. Logging
//! goes through `tracing`; whatever subscriber the host installs is the
//! spec's `logger()`.
//!
//! Registration is a one-time, process-wide action: the registry of built-in
//! activities is assembled on first use and never mutated afterwards, so
//! concurrent evaluations share nothing but immutable tables.

pub mod dynamic_log;
pub mod json_schema_to_xsd;
pub mod xsd_to_json_schema;

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;
use tracing::error;

use crate::error::{Result, TranscodeError};

/// One evaluation's window onto the host: named inputs in, named outputs back.
pub trait ActivityContext {
    fn get_input(&self, name: &str) -> Option<Value>;
    fn set_output(&mut self, name: &str, value: Value);
}

/// A unit of function the host can schedule
///
/// `eval` returning `Ok(true)` marks the invocation done. Validation and
/// conversion failures are *soft*: the activity reports them through its
/// `error`/`errorMessage` outputs and still completes, so the host does not
/// retry a request that cannot succeed.
pub trait Activity: Send + Sync {
    /// Stable identifier the host uses to address this activity.
    fn id(&self) -> &'static str;
    /// Evaluate one invocation against the given context.
    fn eval(&self, ctx: &mut dyn ActivityContext) -> Result<bool>;
}

/// The registered activity set
#[derive(Default)]
pub struct ActivityRegistry {
    activities: Vec<Box<dyn Activity>>,
}

impl ActivityRegistry {
    fn with_builtins() -> Self {
        let mut registry = ActivityRegistry::default();
        registry.register(Box::new(json_schema_to_xsd::JsonSchemaToXsd));
        registry.register(Box::new(xsd_to_json_schema::XsdToJsonSchema));
        registry.register(Box::new(dynamic_log::DynamicLog::default()));
        registry
    }

    pub fn register(&mut self, activity: Box<dyn Activity>) {
        self.activities.push(activity);
    }

    pub fn get(&self, id: &str) -> Option<&dyn Activity> {
        self.activities
            .iter()
            .find(|activity| activity.id() == id)
            .map(|activity| activity.as_ref())
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.activities.iter().map(|activity| activity.id()).collect()
    }
}

/// The process-wide registry, built once on first use.
pub fn registry() -> &'static ActivityRegistry {
    static REGISTRY: OnceLock<ActivityRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ActivityRegistry::with_builtins)
}

/// In-memory context backed by plain maps; used by the CLI and tests.
#[derive(Debug, Default)]
pub struct MapContext {
    inputs: HashMap<String, Value>,
    outputs: HashMap<String, Value>,
}

impl MapContext {
    pub fn with_inputs<I, K>(inputs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        MapContext {
            inputs: inputs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            outputs: HashMap::new(),
        }
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    pub fn output_str(&self, name: &str) -> &str {
        self.output(name).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn output_bool(&self, name: &str) -> bool {
        self.output(name).and_then(Value::as_bool).unwrap_or_default()
    }
}

impl ActivityContext for MapContext {
    fn get_input(&self, name: &str) -> Option<Value> {
        self.inputs.get(name).cloned()
    }

    fn set_output(&mut self, name: &str, value: Value) {
        self.outputs.insert(name.to_string(), value);
    }
}

/// Coerce a host value to a string, the way hosts hand over loosely typed
/// flow data: strings pass through, scalars render, anything else is absent.
pub(crate) fn string_input(ctx: &dyn ActivityContext, name: &str) -> Option<String> {
    match ctx.get_input(name)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// A required string input: present, coercible and non-blank.
pub(crate) fn required_string_input(
    ctx: &dyn ActivityContext,
    name: &'static str,
) -> Result<String> {
    match string_input(ctx, name) {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(TranscodeError::MissingInput { name }),
    }
}

/// Set the failure triple: empty primary output, error flag, tagged message.
pub(crate) fn set_error_outputs(
    ctx: &mut dyn ActivityContext,
    primary_output: &str,
    err: &TranscodeError,
) {
    error!(code = %err.code(), "{}", err);
    ctx.set_output(primary_output, Value::String(String::new()));
    ctx.set_output("error", Value::Bool(true));
    ctx.set_output("errorMessage", Value::String(err.formatted()));
}
