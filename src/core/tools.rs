//! # Operation Catalog
//!
//! Every math operation the model can call is a unit struct implementing
//! [`Tool`]. The [`ToolRegistry`] is built once, explicitly, from those
//! structs and never changes afterwards:
//!
//! ```text
//! ToolRegistry::builder()
//!     .register(CalculatorTool)
//!     .register(PowerTool)
//!     ...
//!     .build()?            // rejects duplicate names
//! ```
//!
//! The registry is the single dispatch surface: [`ToolRegistry::invoke`]
//! takes an operation name plus JSON arguments and returns a tagged
//! `Result<String, ToolError>`. [`render_outcome`] turns that back into the
//! plain text the model reads, with failures marked by an `Error:` prefix.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::inference::{ToolCall, ToolDefinition};

pub mod algebra;
pub mod arithmetic;
pub mod format;
pub mod geometry;
pub mod logarithms;
pub mod percentages;
pub mod sequences;
pub mod statistics;
pub mod trigonometry;

/// Marker that starts every rendered failure.
pub const ERROR_PREFIX: &str = "Error: ";

// ============================================================================
// Errors
// ============================================================================

/// Why an operation could not produce an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolError {
    /// Arguments did not match the declared parameter schema.
    InvalidArguments(String),
    /// Inputs outside the operation's mathematical domain.
    Domain(String),
    /// An expression or equation could not be parsed or solved.
    Parse(String),
    /// No operation is registered under this name.
    UnknownOperation(String),
}

impl ToolError {
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }
}

/// Rejects results that overflowed to infinity or became NaN.
pub(crate) fn finite(value: f64) -> Result<f64, ToolError> {
    if !value.is_finite() {
        return Err(ToolError::domain("The result is too large to represent"));
    }
    Ok(value)
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            ToolError::Domain(msg) | ToolError::Parse(msg) => write!(f, "{msg}"),
            ToolError::UnknownOperation(name) => write!(f, "Unknown tool: {name}"),
        }
    }
}

impl std::error::Error for ToolError {}

/// Raised while building a catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    DuplicateName(&'static str),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::DuplicateName(name) => {
                write!(f, "operation '{name}' is registered more than once")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Renders a tagged outcome as the text handed back to the model.
pub fn render_outcome(outcome: &Result<String, ToolError>) -> String {
    match outcome {
        Ok(text) => text.clone(),
        Err(e) => format!("{ERROR_PREFIX}{e}"),
    }
}

// ============================================================================
// Tool trait
// ============================================================================

/// A single named, pure operation.
pub trait Tool: Send + Sync + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    type Args: DeserializeOwned + JsonSchema;

    fn call(&self, args: Self::Args) -> Result<String, ToolError>;
}

/// Object-safe view of a [`Tool`] so the registry can hold mixed types.
trait ErasedTool: Send + Sync {
    fn invoke(&self, arguments: Value) -> Result<String, ToolError>;
}

impl<T: Tool> ErasedTool for T {
    fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        let args: T::Args = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
        self.call(args)
    }
}

/// Name, description and JSON parameter schema of one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

impl OperationDescriptor {
    fn of<T: Tool>() -> Self {
        Self {
            name: T::NAME,
            description: T::DESCRIPTION,
            parameters: parameters_schema::<T::Args>(),
        }
    }

    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            parameters: self.parameters.clone(),
        }
    }
}

/// JSON Schema for an argument struct, trimmed to what function-calling APIs expect.
fn parameters_schema<A: JsonSchema>() -> Value {
    let root = schemars::schema_for!(A);
    let mut schema = serde_json::to_value(root).unwrap_or_else(|e| {
        warn!("Schema serialization failed: {}", e);
        serde_json::json!({ "type": "object" })
    });
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    schema
}

// ============================================================================
// Argument coercion
// ============================================================================

/// Accepts numeric strings wherever the schema declares a number.
///
/// Models frequently send `"5"` instead of `5`, or a list as `"1, 2, 3"`.
/// Only values that parse as finite numbers are rewritten; anything else is
/// left for deserialization to reject.
fn coerce_numeric_strings(schema: &Value, arguments: &mut Value) {
    let (Some(properties), Some(args)) = (
        schema.get("properties").and_then(Value::as_object),
        arguments.as_object_mut(),
    ) else {
        return;
    };

    for (name, property) in properties {
        let Some(value) = args.get_mut(name) else {
            continue;
        };
        if declares_type(property, "number") || declares_type(property, "integer") {
            coerce_scalar(value, declares_type(property, "integer"));
        } else if declares_type(property, "array") {
            if let Value::String(text) = value {
                let parsed: Option<Vec<Value>> = text
                    .trim()
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .split([',', ' ', ';'])
                    .filter(|part| !part.is_empty())
                    .map(|part| parse_finite(part).map(Value::from))
                    .collect();
                if let Some(items) = parsed {
                    *value = Value::Array(items);
                }
            }
            if let Value::Array(items) = value {
                items.iter_mut().for_each(|item| coerce_scalar(item, false));
            }
        }
    }
}

fn declares_type(property: &Value, ty: &str) -> bool {
    match property.get("type") {
        Some(Value::String(t)) => t == ty,
        Some(Value::Array(types)) => types.iter().any(|t| t == ty),
        _ => false,
    }
}

fn coerce_scalar(value: &mut Value, integer: bool) {
    let number = match value {
        Value::String(text) => parse_finite(text),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    let Some(number) = number else {
        return;
    };
    if integer {
        if number.fract() == 0.0 && number.abs() < 9.0e15 {
            *value = Value::from(number as i64);
        }
    } else if value.is_string() {
        *value = Value::from(number);
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

// ============================================================================
// Registry
// ============================================================================

struct Entry {
    descriptor: OperationDescriptor,
    tool: Box<dyn ErasedTool>,
}

/// Immutable, ordered catalog of operations.
pub struct ToolRegistry {
    entries: Vec<Entry>,
    descriptors: Vec<OperationDescriptor>,
    index: HashMap<&'static str, usize>,
}

/// Collects operations in declaration order; [`build`](Self::build) seals them.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    entries: Vec<Entry>,
}

impl ToolRegistryBuilder {
    pub fn register<T: Tool>(mut self, tool: T) -> Self {
        self.entries.push(Entry {
            descriptor: OperationDescriptor::of::<T>(),
            tool: Box::new(tool),
        });
        self
    }

    pub fn build(self) -> Result<ToolRegistry, CatalogError> {
        let mut index = HashMap::with_capacity(self.entries.len());
        for (position, entry) in self.entries.iter().enumerate() {
            if index.insert(entry.descriptor.name, position).is_some() {
                return Err(CatalogError::DuplicateName(entry.descriptor.name));
            }
        }
        let descriptors = self.entries.iter().map(|e| e.descriptor.clone()).collect();
        Ok(ToolRegistry {
            entries: self.entries,
            descriptors,
            index,
        })
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Every operation, in registration order.
    pub fn list_operations(&self) -> &[OperationDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tool definitions in the shape providers send to the model.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.descriptors.iter().map(OperationDescriptor::to_definition).collect()
    }

    /// Runs the named operation with JSON arguments.
    pub fn invoke(&self, name: &str, mut arguments: Value) -> Result<String, ToolError> {
        let entry = self
            .index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| ToolError::UnknownOperation(name.to_string()))?;
        if arguments.is_null() {
            arguments = Value::Object(Default::default());
        }
        coerce_numeric_strings(&entry.descriptor.parameters, &mut arguments);
        entry.tool.invoke(arguments)
    }

    /// Executes a model tool call and returns the text the model will read.
    pub fn execute(&self, tool_call: &ToolCall) -> String {
        info!("Tool called: {} (call_id={})", tool_call.name, tool_call.call_id);
        let outcome = if tool_call.arguments.trim().is_empty() {
            self.invoke(&tool_call.name, Value::Null)
        } else {
            serde_json::from_str::<Value>(&tool_call.arguments)
                .map_err(|e| ToolError::invalid_arguments(format!("arguments are not valid JSON: {e}")))
                .and_then(|args| self.invoke(&tool_call.name, args))
        };
        let rendered = render_outcome(&outcome);
        debug!("Tool {} returned: {}", tool_call.name, rendered);
        rendered
    }
}

/// Builds the full math catalog.
pub fn default_registry() -> Result<ToolRegistry, CatalogError> {
    use algebra::*;
    use arithmetic::*;
    use geometry::*;
    use logarithms::*;
    use percentages::*;
    use sequences::*;
    use statistics::*;
    use trigonometry::*;

    ToolRegistry::builder()
        // arithmetic
        .register(CalculatorTool)
        .register(PowerTool)
        .register(SquareRootTool)
        // algebra
        .register(SolveLinearEquationTool)
        .register(SolveQuadraticTool)
        .register(FactorExpressionTool)
        .register(ExpandExpressionTool)
        // geometry
        .register(AreaCircleTool)
        .register(CircumferenceCircleTool)
        .register(AreaRectangleTool)
        .register(AreaTriangleTool)
        .register(AreaTrapezoidTool)
        .register(VolumeCubeTool)
        .register(VolumeCuboidTool)
        .register(VolumeCylinderTool)
        .register(VolumeSphereTool)
        .register(VolumeConeTool)
        .register(PythagoreanTheoremTool)
        // trigonometry
        .register(SineTool)
        .register(CosineTool)
        .register(TangentTool)
        .register(ArcsineTool)
        .register(ArccosineTool)
        .register(ArctangentTool)
        // logarithms
        .register(LogarithmTool)
        .register(NaturalLogTool)
        .register(LogBase10Tool)
        .register(ExponentialTool)
        // statistics
        .register(MeanTool)
        .register(MedianTool)
        .register(ModeTool)
        .register(StandardDeviationTool)
        .register(VarianceTool)
        // sequences
        .register(ArithmeticNthTermTool)
        .register(ArithmeticSumTool)
        .register(GeometricNthTermTool)
        .register(GeometricSumTool)
        // percentages and ratios
        .register(PercentageTool)
        .register(PercentageOfTool)
        .register(SimplifyRatioTool)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn registry() -> ToolRegistry {
        default_registry().unwrap()
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "fc_1".into(),
            call_id: "call_1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[test]
    fn test_catalog_has_forty_unique_operations() {
        let registry = registry();
        let names: Vec<_> = registry.list_operations().iter().map(|d| d.name).collect();
        assert_eq!(names.len(), 40);
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), 40);
        assert_eq!(names[0], "calculator");
        assert_eq!(names[39], "simplify_ratio");
    }

    #[test]
    fn test_catalog_order_is_stable() {
        let first: Vec<_> = registry().list_operations().iter().map(|d| d.name).collect();
        let second: Vec<_> = registry().list_operations().iter().map(|d| d.name).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_builder_rejects_duplicate_names() {
        let result = ToolRegistry::builder()
            .register(arithmetic::PowerTool)
            .register(arithmetic::SquareRootTool)
            .register(arithmetic::PowerTool)
            .build();
        assert!(matches!(result, Err(CatalogError::DuplicateName("power"))));
    }

    #[test]
    fn test_descriptors_carry_object_schemas() {
        for descriptor in registry().list_operations() {
            assert!(!descriptor.description.is_empty(), "{}", descriptor.name);
            assert_eq!(descriptor.parameters["type"], "object", "{}", descriptor.name);
            assert!(descriptor.parameters.get("$schema").is_none());
        }
    }

    #[test]
    fn test_optional_operation_parameter_is_not_required() {
        let registry = registry();
        let calculator = &registry.list_operations()[0];
        let required = calculator.parameters["required"].as_array().unwrap();
        assert!(required.contains(&json!("a")));
        assert!(!required.contains(&json!("operation")));
        assert_eq!(calculator.parameters["properties"]["operation"]["default"], "add");
    }

    #[test]
    fn test_invoke_unknown_operation() {
        let err = registry().invoke("integrate", json!({})).unwrap_err();
        assert_eq!(err, ToolError::UnknownOperation("integrate".into()));
    }

    /// One valid argument set for every operation in the catalog.
    fn sample_arguments() -> Vec<(&'static str, Value)> {
        vec![
            ("calculator", json!({"a": 7, "b": 3, "operation": "multiply"})),
            ("power", json!({"base": 2, "exponent": 10})),
            ("square_root", json!({"number": 2})),
            ("solve_linear_equation", json!({"equation": "3x - 7 = 2x + 1"})),
            ("solve_quadratic", json!({"a": 2, "b": 3, "c": -5})),
            ("factor_expression", json!({"expression": "x^3 - 6x^2 + 11x - 6"})),
            ("expand_expression", json!({"expression": "(x - 2)(x + 3)"})),
            ("area_circle", json!({"radius": 2.5})),
            ("circumference_circle", json!({"radius": 2.5})),
            ("area_rectangle", json!({"length": 3, "width": 4.5})),
            ("area_triangle", json!({"base": 6, "height": 4})),
            ("area_trapezoid", json!({"a": 3, "b": 5, "height": 2})),
            ("volume_cube", json!({"side": 3})),
            ("volume_cuboid", json!({"length": 2, "width": 3, "height": 4})),
            ("volume_cylinder", json!({"radius": 1, "height": 2})),
            ("volume_sphere", json!({"radius": 3})),
            ("volume_cone", json!({"radius": 3, "height": 4})),
            ("pythagorean_theorem", json!({"a": 3, "b": 4})),
            ("sine", json!({"angle": 30})),
            ("cosine", json!({"angle": 60})),
            ("tangent", json!({"angle": 45})),
            ("arcsine", json!({"value": 0.5})),
            ("arccosine", json!({"value": 0.5})),
            ("arctangent", json!({"value": 1})),
            ("logarithm", json!({"number": 8, "base": 2})),
            ("natural_log", json!({"number": 10})),
            ("log_base_10", json!({"number": 1000})),
            ("exponential", json!({"exponent": 1.5})),
            ("mean", json!({"numbers": [1, 2, 3, 4]})),
            ("median", json!({"numbers": [5, 1, 3]})),
            ("mode", json!({"numbers": [1, 2, 2, 3]})),
            ("standard_deviation", json!({"numbers": [2, 4, 4, 4, 5, 5, 7, 9]})),
            ("variance", json!({"numbers": [2, 4, 4, 4, 5, 5, 7, 9]})),
            ("arithmetic_sequence_nth_term", json!({"first": 5, "difference": 3, "n": 10})),
            ("arithmetic_sequence_sum", json!({"first": 1, "difference": 1, "n": 100})),
            ("geometric_sequence_nth_term", json!({"first": 2, "ratio": 3, "n": 5})),
            ("geometric_sequence_sum", json!({"first": 1, "ratio": 0.5, "n": 10})),
            ("percentage", json!({"part": 25, "whole": 200})),
            ("percentage_of", json!({"percentage": 15, "number": 80})),
            ("simplify_ratio", json!({"a": 12, "b": 18})),
        ]
    }

    #[test]
    fn test_every_operation_is_pure() {
        let registry = registry();
        let samples = sample_arguments();

        let covered: HashSet<_> = samples.iter().map(|(name, _)| *name).collect();
        for descriptor in registry.list_operations() {
            assert!(covered.contains(descriptor.name), "no sample for {}", descriptor.name);
        }

        for (name, args) in samples {
            let first = registry.invoke(name, args.clone());
            assert!(first.is_ok(), "{name} {args}: {first:?}");
            for _ in 0..3 {
                assert_eq!(registry.invoke(name, args.clone()), first, "{name}");
            }
        }
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let registry = registry();
        let out = registry.invoke("square_root", json!({"number": "16"})).unwrap();
        assert!(out.contains("4.0"));

        let out = registry.invoke("mean", json!({"numbers": "10, 20, 30"})).unwrap();
        assert!(out.contains("20.0"));

        let out = registry
            .invoke("arithmetic_sequence_nth_term", json!({"first": 5, "difference": 3, "n": 10.0}))
            .unwrap();
        assert!(out.contains("32.0"));
    }

    #[test]
    fn test_non_numeric_string_is_invalid_argument() {
        let err = registry().invoke("square_root", json!({"number": "sixteen"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_execute_renders_success_and_error() {
        let registry = registry();
        let ok = registry.execute(&call("calculator", r#"{"a": 10, "b": 2, "operation": "divide"}"#));
        assert!(ok.contains("5.0"));
        assert!(!ok.starts_with(ERROR_PREFIX));

        let err = registry.execute(&call("calculator", r#"{"a": 10, "b": 0, "operation": "divide"}"#));
        assert!(err.starts_with(ERROR_PREFIX));
    }

    #[test]
    fn test_execute_bad_json_arguments() {
        let out = registry().execute(&call("power", "{not json"));
        assert!(out.starts_with("Error: Invalid arguments"));
    }

    #[test]
    fn test_execute_unknown_tool() {
        let out = registry().execute(&call("nonexistent", "{}"));
        assert_eq!(out, "Error: Unknown tool: nonexistent");
    }

    #[test]
    fn test_documented_failures_carry_error_marker() {
        let registry = registry();
        let failures = [
            ("calculator", json!({"a": 1, "b": 0, "operation": "divide"})),
            ("calculator", json!({"a": 1, "b": 2, "operation": "modulo"})),
            ("power", json!({"base": -8, "exponent": 0.5})),
            ("square_root", json!({"number": -4})),
            ("solve_linear_equation", json!({"equation": "2*x + = 13"})),
            ("solve_quadratic", json!({"a": 0, "b": 2, "c": 1})),
            ("factor_expression", json!({"expression": "x^"})),
            ("expand_expression", json!({"expression": "(x + 1) # 2"})),
            ("expand_expression", json!({"expression": "((x^64)^64)^64"})),
            ("pythagorean_theorem", json!({"a": 3})),
            ("arcsine", json!({"value": 2})),
            ("arccosine", json!({"value": -1.5})),
            ("logarithm", json!({"number": 8, "base": 1})),
            ("natural_log", json!({"number": 0})),
            ("log_base_10", json!({"number": -10})),
            ("mean", json!({"numbers": []})),
            ("mean", json!({"numbers": [1e308, 1e308]})),
            ("area_circle", json!({"radius": 1e200})),
            ("solve_quadratic", json!({"a": 1e200, "b": 1e200, "c": 1})),
            ("standard_deviation", json!({"numbers": [1]})),
            ("variance", json!({"numbers": [1]})),
            ("percentage", json!({"part": 5, "whole": 0})),
            ("simplify_ratio", json!({"a": 4, "b": 0})),
        ];
        for (name, args) in failures {
            let rendered = render_outcome(&registry.invoke(name, args.clone()));
            assert!(rendered.starts_with(ERROR_PREFIX), "{name} {args}: {rendered}");
        }
    }

    #[test]
    fn test_successes_never_carry_error_marker() {
        let registry = registry();
        for (name, args) in [
            ("calculator", json!({"a": 10, "b": 2, "operation": "divide"})),
            ("mode", json!({"numbers": [1, 2, 3]})),
            ("solve_quadratic", json!({"a": 1, "b": 0, "c": 1})),
            ("area_circle", json!({"radius": 5})),
        ] {
            let rendered = render_outcome(&registry.invoke(name, args));
            assert!(!rendered.starts_with(ERROR_PREFIX), "{name}: {rendered}");
        }
    }
}
