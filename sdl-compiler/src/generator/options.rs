use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// Configuration for schema generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct SchemaGeneratorOptions {
    /// Fail with all validation problems instead of building a best-effort schema.
    /// Defaults to false.
    pub strict_mode: bool,

    /// Report interfaces and unions without a type resolver, and custom scalars without a
    /// coercing implementation. Defaults to true.
    pub enforce_wiring: bool,

    /// Keep the source definitions on built schema elements. Directive wiring only visits
    /// elements that have one. Defaults to true.
    pub capture_ast_definitions: bool,

    /// Also build types that are not reachable from the root types. Defaults to true.
    pub additional_types: bool,
}

impl Default for SchemaGeneratorOptions {
    fn default() -> Self {
        Self {
            strict_mode: false,
            enforce_wiring: true,
            capture_ast_definitions: true,
            additional_types: true,
        }
    }
}

impl SchemaGeneratorOptions {
    pub fn strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    pub fn enforce_wiring(mut self, enforce_wiring: bool) -> Self {
        self.enforce_wiring = enforce_wiring;
        self
    }

    pub fn capture_ast_definitions(mut self, capture_ast_definitions: bool) -> Self {
        self.capture_ast_definitions = capture_ast_definitions;
        self
    }

    pub fn additional_types(mut self, additional_types: bool) -> Self {
        self.additional_types = additional_types;
        self
    }
}
