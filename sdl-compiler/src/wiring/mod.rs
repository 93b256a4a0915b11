//! The host-provided behavior attached to a schema while it is built.
//!
//! Data fetchers and type resolvers never run while a schema is being built. They are stored on
//! the schema's [`CodeRegistry`] for an executor to use. Scalar [`Coercing::parse_literal`] does
//! run, to check and convert directive arguments and default values.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::ast;
use indexmap::IndexMap;
use serde_json::Value;

mod code_registry;
mod scalars;

pub use code_registry::CodeRegistry;
pub use code_registry::CodeRegistryBuilder;
pub use code_registry::FieldCoordinate;
pub use code_registry::PropertyDataFetcher;
pub use scalars::BooleanCoercing;
pub use scalars::FloatCoercing;
pub use scalars::IdCoercing;
pub use scalars::IntCoercing;
pub use scalars::PassThroughCoercing;
pub use scalars::StringCoercing;
pub(crate) use scalars::built_in_coercing;

use crate::directive_wiring::SchemaDirectiveWiring;
use crate::registry::TypeDefinition;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A value could not be converted by a scalar's [`Coercing`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CoercingError {
    #[error("cannot serialize value: {0}")]
    Serialize(String),
    #[error("cannot parse value: {0}")]
    ParseValue(String),
    #[error("cannot parse literal: {0}")]
    ParseLiteral(String),
}

/// Conversions for a scalar type between its internal value, variables and SDL literals.
pub trait Coercing: Send + Sync {
    /// Converts an internal value into its result form.
    fn serialize(&self, value: &Value) -> Result<Value, CoercingError>;

    /// Converts a variable value into its internal form.
    fn parse_value(&self, value: &Value) -> Result<Value, CoercingError>;

    /// Converts an SDL literal into its internal form.
    fn parse_literal(&self, literal: &ast::Value) -> Result<Value, CoercingError>;
}

/// What a [`DataFetcher`] gets to look at.
#[derive(Debug)]
pub struct DataFetchingEnvironment<'a> {
    pub parent_type: &'a Name,
    pub field_name: &'a Name,
    pub source: &'a Value,
    pub arguments: &'a IndexMap<Name, Value>,
}

/// Produces the value of one field.
pub trait DataFetcher: Send + Sync {
    fn fetch(&self, environment: &DataFetchingEnvironment<'_>) -> Result<Value, BoxError>;
}

/// What a [`TypeResolver`] gets to look at.
#[derive(Debug)]
pub struct TypeResolutionEnvironment<'a> {
    pub abstract_type: &'a Name,
    pub object: &'a Value,
}

/// Picks the concrete object type of a value whose static type is an interface or a union.
pub trait TypeResolver: Send + Sync {
    fn resolve_type(&self, environment: &TypeResolutionEnvironment<'_>) -> Option<Name>;
}

/// Maps enum value names to the internal values the executor should use.
pub trait EnumValuesProvider: Send + Sync {
    fn value(&self, name: &str) -> Option<Value>;
}

/// A fallback source of behavior, consulted for anything the explicit wiring does not provide.
///
/// Every hook returns `None` by default, meaning the factory has nothing for that element.
pub trait WiringFactory: Send + Sync {
    fn scalar(&self, _definition: &TypeDefinition) -> Option<Arc<dyn Coercing>> {
        None
    }

    fn type_resolver(&self, _definition: &TypeDefinition) -> Option<Arc<dyn TypeResolver>> {
        None
    }

    fn data_fetcher(
        &self,
        _parent_type: &Name,
        _field: &ast::FieldDefinition,
    ) -> Option<Arc<dyn DataFetcher>> {
        None
    }

    fn enum_values_provider(
        &self,
        _definition: &TypeDefinition,
    ) -> Option<Arc<dyn EnumValuesProvider>> {
        None
    }

    /// Consulted once per element visited by directive wiring, after the explicit wirings.
    fn schema_directive_wiring(
        &self,
        _directives: &[crate::schema::AppliedDirective],
    ) -> Option<Arc<dyn SchemaDirectiveWiring>> {
        None
    }

    /// The fetcher for fields that have no explicit or factory data fetcher.
    fn default_data_fetcher(&self) -> Option<Arc<dyn DataFetcher>> {
        None
    }
}

/// A scalar wired by the host: its name, description and conversions.
#[derive(Clone)]
pub struct ScalarWiring {
    pub name: Name,
    pub description: Option<String>,
    pub coercing: Arc<dyn Coercing>,
}

impl ScalarWiring {
    pub fn new(name: Name, coercing: impl Coercing + 'static) -> Self {
        Self {
            name,
            description: None,
            coercing: Arc::new(coercing),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for ScalarWiring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarWiring")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Behavior wired for one named type.
#[derive(Clone)]
pub struct TypeRuntimeWiring {
    pub(crate) type_name: Name,
    pub(crate) data_fetchers: IndexMap<Name, Arc<dyn DataFetcher>>,
    pub(crate) default_data_fetcher: Option<Arc<dyn DataFetcher>>,
    pub(crate) type_resolver: Option<Arc<dyn TypeResolver>>,
    pub(crate) enum_values: Option<Arc<dyn EnumValuesProvider>>,
}

impl TypeRuntimeWiring {
    pub fn new(type_name: Name) -> Self {
        Self {
            type_name,
            data_fetchers: IndexMap::new(),
            default_data_fetcher: None,
            type_resolver: None,
            enum_values: None,
        }
    }

    pub fn type_name(&self) -> &Name {
        &self.type_name
    }

    pub fn data_fetcher(mut self, field_name: Name, fetcher: impl DataFetcher + 'static) -> Self {
        self.data_fetchers.insert(field_name, Arc::new(fetcher));
        self
    }

    /// The fetcher used for fields of this type that have no fetcher of their own.
    pub fn default_data_fetcher(mut self, fetcher: impl DataFetcher + 'static) -> Self {
        self.default_data_fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn type_resolver(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.type_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn enum_values(mut self, provider: impl EnumValuesProvider + 'static) -> Self {
        self.enum_values = Some(Arc::new(provider));
        self
    }
}

impl fmt::Debug for TypeRuntimeWiring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRuntimeWiring")
            .field("type_name", &self.type_name)
            .field("data_fetchers", &self.data_fetchers.keys().collect::<Vec<_>>())
            .field("has_type_resolver", &self.type_resolver.is_some())
            .field("has_enum_values", &self.enum_values.is_some())
            .finish_non_exhaustive()
    }
}

/// Everything a host wires into a schema.
#[derive(Clone, Default)]
pub struct RuntimeWiring {
    pub(crate) scalars: IndexMap<Name, ScalarWiring>,
    pub(crate) types: IndexMap<Name, TypeRuntimeWiring>,
    pub(crate) directive_wirings: IndexMap<Name, Arc<dyn SchemaDirectiveWiring>>,
    pub(crate) global_directive_wirings: Vec<Arc<dyn SchemaDirectiveWiring>>,
    pub(crate) factory: Option<Arc<dyn WiringFactory>>,
    pub(crate) default_data_fetcher: Option<Arc<dyn DataFetcher>>,
    pub(crate) code_registry: Option<CodeRegistryBuilder>,
}

impl RuntimeWiring {
    pub fn builder() -> RuntimeWiringBuilder {
        RuntimeWiringBuilder::default()
    }

    /// The conversions for a scalar, from the host's scalars, then the built-in ones, then the
    /// wiring factory.
    pub(crate) fn coercing_for(&self, definition: &TypeDefinition) -> Option<Arc<dyn Coercing>> {
        let name = definition.name();
        self.scalars
            .get(name)
            .map(|scalar| scalar.coercing.clone())
            .or_else(|| built_in_coercing(name))
            .or_else(|| {
                self.factory
                    .as_ref()
                    .and_then(|factory| factory.scalar(definition))
            })
    }

    pub(crate) fn type_resolver_for(
        &self,
        definition: &TypeDefinition,
    ) -> Option<Arc<dyn TypeResolver>> {
        self.types
            .get(definition.name())
            .and_then(|wiring| wiring.type_resolver.clone())
            .or_else(|| {
                self.factory
                    .as_ref()
                    .and_then(|factory| factory.type_resolver(definition))
            })
    }

    pub(crate) fn enum_values_provider_for(
        &self,
        definition: &TypeDefinition,
    ) -> Option<Arc<dyn EnumValuesProvider>> {
        self.types
            .get(definition.name())
            .and_then(|wiring| wiring.enum_values.clone())
            .or_else(|| {
                self.factory
                    .as_ref()
                    .and_then(|factory| factory.enum_values_provider(definition))
            })
    }

    /// The fetcher for a field: its own wiring, then the factory, then the type's default.
    /// `None` means the code registry's default fetcher applies.
    pub(crate) fn data_fetcher_for(
        &self,
        parent_type: &Name,
        field: &ast::FieldDefinition,
    ) -> Option<Arc<dyn DataFetcher>> {
        let type_wiring = self.types.get(parent_type);
        type_wiring
            .and_then(|wiring| wiring.data_fetchers.get(&field.name).cloned())
            .or_else(|| {
                self.factory
                    .as_ref()
                    .and_then(|factory| factory.data_fetcher(parent_type, field))
            })
            .or_else(|| type_wiring.and_then(|wiring| wiring.default_data_fetcher.clone()))
    }

    pub(crate) fn scalar_description(&self, name: &str) -> Option<&str> {
        self.scalars
            .get(name)
            .and_then(|scalar| scalar.description.as_deref())
    }

    pub(crate) fn directive_wiring(&self, name: &str) -> Option<&Arc<dyn SchemaDirectiveWiring>> {
        self.directive_wirings.get(name)
    }

    pub(crate) fn global_directive_wirings(&self) -> &[Arc<dyn SchemaDirectiveWiring>] {
        &self.global_directive_wirings
    }

    pub(crate) fn factory(&self) -> Option<&Arc<dyn WiringFactory>> {
        self.factory.as_ref()
    }

    pub(crate) fn default_data_fetcher(&self) -> Option<Arc<dyn DataFetcher>> {
        self.default_data_fetcher.clone().or_else(|| {
            self.factory
                .as_ref()
                .and_then(|factory| factory.default_data_fetcher())
        })
    }

    /// The code registry a build starts from, if the host seeded one.
    pub(crate) fn code_registry_seed(&self) -> Option<&CodeRegistryBuilder> {
        self.code_registry.as_ref()
    }

    pub(crate) fn has_directive_wiring(&self) -> bool {
        !self.directive_wirings.is_empty()
            || !self.global_directive_wirings.is_empty()
            || self.factory.is_some()
    }
}

impl fmt::Debug for RuntimeWiring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeWiring")
            .field("scalars", &self.scalars.keys().collect::<Vec<_>>())
            .field("types", &self.types.values().collect::<Vec<_>>())
            .field(
                "directive_wirings",
                &self.directive_wirings.keys().collect::<Vec<_>>(),
            )
            .field(
                "global_directive_wirings",
                &self.global_directive_wirings.len(),
            )
            .field("has_factory", &self.factory.is_some())
            .field("has_code_registry", &self.code_registry.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct RuntimeWiringBuilder {
    wiring: RuntimeWiring,
}

impl RuntimeWiringBuilder {
    pub fn scalar(mut self, scalar: ScalarWiring) -> Self {
        self.wiring.scalars.insert(scalar.name.clone(), scalar);
        self
    }

    /// Adds the wiring of a type. Wiring the same type twice merges the two, the later one
    /// winning where both set something.
    pub fn type_wiring(mut self, wiring: TypeRuntimeWiring) -> Self {
        match self.wiring.types.get_mut(&wiring.type_name) {
            Some(existing) => {
                existing.data_fetchers.extend(wiring.data_fetchers);
                if wiring.default_data_fetcher.is_some() {
                    existing.default_data_fetcher = wiring.default_data_fetcher;
                }
                if wiring.type_resolver.is_some() {
                    existing.type_resolver = wiring.type_resolver;
                }
                if wiring.enum_values.is_some() {
                    existing.enum_values = wiring.enum_values;
                }
            }
            None => {
                self.wiring.types.insert(wiring.type_name.clone(), wiring);
            }
        }
        self
    }

    /// Wires a directive by name. It is invoked for every element the directive is applied to.
    pub fn directive(mut self, name: Name, wiring: impl SchemaDirectiveWiring + 'static) -> Self {
        self.wiring.directive_wirings.insert(name, Arc::new(wiring));
        self
    }

    /// Adds a directive wiring invoked for every element built from a definition, whatever its
    /// directives.
    pub fn directive_wiring(mut self, wiring: impl SchemaDirectiveWiring + 'static) -> Self {
        self.wiring.global_directive_wirings.push(Arc::new(wiring));
        self
    }

    pub fn wiring_factory(mut self, factory: impl WiringFactory + 'static) -> Self {
        self.wiring.factory = Some(Arc::new(factory));
        self
    }

    /// The fetcher for every field that has no other fetcher.
    pub fn default_data_fetcher(mut self, fetcher: impl DataFetcher + 'static) -> Self {
        self.wiring.default_data_fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Data fetchers and type resolvers to start from. Anything the wiring provides for the same
    /// field or type replaces them.
    pub fn code_registry(mut self, code_registry: CodeRegistryBuilder) -> Self {
        self.wiring.code_registry = Some(code_registry);
        self
    }

    pub fn build(self) -> RuntimeWiring {
        self.wiring
    }
}

/// Wiring used for schemas that are only inspected, never executed: every scalar passes values
/// through, abstract types resolve from a `__typename` property and fields read the property of
/// the same name.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockedWiringFactory;

struct TypenameResolver;

impl TypeResolver for TypenameResolver {
    fn resolve_type(&self, environment: &TypeResolutionEnvironment<'_>) -> Option<Name> {
        environment
            .object
            .get("__typename")
            .and_then(Value::as_str)
            .and_then(|name| Name::new(name).ok())
    }
}

impl WiringFactory for MockedWiringFactory {
    fn scalar(&self, _definition: &TypeDefinition) -> Option<Arc<dyn Coercing>> {
        Some(Arc::new(PassThroughCoercing))
    }

    fn type_resolver(&self, _definition: &TypeDefinition) -> Option<Arc<dyn TypeResolver>> {
        Some(Arc::new(TypenameResolver))
    }

    fn default_data_fetcher(&self) -> Option<Arc<dyn DataFetcher>> {
        Some(Arc::new(PropertyDataFetcher))
    }
}
