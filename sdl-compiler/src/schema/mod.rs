//! The executable schema graph produced by the [`SchemaGenerator`](crate::SchemaGenerator).

use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::name;
use apollo_compiler::parser::SourceMap;
use indexmap::IndexMap;
use indexmap::IndexSet;

use crate::bail;
use crate::error::Diagnostic;
use crate::error::SchemaBuildError;
use crate::wiring::CodeRegistry;

mod printer;
mod types;

pub use types::AppliedArgument;
pub use types::AppliedDirective;
pub use types::DirectiveDeclaration;
pub use types::EnumType;
pub use types::EnumValueDefinition;
pub use types::FieldDefinition;
pub use types::FieldType;
pub use types::InputObjectType;
pub use types::InputValueDefinition;
pub use types::InterfaceType;
pub use types::NamedTypeRef;
pub use types::ObjectType;
pub use types::ScalarType;
pub use types::SchemaType;
pub use types::UnionType;

/// Everything a [`Schema`] is made of, before its roots are checked.
#[derive(Debug, Default)]
pub(crate) struct SchemaParts {
    pub(crate) types: IndexMap<Name, SchemaType>,
    pub(crate) query_type: Option<Name>,
    pub(crate) mutation_type: Option<Name>,
    pub(crate) subscription_type: Option<Name>,
    pub(crate) additional_types: IndexSet<Name>,
    pub(crate) directives: IndexMap<Name, Arc<DirectiveDeclaration>>,
    pub(crate) code_registry: CodeRegistry,
    pub(crate) problems: Vec<Diagnostic>,
    pub(crate) definition: Option<Node<ast::SchemaDefinition>>,
    pub(crate) extensions: Vec<Node<ast::SchemaExtension>>,
    pub(crate) sources: Vec<SourceMap>,
}

/// A built schema. Immutable, and cheap to share across threads.
#[derive(Debug)]
pub struct Schema {
    types: IndexMap<Name, SchemaType>,
    query_type: Arc<ObjectType>,
    mutation_type: Option<Arc<ObjectType>>,
    subscription_type: Option<Arc<ObjectType>>,
    additional_types: IndexSet<Name>,
    directives: IndexMap<Name, Arc<DirectiveDeclaration>>,
    code_registry: CodeRegistry,
    problems: Vec<Diagnostic>,
    definition: Option<Node<ast::SchemaDefinition>>,
    extensions: Vec<Node<ast::SchemaExtension>>,
    sources: Vec<SourceMap>,
}

fn root_object(
    types: &IndexMap<Name, SchemaType>,
    name: Option<&Name>,
) -> Result<Option<Arc<ObjectType>>, SchemaBuildError> {
    let Some(name) = name else {
        return Ok(None);
    };
    match types.get(name) {
        Some(SchemaType::Object(object)) => Ok(Some(object.clone())),
        Some(other) => bail!("root type `{name}` is {} type", other.kind()),
        None => bail!("root type `{name}` was not built"),
    }
}

impl Schema {
    pub(crate) fn assemble(parts: SchemaParts) -> Result<Self, SchemaBuildError> {
        let Some(query_type) = root_object(&parts.types, parts.query_type.as_ref())? else {
            bail!("schema has no query root type")
        };
        let mutation_type = root_object(&parts.types, parts.mutation_type.as_ref())?;
        let subscription_type = root_object(&parts.types, parts.subscription_type.as_ref())?;
        Ok(Self {
            types: parts.types,
            query_type,
            mutation_type,
            subscription_type,
            additional_types: parts.additional_types,
            directives: parts.directives,
            code_registry: parts.code_registry,
            problems: parts.problems,
            definition: parts.definition,
            extensions: parts.extensions,
            sources: parts.sources,
        })
    }

    pub(crate) fn into_parts(self) -> SchemaParts {
        SchemaParts {
            query_type: Some(self.query_type.name.clone()),
            mutation_type: self.mutation_type.map(|object| object.name.clone()),
            subscription_type: self.subscription_type.map(|object| object.name.clone()),
            types: self.types,
            additional_types: self.additional_types,
            directives: self.directives,
            code_registry: self.code_registry,
            problems: self.problems,
            definition: self.definition,
            extensions: self.extensions,
            sources: self.sources,
        }
    }

    /// The smallest valid schema: an empty `Query` object type and nothing else.
    ///
    /// Returned instead of a schema that could not be built; `problems` says why.
    pub(crate) fn placeholder(problems: Vec<Diagnostic>, sources: Vec<SourceMap>) -> Self {
        let query_type = Arc::new(ObjectType {
            name: name!("Query"),
            description: None,
            interfaces: Vec::new(),
            fields: IndexMap::new(),
            directives: Vec::new(),
            definition: None,
            extensions: Vec::new(),
        });
        let mut types = IndexMap::new();
        types.insert(
            query_type.name.clone(),
            SchemaType::Object(query_type.clone()),
        );
        Self {
            types,
            query_type,
            mutation_type: None,
            subscription_type: None,
            additional_types: IndexSet::new(),
            directives: IndexMap::new(),
            code_registry: CodeRegistry::default(),
            problems,
            definition: None,
            extensions: Vec::new(),
            sources,
        }
    }

    pub fn query_type(&self) -> &Arc<ObjectType> {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&Arc<ObjectType>> {
        self.mutation_type.as_ref()
    }

    pub fn subscription_type(&self) -> Option<&Arc<ObjectType>> {
        self.subscription_type.as_ref()
    }

    /// Types that are not reachable from the root types, such as implementations of an interface
    /// that no field returns directly.
    pub fn additional_types(&self) -> &IndexSet<Name> {
        &self.additional_types
    }

    pub fn types(&self) -> impl Iterator<Item = &SchemaType> {
        self.types.values()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &Name> {
        self.types.keys()
    }

    pub fn get_type(&self, name: &str) -> Option<&SchemaType> {
        self.types.get(name)
    }

    pub fn get_object(&self, name: &str) -> Option<&Arc<ObjectType>> {
        match self.types.get(name)? {
            SchemaType::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn get_interface(&self, name: &str) -> Option<&Arc<InterfaceType>> {
        match self.types.get(name)? {
            SchemaType::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub fn get_union(&self, name: &str) -> Option<&Arc<UnionType>> {
        match self.types.get(name)? {
            SchemaType::Union(union_) => Some(union_),
            _ => None,
        }
    }

    pub fn get_enum(&self, name: &str) -> Option<&Arc<EnumType>> {
        match self.types.get(name)? {
            SchemaType::Enum(enum_) => Some(enum_),
            _ => None,
        }
    }

    pub fn get_scalar(&self, name: &str) -> Option<&Arc<ScalarType>> {
        match self.types.get(name)? {
            SchemaType::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn get_input_object(&self, name: &str) -> Option<&Arc<InputObjectType>> {
        match self.types.get(name)? {
            SchemaType::InputObject(input_object) => Some(input_object),
            _ => None,
        }
    }

    /// Follows a type reference to the type it points to.
    pub fn resolve(&self, reference: &NamedTypeRef) -> Option<&SchemaType> {
        match reference {
            NamedTypeRef::Resolved { index, .. } => {
                self.types.get_index(*index).map(|(_, ty)| ty)
            }
            NamedTypeRef::Deferred(name) => self.types.get(name),
        }
    }

    pub fn directive(&self, name: &str) -> Option<&Arc<DirectiveDeclaration>> {
        self.directives.get(name)
    }

    pub fn directives(&self) -> impl Iterator<Item = &Arc<DirectiveDeclaration>> {
        self.directives.values()
    }

    pub fn directive_names(&self) -> impl Iterator<Item = &Name> {
        self.directives.keys()
    }

    /// The object types a value of the given interface or union type can have.
    pub fn possible_types(&self, abstract_type: &str) -> Vec<&Arc<ObjectType>> {
        match self.types.get(abstract_type) {
            Some(SchemaType::Union(union_)) => union_
                .members
                .iter()
                .filter_map(|member| match self.resolve(member) {
                    Some(SchemaType::Object(object)) => Some(object),
                    _ => None,
                })
                .collect(),
            Some(SchemaType::Interface(_)) => self
                .types
                .values()
                .filter_map(|ty| match ty {
                    SchemaType::Object(object) => Some(object),
                    _ => None,
                })
                .filter(|object| self.implements(&object.interfaces, abstract_type))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_possible_type(&self, abstract_type: &str, object: &str) -> bool {
        self.possible_types(abstract_type)
            .iter()
            .any(|possible| possible.name.as_str() == object)
    }

    /// Whether the interface list reaches `interface`, directly or through the interfaces those
    /// interfaces implement.
    fn implements(&self, interfaces: &[NamedTypeRef], interface: &str) -> bool {
        let mut visited = IndexSet::new();
        let mut stack = interfaces.iter().collect::<Vec<_>>();
        while let Some(reference) = stack.pop() {
            if reference.name().as_str() == interface {
                return true;
            }
            if !visited.insert(reference.name()) {
                continue;
            }
            if let Some(SchemaType::Interface(next)) = self.resolve(reference) {
                stack.extend(next.interfaces.iter());
            }
        }
        false
    }

    /// Executable behavior: data fetchers and type resolvers.
    pub fn code_registry(&self) -> &CodeRegistry {
        &self.code_registry
    }

    /// Problems found while the schema was checked and built. A schema with problems may be
    /// incomplete, or a placeholder.
    pub fn problems(&self) -> &[Diagnostic] {
        &self.problems
    }

    /// Source maps of the documents the schema was built from.
    pub fn sources(&self) -> &[SourceMap] {
        &self.sources
    }

    pub fn schema_definition(&self) -> Option<&Node<ast::SchemaDefinition>> {
        self.definition.as_ref()
    }

    pub fn schema_extensions(&self) -> &[Node<ast::SchemaExtension>] {
        &self.extensions
    }
}
