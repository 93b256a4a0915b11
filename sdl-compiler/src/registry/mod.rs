//! The symbol table over SDL definitions.
//!
//! A [`TypeDefinitionRegistry`] is filled with [`ast::Definition`]s, one at a time or a whole
//! document at once, and keeps every problem it notices on the way (redefinitions, executable
//! definitions) instead of refusing the input. Canonical definitions live in one namespace for
//! types and one for directives; extensions are kept separately, per kind, in the order they were
//! added.

use std::fmt;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::ast::OperationType;
use apollo_compiler::parser::SourceMap;
use apollo_compiler::parser::SourceSpan;
use indexmap::IndexMap;
use indexmap::IndexSet;

use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaCoordinate;

pub(crate) mod built_ins;
mod relations;

pub use built_ins::built_in_scalar;
pub use built_ins::is_built_in_directive;
pub use built_ins::is_built_in_scalar;

/// The kind of a named type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, strum_macros::Display)]
pub enum TypeKind {
    #[strum(to_string = "scalar")]
    Scalar,
    #[strum(to_string = "object")]
    Object,
    #[strum(to_string = "interface")]
    Interface,
    #[strum(to_string = "union")]
    Union,
    #[strum(to_string = "enum")]
    Enum,
    #[strum(to_string = "input object")]
    InputObject,
}

impl TypeKind {
    pub fn is_input(self) -> bool {
        matches!(self, Self::Scalar | Self::Enum | Self::InputObject)
    }

    pub fn is_output(self) -> bool {
        !matches!(self, Self::InputObject)
    }

    pub fn is_abstract(self) -> bool {
        matches!(self, Self::Interface | Self::Union)
    }
}

/// A canonical (non-extension) type definition.
#[derive(Clone, Debug)]
pub enum TypeDefinition {
    Scalar(Node<ast::ScalarTypeDefinition>),
    Object(Node<ast::ObjectTypeDefinition>),
    Interface(Node<ast::InterfaceTypeDefinition>),
    Union(Node<ast::UnionTypeDefinition>),
    Enum(Node<ast::EnumTypeDefinition>),
    InputObject(Node<ast::InputObjectTypeDefinition>),
}

impl TypeDefinition {
    pub fn name(&self) -> &Name {
        match self {
            Self::Scalar(def) => &def.name,
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::Union(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::InputObject(def) => &def.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Object(_) => TypeKind::Object,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
            Self::Enum(_) => TypeKind::Enum,
            Self::InputObject(_) => TypeKind::InputObject,
        }
    }

    pub fn location(&self) -> Option<SourceSpan> {
        match self {
            Self::Scalar(def) => def.location(),
            Self::Object(def) => def.location(),
            Self::Interface(def) => def.location(),
            Self::Union(def) => def.location(),
            Self::Enum(def) => def.location(),
            Self::InputObject(def) => def.location(),
        }
    }

    pub fn directives(&self) -> &ast::DirectiveList {
        match self {
            Self::Scalar(def) => &def.directives,
            Self::Object(def) => &def.directives,
            Self::Interface(def) => &def.directives,
            Self::Union(def) => &def.directives,
            Self::Enum(def) => &def.directives,
            Self::InputObject(def) => &def.directives,
        }
    }

    pub fn description(&self) -> Option<&Node<str>> {
        match self {
            Self::Scalar(def) => def.description.as_ref(),
            Self::Object(def) => def.description.as_ref(),
            Self::Interface(def) => def.description.as_ref(),
            Self::Union(def) => def.description.as_ref(),
            Self::Enum(def) => def.description.as_ref(),
            Self::InputObject(def) => def.description.as_ref(),
        }
    }
}

/// A type extension as seen by checks that only care about what it extends.
#[derive(Clone, Debug)]
pub struct ExtensionRef<'registry> {
    pub name: &'registry Name,
    pub kind: TypeKind,
    pub location: Option<SourceSpan>,
}

#[derive(Clone, Default)]
pub struct TypeDefinitionRegistry {
    types: IndexMap<Name, TypeDefinition>,
    scalar_extensions: IndexMap<Name, Vec<Node<ast::ScalarTypeExtension>>>,
    object_extensions: IndexMap<Name, Vec<Node<ast::ObjectTypeExtension>>>,
    interface_extensions: IndexMap<Name, Vec<Node<ast::InterfaceTypeExtension>>>,
    union_extensions: IndexMap<Name, Vec<Node<ast::UnionTypeExtension>>>,
    enum_extensions: IndexMap<Name, Vec<Node<ast::EnumTypeExtension>>>,
    input_object_extensions: IndexMap<Name, Vec<Node<ast::InputObjectTypeExtension>>>,
    directive_definitions: IndexMap<Name, Node<ast::DirectiveDefinition>>,
    schema_definition: Option<Node<ast::SchemaDefinition>>,
    schema_extensions: Vec<Node<ast::SchemaExtension>>,
    sources: Vec<SourceMap>,
    errors: Vec<Diagnostic>,
}

impl fmt::Debug for TypeDefinitionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinitionRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field(
                "directive_definitions",
                &self.directive_definitions.keys().collect::<Vec<_>>(),
            )
            .field("has_schema_definition", &self.schema_definition.is_some())
            .field("schema_extensions", &self.schema_extensions.len())
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

fn push_extension<T>(extensions: &mut IndexMap<Name, Vec<T>>, name: &Name, extension: T) {
    extensions.entry(name.clone()).or_default().push(extension);
}

fn merge_extensions<T>(target: &mut IndexMap<Name, Vec<T>>, source: IndexMap<Name, Vec<T>>) {
    for (name, extensions) in source {
        target.entry(name).or_default().extend(extensions);
    }
}

fn extensions_of<'a, T>(extensions: &'a IndexMap<Name, Vec<T>>, name: &str) -> &'a [T] {
    extensions.get(name).map(Vec::as_slice).unwrap_or_default()
}

impl TypeDefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every definition of a parsed document, remembering its sources so diagnostics can be
    /// rendered with line and column positions.
    pub fn add_document(&mut self, document: ast::Document) {
        self.sources.push(document.sources.clone());
        for definition in document.definitions {
            // Rejected definitions are recorded in `errors`.
            let _ = self.add(definition);
        }
    }

    /// Adds a single definition.
    ///
    /// Extensions are always accepted. A canonical definition whose name is already taken in its
    /// namespace is rejected: the first definition is kept, and the returned diagnostic is also
    /// recorded in [`Self::errors`].
    pub fn add(&mut self, definition: ast::Definition) -> Result<(), Diagnostic> {
        let result = match definition {
            ast::Definition::OperationDefinition(operation) => {
                let name = operation
                    .name
                    .as_ref()
                    .map(|name| format!(r#" "{name}""#))
                    .unwrap_or_default();
                Err(Diagnostic::new(
                    DiagnosticCode::NonSdlDefinition,
                    format!("The operation{name} is not a type system definition and cannot be part of a schema."),
                )
                .located(operation.location()))
            }
            ast::Definition::FragmentDefinition(fragment) => Err(Diagnostic::new(
                DiagnosticCode::NonSdlDefinition,
                format!(
                    r#"The fragment "{}" is not a type system definition and cannot be part of a schema."#,
                    fragment.name
                ),
            )
            .located(fragment.location())),
            ast::Definition::DirectiveDefinition(directive) => {
                self.add_directive_definition(directive)
            }
            ast::Definition::SchemaDefinition(schema) => self.add_schema_definition(schema),
            ast::Definition::ScalarTypeDefinition(def) => self.add_type(TypeDefinition::Scalar(def)),
            ast::Definition::ObjectTypeDefinition(def) => self.add_type(TypeDefinition::Object(def)),
            ast::Definition::InterfaceTypeDefinition(def) => {
                self.add_type(TypeDefinition::Interface(def))
            }
            ast::Definition::UnionTypeDefinition(def) => self.add_type(TypeDefinition::Union(def)),
            ast::Definition::EnumTypeDefinition(def) => self.add_type(TypeDefinition::Enum(def)),
            ast::Definition::InputObjectTypeDefinition(def) => {
                self.add_type(TypeDefinition::InputObject(def))
            }
            ast::Definition::SchemaExtension(extension) => {
                self.schema_extensions.push(extension);
                Ok(())
            }
            ast::Definition::ScalarTypeExtension(extension) => {
                let name = extension.name.clone();
                push_extension(&mut self.scalar_extensions, &name, extension);
                Ok(())
            }
            ast::Definition::ObjectTypeExtension(extension) => {
                let name = extension.name.clone();
                push_extension(&mut self.object_extensions, &name, extension);
                Ok(())
            }
            ast::Definition::InterfaceTypeExtension(extension) => {
                let name = extension.name.clone();
                push_extension(&mut self.interface_extensions, &name, extension);
                Ok(())
            }
            ast::Definition::UnionTypeExtension(extension) => {
                let name = extension.name.clone();
                push_extension(&mut self.union_extensions, &name, extension);
                Ok(())
            }
            ast::Definition::EnumTypeExtension(extension) => {
                let name = extension.name.clone();
                push_extension(&mut self.enum_extensions, &name, extension);
                Ok(())
            }
            ast::Definition::InputObjectTypeExtension(extension) => {
                let name = extension.name.clone();
                push_extension(&mut self.input_object_extensions, &name, extension);
                Ok(())
            }
        };
        if let Err(diagnostic) = &result {
            self.errors.push(diagnostic.clone());
        }
        result
    }

    fn add_type(&mut self, definition: TypeDefinition) -> Result<(), Diagnostic> {
        let name = definition.name().clone();
        if let Some(existing) = self.types.get(&name) {
            let message = format!(
                r#"The {} "{name}" is already defined, the later definition is ignored."#,
                definition.kind()
            );
            return Err(Diagnostic::new(DiagnosticCode::TypeRedefinition, message)
                .at(SchemaCoordinate::Type(name))
                .located(definition.location())
                .located(existing.location()));
        }
        self.types.insert(name, definition);
        Ok(())
    }

    fn add_directive_definition(
        &mut self,
        directive: Node<ast::DirectiveDefinition>,
    ) -> Result<(), Diagnostic> {
        if let Some(existing) = self.directive_definitions.get(&directive.name) {
            return Err(Diagnostic::new(
                DiagnosticCode::DirectiveRedefinition,
                format!(
                    r#"The directive "@{}" is already defined, the later definition is ignored."#,
                    directive.name
                ),
            )
            .at(SchemaCoordinate::Directive(directive.name.clone()))
            .located(directive.location())
            .located(existing.location()));
        }
        self.directive_definitions
            .insert(directive.name.clone(), directive);
        Ok(())
    }

    fn add_schema_definition(
        &mut self,
        schema: Node<ast::SchemaDefinition>,
    ) -> Result<(), Diagnostic> {
        if let Some(existing) = &self.schema_definition {
            return Err(Diagnostic::new(
                DiagnosticCode::SchemaRedefinition,
                "A schema definition already exists, the later definition is ignored.",
            )
            .at(SchemaCoordinate::Schema)
            .located(schema.location())
            .located(existing.location()));
        }
        self.schema_definition = Some(schema);
        Ok(())
    }

    /// Merges another registry into this one.
    ///
    /// Canonical definitions from `other` go through the same redefinition rules as [`Self::add`],
    /// so definitions already in `self` win. Extensions are concatenated, sources are unioned and
    /// the errors `other` accumulated are carried over.
    pub fn merge(&mut self, other: TypeDefinitionRegistry) {
        let TypeDefinitionRegistry {
            types,
            scalar_extensions,
            object_extensions,
            interface_extensions,
            union_extensions,
            enum_extensions,
            input_object_extensions,
            directive_definitions,
            schema_definition,
            schema_extensions,
            sources,
            errors,
        } = other;

        self.errors.extend(errors);
        self.sources.extend(sources);
        for definition in types.into_values() {
            if let Err(diagnostic) = self.add_type(definition) {
                self.errors.push(diagnostic);
            }
        }
        for directive in directive_definitions.into_values() {
            if let Err(diagnostic) = self.add_directive_definition(directive) {
                self.errors.push(diagnostic);
            }
        }
        if let Some(schema) = schema_definition {
            if let Err(diagnostic) = self.add_schema_definition(schema) {
                self.errors.push(diagnostic);
            }
        }
        self.schema_extensions.extend(schema_extensions);
        merge_extensions(&mut self.scalar_extensions, scalar_extensions);
        merge_extensions(&mut self.object_extensions, object_extensions);
        merge_extensions(&mut self.interface_extensions, interface_extensions);
        merge_extensions(&mut self.union_extensions, union_extensions);
        merge_extensions(&mut self.enum_extensions, enum_extensions);
        merge_extensions(&mut self.input_object_extensions, input_object_extensions);
    }

    /// Adds the directives defined by the GraphQL specification, unless a directive with the same
    /// name was already declared.
    pub fn add_builtin_directives(&mut self) {
        for directive in built_ins::built_in_directives() {
            if !self.directive_definitions.contains_key(&directive.name) {
                self.directive_definitions
                    .insert(directive.name.clone(), directive.clone());
            }
        }
    }

    /// Problems noticed while definitions were added or merged.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Source maps of every document added, used to render diagnostic locations.
    pub fn sources(&self) -> &[SourceMap] {
        &self.sources
    }

    /// Looks a type up by name, falling back to the built-in scalars.
    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name).or_else(|| built_in_scalar(name))
    }

    /// Looks a type up among the definitions that were added, ignoring built-in scalars that
    /// were not declared.
    pub fn declared_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.get_type(name).is_some()
    }

    pub fn type_kind(&self, name: &str) -> Option<TypeKind> {
        self.get_type(name).map(TypeDefinition::kind)
    }

    pub fn is_object_type(&self, name: &str) -> bool {
        self.type_kind(name) == Some(TypeKind::Object)
    }

    pub fn is_interface_or_union(&self, name: &str) -> bool {
        self.type_kind(name).is_some_and(TypeKind::is_abstract)
    }

    /// Canonical type definitions, in the order they were added. Built-in scalars are not
    /// included unless they were declared.
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &Name> {
        self.types.keys()
    }

    pub fn scalars(&self) -> impl Iterator<Item = &Node<ast::ScalarTypeDefinition>> {
        self.types.values().filter_map(|def| match def {
            TypeDefinition::Scalar(def) => Some(def),
            _ => None,
        })
    }

    pub fn objects(&self) -> impl Iterator<Item = &Node<ast::ObjectTypeDefinition>> {
        self.types.values().filter_map(|def| match def {
            TypeDefinition::Object(def) => Some(def),
            _ => None,
        })
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Node<ast::InterfaceTypeDefinition>> {
        self.types.values().filter_map(|def| match def {
            TypeDefinition::Interface(def) => Some(def),
            _ => None,
        })
    }

    pub fn unions(&self) -> impl Iterator<Item = &Node<ast::UnionTypeDefinition>> {
        self.types.values().filter_map(|def| match def {
            TypeDefinition::Union(def) => Some(def),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &Node<ast::EnumTypeDefinition>> {
        self.types.values().filter_map(|def| match def {
            TypeDefinition::Enum(def) => Some(def),
            _ => None,
        })
    }

    pub fn input_objects(&self) -> impl Iterator<Item = &Node<ast::InputObjectTypeDefinition>> {
        self.types.values().filter_map(|def| match def {
            TypeDefinition::InputObject(def) => Some(def),
            _ => None,
        })
    }

    pub fn scalar_extensions(&self, name: &str) -> &[Node<ast::ScalarTypeExtension>] {
        extensions_of(&self.scalar_extensions, name)
    }

    pub fn object_extensions(&self, name: &str) -> &[Node<ast::ObjectTypeExtension>] {
        extensions_of(&self.object_extensions, name)
    }

    pub fn interface_extensions(&self, name: &str) -> &[Node<ast::InterfaceTypeExtension>] {
        extensions_of(&self.interface_extensions, name)
    }

    pub fn union_extensions(&self, name: &str) -> &[Node<ast::UnionTypeExtension>] {
        extensions_of(&self.union_extensions, name)
    }

    pub fn enum_extensions(&self, name: &str) -> &[Node<ast::EnumTypeExtension>] {
        extensions_of(&self.enum_extensions, name)
    }

    pub fn input_object_extensions(&self, name: &str) -> &[Node<ast::InputObjectTypeExtension>] {
        extensions_of(&self.input_object_extensions, name)
    }

    /// Every type extension in the registry, grouped by kind.
    pub fn extensions(&self) -> Vec<ExtensionRef<'_>> {
        fn collect<'a, T>(
            out: &mut Vec<ExtensionRef<'a>>,
            extensions: &'a IndexMap<Name, Vec<Node<T>>>,
            kind: TypeKind,
        ) {
            for (name, nodes) in extensions {
                out.extend(nodes.iter().map(|node| ExtensionRef {
                    name,
                    kind,
                    location: node.location(),
                }));
            }
        }
        let mut out = Vec::new();
        collect(&mut out, &self.scalar_extensions, TypeKind::Scalar);
        collect(&mut out, &self.object_extensions, TypeKind::Object);
        collect(&mut out, &self.interface_extensions, TypeKind::Interface);
        collect(&mut out, &self.union_extensions, TypeKind::Union);
        collect(&mut out, &self.enum_extensions, TypeKind::Enum);
        collect(&mut out, &self.input_object_extensions, TypeKind::InputObject);
        out
    }

    pub fn directive_definition(&self, name: &str) -> Option<&Node<ast::DirectiveDefinition>> {
        self.directive_definitions.get(name)
    }

    pub fn directive_definitions(&self) -> impl Iterator<Item = &Node<ast::DirectiveDefinition>> {
        self.directive_definitions.values()
    }

    pub fn schema_definition(&self) -> Option<&Node<ast::SchemaDefinition>> {
        self.schema_definition.as_ref()
    }

    pub fn schema_extensions(&self) -> &[Node<ast::SchemaExtension>] {
        &self.schema_extensions
    }

    /// Root operation types declared by the schema definition and its extensions. The first
    /// declaration of each operation type wins.
    pub fn operation_types(&self) -> IndexMap<OperationType, &Name> {
        let mut operation_types = IndexMap::new();
        let declared = self
            .schema_definition
            .iter()
            .flat_map(|schema| schema.root_operations.iter())
            .chain(
                self.schema_extensions
                    .iter()
                    .flat_map(|extension| extension.root_operations.iter()),
            );
        for root_operation in declared {
            let (operation_type, type_name) = &**root_operation;
            operation_types.entry(*operation_type).or_insert(type_name);
        }
        operation_types
    }

    /// Directives applied to a type and all of its extensions, in declaration order.
    pub fn type_directives<'a>(
        &'a self,
        definition: &'a TypeDefinition,
    ) -> Vec<&'a Node<ast::Directive>> {
        let name = definition.name();
        let mut directives = definition.directives().iter().collect::<Vec<_>>();
        match definition {
            TypeDefinition::Scalar(_) => directives.extend(
                self.scalar_extensions(name)
                    .iter()
                    .flat_map(|ext| ext.directives.iter()),
            ),
            TypeDefinition::Object(_) => directives.extend(
                self.object_extensions(name)
                    .iter()
                    .flat_map(|ext| ext.directives.iter()),
            ),
            TypeDefinition::Interface(_) => directives.extend(
                self.interface_extensions(name)
                    .iter()
                    .flat_map(|ext| ext.directives.iter()),
            ),
            TypeDefinition::Union(_) => directives.extend(
                self.union_extensions(name)
                    .iter()
                    .flat_map(|ext| ext.directives.iter()),
            ),
            TypeDefinition::Enum(_) => directives.extend(
                self.enum_extensions(name)
                    .iter()
                    .flat_map(|ext| ext.directives.iter()),
            ),
            TypeDefinition::InputObject(_) => directives.extend(
                self.input_object_extensions(name)
                    .iter()
                    .flat_map(|ext| ext.directives.iter()),
            ),
        }
        directives
    }

    /// Fields of an object or interface type and its extensions, including repeated names.
    pub fn all_fields(&self, name: &str) -> Vec<&Node<ast::FieldDefinition>> {
        match self.get_type(name) {
            Some(TypeDefinition::Object(def)) => def
                .fields
                .iter()
                .chain(
                    self.object_extensions(name)
                        .iter()
                        .flat_map(|ext| ext.fields.iter()),
                )
                .collect(),
            Some(TypeDefinition::Interface(def)) => def
                .fields
                .iter()
                .chain(
                    self.interface_extensions(name)
                        .iter()
                        .flat_map(|ext| ext.fields.iter()),
                )
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Fields of an object or interface type and its extensions, one per name. When a name is
    /// repeated, the canonical definition wins over extensions, and earlier extensions win over
    /// later ones.
    pub fn fields(&self, name: &str) -> IndexMap<Name, &Node<ast::FieldDefinition>> {
        let mut fields = IndexMap::new();
        for field in self.all_fields(name) {
            fields.entry(field.name.clone()).or_insert(field);
        }
        fields
    }

    /// Interfaces named in the `implements` clauses of a type and its extensions, including
    /// repeated names.
    pub fn all_implemented_interfaces(&self, name: &str) -> Vec<&Name> {
        match self.get_type(name) {
            Some(TypeDefinition::Object(def)) => def
                .implements_interfaces
                .iter()
                .chain(
                    self.object_extensions(name)
                        .iter()
                        .flat_map(|ext| ext.implements_interfaces.iter()),
                )
                .collect(),
            Some(TypeDefinition::Interface(def)) => def
                .implements_interfaces
                .iter()
                .chain(
                    self.interface_extensions(name)
                        .iter()
                        .flat_map(|ext| ext.implements_interfaces.iter()),
                )
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn implemented_interfaces(&self, name: &str) -> IndexSet<Name> {
        self.all_implemented_interfaces(name)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Members of a union and its extensions, including repeated names.
    pub fn all_union_members(&self, name: &str) -> Vec<&Name> {
        match self.get_type(name) {
            Some(TypeDefinition::Union(def)) => def
                .members
                .iter()
                .chain(
                    self.union_extensions(name)
                        .iter()
                        .flat_map(|ext| ext.members.iter()),
                )
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Values of an enum and its extensions, including repeated names.
    pub fn all_enum_values(&self, name: &str) -> Vec<&Node<ast::EnumValueDefinition>> {
        match self.get_type(name) {
            Some(TypeDefinition::Enum(def)) => def
                .values
                .iter()
                .chain(
                    self.enum_extensions(name)
                        .iter()
                        .flat_map(|ext| ext.values.iter()),
                )
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Fields of an input object and its extensions, including repeated names.
    pub fn all_input_fields(&self, name: &str) -> Vec<&Node<ast::InputValueDefinition>> {
        match self.get_type(name) {
            Some(TypeDefinition::InputObject(def)) => def
                .fields
                .iter()
                .chain(
                    self.input_object_extensions(name)
                        .iter()
                        .flat_map(|ext| ext.fields.iter()),
                )
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Fields of an input object and its extensions, one per name, canonical first.
    pub fn input_fields(&self, name: &str) -> IndexMap<Name, &Node<ast::InputValueDefinition>> {
        let mut fields = IndexMap::new();
        for field in self.all_input_fields(name) {
            fields.entry(field.name.clone()).or_insert(field);
        }
        fields
    }
}
