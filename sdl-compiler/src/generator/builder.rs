//! The recursive, memoized construction of schema types.

use std::collections::HashMap;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::ast::OperationType;
use indexmap::IndexMap;
use indexmap::IndexSet;

use super::SchemaGeneratorOptions;
use super::values::ValueBuilder;
use super::values::literal_to_json;
use crate::bail;
use crate::cancellation::CancellationToken;
use crate::error::Diagnostic;
use crate::error::SchemaBuildError;
use crate::registry::TypeDefinition;
use crate::registry::TypeDefinitionRegistry;
use crate::registry::TypeKind;
use crate::registry::built_ins::DEFAULT_DEPRECATION_REASON;
use crate::registry::built_ins::DEPRECATED_DIRECTIVE_NAME;
use crate::registry::built_ins::DEPRECATED_REASON_ARGUMENT_NAME;
use crate::registry::built_ins::SPECIFIED_BY_DIRECTIVE_NAME;
use crate::registry::built_ins::SPECIFIED_BY_URL_ARGUMENT_NAME;
use crate::schema::AppliedArgument;
use crate::schema::AppliedDirective;
use crate::schema::DirectiveDeclaration;
use crate::schema::EnumType;
use crate::schema::EnumValueDefinition;
use crate::schema::FieldDefinition;
use crate::schema::FieldType;
use crate::schema::InputObjectType;
use crate::schema::InputValueDefinition;
use crate::schema::InterfaceType;
use crate::schema::NamedTypeRef;
use crate::schema::ObjectType;
use crate::schema::ScalarType;
use crate::schema::Schema;
use crate::schema::SchemaParts;
use crate::schema::SchemaType;
use crate::wiring::CodeRegistryBuilder;
use crate::wiring::FieldCoordinate;
use crate::wiring::PassThroughCoercing;
use crate::wiring::RuntimeWiring;

/// Where a type reference appears. Scalars and enums can be used in both positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    Input,
    Output,
}

pub(crate) struct BuildContext<'a> {
    registry: &'a TypeDefinitionRegistry,
    wiring: &'a RuntimeWiring,
    options: &'a SchemaGeneratorOptions,
    token: &'a CancellationToken,
    values: ValueBuilder<'a>,
    /// Types whose construction has started but not finished, innermost last.
    stack: Vec<Name>,
    types: IndexMap<Name, SchemaType>,
    output_types: HashMap<Name, usize>,
    input_types: HashMap<Name, usize>,
    code_registry: CodeRegistryBuilder,
    problems: Vec<Diagnostic>,
}

fn description(description: Option<&Node<str>>) -> Option<String> {
    description.map(|description| description.to_string())
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(
        registry: &'a TypeDefinitionRegistry,
        wiring: &'a RuntimeWiring,
        options: &'a SchemaGeneratorOptions,
        token: &'a CancellationToken,
        problems: Vec<Diagnostic>,
    ) -> Self {
        let mut code_registry = wiring.code_registry_seed().cloned().unwrap_or_default();
        if let Some(fetcher) = wiring.default_data_fetcher() {
            code_registry.default_data_fetcher(fetcher);
        }
        Self {
            registry,
            wiring,
            options,
            token,
            values: ValueBuilder { registry, wiring },
            stack: Vec::new(),
            types: IndexMap::new(),
            output_types: HashMap::new(),
            input_types: HashMap::new(),
            code_registry,
            problems,
        }
    }

    /// Builds the whole schema: roots first, then directives, then every type not reachable from
    /// the roots.
    #[tracing::instrument(level = "trace", skip_all)]
    pub(crate) fn build(mut self) -> Result<Schema, SchemaBuildError> {
        let registry = self.registry;
        let operation_types = registry.operation_types();
        let root = |operation_type: OperationType, default_name: &str| {
            operation_types
                .get(&operation_type)
                .map(|name| (*name).clone())
                .or_else(|| {
                    registry
                        .is_object_type(default_name)
                        .then(|| registry.get_type(default_name).map(|ty| ty.name().clone()))
                        .flatten()
                })
        };
        let query_type = root(OperationType::Query, "Query");
        let mutation_type = root(OperationType::Mutation, "Mutation");
        let subscription_type = root(OperationType::Subscription, "Subscription");

        let Some(query_name) = &query_type else {
            bail!("no query root type can be determined")
        };
        self.output_type_ref(query_name)?;
        for name in mutation_type.iter().chain(&subscription_type) {
            self.output_type_ref(name)?;
        }
        let reachable = self.types.len();

        let mut directives = IndexMap::new();
        for directive in registry.directive_definitions() {
            self.token.check()?;
            let declaration = self.build_directive_declaration(directive)?;
            directives.insert(directive.name.clone(), Arc::new(declaration));
        }

        let referenced = self.types.len();
        if self.options.additional_types {
            for definition in registry.types() {
                let name = definition.name();
                if self.types.contains_key(name) {
                    continue;
                }
                let position = if definition.kind().is_output() {
                    Position::Output
                } else {
                    Position::Input
                };
                self.type_ref(name, position)?;
            }
        }
        // Types built in the last pass are referenced by neither roots nor directives.
        let additional_types = self
            .types
            .keys()
            .skip(referenced)
            .cloned()
            .collect::<IndexSet<_>>();
        tracing::debug!(
            reachable,
            from_directives = referenced - reachable,
            unreferenced = self.types.len() - referenced,
            "built schema types"
        );

        resolve_deferred_references(&mut self.types, &mut directives)?;

        Schema::assemble(SchemaParts {
            types: self.types,
            query_type,
            mutation_type,
            subscription_type,
            additional_types,
            directives,
            code_registry: self.code_registry.build(),
            problems: self.problems,
            definition: registry.schema_definition().cloned(),
            extensions: registry.schema_extensions().to_vec(),
            sources: registry.sources().to_vec(),
        })
    }

    fn output_type_ref(&mut self, name: &Name) -> Result<NamedTypeRef, SchemaBuildError> {
        self.type_ref(name, Position::Output)
    }

    /// A reference to a named type, building the type first if needed.
    ///
    /// A type that is being built further up the stack is referenced as `Deferred`, once its kind
    /// is known to fit the position.
    fn type_ref(
        &mut self,
        name: &Name,
        position: Position,
    ) -> Result<NamedTypeRef, SchemaBuildError> {
        self.token.check()?;
        let cache = match position {
            Position::Input => &self.input_types,
            Position::Output => &self.output_types,
        };
        if let Some(&index) = cache.get(name) {
            return Ok(NamedTypeRef::Resolved {
                name: name.clone(),
                index,
            });
        }
        let registry = self.registry;
        let Some(definition) = registry.get_type(name) else {
            bail!("type `{name}` is not defined")
        };
        let kind = definition.kind();
        let allowed = match position {
            Position::Input => kind.is_input(),
            Position::Output => kind.is_output(),
        };
        if !allowed {
            bail!(
                "{kind} `{name}` cannot be used as {} type",
                match position {
                    Position::Input => "an input",
                    Position::Output => "an output",
                }
            )
        }
        if self.stack.contains(name) {
            return Ok(NamedTypeRef::Deferred(name.clone()));
        }

        self.stack.push(name.clone());
        tracing::trace!(type_name = %name, %kind, "building type");
        let built = match definition {
            TypeDefinition::Scalar(def) => {
                SchemaType::Scalar(Arc::new(self.build_scalar(definition, def)))
            }
            TypeDefinition::Object(def) => SchemaType::Object(Arc::new(self.build_object(def)?)),
            TypeDefinition::Interface(def) => {
                SchemaType::Interface(Arc::new(self.build_interface(definition, def)?))
            }
            TypeDefinition::Union(def) => {
                SchemaType::Union(Arc::new(self.build_union(definition, def)?))
            }
            TypeDefinition::Enum(def) => {
                SchemaType::Enum(Arc::new(self.build_enum(definition, def)))
            }
            TypeDefinition::InputObject(def) => {
                SchemaType::InputObject(Arc::new(self.build_input_object(def)?))
            }
        };
        self.stack.pop();

        let (index, _) = self.types.insert_full(name.clone(), built);
        if kind.is_input() {
            self.input_types.insert(name.clone(), index);
        }
        if kind.is_output() {
            self.output_types.insert(name.clone(), index);
        }
        Ok(NamedTypeRef::Resolved {
            name: name.clone(),
            index,
        })
    }

    fn field_type(
        &mut self,
        ty: &ast::Type,
        position: Position,
    ) -> Result<FieldType, SchemaBuildError> {
        Ok(match ty {
            ast::Type::Named(name) => FieldType::Named(self.type_ref(name, position)?),
            ast::Type::NonNullNamed(name) => {
                FieldType::NonNull(Box::new(FieldType::Named(self.type_ref(name, position)?)))
            }
            ast::Type::List(inner) => FieldType::List(Box::new(self.field_type(inner, position)?)),
            ast::Type::NonNullList(inner) => FieldType::NonNull(Box::new(FieldType::List(
                Box::new(self.field_type(inner, position)?),
            ))),
        })
    }

    fn capture<T: Clone>(&self, definition: &T) -> Option<T> {
        self.options
            .capture_ast_definitions
            .then(|| definition.clone())
    }

    fn capture_all<T: Clone>(&self, extensions: &[T]) -> Vec<T> {
        if self.options.capture_ast_definitions {
            extensions.to_vec()
        } else {
            Vec::new()
        }
    }

    fn applied_directives<'d>(
        &self,
        directives: impl IntoIterator<Item = &'d Node<ast::Directive>>,
    ) -> Vec<AppliedDirective> {
        directives
            .into_iter()
            .map(|directive| self.applied_directive(directive))
            .collect()
    }

    /// Converts a directive application. Arguments the application leaves out but the
    /// declaration gives a default for are filled in.
    fn applied_directive(&self, directive: &Node<ast::Directive>) -> AppliedDirective {
        let declaration = self.registry.directive_definition(&directive.name);
        let mut arguments = IndexMap::new();
        for argument in &directive.arguments {
            if arguments.contains_key(&argument.name) {
                continue;
            }
            let declared = declaration.and_then(|declaration| {
                declaration
                    .arguments
                    .iter()
                    .find(|declared| declared.name == argument.name)
            });
            let value = match declared {
                Some(declared) => self.values.build(&argument.value, &declared.ty),
                None => literal_to_json(&argument.value).unwrap_or_default(),
            };
            arguments.insert(
                argument.name.clone(),
                AppliedArgument {
                    value,
                    literal: Some(argument.value.clone()),
                },
            );
        }
        for declared in declaration
            .into_iter()
            .flat_map(|declaration| declaration.arguments.iter())
        {
            if arguments.contains_key(&declared.name) {
                continue;
            }
            if let Some(default_value) = &declared.default_value {
                arguments.insert(
                    declared.name.clone(),
                    AppliedArgument {
                        value: self.values.build(default_value, &declared.ty),
                        literal: None,
                    },
                );
            }
        }
        AppliedDirective {
            name: directive.name.clone(),
            arguments,
        }
    }

    fn deprecation_reason(directives: &[AppliedDirective]) -> Option<String> {
        let deprecated = directives
            .iter()
            .find(|directive| directive.name == DEPRECATED_DIRECTIVE_NAME)?;
        Some(
            deprecated
                .argument(DEPRECATED_REASON_ARGUMENT_NAME)
                .and_then(|reason| reason.as_str())
                .unwrap_or(DEFAULT_DEPRECATION_REASON)
                .to_owned(),
        )
    }

    fn build_scalar(
        &mut self,
        definition: &TypeDefinition,
        def: &Node<ast::ScalarTypeDefinition>,
    ) -> ScalarType {
        let declared = self.registry.declared_type(&def.name).is_some();
        let directives = self.applied_directives(self.registry.type_directives(definition));
        let specified_by_url = directives
            .iter()
            .find(|directive| directive.name == SPECIFIED_BY_DIRECTIVE_NAME)
            .and_then(|directive| directive.argument(SPECIFIED_BY_URL_ARGUMENT_NAME))
            .and_then(|url| url.as_str())
            .map(str::to_owned);
        let coercing = self
            .wiring
            .coercing_for(definition)
            .unwrap_or_else(|| Arc::new(PassThroughCoercing));
        ScalarType {
            name: def.name.clone(),
            description: description(def.description.as_ref()).or_else(|| {
                self.wiring
                    .scalar_description(&def.name)
                    .map(str::to_owned)
            }),
            specified_by_url,
            coercing,
            directives,
            definition: if declared { self.capture(def) } else { None },
            extensions: self.capture_all(self.registry.scalar_extensions(&def.name)),
        }
    }

    fn build_object(
        &mut self,
        def: &Node<ast::ObjectTypeDefinition>,
    ) -> Result<ObjectType, SchemaBuildError> {
        let definition = TypeDefinition::Object(def.clone());
        let interfaces = self.interface_refs(&def.name)?;
        let fields = self.build_fields(&def.name, true)?;
        Ok(ObjectType {
            name: def.name.clone(),
            description: description(def.description.as_ref()),
            interfaces,
            fields,
            directives: self.applied_directives(self.registry.type_directives(&definition)),
            definition: self.capture(def),
            extensions: self.capture_all(self.registry.object_extensions(&def.name)),
        })
    }

    fn build_interface(
        &mut self,
        definition: &TypeDefinition,
        def: &Node<ast::InterfaceTypeDefinition>,
    ) -> Result<InterfaceType, SchemaBuildError> {
        let interfaces = self.interface_refs(&def.name)?;
        let fields = self.build_fields(&def.name, false)?;
        if let Some(resolver) = self.wiring.type_resolver_for(definition) {
            self.code_registry.type_resolver(def.name.clone(), resolver);
        }
        Ok(InterfaceType {
            name: def.name.clone(),
            description: description(def.description.as_ref()),
            interfaces,
            fields,
            directives: self.applied_directives(self.registry.type_directives(definition)),
            definition: self.capture(def),
            extensions: self.capture_all(self.registry.interface_extensions(&def.name)),
        })
    }

    /// References to the interfaces a type implements. Names that are not interfaces are
    /// reported by validation and left out.
    fn interface_refs(&mut self, type_name: &Name) -> Result<Vec<NamedTypeRef>, SchemaBuildError> {
        let registry = self.registry;
        registry
            .implemented_interfaces(type_name)
            .iter()
            .filter(|interface| registry.type_kind(interface) == Some(TypeKind::Interface))
            .map(|interface| self.output_type_ref(interface))
            .collect()
    }

    /// Fields of a type and its extensions. On objects, each field also gets its data fetcher
    /// registered.
    fn build_fields(
        &mut self,
        type_name: &Name,
        register_fetchers: bool,
    ) -> Result<IndexMap<Name, Arc<FieldDefinition>>, SchemaBuildError> {
        let registry = self.registry;
        let mut fields = IndexMap::new();
        for (name, field) in registry.fields(type_name) {
            let built = self.build_field(field)?;
            let fetcher = register_fetchers
                .then(|| self.wiring.data_fetcher_for(type_name, field))
                .flatten();
            if let Some(fetcher) = fetcher {
                self.code_registry
                    .data_fetcher(FieldCoordinate::new(type_name.clone(), name.clone()), fetcher);
            }
            fields.insert(name, Arc::new(built));
        }
        Ok(fields)
    }

    fn build_field(
        &mut self,
        field: &Node<ast::FieldDefinition>,
    ) -> Result<FieldDefinition, SchemaBuildError> {
        let ty = self.field_type(&field.ty, Position::Output)?;
        let arguments = self.build_input_values(&field.arguments)?;
        let directives = self.applied_directives(field.directives.iter());
        Ok(FieldDefinition {
            name: field.name.clone(),
            description: description(field.description.as_ref()),
            ty,
            arguments,
            deprecation_reason: Self::deprecation_reason(&directives),
            directives,
            definition: self.capture(field),
        })
    }

    /// Arguments or input fields, one per name. The first definition of a name wins.
    fn build_input_values<'d>(
        &mut self,
        values: impl IntoIterator<Item = &'d Node<ast::InputValueDefinition>>,
    ) -> Result<IndexMap<Name, Arc<InputValueDefinition>>, SchemaBuildError> {
        let mut built = IndexMap::new();
        for value in values {
            if built.contains_key(&value.name) {
                continue;
            }
            let input_value = self.build_input_value(value)?;
            built.insert(value.name.clone(), Arc::new(input_value));
        }
        Ok(built)
    }

    fn build_input_value(
        &mut self,
        value: &Node<ast::InputValueDefinition>,
    ) -> Result<InputValueDefinition, SchemaBuildError> {
        let ty = self.field_type(&value.ty, Position::Input)?;
        let directives = self.applied_directives(value.directives.iter());
        Ok(InputValueDefinition {
            name: value.name.clone(),
            description: description(value.description.as_ref()),
            ty,
            default_value: value
                .default_value
                .as_ref()
                .map(|default_value| self.values.build(default_value, &value.ty)),
            default_literal: value.default_value.clone(),
            deprecation_reason: Self::deprecation_reason(&directives),
            directives,
            definition: self.capture(value),
        })
    }

    fn build_union(
        &mut self,
        definition: &TypeDefinition,
        def: &Node<ast::UnionTypeDefinition>,
    ) -> Result<crate::schema::UnionType, SchemaBuildError> {
        let registry = self.registry;
        let mut members = Vec::new();
        let mut seen = IndexSet::new();
        for member in registry.all_union_members(&def.name) {
            if !registry.is_object_type(member) || !seen.insert(member) {
                continue;
            }
            members.push(self.output_type_ref(member)?);
        }
        if let Some(resolver) = self.wiring.type_resolver_for(definition) {
            self.code_registry.type_resolver(def.name.clone(), resolver);
        }
        Ok(crate::schema::UnionType {
            name: def.name.clone(),
            description: description(def.description.as_ref()),
            members,
            directives: self.applied_directives(registry.type_directives(definition)),
            definition: self.capture(def),
            extensions: self.capture_all(registry.union_extensions(&def.name)),
        })
    }

    fn build_enum(
        &mut self,
        definition: &TypeDefinition,
        def: &Node<ast::EnumTypeDefinition>,
    ) -> EnumType {
        let provider = self.wiring.enum_values_provider_for(definition);
        let mut values = IndexMap::new();
        for value in self.registry.all_enum_values(&def.name) {
            if values.contains_key(&value.value) {
                continue;
            }
            let directives = self.applied_directives(value.directives.iter());
            let runtime_value = provider
                .as_ref()
                .and_then(|provider| provider.value(&value.value))
                .unwrap_or_else(|| serde_json::Value::String(value.value.to_string()));
            values.insert(
                value.value.clone(),
                Arc::new(EnumValueDefinition {
                    name: value.value.clone(),
                    description: description(value.description.as_ref()),
                    value: runtime_value,
                    deprecation_reason: Self::deprecation_reason(&directives),
                    directives,
                    definition: self.capture(value),
                }),
            );
        }
        EnumType {
            name: def.name.clone(),
            description: description(def.description.as_ref()),
            values,
            directives: self.applied_directives(self.registry.type_directives(definition)),
            definition: self.capture(def),
            extensions: self.capture_all(self.registry.enum_extensions(&def.name)),
        }
    }

    fn build_input_object(
        &mut self,
        def: &Node<ast::InputObjectTypeDefinition>,
    ) -> Result<InputObjectType, SchemaBuildError> {
        let registry = self.registry;
        let definition = TypeDefinition::InputObject(def.clone());
        let fields = self.build_input_values(registry.all_input_fields(&def.name))?;
        Ok(InputObjectType {
            name: def.name.clone(),
            description: description(def.description.as_ref()),
            fields,
            directives: self.applied_directives(registry.type_directives(&definition)),
            definition: self.capture(def),
            extensions: self.capture_all(registry.input_object_extensions(&def.name)),
        })
    }

    fn build_directive_declaration(
        &mut self,
        directive: &Node<ast::DirectiveDefinition>,
    ) -> Result<DirectiveDeclaration, SchemaBuildError> {
        Ok(DirectiveDeclaration {
            name: directive.name.clone(),
            description: description(directive.description.as_ref()),
            arguments: self.build_input_values(&directive.arguments)?,
            repeatable: directive.repeatable,
            locations: directive.locations.clone(),
            definition: self.capture(directive),
        })
    }
}

fn resolve_reference(
    reference: &mut NamedTypeRef,
    indices: &HashMap<Name, usize>,
) -> Result<(), SchemaBuildError> {
    let name = reference.name().clone();
    let Some(&index) = indices.get(&name) else {
        bail!("type reference `{name}` points to a type that was never built")
    };
    *reference = NamedTypeRef::Resolved { name, index };
    Ok(())
}

fn resolve_input_values(
    values: &mut IndexMap<Name, Arc<InputValueDefinition>>,
    indices: &HashMap<Name, usize>,
) -> Result<(), SchemaBuildError> {
    for value in values.values_mut() {
        if !value.ty.inner_named_type().is_resolved() {
            resolve_reference(Arc::make_mut(value).ty.inner_named_type_mut(), indices)?;
        }
    }
    Ok(())
}

fn resolve_fields(
    fields: &mut IndexMap<Name, Arc<FieldDefinition>>,
    indices: &HashMap<Name, usize>,
) -> Result<(), SchemaBuildError> {
    for field in fields.values_mut() {
        let has_deferred = !field.ty.inner_named_type().is_resolved()
            || field
                .arguments
                .values()
                .any(|argument| !argument.ty.inner_named_type().is_resolved());
        if has_deferred {
            let field = Arc::make_mut(field);
            if !field.ty.inner_named_type().is_resolved() {
                resolve_reference(field.ty.inner_named_type_mut(), indices)?;
            }
            resolve_input_values(&mut field.arguments, indices)?;
        }
    }
    Ok(())
}

fn resolve_references(
    references: &mut [NamedTypeRef],
    indices: &HashMap<Name, usize>,
) -> Result<(), SchemaBuildError> {
    for reference in references {
        if !reference.is_resolved() {
            resolve_reference(reference, indices)?;
        }
    }
    Ok(())
}

/// Replaces every `Deferred` reference with the arena slot of the type it names.
fn resolve_deferred_references(
    types: &mut IndexMap<Name, SchemaType>,
    directives: &mut IndexMap<Name, Arc<DirectiveDeclaration>>,
) -> Result<(), SchemaBuildError> {
    let indices = types
        .keys()
        .enumerate()
        .map(|(index, name)| (name.clone(), index))
        .collect::<HashMap<_, _>>();
    for ty in types.values_mut() {
        match ty {
            SchemaType::Scalar(_) | SchemaType::Enum(_) => {}
            SchemaType::Object(object) => {
                let object = Arc::make_mut(object);
                resolve_references(&mut object.interfaces, &indices)?;
                resolve_fields(&mut object.fields, &indices)?;
            }
            SchemaType::Interface(interface) => {
                let interface = Arc::make_mut(interface);
                resolve_references(&mut interface.interfaces, &indices)?;
                resolve_fields(&mut interface.fields, &indices)?;
            }
            SchemaType::Union(union_) => {
                resolve_references(&mut Arc::make_mut(union_).members, &indices)?;
            }
            SchemaType::InputObject(input_object) => {
                resolve_input_values(&mut Arc::make_mut(input_object).fields, &indices)?;
            }
        }
    }
    for directive in directives.values_mut() {
        resolve_input_values(&mut Arc::make_mut(directive).arguments, &indices)?;
    }
    Ok(())
}
