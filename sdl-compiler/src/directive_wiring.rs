//! Directive wiring: host callbacks that rewrite elements of a built schema based on the
//! directives applied to them.
//!
//! The walk visits every element that was built from a source definition, children before their
//! parent type. For each element the callbacks run in this order: the wirings registered under
//! the name of each applied directive, in the order the directives are applied; then the wirings
//! registered for every element, in registration order; then the one the wiring factory hands
//! out, if any. Each callback receives the element as rewritten so far and returns either the
//! same `Arc` or a replacement.

use std::sync::Arc;

use apollo_compiler::Name;
use indexmap::IndexMap;

use crate::bail;
use crate::cancellation::CancellationToken;
use crate::error::SchemaBuildError;
use crate::registry::TypeDefinitionRegistry;
use crate::schema::AppliedDirective;
use crate::schema::EnumType;
use crate::schema::EnumValueDefinition;
use crate::schema::FieldDefinition;
use crate::schema::InputObjectType;
use crate::schema::InputValueDefinition;
use crate::schema::InterfaceType;
use crate::schema::ObjectType;
use crate::schema::ScalarType;
use crate::schema::Schema;
use crate::schema::SchemaType;
use crate::schema::UnionType;
use crate::wiring::CodeRegistryBuilder;
use crate::wiring::FieldCoordinate;
use crate::wiring::RuntimeWiring;

/// What a [`SchemaDirectiveWiring`] callback gets to look at and change.
pub struct DirectiveWiringEnvironment<'a, T> {
    /// The element, including the changes of the callbacks that ran before this one.
    pub element: Arc<T>,
    /// The directive this callback was registered for. `None` for wirings registered for every
    /// element and for the wiring factory's.
    pub directive: Option<&'a AppliedDirective>,
    /// Every directive applied to the element, as it was before any callback ran.
    pub directives: &'a [AppliedDirective],
    /// The type that declares the element, for fields, arguments, enum values and input fields.
    pub parent_type: Option<&'a Name>,
    /// The field that declares the element, for field arguments.
    pub field_name: Option<&'a Name>,
    /// Data fetchers and type resolvers the schema will be rebuilt with.
    pub code_registry: &'a mut CodeRegistryBuilder,
    pub registry: &'a TypeDefinitionRegistry,
}

impl<T> DirectiveWiringEnvironment<'_, T> {
    /// Looks up an applied directive by name.
    pub fn applied_directive(&self, name: &str) -> Option<&AppliedDirective> {
        self.directives
            .iter()
            .find(|directive| directive.name == name)
    }
}

impl DirectiveWiringEnvironment<'_, FieldDefinition> {
    /// `Parent.field`, the key of the field's data fetcher in the code registry.
    pub fn field_coordinate(&self) -> Option<FieldCoordinate> {
        self.parent_type
            .map(|parent| FieldCoordinate::new(parent.clone(), self.element.name.clone()))
    }
}

/// Rewrites schema elements. Every method returns the element unchanged by default.
pub trait SchemaDirectiveWiring: Send + Sync {
    fn on_scalar(&self, environment: DirectiveWiringEnvironment<'_, ScalarType>) -> Arc<ScalarType> {
        environment.element
    }

    fn on_object(&self, environment: DirectiveWiringEnvironment<'_, ObjectType>) -> Arc<ObjectType> {
        environment.element
    }

    fn on_interface(
        &self,
        environment: DirectiveWiringEnvironment<'_, InterfaceType>,
    ) -> Arc<InterfaceType> {
        environment.element
    }

    fn on_union(&self, environment: DirectiveWiringEnvironment<'_, UnionType>) -> Arc<UnionType> {
        environment.element
    }

    fn on_enum(&self, environment: DirectiveWiringEnvironment<'_, EnumType>) -> Arc<EnumType> {
        environment.element
    }

    fn on_input_object(
        &self,
        environment: DirectiveWiringEnvironment<'_, InputObjectType>,
    ) -> Arc<InputObjectType> {
        environment.element
    }

    fn on_field(
        &self,
        environment: DirectiveWiringEnvironment<'_, FieldDefinition>,
    ) -> Arc<FieldDefinition> {
        environment.element
    }

    fn on_argument(
        &self,
        environment: DirectiveWiringEnvironment<'_, InputValueDefinition>,
    ) -> Arc<InputValueDefinition> {
        environment.element
    }

    fn on_enum_value(
        &self,
        environment: DirectiveWiringEnvironment<'_, EnumValueDefinition>,
    ) -> Arc<EnumValueDefinition> {
        environment.element
    }

    fn on_input_field(
        &self,
        environment: DirectiveWiringEnvironment<'_, InputValueDefinition>,
    ) -> Arc<InputValueDefinition> {
        environment.element
    }
}

/// Which callback of [`SchemaDirectiveWiring`] an element is handed to.
trait WiredElement: Sized {
    const KIND: &'static str;

    fn element_name(&self) -> &Name;

    fn applied_directives(&self) -> &[AppliedDirective];

    fn has_definition(&self) -> bool;

    fn invoke(
        wiring: &dyn SchemaDirectiveWiring,
        environment: DirectiveWiringEnvironment<'_, Self>,
    ) -> Arc<Self>;
}

macro_rules! wired_element {
    ($ty:ty, $kind:literal, $callback:ident) => {
        impl WiredElement for $ty {
            const KIND: &'static str = $kind;

            fn element_name(&self) -> &Name {
                &self.name
            }

            fn applied_directives(&self) -> &[AppliedDirective] {
                &self.directives
            }

            fn has_definition(&self) -> bool {
                self.definition.is_some()
            }

            fn invoke(
                wiring: &dyn SchemaDirectiveWiring,
                environment: DirectiveWiringEnvironment<'_, Self>,
            ) -> Arc<Self> {
                wiring.$callback(environment)
            }
        }
    };
}

wired_element!(ScalarType, "scalar", on_scalar);
wired_element!(ObjectType, "object", on_object);
wired_element!(InterfaceType, "interface", on_interface);
wired_element!(UnionType, "union", on_union);
wired_element!(EnumType, "enum", on_enum);
wired_element!(InputObjectType, "input object", on_input_object);
wired_element!(FieldDefinition, "field", on_field);
wired_element!(EnumValueDefinition, "enum value", on_enum_value);
wired_element!(InputValueDefinition, "argument", on_argument);

struct DirectiveWiringVisitor<'a> {
    wiring: &'a RuntimeWiring,
    registry: &'a TypeDefinitionRegistry,
    code_registry: CodeRegistryBuilder,
    replacements: usize,
}

impl DirectiveWiringVisitor<'_> {
    fn wire<T: WiredElement>(
        &mut self,
        element: Arc<T>,
        parent_type: Option<&Name>,
        field_name: Option<&Name>,
    ) -> Arc<T> {
        self.wire_with(element, parent_type, field_name, T::KIND, T::invoke)
    }

    /// Runs the callback chain for one element.
    fn wire_with<T: WiredElement>(
        &mut self,
        element: Arc<T>,
        parent_type: Option<&Name>,
        field_name: Option<&Name>,
        kind: &'static str,
        invoke: impl Fn(&dyn SchemaDirectiveWiring, DirectiveWiringEnvironment<'_, T>) -> Arc<T>,
    ) -> Arc<T> {
        if !element.has_definition() {
            return element;
        }
        let directives = element.applied_directives().to_vec();
        let factory_wiring = self
            .wiring
            .factory()
            .and_then(|factory| factory.schema_directive_wiring(&directives));
        let chain = directives
            .iter()
            .filter_map(|directive| {
                self.wiring
                    .directive_wiring(&directive.name)
                    .map(|wiring| (Some(directive), wiring.clone()))
            })
            .chain(
                self.wiring
                    .global_directive_wirings()
                    .iter()
                    .map(|wiring| (None, wiring.clone())),
            )
            .chain(factory_wiring.map(|wiring| (None, wiring)))
            .collect::<Vec<_>>();

        let original = element.clone();
        let mut element = element;
        for (directive, wiring) in chain {
            element = invoke(
                wiring.as_ref(),
                DirectiveWiringEnvironment {
                    element,
                    directive,
                    directives: &directives,
                    parent_type,
                    field_name,
                    code_registry: &mut self.code_registry,
                    registry: self.registry,
                },
            );
        }

        if !Arc::ptr_eq(&original, &element) {
            self.replacements += 1;
            tracing::debug!(
                kind,
                name = %original.element_name(),
                parent_type = parent_type.map(|name| name.as_str()),
                "directive wiring replaced schema element"
            );
        }
        element
    }

    fn wire_arguments(
        &mut self,
        arguments: &IndexMap<Name, Arc<InputValueDefinition>>,
        parent_type: &Name,
        field_name: &Name,
    ) -> Option<IndexMap<Name, Arc<InputValueDefinition>>> {
        let mut changed = false;
        let wired = arguments
            .iter()
            .map(|(name, argument)| {
                let wired = self.wire_with(
                    argument.clone(),
                    Some(parent_type),
                    Some(field_name),
                    "argument",
                    |wiring, environment| wiring.on_argument(environment),
                );
                changed |= !Arc::ptr_eq(argument, &wired);
                (name.clone(), wired)
            })
            .collect();
        changed.then_some(wired)
    }

    fn wire_fields(
        &mut self,
        fields: &IndexMap<Name, Arc<FieldDefinition>>,
        parent_type: &Name,
    ) -> Option<IndexMap<Name, Arc<FieldDefinition>>> {
        let mut changed = false;
        let mut wired = IndexMap::with_capacity(fields.len());
        for (name, field) in fields {
            let mut rewritten = field.clone();
            if let Some(arguments) = self.wire_arguments(&field.arguments, parent_type, name) {
                rewritten = Arc::new(FieldDefinition {
                    arguments,
                    ..(**field).clone()
                });
            }
            let rewritten = self.wire(rewritten, Some(parent_type), None);
            changed |= !Arc::ptr_eq(field, &rewritten);
            wired.insert(name.clone(), rewritten);
        }
        changed.then_some(wired)
    }

    fn wire_type(&mut self, ty: &SchemaType) -> SchemaType {
        match ty {
            SchemaType::Scalar(scalar) => SchemaType::Scalar(self.wire(scalar.clone(), None, None)),
            SchemaType::Object(object) => {
                let mut element = object.clone();
                if let Some(fields) = self.wire_fields(&object.fields, &object.name) {
                    element = Arc::new(ObjectType {
                        fields,
                        ..(**object).clone()
                    });
                }
                SchemaType::Object(self.wire(element, None, None))
            }
            SchemaType::Interface(interface) => {
                let mut element = interface.clone();
                if let Some(fields) = self.wire_fields(&interface.fields, &interface.name) {
                    element = Arc::new(InterfaceType {
                        fields,
                        ..(**interface).clone()
                    });
                }
                SchemaType::Interface(self.wire(element, None, None))
            }
            SchemaType::Union(union_) => SchemaType::Union(self.wire(union_.clone(), None, None)),
            SchemaType::Enum(enum_) => {
                let mut changed = false;
                let values = enum_
                    .values
                    .iter()
                    .map(|(name, value)| {
                        let wired = self.wire(value.clone(), Some(&enum_.name), None);
                        changed |= !Arc::ptr_eq(value, &wired);
                        (name.clone(), wired)
                    })
                    .collect();
                let element = if changed {
                    Arc::new(EnumType {
                        values,
                        ..(**enum_).clone()
                    })
                } else {
                    enum_.clone()
                };
                SchemaType::Enum(self.wire(element, None, None))
            }
            SchemaType::InputObject(input_object) => {
                let mut changed = false;
                let fields = input_object
                    .fields
                    .iter()
                    .map(|(name, field)| {
                        let wired = self.wire_with(
                            field.clone(),
                            Some(&input_object.name),
                            None,
                            "input field",
                            |wiring, environment| wiring.on_input_field(environment),
                        );
                        changed |= !Arc::ptr_eq(field, &wired);
                        (name.clone(), wired)
                    })
                    .collect();
                let element = if changed {
                    Arc::new(InputObjectType {
                        fields,
                        ..(**input_object).clone()
                    })
                } else {
                    input_object.clone()
                };
                SchemaType::InputObject(self.wire(element, None, None))
            }
        }
    }
}

/// Runs the directive wirings over a built schema and returns the rewritten schema.
///
/// The code registry of the result is rebuilt from the one of `schema`, with whatever the
/// callbacks registered on top.
#[tracing::instrument(level = "trace", skip_all)]
pub(crate) fn apply_directive_wiring(
    schema: Schema,
    registry: &TypeDefinitionRegistry,
    wiring: &RuntimeWiring,
    token: &CancellationToken,
) -> Result<Schema, SchemaBuildError> {
    if !wiring.has_directive_wiring() {
        return Ok(schema);
    }
    let mut parts = schema.into_parts();
    let mut visitor = DirectiveWiringVisitor {
        wiring,
        registry,
        code_registry: parts.code_registry.to_builder(),
        replacements: 0,
    };
    for ty in parts.types.values_mut() {
        token.check()?;
        if ty.name().starts_with("__") || !ty.has_definition() {
            continue;
        }
        let wired = visitor.wire_type(ty);
        if wired.name() != ty.name() || wired.kind() != ty.kind() {
            bail!(
                "directive wiring replaced {} `{}` with {} `{}`",
                ty.kind(),
                ty.name(),
                wired.kind(),
                wired.name()
            );
        }
        *ty = wired;
    }
    tracing::debug!(
        replacements = visitor.replacements,
        "directive wiring complete"
    );
    parts.code_registry = visitor.code_registry.build();
    Schema::assemble(parts)
}
