//! Elements of a built schema.
//!
//! Every element is immutable once built and shared through `Arc`, so a directive wiring that
//! wants to change one returns a new `Arc` rather than mutating it in place.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use indexmap::IndexMap;
use serde_json::Value;

use crate::registry::TypeKind;
use crate::wiring::Coercing;

/// A reference from a field, argument or member to a named type of the arena.
///
/// References to a type that was still being built when the reference was made start out
/// `Deferred` and are resolved once every type is built. A finished schema only holds
/// `Resolved` references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamedTypeRef {
    Resolved { name: Name, index: usize },
    Deferred(Name),
}

impl NamedTypeRef {
    pub fn name(&self) -> &Name {
        match self {
            Self::Resolved { name, .. } | Self::Deferred(name) => name,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// The type of a field, argument or input field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Named(NamedTypeRef),
    List(Box<FieldType>),
    NonNull(Box<FieldType>),
}

impl FieldType {
    /// The named type under all list and non-null wrappers.
    pub fn inner_named_type(&self) -> &NamedTypeRef {
        match self {
            Self::Named(named) => named,
            Self::List(inner) | Self::NonNull(inner) => inner.inner_named_type(),
        }
    }

    pub(crate) fn inner_named_type_mut(&mut self) -> &mut NamedTypeRef {
        match self {
            Self::Named(named) => named,
            Self::List(inner) | Self::NonNull(inner) => inner.inner_named_type_mut(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::NonNull(inner) => inner.is_list(),
            Self::Named(_) => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => write!(f, "{}", named.name()),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// One argument of a directive application, as a runtime value and as written.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedArgument {
    pub value: Value,
    pub literal: Option<Node<ast::Value>>,
}

/// A directive applied to a schema element.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedDirective {
    pub name: Name,
    pub arguments: IndexMap<Name, AppliedArgument>,
}

impl AppliedDirective {
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name).map(|argument| &argument.value)
    }
}

/// A directive declared by the schema.
#[derive(Clone, Debug)]
pub struct DirectiveDeclaration {
    pub name: Name,
    pub description: Option<String>,
    pub arguments: IndexMap<Name, Arc<InputValueDefinition>>,
    pub repeatable: bool,
    pub locations: Vec<ast::DirectiveLocation>,
    pub definition: Option<Node<ast::DirectiveDefinition>>,
}

/// An argument, an input field, or a directive argument.
#[derive(Clone, Debug)]
pub struct InputValueDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub ty: FieldType,
    pub default_value: Option<Value>,
    /// The default value as written in the SDL.
    pub default_literal: Option<Node<ast::Value>>,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<AppliedDirective>,
    pub definition: Option<Node<ast::InputValueDefinition>>,
}

#[derive(Clone, Debug)]
pub struct FieldDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub ty: FieldType,
    pub arguments: IndexMap<Name, Arc<InputValueDefinition>>,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<AppliedDirective>,
    pub definition: Option<Node<ast::FieldDefinition>>,
}

impl FieldDefinition {
    pub fn argument(&self, name: &str) -> Option<&Arc<InputValueDefinition>> {
        self.arguments.get(name)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct EnumValueDefinition {
    pub name: Name,
    pub description: Option<String>,
    /// The internal value, from the enum's values provider, or the value name itself.
    pub value: Value,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<AppliedDirective>,
    pub definition: Option<Node<ast::EnumValueDefinition>>,
}

#[derive(Clone)]
pub struct ScalarType {
    pub name: Name,
    pub description: Option<String>,
    pub specified_by_url: Option<String>,
    pub coercing: Arc<dyn Coercing>,
    pub directives: Vec<AppliedDirective>,
    pub definition: Option<Node<ast::ScalarTypeDefinition>>,
    pub extensions: Vec<Node<ast::ScalarTypeExtension>>,
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("specified_by_url", &self.specified_by_url)
            .field("directives", &self.directives)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct ObjectType {
    pub name: Name,
    pub description: Option<String>,
    pub interfaces: Vec<NamedTypeRef>,
    pub fields: IndexMap<Name, Arc<FieldDefinition>>,
    pub directives: Vec<AppliedDirective>,
    pub definition: Option<Node<ast::ObjectTypeDefinition>>,
    pub extensions: Vec<Node<ast::ObjectTypeExtension>>,
}

impl ObjectType {
    pub fn field(&self, name: &str) -> Option<&Arc<FieldDefinition>> {
        self.fields.get(name)
    }

    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces
            .iter()
            .any(|implemented| implemented.name().as_str() == interface)
    }
}

#[derive(Clone, Debug)]
pub struct InterfaceType {
    pub name: Name,
    pub description: Option<String>,
    pub interfaces: Vec<NamedTypeRef>,
    pub fields: IndexMap<Name, Arc<FieldDefinition>>,
    pub directives: Vec<AppliedDirective>,
    pub definition: Option<Node<ast::InterfaceTypeDefinition>>,
    pub extensions: Vec<Node<ast::InterfaceTypeExtension>>,
}

impl InterfaceType {
    pub fn field(&self, name: &str) -> Option<&Arc<FieldDefinition>> {
        self.fields.get(name)
    }
}

#[derive(Clone, Debug)]
pub struct UnionType {
    pub name: Name,
    pub description: Option<String>,
    pub members: Vec<NamedTypeRef>,
    pub directives: Vec<AppliedDirective>,
    pub definition: Option<Node<ast::UnionTypeDefinition>>,
    pub extensions: Vec<Node<ast::UnionTypeExtension>>,
}

#[derive(Clone, Debug)]
pub struct EnumType {
    pub name: Name,
    pub description: Option<String>,
    pub values: IndexMap<Name, Arc<EnumValueDefinition>>,
    pub directives: Vec<AppliedDirective>,
    pub definition: Option<Node<ast::EnumTypeDefinition>>,
    pub extensions: Vec<Node<ast::EnumTypeExtension>>,
}

impl EnumType {
    pub fn value(&self, name: &str) -> Option<&Arc<EnumValueDefinition>> {
        self.values.get(name)
    }
}

#[derive(Clone, Debug)]
pub struct InputObjectType {
    pub name: Name,
    pub description: Option<String>,
    pub fields: IndexMap<Name, Arc<InputValueDefinition>>,
    pub directives: Vec<AppliedDirective>,
    pub definition: Option<Node<ast::InputObjectTypeDefinition>>,
    pub extensions: Vec<Node<ast::InputObjectTypeExtension>>,
}

/// A named type of a built schema.
#[derive(Clone, Debug)]
pub enum SchemaType {
    Scalar(Arc<ScalarType>),
    Object(Arc<ObjectType>),
    Interface(Arc<InterfaceType>),
    Union(Arc<UnionType>),
    Enum(Arc<EnumType>),
    InputObject(Arc<InputObjectType>),
}

impl SchemaType {
    pub fn name(&self) -> &Name {
        match self {
            Self::Scalar(ty) => &ty.name,
            Self::Object(ty) => &ty.name,
            Self::Interface(ty) => &ty.name,
            Self::Union(ty) => &ty.name,
            Self::Enum(ty) => &ty.name,
            Self::InputObject(ty) => &ty.name,
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

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Scalar(ty) => ty.description.as_deref(),
            Self::Object(ty) => ty.description.as_deref(),
            Self::Interface(ty) => ty.description.as_deref(),
            Self::Union(ty) => ty.description.as_deref(),
            Self::Enum(ty) => ty.description.as_deref(),
            Self::InputObject(ty) => ty.description.as_deref(),
        }
    }

    pub fn directives(&self) -> &[AppliedDirective] {
        match self {
            Self::Scalar(ty) => &ty.directives,
            Self::Object(ty) => &ty.directives,
            Self::Interface(ty) => &ty.directives,
            Self::Union(ty) => &ty.directives,
            Self::Enum(ty) => &ty.directives,
            Self::InputObject(ty) => &ty.directives,
        }
    }

    /// Whether the type was built from a source definition, as opposed to a built-in scalar
    /// nobody declared.
    pub fn has_definition(&self) -> bool {
        match self {
            Self::Scalar(ty) => ty.definition.is_some(),
            Self::Object(ty) => ty.definition.is_some(),
            Self::Interface(ty) => ty.definition.is_some(),
            Self::Union(ty) => ty.definition.is_some(),
            Self::Enum(ty) => ty.definition.is_some(),
            Self::InputObject(ty) => ty.definition.is_some(),
        }
    }
}
