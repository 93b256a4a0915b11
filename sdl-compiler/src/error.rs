//! Diagnostics collected while checking and building a schema, and the few errors that abort a
//! build outright.
//!
//! Semantic problems in the type definitions are never returned as `Err`: they are pushed as
//! [`Diagnostic`] values onto the registry, the validator output, or the built schema, and the
//! pipeline keeps going. Only cancellation, strict-mode problems, parse failures and internal
//! failures are [`SchemaBuildError`]s.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Range;

use apollo_compiler::Name;
use apollo_compiler::parser::SourceMap;
use apollo_compiler::parser::SourceSpan;
use apollo_compiler::validation::DiagnosticList;
use itertools::Itertools;

/// A stable code identifying what kind of problem a [`Diagnostic`] describes.
///
/// The string form (`MISSING_TYPE`, `UNION_TYPE_ERROR`, ...) is stable and can be relied upon by
/// tools; messages are not.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    strum_macros::IntoStaticStr,
    strum_macros::EnumIter,
    strum_macros::Display
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// A referenced type is not declared anywhere.
    MissingType,
    /// A type with the same name was already added to the registry.
    TypeRedefinition,
    /// A directive definition with the same name was already added to the registry.
    DirectiveRedefinition,
    /// More than one `schema { ... }` block was added.
    SchemaRedefinition,
    /// A field, enum value or input field appears more than once.
    NonUniqueName,
    /// An argument appears more than once on a field, directive definition or directive usage.
    NonUniqueArgument,
    /// A non-repeatable directive is applied more than once to the same element.
    NonUniqueDirective,
    /// An interface is listed more than once across a type and its extensions.
    InterfaceImplementedMoreThanOnce,
    /// A type lists itself in its `implements` clause.
    ImplementingItself,
    /// An interface implements itself through other interfaces.
    CircularImplementationHierarchy,
    /// A type implements an interface but not the interfaces that interface implements.
    MissingTransitiveInterface,
    /// A type implements something that is not an interface.
    MissingInterfaceType,
    /// A field required by an implemented interface is absent.
    MissingInterfaceField,
    /// An argument required by an implemented interface field is absent.
    MissingInterfaceFieldArguments,
    /// An implementing field's type is not a subtype of the interface field's type.
    InterfaceFieldRedefinition,
    /// An implementing field argument differs from the interface field argument.
    InterfaceArgumentRedefinition,
    /// An implementing field adds a required argument the interface field does not have.
    InterfaceFieldArgumentNotOptional,
    /// A union is malformed: reserved name, no members, non-object or repeated members.
    UnionTypeError,
    /// A root operation type is declared more than once.
    OperationRedefinition,
    /// A root operation type is not an object type.
    OperationTypesMustBeObjects,
    /// No query root operation can be determined.
    QueryOperationMissing,
    /// A used directive has no definition.
    DirectiveUndeclared,
    /// A directive is used at a location its definition does not allow.
    DirectiveIllegalLocation,
    /// A directive argument value or argument definition has an illegal type.
    DirectiveIllegalArgumentType,
    /// A directive usage supplies an argument its definition does not declare.
    DirectiveUnknownArgument,
    /// A directive usage omits a required argument.
    DirectiveMissingNonNullArgument,
    /// A directive is used on its own argument definitions.
    DirectiveIllegalReference,
    /// A name uses the reserved `__` prefix.
    IllegalName,
    /// An argument or input field has a type that cannot be used as input.
    NotAnInputType,
    /// A field has a type that cannot be used as output.
    NotAnOutputType,
    /// An executable definition (operation or fragment) was handed to the registry.
    NonSdlDefinition,
    /// A type extension has no base type to extend.
    TypeExtensionMissingBaseType,
    /// A type extension extends a base type of a different kind.
    TypeExtensionDifferentKind,
    /// An interface or union has no type resolver wired.
    MissingTypeResolver,
    /// A custom scalar has no coercing wired.
    MissingScalarImplementation,
    /// The schema could not be built and a placeholder was returned instead.
    InternalError,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A reference to the schema element a diagnostic is about, printed in schema coordinate syntax.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum SchemaCoordinate {
    /// The schema definition itself.
    Schema,
    /// `Type`
    Type(Name),
    /// `Type.member`, where member is a field, an enum value or an input field.
    Member { type_name: Name, member: Name },
    /// `Type.field(argument:)`
    Argument {
        type_name: Name,
        field_name: Name,
        argument: Name,
    },
    /// `@directive`
    Directive(Name),
    /// `@directive(argument:)`
    DirectiveArgument { directive: Name, argument: Name },
}

impl SchemaCoordinate {
    pub(crate) fn member(type_name: &Name, member: &Name) -> Self {
        Self::Member {
            type_name: type_name.clone(),
            member: member.clone(),
        }
    }

    pub(crate) fn argument(type_name: &Name, field_name: &Name, argument: &Name) -> Self {
        Self::Argument {
            type_name: type_name.clone(),
            field_name: field_name.clone(),
            argument: argument.clone(),
        }
    }

    pub(crate) fn directive_argument(directive: &Name, argument: &Name) -> Self {
        Self::DirectiveArgument {
            directive: directive.clone(),
            argument: argument.clone(),
        }
    }

    /// The type (or directive) the coordinate starts from.
    pub fn root_name(&self) -> Option<&Name> {
        match self {
            Self::Schema => None,
            Self::Type(type_name)
            | Self::Member { type_name, .. }
            | Self::Argument { type_name, .. } => Some(type_name),
            Self::Directive(directive) | Self::DirectiveArgument { directive, .. } => {
                Some(directive)
            }
        }
    }
}

impl Display for SchemaCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => f.write_str("schema"),
            Self::Type(type_name) => write!(f, "{type_name}"),
            Self::Member { type_name, member } => write!(f, "{type_name}.{member}"),
            Self::Argument {
                type_name,
                field_name,
                argument,
            } => write!(f, "{type_name}.{field_name}({argument}:)"),
            Self::Directive(directive) => write!(f, "@{directive}"),
            Self::DirectiveArgument {
                directive,
                argument,
            } => write!(f, "@{directive}({argument}:)"),
        }
    }
}

/// A 1-indexed line/column reference to SDL source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    fn from_span(span: SourceSpan, sources: &[SourceMap]) -> Option<Range<Self>> {
        sources.iter().find_map(|source_map| {
            span.line_column_range(source_map).map(|range| Range {
                start: Self {
                    line: range.start.line,
                    column: range.start.column,
                },
                end: Self {
                    line: range.end.line,
                    column: range.end.column,
                },
            })
        })
    }
}

/// A structured, non-fatal problem found in the type definitions.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    /// A human-readable message. These messages are not stable, tools should rely on `code`.
    pub message: String,
    /// Where the offending definitions were declared. May be empty for definitions that were
    /// constructed programmatically instead of parsed.
    pub locations: Vec<SourceSpan>,
    /// The schema element the problem is about.
    pub coordinate: Option<SchemaCoordinate>,
}

impl Diagnostic {
    pub(crate) fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            locations: Vec::new(),
            coordinate: None,
        }
    }

    pub(crate) fn at(mut self, coordinate: SchemaCoordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    pub(crate) fn located(mut self, location: Option<SourceSpan>) -> Self {
        self.locations.extend(location);
        self
    }

    /// Resolves the source spans against the source maps the definitions were parsed from.
    ///
    /// Spans whose file is in none of the maps are skipped.
    pub fn line_column_ranges(&self, sources: &[SourceMap]) -> Vec<Range<Location>> {
        self.locations
            .iter()
            .filter_map(|span| Location::from_span(*span, sources))
            .collect()
    }

    /// Renders the diagnostic as JSON, in the shape GraphQL errors usually take.
    pub fn to_json(&self, sources: &[SourceMap]) -> serde_json::Value {
        let locations = self
            .line_column_ranges(sources)
            .into_iter()
            .map(|range| {
                serde_json::json!({
                    "line": range.start.line,
                    "column": range.start.column,
                })
            })
            .collect::<Vec<_>>();
        serde_json::json!({
            "message": self.message,
            "locations": locations,
            "extensions": {
                "code": self.code.as_str(),
                "coordinate": self.coordinate.as_ref().map(|c| c.to_string()),
            },
        })
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Signals that the caller cancelled validation or building. No result was produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("schema processing was cancelled")]
pub struct Cancelled;

/// Syntax errors reported by the SDL parser.
#[derive(Debug)]
pub struct ParseErrors {
    pub errors: DiagnosticList,
}

impl Display for ParseErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut errors = self.errors.iter();
        for (i, error) in errors.by_ref().take(5).enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", error)?;
        }
        let remaining = errors.count();
        if remaining > 0 {
            write!(f, "\n...and {remaining} other errors")?;
        }
        Ok(())
    }
}

/// Errors that abort schema processing.
#[derive(Debug, thiserror::Error)]
pub enum SchemaBuildError {
    /// The caller cancelled the operation.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    /// The SDL could not be parsed.
    #[error("{0}")]
    Parse(ParseErrors),
    /// Strict mode is enabled and the definitions have problems.
    #[error("the schema has {} problem(s):\n{}", .0.len(), .0.iter().join("\n"))]
    Problem(Vec<Diagnostic>),
    /// Something went wrong that the checks should have prevented.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl SchemaBuildError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Creates a [`SchemaBuildError::Internal`] with a formatted message.
#[macro_export]
macro_rules! internal_error {
    ( $( $arg:tt )+ ) => {
        $crate::error::SchemaBuildError::Internal {
            message: format!( $( $arg )+ ),
        }
    }
}

/// Returns early with a [`SchemaBuildError::Internal`] built from a formatted message.
#[macro_export]
macro_rules! bail {
    ( $( $arg:tt )+ ) => {
        return Err($crate::internal_error!( $( $arg )+ ).into())
    }
}
