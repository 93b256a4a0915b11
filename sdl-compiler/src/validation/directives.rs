//! Rules for directive definitions and for every place a directive is applied.

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::ast::DirectiveLocation;
use indexmap::IndexSet;

use super::arguments::LiteralChecker;
use super::names::is_reserved_name;
use super::names::validate_argument_names;
use crate::cancellation::CancellationToken;
use crate::error::Cancelled;
use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaCoordinate;
use crate::registry::TypeDefinition;
use crate::registry::TypeDefinitionRegistry;
use crate::wiring::RuntimeWiring;

pub(crate) fn validate_directive_definition(
    registry: &TypeDefinitionRegistry,
    directive: &Node<ast::DirectiveDefinition>,
    errors: &mut Vec<Diagnostic>,
) {
    let directive_name = &directive.name;
    if is_reserved_name(directive_name) {
        errors.push(
            Diagnostic::new(
                DiagnosticCode::IllegalName,
                format!(
                    r#"The directive "@{directive_name}" must not have a name starting with "__"."#
                ),
            )
            .at(SchemaCoordinate::Directive(directive_name.clone()))
            .located(directive.location()),
        );
    }
    validate_argument_names(
        &directive.arguments,
        |argument| SchemaCoordinate::directive_argument(directive_name, argument),
        errors,
    );

    for argument in &directive.arguments {
        let coordinate = SchemaCoordinate::directive_argument(directive_name, &argument.name);
        let type_name = argument.ty.inner_named_type();
        let diagnostic = match registry.type_kind(type_name) {
            None => Diagnostic::new(
                DiagnosticCode::DirectiveIllegalArgumentType,
                format!(
                    r#"The argument "{coordinate}" has type "{type_name}", which is not defined."#
                ),
            ),
            Some(kind) if !kind.is_input() => Diagnostic::new(
                DiagnosticCode::NotAnInputType,
                format!(
                    r#"The argument "{coordinate}" has {kind} type "{type_name}", which is not an input type."#
                ),
            ),
            Some(_) => continue,
        };
        errors.push(diagnostic.at(coordinate).located(argument.location()));
    }

    let arguments = directive.arguments.iter().collect::<Vec<_>>();
    if let Some(usage) =
        find_self_reference(registry, directive_name, &arguments, &mut IndexSet::new())
    {
        errors.push(
            Diagnostic::new(
                DiagnosticCode::DirectiveIllegalReference,
                format!(
                    r#"The directive "@{directive_name}" cannot reference itself, but it is applied to {usage}."#
                ),
            )
            .at(SchemaCoordinate::Directive(directive_name.clone()))
            .located(directive.location()),
        );
    }
}

/// Looks for `directive_name` on the given argument definitions and, through their types, on
/// input objects and their fields. Returns a description of the first usage found.
fn find_self_reference(
    registry: &TypeDefinitionRegistry,
    directive_name: &Name,
    arguments: &[&Node<ast::InputValueDefinition>],
    visited: &mut IndexSet<Name>,
) -> Option<String> {
    for argument in arguments {
        if argument.directives.has(directive_name) {
            return Some(format!(r#"its argument "{}""#, argument.name));
        }
        let type_name = argument.ty.inner_named_type();
        let Some(definition @ TypeDefinition::InputObject(_)) = registry.get_type(type_name) else {
            continue;
        };
        if !visited.insert(type_name.clone()) {
            continue;
        }
        let on_type = registry
            .type_directives(definition)
            .iter()
            .any(|directive| directive.name == *directive_name);
        if on_type {
            return Some(format!(r#"the input type "{type_name}""#));
        }
        let fields = registry.all_input_fields(type_name);
        for field in &fields {
            if field.directives.has(directive_name) {
                return Some(format!(r#"the input field "{type_name}.{}""#, field.name));
            }
        }
        if let Some(usage) = find_self_reference(registry, directive_name, &fields, visited) {
            return Some(usage);
        }
    }
    None
}

/// A schema element directives can be applied to.
struct Site<'a> {
    location: DirectiveLocation,
    coordinate: SchemaCoordinate,
    directives: Vec<&'a Node<ast::Directive>>,
}

fn type_location(definition: &TypeDefinition) -> DirectiveLocation {
    match definition {
        TypeDefinition::Scalar(_) => DirectiveLocation::Scalar,
        TypeDefinition::Object(_) => DirectiveLocation::Object,
        TypeDefinition::Interface(_) => DirectiveLocation::Interface,
        TypeDefinition::Union(_) => DirectiveLocation::Union,
        TypeDefinition::Enum(_) => DirectiveLocation::Enum,
        TypeDefinition::InputObject(_) => DirectiveLocation::InputObject,
    }
}

/// A type with its extensions, and its members.
fn type_sites<'a>(
    registry: &'a TypeDefinitionRegistry,
    definition: &'a TypeDefinition,
) -> Vec<Site<'a>> {
    let type_name = definition.name();
    let mut sites = vec![Site {
        location: type_location(definition),
        coordinate: SchemaCoordinate::Type(type_name.clone()),
        directives: registry.type_directives(definition),
    }];
    match definition {
        TypeDefinition::Object(_) | TypeDefinition::Interface(_) => {
            for field in registry.all_fields(type_name) {
                sites.push(Site {
                    location: DirectiveLocation::FieldDefinition,
                    coordinate: SchemaCoordinate::member(type_name, &field.name),
                    directives: field.directives.iter().collect(),
                });
                sites.extend(field.arguments.iter().map(|argument| Site {
                    location: DirectiveLocation::ArgumentDefinition,
                    coordinate: SchemaCoordinate::argument(type_name, &field.name, &argument.name),
                    directives: argument.directives.iter().collect(),
                }));
            }
        }
        TypeDefinition::Enum(_) => {
            sites.extend(registry.all_enum_values(type_name).into_iter().map(|value| Site {
                location: DirectiveLocation::EnumValue,
                coordinate: SchemaCoordinate::member(type_name, &value.value),
                directives: value.directives.iter().collect(),
            }));
        }
        TypeDefinition::InputObject(_) => {
            sites.extend(registry.all_input_fields(type_name).into_iter().map(|field| Site {
                location: DirectiveLocation::InputFieldDefinition,
                coordinate: SchemaCoordinate::member(type_name, &field.name),
                directives: field.directives.iter().collect(),
            }));
        }
        TypeDefinition::Scalar(_) | TypeDefinition::Union(_) => {}
    }
    sites
}

/// Checks every directive application: on the schema, on each type with its extensions and
/// members, and on directive arguments.
pub(crate) fn validate_directive_usages(
    registry: &TypeDefinitionRegistry,
    wiring: &RuntimeWiring,
    token: &CancellationToken,
    errors: &mut Vec<Diagnostic>,
) -> Result<(), Cancelled> {
    let checker = LiteralChecker { registry, wiring };

    let schema_directives = registry
        .schema_definition()
        .into_iter()
        .flat_map(|schema| schema.directives.iter())
        .chain(
            registry
                .schema_extensions()
                .iter()
                .flat_map(|extension| extension.directives.iter()),
        )
        .collect::<Vec<_>>();
    validate_site(
        &checker,
        Site {
            location: DirectiveLocation::Schema,
            coordinate: SchemaCoordinate::Schema,
            directives: schema_directives,
        },
        errors,
    );

    for definition in registry.types() {
        token.check()?;
        for site in type_sites(registry, definition) {
            validate_site(&checker, site, errors);
        }
    }

    for directive in registry.directive_definitions() {
        token.check()?;
        for argument in &directive.arguments {
            let site = Site {
                location: DirectiveLocation::ArgumentDefinition,
                coordinate: SchemaCoordinate::directive_argument(&directive.name, &argument.name),
                directives: argument.directives.iter().collect(),
            };
            validate_site(&checker, site, errors);
        }
    }
    Ok(())
}

fn validate_site(checker: &LiteralChecker<'_>, site: Site<'_>, errors: &mut Vec<Diagnostic>) {
    let Site {
        location,
        coordinate,
        directives,
    } = site;
    let mut applied = IndexSet::new();
    for directive in directives {
        let directive_name = &directive.name;
        let Some(declaration) = checker.registry.directive_definition(directive_name) else {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::DirectiveUndeclared,
                    format!(r#"The directive "@{directive_name}" used on "{coordinate}" is not defined."#),
                )
                .at(coordinate.clone())
                .located(directive.location()),
            );
            continue;
        };

        if !declaration.locations.contains(&location) {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::DirectiveIllegalLocation,
                    format!(
                        r#"The directive "@{directive_name}" cannot be used on "{coordinate}": it is allowed on {} but this is {location}."#,
                        itertools::join(&declaration.locations, ", ")
                    ),
                )
                .at(coordinate.clone())
                .located(directive.location()),
            );
        }

        if !applied.insert(directive_name) && !declaration.repeatable {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::NonUniqueDirective,
                    format!(
                        r#"The non-repeatable directive "@{directive_name}" is used more than once on "{coordinate}"."#
                    ),
                )
                .at(coordinate.clone())
                .located(directive.location()),
            );
        }

        validate_directive_arguments(checker, directive, declaration, &coordinate, errors);
    }
}

fn validate_directive_arguments(
    checker: &LiteralChecker<'_>,
    directive: &Node<ast::Directive>,
    declaration: &Node<ast::DirectiveDefinition>,
    coordinate: &SchemaCoordinate,
    errors: &mut Vec<Diagnostic>,
) {
    let directive_name = &directive.name;
    let mut supplied = IndexSet::new();
    for argument in &directive.arguments {
        let argument_name = &argument.name;
        if !supplied.insert(argument_name) {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::NonUniqueArgument,
                    format!(
                        r#"The argument "{argument_name}" is given more than once to "@{directive_name}" on "{coordinate}"."#
                    ),
                )
                .at(coordinate.clone())
                .located(argument.location()),
            );
            continue;
        }
        let Some(declared) = declaration
            .arguments
            .iter()
            .find(|declared| declared.name == *argument_name)
        else {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::DirectiveUnknownArgument,
                    format!(
                        r#"The directive "@{directive_name}" has no argument "{argument_name}", it is used on "{coordinate}"."#
                    ),
                )
                .at(coordinate.clone())
                .located(argument.location()),
            );
            continue;
        };
        if let Err(error) = checker.check(&argument.value, &declared.ty) {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::DirectiveIllegalArgumentType,
                    format!(
                        r#"The argument "{argument_name}" of "@{directive_name}" on "{coordinate}" has an invalid value {}: {error}."#,
                        argument.value
                    ),
                )
                .at(coordinate.clone())
                .located(argument.location()),
            );
        }
    }

    for declared in &declaration.arguments {
        let required = declared.ty.is_non_null() && declared.default_value.is_none();
        if required && !supplied.contains(&declared.name) {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::DirectiveMissingNonNullArgument,
                    format!(
                        r#"The directive "@{directive_name}" on "{coordinate}" is missing its required argument "{}"."#,
                        declared.name
                    ),
                )
                .at(coordinate.clone())
                .located(directive.location()),
            );
        }
    }
}
