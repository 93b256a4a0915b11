//! Rules for object and interface types and the interfaces they implement.

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use indexmap::IndexSet;

use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaCoordinate;
use crate::registry::TypeDefinition;
use crate::registry::TypeDefinitionRegistry;
use crate::registry::TypeKind;

pub(crate) fn validate_implementing_type(
    registry: &TypeDefinitionRegistry,
    definition: &TypeDefinition,
    errors: &mut Vec<Diagnostic>,
) {
    let type_name = definition.name();
    validate_unique_interfaces(registry, type_name, errors);
    if !validate_acyclic(registry, definition, errors) {
        return;
    }

    let declared = registry
        .implemented_interfaces(type_name)
        .into_iter()
        .filter(|interface| registry.type_kind(interface) == Some(TypeKind::Interface))
        .collect::<IndexSet<_>>();
    validate_transitive_interfaces(registry, definition, &declared, errors);
    for interface in &declared {
        validate_interface_fields(registry, definition, interface, errors);
    }
}

/// Each interface may appear once across the `implements` clauses of a type and its extensions.
fn validate_unique_interfaces(
    registry: &TypeDefinitionRegistry,
    type_name: &Name,
    errors: &mut Vec<Diagnostic>,
) {
    let mut seen = IndexSet::new();
    for interface in registry.all_implemented_interfaces(type_name) {
        if !seen.insert(interface) {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::InterfaceImplementedMoreThanOnce,
                    format!(
                        r#"The type "{type_name}" can only implement "{interface}" once."#
                    ),
                )
                .at(SchemaCoordinate::Type(type_name.clone()))
                .located(interface.location()),
            );
        }
    }
}

/// Reports a type that implements itself. Returns whether the hierarchy is free of cycles through
/// this type.
fn validate_acyclic(
    registry: &TypeDefinitionRegistry,
    definition: &TypeDefinition,
    errors: &mut Vec<Diagnostic>,
) -> bool {
    let type_name = definition.name();
    let implements = registry.all_implemented_interfaces(type_name);
    if let Some(itself) = implements.iter().find(|interface| **interface == type_name) {
        errors.push(
            Diagnostic::new(
                DiagnosticCode::ImplementingItself,
                format!(r#"The type "{type_name}" cannot implement itself."#),
            )
            .at(SchemaCoordinate::Type(type_name.clone()))
            .located(itself.location()),
        );
        return false;
    }
    if !matches!(definition, TypeDefinition::Interface(_)) {
        return true;
    }
    let circular = registry
        .transitive_interfaces(type_name)
        .iter()
        .find(|interface| {
            registry
                .all_implemented_interfaces(interface)
                .iter()
                .any(|implemented| *implemented == type_name)
        })
        .cloned();
    match circular {
        Some(through) => {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::CircularImplementationHierarchy,
                    format!(
                        r#"The interface "{type_name}" implements itself through "{through}"."#
                    ),
                )
                .at(SchemaCoordinate::Type(type_name.clone()))
                .located(definition.location()),
            );
            false
        }
        None => true,
    }
}

/// If a type implements `I` and `I` implements `J`, the type must also declare `J`.
fn validate_transitive_interfaces(
    registry: &TypeDefinitionRegistry,
    definition: &TypeDefinition,
    declared: &IndexSet<Name>,
    errors: &mut Vec<Diagnostic>,
) {
    let type_name = definition.name();
    let mut reported = IndexSet::new();
    for interface in declared {
        for transitive in registry.transitive_interfaces(interface) {
            if transitive == *type_name
                || declared.contains(&transitive)
                || registry.type_kind(&transitive) != Some(TypeKind::Interface)
                || !reported.insert(transitive.clone())
            {
                continue;
            }
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::MissingTransitiveInterface,
                    format!(
                        r#"The {} "{type_name}" must implement "{transitive}" because it is implemented by "{interface}"."#,
                        definition.kind()
                    ),
                )
                .at(SchemaCoordinate::Type(type_name.clone()))
                .located(definition.location()),
            );
        }
    }
}

fn is_optional(argument: &ast::InputValueDefinition) -> bool {
    !argument.ty.is_non_null() || argument.default_value.is_some()
}

fn signature(argument: &ast::InputValueDefinition) -> String {
    match &argument.default_value {
        Some(default_value) => format!("{} = {}", argument.ty, default_value),
        None => argument.ty.to_string(),
    }
}

/// Every field of `interface` must be implemented with a compatible type and arguments.
fn validate_interface_fields(
    registry: &TypeDefinitionRegistry,
    definition: &TypeDefinition,
    interface: &Name,
    errors: &mut Vec<Diagnostic>,
) {
    let type_name = definition.name();
    let kind = definition.kind();
    let fields = registry.fields(type_name);
    for (field_name, interface_field) in registry.fields(interface) {
        let coordinate = SchemaCoordinate::member(type_name, &field_name);
        let Some(field) = fields.get(&field_name) else {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::MissingInterfaceField,
                    format!(
                        r#"The {kind} "{type_name}" does not have a field "{field_name}" required by the interface "{interface}"."#
                    ),
                )
                .at(coordinate)
                .located(definition.location())
                .located(interface_field.location()),
            );
            continue;
        };

        if !registry.is_sub_type_of(&field.ty, &interface_field.ty) {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::InterfaceFieldRedefinition,
                    format!(
                        r#"The field "{coordinate}" has type "{}", which does not match the type "{}" of "{interface}.{field_name}"."#,
                        field.ty, interface_field.ty
                    ),
                )
                .at(coordinate.clone())
                .located(field.location())
                .located(interface_field.location()),
            );
        }

        validate_field_arguments(
            type_name,
            interface,
            field,
            interface_field,
            errors,
        );
    }
}

fn validate_field_arguments(
    type_name: &Name,
    interface: &Name,
    field: &Node<ast::FieldDefinition>,
    interface_field: &Node<ast::FieldDefinition>,
    errors: &mut Vec<Diagnostic>,
) {
    let field_name = &field.name;
    for interface_argument in &interface_field.arguments {
        let coordinate =
            SchemaCoordinate::argument(type_name, field_name, &interface_argument.name);
        let argument = field
            .arguments
            .iter()
            .find(|argument| argument.name == interface_argument.name);
        let Some(argument) = argument else {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::MissingInterfaceFieldArguments,
                    format!(
                        r#"The field "{type_name}.{field_name}" is missing the argument "{}" required by "{interface}.{field_name}"."#,
                        interface_argument.name
                    ),
                )
                .at(coordinate)
                .located(field.location())
                .located(interface_argument.location()),
            );
            continue;
        };
        let expected = signature(interface_argument);
        let actual = signature(argument);
        if actual != expected {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::InterfaceArgumentRedefinition,
                    format!(
                        r#"The argument "{coordinate}" is declared as "{actual}" but "{interface}.{field_name}" declares it as "{expected}"."#
                    ),
                )
                .at(coordinate)
                .located(argument.location())
                .located(interface_argument.location()),
            );
        }
    }

    for argument in &field.arguments {
        let declared_by_interface = interface_field
            .arguments
            .iter()
            .any(|interface_argument| interface_argument.name == argument.name);
        if declared_by_interface || is_optional(argument) {
            continue;
        }
        let coordinate = SchemaCoordinate::argument(type_name, field_name, &argument.name);
        errors.push(
            Diagnostic::new(
                DiagnosticCode::InterfaceFieldArgumentNotOptional,
                format!(
                    r#"The argument "{coordinate}" is required, but "{interface}.{field_name}" does not declare it."#
                ),
            )
            .at(coordinate)
            .located(argument.location()),
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::DiagnosticCode;
    use crate::validation::test_helpers::*;

    #[test]
    fn implemented_twice_across_extensions() {
        let problems = check(
            r#"
            interface Node { id: ID }
            type Query implements Node { id: ID }
            extend type Query implements Node
            "#,
        );
        assert_eq!(problems.len(), 1);
        assert_eq!(
            problems[0].code,
            DiagnosticCode::InterfaceImplementedMoreThanOnce
        );
    }

    #[test]
    fn self_and_circular_implementation() {
        let codes = codes(
            r#"
            interface A implements A { a: Int }
            interface B implements C { b: Int }
            interface C implements B { b: Int }
            type Query { a: A }
            "#,
        );
        assert_eq!(
            codes,
            [
                DiagnosticCode::ImplementingItself,
                DiagnosticCode::CircularImplementationHierarchy,
                DiagnosticCode::CircularImplementationHierarchy,
            ]
        );
    }

    #[test]
    fn missing_transitive_interface_is_reported_once() {
        let problems = check(
            r#"
            interface J { j: Int }
            interface I implements J { j: Int i: Int }
            type T implements I { i: Int }
            type Query { t: T }
            "#,
        );
        let codes = problems
            .iter()
            .map(|problem| problem.code)
            .collect::<Vec<_>>();
        assert_eq!(
            codes,
            [
                DiagnosticCode::MissingTransitiveInterface,
                DiagnosticCode::MissingInterfaceField,
            ]
        );
        assert!(problems[1].message.contains(r#""j""#));
        assert!(problems[1].message.contains(r#""I""#));
    }

    #[test]
    fn field_types_and_arguments_must_match() {
        let codes = codes(
            r#"
            interface Node { id: ID! list(first: Int): [Node] named(after: String): Node }
            type Query implements Node {
              id: ID
              list(first: Int, extra: Int!): [Query!]!
              named(after: String!): Query
            }
            "#,
        );
        assert_eq!(
            codes,
            [
                DiagnosticCode::InterfaceFieldRedefinition,
                DiagnosticCode::InterfaceFieldArgumentNotOptional,
                DiagnosticCode::InterfaceArgumentRedefinition,
            ]
        );
    }

    #[test]
    fn missing_argument() {
        let codes = codes(
            "interface Node { f(a: Int): Int } type Query implements Node { f: Int }",
        );
        assert_eq!(codes, [DiagnosticCode::MissingInterfaceFieldArguments]);
    }
}
