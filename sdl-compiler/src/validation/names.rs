use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::parser::SourceSpan;
use indexmap::IndexMap;

use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaCoordinate;
use crate::registry::TypeDefinition;
use crate::registry::TypeDefinitionRegistry;

pub(crate) fn is_reserved_name(name: &str) -> bool {
    name.starts_with("__")
}

fn validate_reserved_name(
    name: &Name,
    what: &str,
    coordinate: &SchemaCoordinate,
    location: Option<SourceSpan>,
    errors: &mut Vec<Diagnostic>,
) {
    if is_reserved_name(name) {
        errors.push(
            Diagnostic::new(
                DiagnosticCode::IllegalName,
                format!(
                    r#"The {what} "{coordinate}" must not have a name starting with "__", which is reserved for introspection."#
                ),
            )
            .at(coordinate.clone())
            .located(location),
        );
    }
}

/// Reports every name after the first in `names`.
fn validate_unique<'a>(
    names: impl IntoIterator<Item = (&'a Name, Option<SourceSpan>)>,
    code: DiagnosticCode,
    what: &str,
    coordinate: impl Fn(&Name) -> SchemaCoordinate,
    errors: &mut Vec<Diagnostic>,
) {
    let mut seen = IndexMap::<&Name, Option<SourceSpan>>::new();
    for (name, location) in names {
        match seen.get(name) {
            Some(first) => {
                let coordinate = coordinate(name);
                errors.push(
                    Diagnostic::new(
                        code,
                        format!(r#"The {what} "{coordinate}" is defined more than once."#),
                    )
                    .at(coordinate)
                    .located(location)
                    .located(*first),
                );
            }
            None => {
                seen.insert(name, location);
            }
        }
    }
}

/// Checks argument names of a field or directive definition.
pub(crate) fn validate_argument_names(
    arguments: &[Node<ast::InputValueDefinition>],
    coordinate: impl Fn(&Name) -> SchemaCoordinate,
    errors: &mut Vec<Diagnostic>,
) {
    for argument in arguments {
        validate_reserved_name(
            &argument.name,
            "argument",
            &coordinate(&argument.name),
            argument.location(),
            errors,
        );
    }
    validate_unique(
        arguments
            .iter()
            .map(|argument| (&argument.name, argument.location())),
        DiagnosticCode::NonUniqueArgument,
        "argument",
        coordinate,
        errors,
    );
}

/// Checks the names of a type, its members and their arguments, across the type and its
/// extensions. A member an extension declares again is a duplicate.
pub(crate) fn validate_names(
    registry: &TypeDefinitionRegistry,
    definition: &TypeDefinition,
    errors: &mut Vec<Diagnostic>,
) {
    let type_name = definition.name();
    let type_coordinate = SchemaCoordinate::Type(type_name.clone());
    // Union names are checked with the other union rules.
    if !matches!(definition, TypeDefinition::Union(_)) {
        validate_reserved_name(
            type_name,
            "type",
            &type_coordinate,
            definition.location(),
            errors,
        );
    }
    let member = |name: &Name| SchemaCoordinate::member(type_name, name);

    match definition {
        TypeDefinition::Object(_) | TypeDefinition::Interface(_) => {
            let fields = registry.all_fields(type_name);
            for field in &fields {
                validate_reserved_name(
                    &field.name,
                    "field",
                    &member(&field.name),
                    field.location(),
                    errors,
                );
                validate_argument_names(
                    &field.arguments,
                    |argument| SchemaCoordinate::argument(type_name, &field.name, argument),
                    errors,
                );
            }
            validate_unique(
                fields.iter().map(|field| (&field.name, field.location())),
                DiagnosticCode::NonUniqueName,
                "field",
                member,
                errors,
            );
        }
        TypeDefinition::Enum(_) => {
            let values = registry.all_enum_values(type_name);
            for value in &values {
                validate_reserved_name(
                    &value.value,
                    "enum value",
                    &member(&value.value),
                    value.location(),
                    errors,
                );
            }
            validate_unique(
                values.iter().map(|value| (&value.value, value.location())),
                DiagnosticCode::NonUniqueName,
                "enum value",
                member,
                errors,
            );
        }
        TypeDefinition::InputObject(_) => {
            let fields = registry.all_input_fields(type_name);
            for field in &fields {
                validate_reserved_name(
                    &field.name,
                    "input field",
                    &member(&field.name),
                    field.location(),
                    errors,
                );
            }
            validate_unique(
                fields.iter().map(|field| (&field.name, field.location())),
                DiagnosticCode::NonUniqueName,
                "input field",
                member,
                errors,
            );
        }
        TypeDefinition::Scalar(_) | TypeDefinition::Union(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::DiagnosticCode;
    use crate::validation::test_helpers::*;

    #[test]
    fn extension_redeclaring_a_field_is_a_duplicate() {
        let problems = check("type Query { a: Int } extend type Query { a: Int b: Int }");
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].code, DiagnosticCode::NonUniqueName);
        assert_eq!(problems[0].coordinate.as_ref().unwrap().to_string(), "Query.a");
        assert_eq!(problems[0].locations.len(), 2);
    }

    #[test]
    fn duplicate_arguments_and_values() {
        let codes = codes(
            r#"
            enum Color { RED RED }
            input In { a: Int a: Int }
            type Query { f(x: Int, x: Int): Color g(i: In): Int }
            "#,
        );
        assert_eq!(
            codes,
            [
                DiagnosticCode::NonUniqueName,
                DiagnosticCode::NonUniqueName,
                DiagnosticCode::NonUniqueArgument,
            ]
        );
    }

    #[test]
    fn reserved_prefix_is_illegal() {
        let codes = codes("type __Query { a: Int } type Query { __a: Int f(__x: Int): Int }");
        assert_eq!(
            codes,
            [
                DiagnosticCode::IllegalName,
                DiagnosticCode::IllegalName,
                DiagnosticCode::IllegalName,
            ]
        );
    }
}
