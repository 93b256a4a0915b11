use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::OperationType;
use apollo_compiler::parser::SourceSpan;
use indexmap::IndexMap;

use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaCoordinate;
use crate::registry::TypeDefinitionRegistry;

/// Checks the root operation types declared by the schema definition and its extensions.
///
/// Without a schema definition, extensions extend the implicit schema whose roots are the types
/// named `Query`, `Mutation` and `Subscription`.
pub(crate) fn validate_schema_root(
    registry: &TypeDefinitionRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    let declared = registry
        .schema_definition()
        .into_iter()
        .flat_map(|schema| schema.root_operations.iter())
        .chain(
            registry
                .schema_extensions()
                .iter()
                .flat_map(|extension| extension.root_operations.iter()),
        );

    let mut roots = IndexMap::<OperationType, (&Name, Option<SourceSpan>)>::new();
    for root_operation in declared {
        let root_operation: &Node<(OperationType, Name)> = root_operation;
        let (operation_type, type_name) = &**root_operation;
        if let Some((first, first_location)) = roots.get(operation_type) {
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::OperationRedefinition,
                    format!(
                        r#"The {operation_type} root operation is already defined as "{first}", "{type_name}" is ignored."#
                    ),
                )
                .at(SchemaCoordinate::Schema)
                .located(root_operation.location())
                .located(*first_location),
            );
            continue;
        }
        roots.insert(*operation_type, (type_name, root_operation.location()));
    }

    for (operation_type, (type_name, location)) in &roots {
        let diagnostic = match registry.type_kind(type_name) {
            None => Diagnostic::new(
                DiagnosticCode::MissingType,
                format!(
                    r#"The {operation_type} root operation type "{type_name}" is not defined."#
                ),
            ),
            Some(kind) if !registry.is_object_type(type_name) => Diagnostic::new(
                DiagnosticCode::OperationTypesMustBeObjects,
                format!(
                    r#"The {operation_type} root operation type "{type_name}" must be an object type, not {kind}."#
                ),
            ),
            Some(_) => continue,
        };
        errors.push(diagnostic.at(SchemaCoordinate::Schema).located(*location));
    }

    if roots.contains_key(&OperationType::Query) {
        return;
    }
    match registry.type_kind("Query") {
        None => errors.push(
            Diagnostic::new(
                DiagnosticCode::QueryOperationMissing,
                r#"The schema has no query root operation: declare one in a schema definition, or define a type named "Query"."#,
            )
            .at(SchemaCoordinate::Schema)
            .located(registry.schema_definition().and_then(|schema| schema.location())),
        ),
        Some(kind) if !registry.is_object_type("Query") => {
            let location = registry.get_type("Query").and_then(|ty| ty.location());
            errors.push(
                Diagnostic::new(
                    DiagnosticCode::OperationTypesMustBeObjects,
                    format!(
                        r#"The type "Query" is used as the query root operation type and must be an object type, not {kind}."#
                    ),
                )
                .at(SchemaCoordinate::Schema)
                .located(location),
            )
        }
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::DiagnosticCode;
    use crate::validation::test_helpers::*;

    #[test]
    fn query_type_is_required() {
        assert_eq!(
            codes("type Mutation { a: Int }"),
            [DiagnosticCode::QueryOperationMissing]
        );
    }

    #[test]
    fn roots_must_be_defined_objects() {
        let codes = codes(
            r#"
            schema { query: Root mutation: Missing }
            extend schema { query: Other subscription: In }
            type Root { a: Int }
            type Other { a: Int }
            input In { a: Int }
            "#,
        );
        assert_eq!(
            codes,
            [
                DiagnosticCode::OperationRedefinition,
                DiagnosticCode::MissingType,
                DiagnosticCode::OperationTypesMustBeObjects,
            ]
        );
    }

    #[test]
    fn schema_extension_without_definition_extends_the_implicit_schema() {
        let codes = codes(
            "extend schema { mutation: Mutation } type Query { a: Int } type Mutation { a: Int }",
        );
        assert!(codes.is_empty(), "{codes:?}");
    }
}
