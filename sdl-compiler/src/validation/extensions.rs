use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaCoordinate;
use crate::registry::TypeDefinitionRegistry;

/// Every type extension needs a base type of the same kind.
pub(crate) fn validate_type_extensions(
    registry: &TypeDefinitionRegistry,
    errors: &mut Vec<Diagnostic>,
) {
    for extension in registry.extensions() {
        let name = extension.name;
        let diagnostic = match registry.type_kind(name) {
            None => Diagnostic::new(
                DiagnosticCode::TypeExtensionMissingBaseType,
                format!(
                    r#"The {} extension "{name}" extends a type that is not defined."#,
                    extension.kind
                ),
            ),
            Some(kind) if kind != extension.kind => Diagnostic::new(
                DiagnosticCode::TypeExtensionDifferentKind,
                format!(
                    r#"The {} extension "{name}" cannot extend the {kind} type "{name}"."#,
                    extension.kind
                ),
            ),
            Some(_) => continue,
        };
        errors.push(
            diagnostic
                .at(SchemaCoordinate::Type(name.clone()))
                .located(extension.location),
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::DiagnosticCode;
    use crate::validation::test_helpers::*;

    #[test]
    fn extensions_need_a_base_of_the_same_kind() {
        let codes = codes(
            r#"
            type Query { a: Int }
            extend type Missing { b: Int }
            extend interface Query { c: Int }
            extend scalar String @specifiedBy(url: "https://spec.graphql.org")
            "#,
        );
        assert_eq!(
            codes,
            [
                DiagnosticCode::TypeExtensionMissingBaseType,
                DiagnosticCode::TypeExtensionDifferentKind,
            ]
        );
    }
}
