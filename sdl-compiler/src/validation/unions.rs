use indexmap::IndexSet;

use super::names::is_reserved_name;
use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaCoordinate;
use crate::registry::TypeDefinition;
use crate::registry::TypeDefinitionRegistry;
use crate::registry::TypeKind;

pub(crate) fn validate_union(
    registry: &TypeDefinitionRegistry,
    definition: &TypeDefinition,
    errors: &mut Vec<Diagnostic>,
) {
    let union_name = definition.name();
    let error = |message: String| {
        Diagnostic::new(DiagnosticCode::UnionTypeError, message)
            .at(SchemaCoordinate::Type(union_name.clone()))
    };

    if is_reserved_name(union_name) {
        errors.push(
            error(format!(
                r#"The union "{union_name}" must not have a name starting with "__"."#
            ))
            .located(definition.location()),
        );
    }

    let members = registry.all_union_members(union_name);
    if members.is_empty() {
        errors.push(
            error(format!(
                r#"The union "{union_name}" must have at least one member."#
            ))
            .located(definition.location()),
        );
        return;
    }

    let mut seen = IndexSet::new();
    for member in members {
        if !seen.insert(member) {
            errors.push(
                error(format!(
                    r#"The union "{union_name}" includes "{member}" more than once."#
                ))
                .located(member.location()),
            );
            continue;
        }
        // Undefined members are reported as missing types.
        match registry.type_kind(member) {
            Some(kind) if kind != TypeKind::Object => errors.push(
                error(format!(
                    r#"The union "{union_name}" has {kind} type "{member}" as a member, but members must be object types."#
                ))
                .located(member.location()),
            ),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::DiagnosticCode;
    use crate::validation::test_helpers::*;

    #[test]
    fn empty_union_is_reported_once() {
        let codes = codes("union Empty type Query { a: Int }");
        assert_eq!(codes, [DiagnosticCode::UnionTypeError]);
    }

    #[test]
    fn members_must_be_unique_objects() {
        let problems = check(
            r#"
            interface I { a: Int }
            type Query { a: Int }
            union U = Query | I | Query
            union __V = Query
            "#,
        );
        let messages = problems
            .iter()
            .map(|problem| (problem.code, problem.message.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            messages,
            [
                (
                    DiagnosticCode::UnionTypeError,
                    r#"The union "U" has interface type "I" as a member, but members must be object types."#
                ),
                (
                    DiagnosticCode::UnionTypeError,
                    r#"The union "U" includes "Query" more than once."#
                ),
                (
                    DiagnosticCode::UnionTypeError,
                    r#"The union "__V" must not have a name starting with "__"."#
                ),
            ]
        );
    }
}
