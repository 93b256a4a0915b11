use apollo_compiler::ast;
use apollo_compiler::parser::SourceSpan;

use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaCoordinate;
use crate::registry::TypeDefinition;
use crate::registry::TypeDefinitionRegistry;
use crate::registry::TypeKind;

#[derive(Clone, Copy)]
enum Expected {
    Input,
    Output,
}

fn validate_type_reference(
    registry: &TypeDefinitionRegistry,
    ty: &ast::Type,
    expected: Expected,
    coordinate: SchemaCoordinate,
    location: Option<SourceSpan>,
    errors: &mut Vec<Diagnostic>,
) {
    let type_name = ty.inner_named_type();
    let Some(kind) = registry.type_kind(type_name) else {
        errors.push(
            Diagnostic::new(
                DiagnosticCode::MissingType,
                format!(r#"The type "{type_name}" used by "{coordinate}" is not defined."#),
            )
            .at(coordinate)
            .located(location),
        );
        return;
    };
    let diagnostic = match expected {
        Expected::Output if !kind.is_output() => Diagnostic::new(
            DiagnosticCode::NotAnOutputType,
            format!(r#"The field "{coordinate}" has {kind} type "{type_name}", which is not an output type."#),
        ),
        Expected::Input if !kind.is_input() => Diagnostic::new(
            DiagnosticCode::NotAnInputType,
            format!(r#""{coordinate}" has {kind} type "{type_name}", which is not an input type."#),
        ),
        _ => return,
    };
    errors.push(diagnostic.at(coordinate).located(location));
}

/// Checks that the types a definition refers to exist and are of a kind that fits where they are
/// used.
pub(crate) fn validate_type_references(
    registry: &TypeDefinitionRegistry,
    definition: &TypeDefinition,
    errors: &mut Vec<Diagnostic>,
) {
    let type_name = definition.name();
    match definition {
        TypeDefinition::Object(_) | TypeDefinition::Interface(_) => {
            for field in registry.all_fields(type_name) {
                validate_type_reference(
                    registry,
                    &field.ty,
                    Expected::Output,
                    SchemaCoordinate::member(type_name, &field.name),
                    field.location(),
                    errors,
                );
                for argument in &field.arguments {
                    validate_type_reference(
                        registry,
                        &argument.ty,
                        Expected::Input,
                        SchemaCoordinate::argument(type_name, &field.name, &argument.name),
                        argument.location(),
                        errors,
                    );
                }
            }
            for interface in registry.implemented_interfaces(type_name) {
                let diagnostic = match registry.type_kind(&interface) {
                    None => Diagnostic::new(
                        DiagnosticCode::MissingType,
                        format!(
                            r#"The type "{type_name}" implements "{interface}", which is not defined."#
                        ),
                    ),
                    Some(TypeKind::Interface) => continue,
                    Some(kind) => Diagnostic::new(
                        DiagnosticCode::MissingInterfaceType,
                        format!(
                            r#"The type "{type_name}" implements {kind} type "{interface}", which is not an interface."#
                        ),
                    ),
                };
                errors.push(
                    diagnostic
                        .at(SchemaCoordinate::Type(type_name.clone()))
                        .located(interface.location()),
                );
            }
        }
        TypeDefinition::Union(_) => {
            let mut reported = Vec::new();
            for member in registry.all_union_members(type_name) {
                if registry.has_type(member) || reported.contains(&member) {
                    continue;
                }
                reported.push(member);
                errors.push(
                    Diagnostic::new(
                        DiagnosticCode::MissingType,
                        format!(
                            r#"The union "{type_name}" has member "{member}", which is not defined."#
                        ),
                    )
                    .at(SchemaCoordinate::Type(type_name.clone()))
                    .located(member.location()),
                );
            }
        }
        TypeDefinition::InputObject(_) => {
            for field in registry.all_input_fields(type_name) {
                validate_type_reference(
                    registry,
                    &field.ty,
                    Expected::Input,
                    SchemaCoordinate::member(type_name, &field.name),
                    field.location(),
                    errors,
                );
            }
        }
        TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) => {}
    }
}
