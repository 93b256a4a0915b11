use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaCoordinate;
use crate::registry::TypeDefinition;
use crate::registry::is_built_in_scalar;
use crate::wiring::RuntimeWiring;

/// Abstract types need a type resolver and custom scalars need a coercing to be executable.
pub(crate) fn validate_wiring(
    wiring: &RuntimeWiring,
    definition: &TypeDefinition,
    errors: &mut Vec<Diagnostic>,
) {
    let name = definition.name();
    let diagnostic = match definition {
        TypeDefinition::Interface(_) | TypeDefinition::Union(_)
            if wiring.type_resolver_for(definition).is_none() =>
        {
            Diagnostic::new(
                DiagnosticCode::MissingTypeResolver,
                format!(
                    r#"The {} "{name}" has no type resolver."#,
                    definition.kind()
                ),
            )
        }
        TypeDefinition::Scalar(_)
            if !is_built_in_scalar(name) && wiring.coercing_for(definition).is_none() =>
        {
            Diagnostic::new(
                DiagnosticCode::MissingScalarImplementation,
                format!(r#"The scalar "{name}" has no coercing implementation."#),
            )
        }
        _ => return,
    };
    errors.push(
        diagnostic
            .at(SchemaCoordinate::Type(name.clone()))
            .located(definition.location()),
    );
}
