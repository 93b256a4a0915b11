//! Semantic checks over a [`TypeDefinitionRegistry`].
//!
//! Every rule appends [`Diagnostic`]s and lets the others run; nothing here fails except
//! cancellation.

use crate::cancellation::CancellationToken;
use crate::error::Cancelled;
use crate::error::Diagnostic;
use crate::registry::TypeDefinition;
use crate::registry::TypeDefinitionRegistry;
use crate::wiring::RuntimeWiring;

mod arguments;
mod directives;
mod extensions;
mod implementing;
mod names;
mod references;
mod schema_root;
mod unions;
mod wiring;

/// Checks a registry before it is built into a schema.
#[derive(Clone, Debug)]
pub struct SchemaTypeChecker {
    enforce_wiring: bool,
}

impl Default for SchemaTypeChecker {
    fn default() -> Self {
        Self {
            enforce_wiring: true,
        }
    }
}

impl SchemaTypeChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether to report abstract types without a type resolver and custom scalars without a
    /// coercing. On by default.
    pub fn enforce_wiring(mut self, enforce_wiring: bool) -> Self {
        self.enforce_wiring = enforce_wiring;
        self
    }

    /// Returns every problem found in `registry`, starting with the ones recorded while it was
    /// populated.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn check_type_registry(
        &self,
        registry: &TypeDefinitionRegistry,
        wiring: &RuntimeWiring,
        token: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let mut errors = registry.errors().to_vec();

        token.check()?;
        schema_root::validate_schema_root(registry, &mut errors);
        extensions::validate_type_extensions(registry, &mut errors);

        for definition in registry.types() {
            token.check()?;
            references::validate_type_references(registry, definition, &mut errors);
            names::validate_names(registry, definition, &mut errors);
            match definition {
                TypeDefinition::Object(_) | TypeDefinition::Interface(_) => {
                    implementing::validate_implementing_type(registry, definition, &mut errors)
                }
                TypeDefinition::Union(_) => {
                    unions::validate_union(registry, definition, &mut errors)
                }
                TypeDefinition::Scalar(_)
                | TypeDefinition::Enum(_)
                | TypeDefinition::InputObject(_) => {}
            }
            if self.enforce_wiring {
                wiring::validate_wiring(wiring, definition, &mut errors);
            }
        }

        for directive in registry.directive_definitions() {
            token.check()?;
            directives::validate_directive_definition(registry, directive, &mut errors);
        }
        directives::validate_directive_usages(registry, wiring, token, &mut errors)?;

        tracing::debug!(problems = errors.len(), "checked type registry");
        Ok(errors)
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use apollo_compiler::ast;

    use super::*;
    use crate::error::DiagnosticCode;
    use crate::wiring::MockedWiringFactory;

    pub(crate) fn registry(sdl: &str) -> TypeDefinitionRegistry {
        let mut registry = TypeDefinitionRegistry::new();
        registry.add_document(ast::Document::parse(sdl, "schema.graphql").unwrap());
        registry.add_builtin_directives();
        registry
    }

    /// Problems found with a wiring that provides everything.
    pub(crate) fn check(sdl: &str) -> Vec<Diagnostic> {
        let wiring = RuntimeWiring::builder()
            .wiring_factory(MockedWiringFactory)
            .build();
        SchemaTypeChecker::new()
            .check_type_registry(&registry(sdl), &wiring, &CancellationToken::new())
            .unwrap()
    }

    pub(crate) fn codes(sdl: &str) -> Vec<DiagnosticCode> {
        check(sdl).iter().map(|problem| problem.code).collect()
    }
}
