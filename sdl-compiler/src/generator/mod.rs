//! Turns a [`TypeDefinitionRegistry`] into an executable [`Schema`].
//!
//! The pipeline adds the built-in directives, validates the registry, builds every type with its
//! runtime wiring and finally runs the directive wirings over the result. Validation problems do
//! not stop the build unless [`SchemaGeneratorOptions::strict_mode`] is set; they are attached to
//! the schema instead.

use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;

use crate::cancellation::CancellationToken;
use crate::directive_wiring::apply_directive_wiring;
use crate::error::Diagnostic;
use crate::error::DiagnosticCode;
use crate::error::SchemaBuildError;
use crate::internal_error;
use crate::registry::TypeDefinitionRegistry;
use crate::schema::Schema;
use crate::validation::SchemaTypeChecker;
use crate::wiring::MockedWiringFactory;
use crate::wiring::RuntimeWiring;

mod builder;
mod options;
mod values;

pub use options::SchemaGeneratorOptions;
pub(crate) use values::literal_to_json;

use self::builder::BuildContext;

#[derive(Clone, Debug, Default)]
pub struct SchemaGenerator {
    options: SchemaGeneratorOptions,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Runs `f`, turning a panic in host code into an internal error.
fn guarded<T>(f: impl FnOnce() -> Result<T, SchemaBuildError>) -> Result<T, SchemaBuildError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(internal_error!(
            "a callback panicked: {}",
            panic_message(payload.as_ref())
        ))
    })
}

impl SchemaGenerator {
    pub fn new(options: SchemaGeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SchemaGeneratorOptions {
        &self.options
    }

    pub fn make_executable_schema(
        &self,
        registry: TypeDefinitionRegistry,
        wiring: &RuntimeWiring,
    ) -> Result<Schema, SchemaBuildError> {
        self.make_executable_schema_with_cancellation(registry, wiring, &CancellationToken::new())
    }

    /// Builds a schema whose scalars pass values through, whose abstract types resolve from
    /// `__typename` and whose fields read the property of the same name. Wiring checks are
    /// skipped.
    pub fn make_unexecutable_schema(
        &self,
        registry: TypeDefinitionRegistry,
    ) -> Result<Schema, SchemaBuildError> {
        let wiring = RuntimeWiring::builder()
            .wiring_factory(MockedWiringFactory)
            .build();
        Self::new(self.options.enforce_wiring(false)).make_executable_schema(registry, &wiring)
    }

    /// Like [`make_executable_schema`](Self::make_executable_schema), checking `token` between
    /// definitions.
    ///
    /// A schema that cannot be built is replaced by a placeholder with an
    /// [`DiagnosticCode::InternalError`] problem, unless strict mode is on.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn make_executable_schema_with_cancellation(
        &self,
        mut registry: TypeDefinitionRegistry,
        wiring: &RuntimeWiring,
        token: &CancellationToken,
    ) -> Result<Schema, SchemaBuildError> {
        registry.add_builtin_directives();

        let checker = SchemaTypeChecker::new().enforce_wiring(self.options.enforce_wiring);
        let problems = match guarded(|| Ok(checker.check_type_registry(&registry, wiring, token)?))
        {
            Ok(problems) => problems,
            Err(error) => return self.recover(error, registry.errors().to_vec(), &registry),
        };
        tracing::debug!(problems = problems.len(), "validated type registry");
        if self.options.strict_mode && !problems.is_empty() {
            return Err(SchemaBuildError::Problem(problems));
        }

        let built = guarded(|| {
            let schema =
                BuildContext::new(&registry, wiring, &self.options, token, problems.clone())
                    .build()?;
            apply_directive_wiring(schema, &registry, wiring, token)
        });
        match built {
            Ok(schema) => {
                tracing::debug!(types = schema.types().count(), "built schema");
                Ok(schema)
            }
            Err(error) => self.recover(error, problems, &registry),
        }
    }

    fn recover(
        &self,
        error: SchemaBuildError,
        mut problems: Vec<Diagnostic>,
        registry: &TypeDefinitionRegistry,
    ) -> Result<Schema, SchemaBuildError> {
        if error.is_cancelled() || self.options.strict_mode {
            return Err(error);
        }
        tracing::error!(%error, "schema could not be built, using a placeholder schema");
        problems.push(Diagnostic::new(
            DiagnosticCode::InternalError,
            format!("the schema could not be built: {error}"),
        ));
        Ok(Schema::placeholder(problems, registry.sources().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::ast;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::schema::FieldType;
    use crate::schema::NamedTypeRef;

    fn registry(sdl: &str) -> TypeDefinitionRegistry {
        let mut registry = TypeDefinitionRegistry::new();
        registry.add_document(ast::Document::parse(sdl, "schema.graphql").unwrap());
        registry
    }

    fn unexecutable(sdl: &str) -> Schema {
        SchemaGenerator::default()
            .make_unexecutable_schema(registry(sdl))
            .unwrap()
    }

    #[test]
    fn explicit_roots_win_over_default_names() {
        let schema = unexecutable(
            "schema { query: Root } type Root { a: Int } type Query { b: Int }",
        );
        assert_eq!(schema.query_type().name, "Root");
        assert!(schema.additional_types().contains("Query"));
    }

    #[test]
    fn self_references_resolve_to_their_own_slot() {
        let schema = unexecutable("type Query { me: Query }");
        let field = schema.query_type().field("me").unwrap();
        let FieldType::Named(NamedTypeRef::Resolved { name, index }) = &field.ty else {
            panic!("unexpected field type {:?}", field.ty);
        };
        assert_eq!(name, "Query");
        assert_eq!(schema.types().nth(*index).unwrap().name(), "Query");
    }

    #[test]
    fn misplaced_types_fail_the_build_with_or_without_a_cycle() {
        for sdl in [
            "type Query { f(a: Query): Int }",
            "type Query { f(a: Other): Int } type Other { x: Int }",
        ] {
            let schema = unexecutable(sdl);
            let codes = schema
                .problems()
                .iter()
                .map(|problem| problem.code)
                .collect::<Vec<_>>();
            assert_eq!(
                codes,
                [DiagnosticCode::NotAnInputType, DiagnosticCode::InternalError],
                "{sdl}"
            );
            assert!(schema.query_type().fields.is_empty(), "{sdl}");
        }
    }

    #[test]
    fn restated_built_in_scalars_keep_their_definition() {
        let schema = unexecutable("scalar String type Query { a: String b: Int }");
        assert!(schema.problems().is_empty(), "{:?}", schema.problems());
        assert!(schema.get_scalar("String").unwrap().definition.is_some());
        assert!(schema.get_scalar("Int").unwrap().definition.is_none());
    }

    #[test]
    fn deprecation_and_specified_by_are_read() {
        let schema = unexecutable(
            r#"
            scalar Url @specifiedBy(url: "https://example.com/url")
            type Query { old: Url @deprecated new: Url @deprecated(reason: "use other") }
            "#,
        );
        let query = schema.query_type();
        assert_eq!(
            query.field("old").unwrap().deprecation_reason.as_deref(),
            Some("No longer supported")
        );
        assert_eq!(
            query.field("new").unwrap().deprecation_reason.as_deref(),
            Some("use other")
        );
        assert_eq!(
            schema.get_scalar("Url").unwrap().specified_by_url.as_deref(),
            Some("https://example.com/url")
        );
    }

    #[test]
    fn strict_mode_returns_problems() {
        let result = SchemaGenerator::new(SchemaGeneratorOptions::default().strict_mode(true))
            .make_unexecutable_schema(registry("type Query { a: Missing }"));
        let Err(SchemaBuildError::Problem(problems)) = result else {
            panic!("expected problems");
        };
        assert_eq!(problems[0].code, DiagnosticCode::MissingType);
    }

    #[test]
    fn missing_types_yield_the_placeholder() {
        let schema = unexecutable("type Query { a: Missing }");
        assert_eq!(schema.query_type().fields.len(), 0);
        let codes = schema
            .problems()
            .iter()
            .map(|problem| problem.code)
            .collect::<Vec<_>>();
        assert_eq!(
            codes,
            [DiagnosticCode::MissingType, DiagnosticCode::InternalError]
        );
    }

    #[test]
    fn unreferenced_types_are_skipped_without_additional_types() {
        let schema = SchemaGenerator::new(SchemaGeneratorOptions::default().additional_types(false))
            .make_unexecutable_schema(registry("type Query { a: Int } type Orphan { b: Int }"))
            .unwrap();
        assert!(schema.get_type("Orphan").is_none());
        assert!(schema.get_type("Int").is_some());
    }
}
