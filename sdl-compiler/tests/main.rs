use itertools::Itertools;
use sdl_compiler::CancellationToken;
use sdl_compiler::Diagnostic;
use sdl_compiler::DiagnosticCode;
use sdl_compiler::RuntimeWiring;
use sdl_compiler::SchemaParser;
use sdl_compiler::SchemaTypeChecker;
use sdl_compiler::TypeDefinitionRegistry;
use sdl_compiler::wiring::MockedWiringFactory;

mod generator;
mod validation;

pub(crate) fn parse(sdl: &str) -> TypeDefinitionRegistry {
    SchemaParser::parse(sdl, "schema.graphql").unwrap()
}

/// Wiring that satisfies every wiring check.
pub(crate) fn mocked_wiring() -> RuntimeWiring {
    RuntimeWiring::builder()
        .wiring_factory(MockedWiringFactory)
        .build()
}

pub(crate) fn check(sdl: &str) -> Vec<Diagnostic> {
    let mut registry = parse(sdl);
    registry.add_builtin_directives();
    SchemaTypeChecker::new()
        .check_type_registry(&registry, &mocked_wiring(), &CancellationToken::new())
        .unwrap()
}

pub(crate) fn codes(sdl: &str) -> Vec<DiagnosticCode> {
    check(sdl).iter().map(|problem| problem.code).collect()
}

/// One problem per line, for snapshots.
pub(crate) fn render(problems: &[Diagnostic]) -> String {
    problems.iter().join("\n")
}
