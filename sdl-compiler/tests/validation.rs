use apollo_compiler::Name;
use apollo_compiler::name;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use sdl_compiler::CancellationToken;
use sdl_compiler::DiagnosticCode;
use sdl_compiler::RuntimeWiring;
use sdl_compiler::SchemaCoordinate;
use sdl_compiler::SchemaTypeChecker;
use sdl_compiler::wiring::ScalarWiring;
use sdl_compiler::wiring::StringCoercing;
use sdl_compiler::wiring::TypeResolutionEnvironment;
use sdl_compiler::wiring::TypeResolver;
use sdl_compiler::wiring::TypeRuntimeWiring;

use crate::check;
use crate::codes;
use crate::parse;
use crate::render;

#[test]
fn a_minimal_schema_is_valid() {
    assert!(check("type Query { a: String }").is_empty());
}

#[test]
fn implementing_types_must_declare_every_interface_field() {
    let valid = r#"
        interface Node { id: ID! }
        type A implements Node { id: ID! }
        type Query { node: Node }
    "#;
    assert!(check(valid).is_empty());

    let problems = check(
        r#"
        interface Node { id: ID! }
        type A implements Node { name: String }
        type Query { node: Node }
        "#,
    );
    assert_snapshot!(render(&problems), @r###"[MISSING_INTERFACE_FIELD] The object "A" does not have a field "id" required by the interface "Node"."###);
    assert_eq!(
        problems[0].coordinate,
        Some(SchemaCoordinate::Member {
            type_name: name!("A"),
            member: name!("id"),
        })
    );
}

#[test]
fn transitive_interfaces_must_be_listed() {
    let problems = check(
        r#"
        interface I { id: ID! }
        interface J implements I { id: ID! name: String }
        type T implements J { id: ID! name: String }
        type Query { t: T }
        "#,
    );
    assert_snapshot!(render(&problems), @r###"[MISSING_TRANSITIVE_INTERFACE] The object "T" must implement "I" because it is implemented by "J"."###);
}

#[test]
fn implementing_fields_may_narrow_their_types() {
    let sdl = r#"
        interface Node { id: ID! }
        interface Named { name: String friends: [Named] }
        type Person implements Named & Node {
          id: ID!
          name: String!
          friends: [Person!]!
        }
        type Query { node: Node }
    "#;
    assert!(check(sdl).is_empty());

    let widened = r#"
        interface Named { name: String! }
        type Person implements Named { name: String }
        type Query { named: Named }
    "#;
    assert_eq!(codes(widened), [DiagnosticCode::InterfaceFieldRedefinition]);
}

#[test]
fn implementing_field_arguments() {
    let problems = codes(
        r#"
        interface Search { find(term: String, limit: Int = 10): [String] }
        type A implements Search { find(limit: Int = 5): [String] }
        type B implements Search { find(term: String, limit: Int = 10, exact: Boolean!): [String] }
        type Query { search: Search }
        "#,
    );
    assert_eq!(
        problems,
        [
            DiagnosticCode::MissingInterfaceFieldArguments,
            DiagnosticCode::InterfaceArgumentRedefinition,
            DiagnosticCode::InterfaceFieldArgumentNotOptional,
        ]
    );
}

#[test]
fn interface_cycles() {
    let problems = codes(
        r#"
        interface A implements B { id: ID }
        interface B implements A { id: ID }
        type C implements C { id: ID }
        type Query { a: A }
        "#,
    );
    assert!(problems.contains(&DiagnosticCode::CircularImplementationHierarchy));
    assert!(problems.contains(&DiagnosticCode::ImplementingItself));
}

#[test]
fn unions_need_object_members() {
    let problems = check(
        r#"
        union Empty
        union Mixed = A | A | I
        interface I { id: ID }
        type A { id: ID }
        type Query { empty: Empty mixed: Mixed }
        "#,
    );
    assert_snapshot!(render(&problems), @r###"
    [UNION_TYPE_ERROR] The union "Empty" must have at least one member.
    [UNION_TYPE_ERROR] The union "Mixed" includes "A" more than once.
    [UNION_TYPE_ERROR] The union "Mixed" has interface type "I" as a member, but members must be object types.
    "###);
}

#[test]
fn references_must_be_defined_and_used_in_the_right_position() {
    let problems = codes(
        r#"
        input Filter { name: String, result: Result }
        type Result { value: Filter }
        type Query { search(filter: Filter, raw: Result): Missing }
        "#,
    );
    assert_eq!(
        problems,
        [
            DiagnosticCode::NotAnInputType,
            DiagnosticCode::NotAnOutputType,
            DiagnosticCode::MissingType,
            DiagnosticCode::NotAnInputType,
        ]
    );
}

#[test]
fn names_must_be_unique_and_unreserved() {
    let problems = codes(
        r#"
        type __Query { a: Int }
        type Query { a: Int a: String __b: Int f(x: Int, x: Int): Int }
        enum E { ONE ONE }
        "#,
    );
    assert_eq!(
        problems,
        [
            DiagnosticCode::IllegalName,
            DiagnosticCode::IllegalName,
            DiagnosticCode::NonUniqueArgument,
            DiagnosticCode::NonUniqueName,
            DiagnosticCode::NonUniqueName,
        ]
    );
}

#[test]
fn schema_roots() {
    assert_eq!(
        codes("type Other { a: Int }"),
        [DiagnosticCode::QueryOperationMissing]
    );
    assert_eq!(
        codes("schema { query: Q } type Q { a: Int } enum Query { A }"),
        Vec::<DiagnosticCode>::new()
    );
    assert_eq!(
        codes("schema { query: Q mutation: M } input Q { a: Int } type M { a: Int }"),
        [DiagnosticCode::OperationTypesMustBeObjects]
    );
    assert_eq!(
        codes("schema { query: Query query: Query } type Query { a: Int }"),
        [DiagnosticCode::OperationRedefinition]
    );
}

#[test]
fn extensions_need_a_base_of_the_same_kind() {
    let problems = codes(
        r#"
        type Query { a: Int }
        extend type Missing { b: Int }
        extend interface Query { c: Int }
        "#,
    );
    assert_eq!(
        problems,
        [
            DiagnosticCode::TypeExtensionMissingBaseType,
            DiagnosticCode::TypeExtensionDifferentKind,
        ]
    );
}

#[test]
fn directives_are_checked_where_they_are_used() {
    let sdl = r#"
        directive @auth(role: String!) on FIELD_DEFINITION
        type Query {
          a: Int @auth(role: "admin")
          b: Int @auth
          c: Int @auth(role: "x", other: 1)
          d: Int @auth(role: "x") @auth(role: "y")
          e: Int @unknown
        }
        type Other @auth(role: "x") { a: Int }
    "#;
    assert_eq!(
        codes(sdl),
        [
            DiagnosticCode::DirectiveMissingNonNullArgument,
            DiagnosticCode::DirectiveUnknownArgument,
            DiagnosticCode::NonUniqueDirective,
            DiagnosticCode::DirectiveUndeclared,
            DiagnosticCode::DirectiveIllegalLocation,
        ]
    );
}

#[test]
fn directive_argument_values_fit_their_types() {
    let problems = check(
        r#"
        input Filter { name: String }
        directive @filter(by: Filter) on FIELD_DEFINITION
        type Query { a: Int @filter(by: { name: 1 }) }
        "#,
    );
    assert_eq!(
        problems
            .iter()
            .map(|problem| problem.code)
            .collect::<Vec<_>>(),
        [DiagnosticCode::DirectiveIllegalArgumentType]
    );
    assert!(problems[0].message.contains(r#"at "name""#), "{}", problems[0]);
}

#[test]
fn directives_cannot_reference_themselves() {
    let problems = codes(
        r#"
        directive @loop(arg: Input @loop) on ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION
        input Input { value: Int }
        directive @deep(arg: Outer) on INPUT_FIELD_DEFINITION
        input Outer { inner: Inner }
        input Inner { value: Int @deep }
        type Query { a: Int }
        "#,
    );
    assert_eq!(
        problems,
        [
            DiagnosticCode::DirectiveIllegalReference,
            DiagnosticCode::DirectiveIllegalReference,
        ]
    );
}

#[test]
fn every_problem_is_reported() {
    let problems = codes(
        r#"
        type Query { a: Missing b: AlsoMissing }
        union U
        type Query { c: Int }
        "#,
    );
    assert_eq!(
        problems,
        [
            DiagnosticCode::TypeRedefinition,
            DiagnosticCode::MissingType,
            DiagnosticCode::MissingType,
            DiagnosticCode::UnionTypeError,
        ]
    );
}

struct NoResolution;

impl TypeResolver for NoResolution {
    fn resolve_type(&self, _environment: &TypeResolutionEnvironment<'_>) -> Option<Name> {
        None
    }
}

#[test]
fn wiring_checks() {
    let sdl = r#"
        scalar Url
        interface Node { id: ID! }
        type Query { node: Node url: Url }
    "#;
    let mut registry = parse(sdl);
    registry.add_builtin_directives();
    let token = CancellationToken::new();

    let problems = SchemaTypeChecker::new()
        .check_type_registry(&registry, &RuntimeWiring::default(), &token)
        .unwrap();
    assert_eq!(
        problems
            .iter()
            .map(|problem| problem.code)
            .collect::<Vec<_>>(),
        [
            DiagnosticCode::MissingScalarImplementation,
            DiagnosticCode::MissingTypeResolver,
        ]
    );

    let wiring = RuntimeWiring::builder()
        .scalar(ScalarWiring::new(name!("Url"), StringCoercing))
        .type_wiring(
            TypeRuntimeWiring::new(name!("Node"))
                .type_resolver(NoResolution),
        )
        .build();
    let problems = SchemaTypeChecker::new()
        .check_type_registry(&registry, &wiring, &token)
        .unwrap();
    assert!(problems.is_empty(), "{}", render(&problems));
}

#[test]
fn cancellation_stops_the_check() {
    let mut registry = parse("type Query { a: Int }");
    registry.add_builtin_directives();
    let token = CancellationToken::new();
    token.cancel();
    let result =
        SchemaTypeChecker::new().check_type_registry(&registry, &RuntimeWiring::default(), &token);
    assert_eq!(result.unwrap_err(), sdl_compiler::Cancelled);
}
