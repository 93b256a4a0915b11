use std::collections::BTreeSet;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::ast;
use apollo_compiler::name;
use indexmap::IndexMap;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use sdl_compiler::CancellationToken;
use sdl_compiler::DiagnosticCode;
use sdl_compiler::RuntimeWiring;
use sdl_compiler::Schema;
use sdl_compiler::SchemaBuildError;
use sdl_compiler::SchemaGenerator;
use sdl_compiler::SchemaGeneratorOptions;
use sdl_compiler::registry::is_built_in_scalar;
use sdl_compiler::schema::FieldType;
use sdl_compiler::schema::NamedTypeRef;
use sdl_compiler::schema::SchemaType;
use sdl_compiler::wiring::BoxError;
use sdl_compiler::wiring::CodeRegistry;
use sdl_compiler::wiring::DataFetcher;
use sdl_compiler::wiring::DataFetchingEnvironment;
use sdl_compiler::wiring::EnumValuesProvider;
use sdl_compiler::wiring::FieldCoordinate;
use sdl_compiler::wiring::TypeRuntimeWiring;
use sdl_compiler::wiring::WiringFactory;
use serde_json::Value;
use serde_json::json;

use crate::mocked_wiring;
use crate::parse;
use crate::render;

fn unexecutable(sdl: &str) -> Schema {
    SchemaGenerator::default()
        .make_unexecutable_schema(parse(sdl))
        .unwrap()
}

fn codes(schema: &Schema) -> Vec<DiagnosticCode> {
    schema.problems().iter().map(|problem| problem.code).collect()
}

struct Constant(Value);

impl DataFetcher for Constant {
    fn fetch(&self, _environment: &DataFetchingEnvironment<'_>) -> Result<Value, BoxError> {
        Ok(self.0.clone())
    }
}

fn fetch(schema: &Schema, type_name: Name, field_name: Name) -> Value {
    let source = json!({ "name": "from source" });
    let arguments = IndexMap::new();
    schema
        .code_registry()
        .data_fetcher(&type_name, &field_name)
        .fetch(&DataFetchingEnvironment {
            parent_type: &type_name,
            field_name: &field_name,
            source: &source,
            arguments: &arguments,
        })
        .unwrap()
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Schema>();
};

#[test]
fn every_declared_type_is_built() {
    let sdl = r#"
        type Query { user(id: ID!): User }
        type User implements Node { id: ID! name: String role: Role }
        interface Node { id: ID! }
        enum Role { ADMIN USER }
        input Unused { a: Int }
        scalar Date
        union Result = User
        directive @audit(level: Int) on FIELD_DEFINITION
        directive @internal on OBJECT | ENUM
    "#;
    let schema = unexecutable(sdl);
    assert!(schema.problems().is_empty(), "{}", render(schema.problems()));

    let mut registry = parse(sdl);
    registry.add_builtin_directives();
    let declared = registry
        .type_names()
        .map(|name| name.to_string())
        .collect::<BTreeSet<_>>();
    let built = schema
        .type_names()
        .filter(|name| !is_built_in_scalar(name))
        .map(|name| name.to_string())
        .collect::<BTreeSet<_>>();
    assert_eq!(built, declared);
    for name in ["ID", "String", "Boolean"] {
        assert!(schema.get_scalar(name).is_some(), "{name} was not built");
    }
    assert!(schema.get_scalar("Float").is_none());

    let declared = registry
        .directive_definitions()
        .map(|directive| directive.name.to_string())
        .collect::<BTreeSet<_>>();
    let built = schema
        .directive_names()
        .map(|name| name.to_string())
        .collect::<BTreeSet<_>>();
    assert_eq!(built, declared);
    for name in ["audit", "internal", "deprecated", "include", "skip", "specifiedBy", "oneOf"] {
        assert!(built.contains(name), "@{name} was not built");
    }
}

#[test]
fn additional_types_are_the_unreachable_ones() {
    let sdl = r#"
        type Query { a: A }
        type A { b: Int }
        type Orphan { c: C }
        type C { d: Int }
    "#;
    let schema = unexecutable(sdl);
    assert_eq!(
        schema
            .additional_types()
            .iter()
            .map(Name::as_str)
            .collect::<Vec<_>>(),
        ["C", "Orphan"]
    );

    let schema = SchemaGenerator::new(SchemaGeneratorOptions::default().additional_types(false))
        .make_unexecutable_schema(parse(sdl))
        .unwrap();
    assert!(schema.get_type("Orphan").is_none());
    assert!(schema.get_type("C").is_none());
    assert!(schema.additional_types().is_empty());
}

#[test]
fn cycles_resolve_to_the_types_they_name() {
    let schema = unexecutable(
        r#"
        type Query { me: User }
        type User { friends: [User!]! best: User home: Query }
        input Tree { children: [Tree] parent: Tree }
        type Mutation { plant(tree: Tree): Boolean }
        "#,
    );
    let mut references = 0;
    for ty in schema.types() {
        let types = match ty {
            SchemaType::Object(object) => object
                .fields
                .values()
                .map(|field| field.ty.clone())
                .chain(
                    object
                        .fields
                        .values()
                        .flat_map(|field| field.arguments.values())
                        .map(|argument| argument.ty.clone()),
                )
                .collect::<Vec<_>>(),
            SchemaType::InputObject(input) => {
                input.fields.values().map(|field| field.ty.clone()).collect()
            }
            _ => Vec::new(),
        };
        for field_type in types {
            let reference = field_type.inner_named_type();
            assert!(reference.is_resolved(), "{reference:?} in {}", ty.name());
            assert_eq!(schema.resolve(reference).unwrap().name(), reference.name());
            references += 1;
        }
    }
    assert_eq!(references, 8);

    let friends = &schema.get_object("User").unwrap().field("friends").unwrap().ty;
    assert_eq!(friends.to_string(), "[User!]!");
    assert!(matches!(friends, FieldType::NonNull(_)));
}

#[test]
fn roots_default_to_their_conventional_names() {
    let schema = unexecutable(
        r#"
        type Query { a: Int }
        type Mutation { b: Int }
        type Subscription { c: Int }
        "#,
    );
    assert_eq!(schema.query_type().name, "Query");
    assert_eq!(schema.mutation_type().unwrap().name, "Mutation");
    assert_eq!(schema.subscription_type().unwrap().name, "Subscription");
}

#[test]
fn interfaces_and_unions_know_their_possible_types() {
    let schema = unexecutable(
        r#"
        interface Node { id: ID! }
        interface Resource implements Node { id: ID! url: String }
        type Image implements Resource & Node { id: ID! url: String }
        type Text implements Node { id: ID! }
        union Media = Image | Text
        type Query { node: Node media: [Media] }
        "#,
    );
    let names = |abstract_type: &str| {
        schema
            .possible_types(abstract_type)
            .iter()
            .map(|object| object.name.to_string())
            .collect::<BTreeSet<_>>()
    };
    assert_eq!(names("Node"), BTreeSet::from(["Image".to_owned(), "Text".to_owned()]));
    assert_eq!(names("Resource"), BTreeSet::from(["Image".to_owned()]));
    assert_eq!(names("Media"), BTreeSet::from(["Image".to_owned(), "Text".to_owned()]));
    assert!(schema.code_registry().type_resolver("Node").is_some());
    assert!(schema.code_registry().type_resolver("Media").is_some());
}

#[test]
fn an_empty_union_is_reported_and_still_built() {
    let schema = unexecutable("union Nothing type Query { nothing: Nothing }");
    assert_eq!(codes(&schema), [DiagnosticCode::UnionTypeError]);
    assert!(schema.get_union("Nothing").unwrap().members.is_empty());
    assert!(schema.possible_types("Nothing").is_empty());
}

#[test]
fn data_fetchers_come_from_the_wiring() {
    struct Factory;

    impl WiringFactory for Factory {
        fn data_fetcher(
            &self,
            _parent_type: &Name,
            field: &ast::FieldDefinition,
        ) -> Option<Arc<dyn DataFetcher>> {
            (field.name == "fromFactory").then(|| -> Arc<dyn DataFetcher> {
                Arc::new(Constant(json!("factory")))
            })
        }
    }

    let wiring = RuntimeWiring::builder()
        .type_wiring(
            TypeRuntimeWiring::new(name!("Query"))
                .data_fetcher(name!("explicit"), Constant(json!("explicit"))),
        )
        .type_wiring(
            TypeRuntimeWiring::new(name!("User")).default_data_fetcher(Constant(json!("user"))),
        )
        .wiring_factory(Factory)
        .build();
    let schema = SchemaGenerator::default()
        .make_executable_schema(
            parse(
                r#"
                type Query { explicit: String fromFactory: String name: String user: User }
                type User { id: ID fromFactory: String }
                "#,
            ),
            &wiring,
        )
        .unwrap();
    assert!(schema.problems().is_empty(), "{}", render(schema.problems()));

    assert_eq!(fetch(&schema, name!("Query"), name!("explicit")), "explicit");
    assert_eq!(fetch(&schema, name!("Query"), name!("fromFactory")), "factory");
    // No wiring at all: the property of the same name is read.
    assert_eq!(fetch(&schema, name!("Query"), name!("name")), "from source");
    assert_eq!(fetch(&schema, name!("User"), name!("id")), "user");
    // The factory wins over the type's default fetcher.
    assert_eq!(fetch(&schema, name!("User"), name!("fromFactory")), "factory");
}

#[test]
fn a_seeded_code_registry_is_kept() {
    let mut seed = CodeRegistry::builder();
    seed.data_fetcher(
        FieldCoordinate::new(name!("Query"), name!("seeded")),
        Arc::new(Constant(json!("seed"))),
    )
    .data_fetcher(
        FieldCoordinate::new(name!("Query"), name!("explicit")),
        Arc::new(Constant(json!("seed"))),
    );
    let wiring = RuntimeWiring::builder()
        .code_registry(seed)
        .type_wiring(
            TypeRuntimeWiring::new(name!("Query"))
                .data_fetcher(name!("explicit"), Constant(json!("explicit"))),
        )
        .build();
    let schema = SchemaGenerator::default()
        .make_executable_schema(parse("type Query { seeded: String explicit: String }"), &wiring)
        .unwrap();
    assert_eq!(fetch(&schema, name!("Query"), name!("seeded")), "seed");
    assert_eq!(fetch(&schema, name!("Query"), name!("explicit")), "explicit");
}

#[test]
fn enum_values_come_from_the_provider() {
    struct Ranks;

    impl EnumValuesProvider for Ranks {
        fn value(&self, name: &str) -> Option<Value> {
            match name {
                "LOW" => Some(json!(1)),
                "HIGH" => Some(json!(10)),
                _ => None,
            }
        }
    }

    let wiring = RuntimeWiring::builder()
        .type_wiring(TypeRuntimeWiring::new(name!("Rank")).enum_values(Ranks))
        .build();
    let schema = SchemaGenerator::default()
        .make_executable_schema(
            parse("enum Rank { LOW HIGH OTHER } type Query { rank: Rank }"),
            &wiring,
        )
        .unwrap();
    let rank = schema.get_enum("Rank").unwrap();
    let values = rank
        .values
        .values()
        .map(|value| value.value.clone())
        .collect::<Vec<_>>();
    assert_eq!(values, [json!(1), json!(10), json!("OTHER")]);
}

#[test]
fn default_values_are_converted_with_their_types() {
    let schema = unexecutable(
        r#"
        enum Order { ASC DESC }
        input Page { size: Int = 20 order: Order = ASC tags: [String] }
        type Query { items(page: Page = { tags: "a" }, limit: Float = 1): [String] }
        "#,
    );
    let items = schema.query_type().field("items").unwrap();
    assert_eq!(
        items.argument("page").unwrap().default_value,
        Some(json!({ "tags": ["a"] }))
    );
    assert_eq!(items.argument("limit").unwrap().default_value, Some(json!(1.0)));
    let page = schema.get_input_object("Page").unwrap();
    assert_eq!(page.fields["order"].default_value, Some(json!("ASC")));
}

#[test]
fn applied_directives_carry_values_and_defaults() {
    let schema = unexecutable(
        r#"
        directive @cache(maxAge: Int = 60, scope: String) on FIELD_DEFINITION
        type Query { a: Int @cache(scope: "private") b: Int @cache }
        "#,
    );
    let query = schema.query_type();
    let a = &query.field("a").unwrap().directives[0];
    assert_eq!(a.argument("scope"), Some(&json!("private")));
    assert_eq!(a.argument("maxAge"), Some(&json!(60)));
    assert!(a.arguments["maxAge"].literal.is_none());
    let b = &query.field("b").unwrap().directives[0];
    assert_eq!(b.argument("scope"), None);
}

#[test]
fn extensions_contribute_to_the_built_types() {
    let schema = unexecutable(
        r#"
        type Query { a: Int }
        extend type Query { b: Int }
        enum E { ONE }
        extend enum E { TWO }
        input I { x: Int }
        extend input I { y: Int }
        union U = A
        extend union U = B
        type A { a: Int }
        type B { b: Int }
        "#,
    );
    let query = schema.query_type();
    assert_eq!(query.fields.keys().map(Name::as_str).collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(query.extensions.len(), 1);
    let e = schema.get_enum("E").unwrap();
    assert_eq!(e.values.keys().map(Name::as_str).collect::<Vec<_>>(), ["ONE", "TWO"]);
    let i = schema.get_input_object("I").unwrap();
    assert_eq!(i.fields.keys().map(Name::as_str).collect::<Vec<_>>(), ["x", "y"]);
    assert_eq!(schema.possible_types("U").len(), 2);
}

#[test]
fn ast_definitions_are_captured_on_request() {
    let sdl = "type Query { a: Int }";
    assert!(unexecutable(sdl).query_type().definition.is_some());

    let schema =
        SchemaGenerator::new(SchemaGeneratorOptions::default().capture_ast_definitions(false))
            .make_unexecutable_schema(parse(sdl))
            .unwrap();
    assert!(schema.query_type().definition.is_none());
    assert!(schema.query_type().field("a").unwrap().definition.is_none());
}

#[test]
fn problems_are_attached_to_the_schema() {
    let schema = unexecutable(
        r#"
        type Query { a: Int a: String }
        enum E { ONE ONE }
        "#,
    );
    assert_eq!(
        codes(&schema),
        [DiagnosticCode::NonUniqueName, DiagnosticCode::NonUniqueName]
    );
    // The first definition of a name wins.
    assert_eq!(schema.query_type().field("a").unwrap().ty.to_string(), "Int");
    assert_eq!(schema.get_enum("E").unwrap().values.len(), 1);
}

#[test]
fn strict_mode_fails_on_problems() {
    let generator = SchemaGenerator::new(SchemaGeneratorOptions::default().strict_mode(true));
    let error = generator
        .make_unexecutable_schema(parse("type Query { a: Missing }"))
        .unwrap_err();
    let SchemaBuildError::Problem(problems) = &error else {
        panic!("unexpected error {error}");
    };
    assert_eq!(problems.len(), 1);
    assert_snapshot!(error, @r###"
    the schema has 1 problem(s):
    [MISSING_TYPE] The type "Missing" used by "Query.a" is not defined.
    "###);

    assert!(
        generator
            .make_unexecutable_schema(parse("type Query { a: Int }"))
            .is_ok()
    );
}

#[test]
fn unbuildable_schemas_become_a_placeholder() {
    let schema = unexecutable("type Query { a: Missing }");
    assert_eq!(
        codes(&schema),
        [DiagnosticCode::MissingType, DiagnosticCode::InternalError]
    );
    assert_eq!(schema.query_type().name, "Query");
    assert!(schema.query_type().fields.is_empty());
    assert_eq!(schema.types().count(), 1);
}

#[test]
fn a_missing_query_root_becomes_a_placeholder() {
    let schema = unexecutable("type Other { a: Int }");
    assert_eq!(
        codes(&schema),
        [
            DiagnosticCode::QueryOperationMissing,
            DiagnosticCode::InternalError
        ]
    );
}

#[test]
fn panicking_callbacks_become_a_placeholder() {
    struct Panicking;

    impl WiringFactory for Panicking {
        fn data_fetcher(
            &self,
            _parent_type: &Name,
            _field: &ast::FieldDefinition,
        ) -> Option<Arc<dyn DataFetcher>> {
            panic!("no fetchers here")
        }
    }

    let wiring = RuntimeWiring::builder().wiring_factory(Panicking).build();
    let schema = SchemaGenerator::default()
        .make_executable_schema(parse("type Query { a: Int }"), &wiring)
        .unwrap();
    let [problem] = schema.problems() else {
        panic!("expected one problem, got {}", render(schema.problems()));
    };
    assert_eq!(problem.code, DiagnosticCode::InternalError);
    assert_snapshot!(problem.message, @"the schema could not be built: internal error: a callback panicked: no fetchers here");
}

#[test]
fn cancellation_aborts_the_build() {
    let token = CancellationToken::new();
    token.cancel();
    let error = SchemaGenerator::default()
        .make_executable_schema_with_cancellation(
            parse("type Query { a: Int }"),
            &mocked_wiring(),
            &token,
        )
        .unwrap_err();
    assert!(error.is_cancelled(), "{error}");

    let strict = SchemaGenerator::new(SchemaGeneratorOptions::default().strict_mode(true));
    let error = strict
        .make_executable_schema_with_cancellation(
            parse("type Query { a: Missing }"),
            &mocked_wiring(),
            &token,
        )
        .unwrap_err();
    assert!(error.is_cancelled(), "{error}");
}

#[test]
fn schemas_are_shared_across_threads() {
    let schema = Arc::new(unexecutable("type Query { a: Int }"));
    let handles = (0..4)
        .map(|_| {
            let schema = schema.clone();
            std::thread::spawn(move || schema.query_type().fields.len())
        })
        .collect::<Vec<_>>();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}

#[test]
fn references_stay_within_the_arena() {
    let schema = unexecutable("type Query { a: A } type A { q: Query }");
    let a = schema.get_object("A").unwrap();
    let NamedTypeRef::Resolved { index, .. } = a.field("q").unwrap().ty.inner_named_type() else {
        panic!("unresolved reference");
    };
    assert!(*index < schema.types().count());
}
