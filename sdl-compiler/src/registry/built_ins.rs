use std::sync::LazyLock;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use indexmap::IndexMap;

use super::TypeDefinition;

const BUILT_IN_DEFINITIONS: &str = r#"
"The `Int` scalar type represents non-fractional signed whole numeric values. Int can represent values between -(2^31) and 2^31 - 1."
scalar Int

"The `Float` scalar type represents signed double-precision fractional values as specified by [IEEE 754](https://en.wikipedia.org/wiki/IEEE_floating_point)."
scalar Float

"The `String` scalar type represents textual data, represented as UTF-8 character sequences. The String type is most often used by GraphQL to represent free-form human-readable text."
scalar String

"The `Boolean` scalar type represents `true` or `false`."
scalar Boolean

"The `ID` scalar type represents a unique identifier, often used to refetch an object or as key for a cache. The ID type appears in a JSON response as a String; however, it is not intended to be human-readable. When expected as an input type, any string (such as `\"4\"`) or integer (such as `4`) input value will be accepted as an ID."
scalar ID

"Directs the executor to include this field or fragment only when the `if` argument is true."
directive @include(
  "Included when true."
  if: Boolean!
) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT

"Directs the executor to skip this field or fragment when the `if` argument is true."
directive @skip(
  "Skipped when true."
  if: Boolean!
) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT

"Marks an element of a GraphQL schema as no longer supported."
directive @deprecated(
  "Explains why this element was deprecated, usually also including a suggestion for how to access supported similar data. Formatted using the Markdown syntax, as specified by [CommonMark](https://commonmark.org/)."
  reason: String = "No longer supported"
) on FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE

"Exposes a URL that specifies the behavior of this scalar."
directive @specifiedBy(
  "The URL that specifies the behavior of this scalar."
  url: String!
) on SCALAR

"Indicates exactly one field must be supplied and this field must not be `null`."
directive @oneOf on INPUT_OBJECT
"#;

pub(crate) const DEPRECATED_DIRECTIVE_NAME: &str = "deprecated";
pub(crate) const DEPRECATED_REASON_ARGUMENT_NAME: &str = "reason";
pub(crate) const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";
pub(crate) const SPECIFIED_BY_DIRECTIVE_NAME: &str = "specifiedBy";
pub(crate) const SPECIFIED_BY_URL_ARGUMENT_NAME: &str = "url";

struct BuiltIns {
    scalars: IndexMap<Name, TypeDefinition>,
    directives: IndexMap<Name, Node<ast::DirectiveDefinition>>,
}

static BUILT_INS: LazyLock<BuiltIns> = LazyLock::new(|| {
    let document = ast::Document::parse(BUILT_IN_DEFINITIONS, "built_in.graphql")
        .expect("built-in definitions are valid SDL");
    let mut scalars = IndexMap::new();
    let mut directives = IndexMap::new();
    for definition in document.definitions {
        match definition {
            ast::Definition::ScalarTypeDefinition(scalar) => {
                scalars.insert(scalar.name.clone(), TypeDefinition::Scalar(scalar));
            }
            ast::Definition::DirectiveDefinition(directive) => {
                directives.insert(directive.name.clone(), directive);
            }
            _ => {}
        }
    }
    BuiltIns {
        scalars,
        directives,
    }
});

/// The five scalars every GraphQL schema has without declaring them.
pub fn built_in_scalar(name: &str) -> Option<&'static TypeDefinition> {
    BUILT_INS.scalars.get(name)
}

pub fn is_built_in_scalar(name: &str) -> bool {
    BUILT_INS.scalars.contains_key(name)
}

/// The directives defined by the GraphQL specification.
pub(crate) fn built_in_directives() -> impl Iterator<Item = &'static Node<ast::DirectiveDefinition>>
{
    BUILT_INS.directives.values()
}

pub fn is_built_in_directive(name: &str) -> bool {
    BUILT_INS.directives.contains_key(name)
}
