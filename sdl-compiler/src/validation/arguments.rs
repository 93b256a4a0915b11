//! Checks that a literal written in the SDL fits the input type it is given for.

use std::fmt;

use apollo_compiler::Name;
use apollo_compiler::ast;
use indexmap::IndexSet;

use crate::registry::TypeDefinition;
use crate::registry::TypeDefinitionRegistry;
use crate::wiring::RuntimeWiring;

#[derive(Clone, Debug, PartialEq, Eq)]
enum PathSegment {
    Field(Name),
    Index(usize),
}

/// Why a literal does not fit its type, and where inside the literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LiteralError {
    path: Vec<PathSegment>,
    reason: String,
}

impl LiteralError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            reason: reason.into(),
        }
    }

    fn inside(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return f.write_str(&self.reason);
        }
        f.write_str("at \"")?;
        for (i, segment) in self.path.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        write!(f, "\": {}", self.reason)
    }
}

fn is_list(ty: &ast::Type) -> bool {
    matches!(ty, ast::Type::List(_) | ast::Type::NonNullList(_))
}

pub(crate) struct LiteralChecker<'a> {
    pub(crate) registry: &'a TypeDefinitionRegistry,
    pub(crate) wiring: &'a RuntimeWiring,
}

impl LiteralChecker<'_> {
    /// Returns the first part of `literal` that does not fit `ty`.
    pub(crate) fn check(&self, literal: &ast::Value, ty: &ast::Type) -> Result<(), LiteralError> {
        let is_null = matches!(literal, ast::Value::Null);
        match ty {
            ast::Type::NonNullNamed(_) | ast::Type::NonNullList(_) if is_null => Err(
                LiteralError::new(format!("null is not allowed for the non-null type {ty}")),
            ),
            _ if is_null => Ok(()),
            ast::Type::Named(name) | ast::Type::NonNullNamed(name) => {
                self.check_named(literal, name)
            }
            ast::Type::List(item) | ast::Type::NonNullList(item) => self.check_list(literal, item),
        }
    }

    fn check_list(&self, literal: &ast::Value, item_type: &ast::Type) -> Result<(), LiteralError> {
        let ast::Value::List(items) = literal else {
            // A single value stands for a list of one.
            return self.check(literal, item_type);
        };
        for (index, item) in items.iter().enumerate() {
            if is_list(item_type) && !matches!(**item, ast::Value::List(_) | ast::Value::Null) {
                return Err(LiteralError::new(format!(
                    "expected a nested list of type {item_type}, got {item}"
                ))
                .inside(PathSegment::Index(index)));
            }
            self.check(item, item_type)
                .map_err(|error| error.inside(PathSegment::Index(index)))?;
        }
        Ok(())
    }

    fn check_named(&self, literal: &ast::Value, type_name: &Name) -> Result<(), LiteralError> {
        if let ast::Value::Variable(variable) = literal {
            return Err(LiteralError::new(format!(
                "the variable ${variable} cannot be used in a schema definition"
            )));
        }
        let Some(definition) = self.registry.get_type(type_name) else {
            return Err(LiteralError::new(format!(
                r#"the type "{type_name}" is not defined"#
            )));
        };
        match definition {
            TypeDefinition::Scalar(_) => {
                if matches!(
                    literal,
                    ast::Value::List(_) | ast::Value::Enum(_) | ast::Value::Object(_)
                ) {
                    return Err(LiteralError::new(format!(
                        "{literal} is not a valid {type_name} literal"
                    )));
                }
                match self.wiring.coercing_for(definition) {
                    Some(coercing) => coercing.parse_literal(literal).map(drop).map_err(|error| {
                        LiteralError::new(format!(
                            "{literal} is not a valid {type_name}: {error}"
                        ))
                    }),
                    // Reported by the wiring checks when they are enabled.
                    None => Ok(()),
                }
            }
            TypeDefinition::Enum(_) => {
                let ast::Value::Enum(value) = literal else {
                    return Err(LiteralError::new(format!(
                        "expected a value of enum {type_name}, got {literal}"
                    )));
                };
                let defined = self
                    .registry
                    .all_enum_values(type_name)
                    .iter()
                    .any(|defined| defined.value == *value);
                if defined {
                    Ok(())
                } else {
                    Err(LiteralError::new(format!(
                        r#"the enum {type_name} has no value "{value}""#
                    )))
                }
            }
            TypeDefinition::InputObject(_) => self.check_input_object(literal, type_name),
            TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
                Err(LiteralError::new(format!(
                    "{} type {type_name} cannot have a literal value",
                    definition.kind()
                )))
            }
        }
    }

    fn check_input_object(
        &self,
        literal: &ast::Value,
        type_name: &Name,
    ) -> Result<(), LiteralError> {
        let ast::Value::Object(entries) = literal else {
            return Err(LiteralError::new(format!(
                "expected an object for input type {type_name}, got {literal}"
            )));
        };
        let fields = self.registry.input_fields(type_name);
        let mut seen = IndexSet::new();
        for (name, value) in entries {
            if !seen.insert(name) {
                return Err(LiteralError::new(format!(
                    r#"the field "{name}" is given more than once"#
                )));
            }
            let Some(field) = fields.get(name) else {
                return Err(LiteralError::new(format!(
                    r#"the input type {type_name} has no field "{name}""#
                )));
            };
            self.check(value, &field.ty)
                .map_err(|error| error.inside(PathSegment::Field(name.clone())))?;
        }
        for (name, field) in &fields {
            let required = field.ty.is_non_null() && field.default_value.is_none();
            if required && !seen.contains(name) {
                return Err(LiteralError::new(format!(
                    r#"the required field "{name}" of {type_name} is missing"#
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::validation::test_helpers::registry;

    const TYPES: &str = r#"
        enum Color { RED GREEN }
        input Point { x: Int! y: Int! = 0 }
        input Filter { name: String colors: [Color!] points: [[Point]] }
        type Query { a: Int }
    "#;

    /// Checks `literal` against `ty`, returning the error message.
    fn check(literal: &str, ty: &str) -> Result<(), String> {
        let registry = registry(&format!(
            "{TYPES} directive @d(v: {ty}) on SCALAR scalar S @d(v: {literal})"
        ));
        let directive = registry
            .scalars()
            .find(|scalar| scalar.name == "S")
            .unwrap()
            .directives[0]
            .clone();
        let declared = registry.directive_definition("d").unwrap().arguments[0].clone();
        let wiring = RuntimeWiring::default();
        LiteralChecker {
            registry: &registry,
            wiring: &wiring,
        }
        .check(&directive.arguments[0].value, &declared.ty)
        .map_err(|error| error.to_string())
    }

    #[test]
    fn scalars_use_their_coercing() {
        assert_eq!(check("1", "Int"), Ok(()));
        assert_eq!(check("1", "Float"), Ok(()));
        assert_eq!(
            check("RED", "String"),
            Err("RED is not a valid String literal".to_owned())
        );
        assert!(check(r#""1""#, "Int").is_err());
    }

    #[test]
    fn nulls_and_non_nulls() {
        assert_eq!(check("null", "Int"), Ok(()));
        assert_eq!(
            check("null", "Int!"),
            Err("null is not allowed for the non-null type Int!".to_owned())
        );
    }

    #[test]
    fn lists_accept_single_values() {
        assert_eq!(check("RED", "[Color!]"), Ok(()));
        assert_eq!(
            check("[RED, BLUE]", "[Color]"),
            Err(r#"at "[1]": the enum Color has no value "BLUE""#.to_owned())
        );
    }

    #[test]
    fn nested_lists_need_list_items() {
        assert_eq!(check("[[1], [2, 3]]", "[[Int]]"), Ok(()));
        assert_eq!(
            check("[[1], 2]", "[[Int]]"),
            Err(r#"at "[1]": expected a nested list of type [Int], got 2"#.to_owned())
        );
    }

    #[test]
    fn input_objects_are_checked_field_by_field() {
        assert_eq!(
            check("{ name: \"a\", points: [[{ x: 1 }]] }", "Filter"),
            Ok(())
        );
        assert_eq!(
            check("{ name: 1 }", "Filter"),
            Err(
                r#"at "name": 1 is not a valid String: cannot parse literal: expected a String, got an Int"#
                    .to_owned()
            )
        );
        assert_eq!(
            check("{ points: [[{ y: 1 }]] }", "Filter"),
            Err(r#"at "points[0][0]": the required field "x" of Point is missing"#.to_owned())
        );
        assert_eq!(
            check("{ other: 1 }", "Filter"),
            Err(r#"the input type Filter has no field "other""#.to_owned())
        );
        assert_eq!(
            check("{ name: \"a\", name: \"b\" }", "Filter"),
            Err(r#"the field "name" is given more than once"#.to_owned())
        );
    }
}
