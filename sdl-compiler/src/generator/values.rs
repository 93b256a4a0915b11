//! Conversion of SDL literals into runtime values.
//!
//! Conversion is best-effort: a literal that does not fit its type becomes `null`, and the
//! problem is logged. Validation reports such literals with a proper diagnostic.

use apollo_compiler::ast;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::registry::TypeDefinition;
use crate::registry::TypeDefinitionRegistry;
use crate::wiring::Coercing;
use crate::wiring::PassThroughCoercing;
use crate::wiring::RuntimeWiring;

/// Converts a constant literal to JSON without looking at its type. Enum values become strings.
///
/// Returns `None` if the literal contains a variable.
pub(crate) fn literal_to_json(literal: &ast::Value) -> Option<Value> {
    Some(match literal {
        ast::Value::Null => Value::Null,
        ast::Value::Enum(name) => Value::String(name.to_string()),
        ast::Value::Variable(_) => return None,
        ast::Value::String(string) => Value::String(string.clone()),
        ast::Value::Boolean(boolean) => Value::Bool(*boolean),
        ast::Value::Int(int) => match int.as_str().parse::<i64>() {
            Ok(int) => Value::from(int),
            Err(_) => Number::from_f64(int.try_to_f64().ok()?).map(Value::Number)?,
        },
        ast::Value::Float(float) => Number::from_f64(float.try_to_f64().ok()?).map(Value::Number)?,
        ast::Value::List(items) => Value::Array(
            items
                .iter()
                .map(|item| literal_to_json(item))
                .collect::<Option<_>>()?,
        ),
        ast::Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| Some((name.to_string(), literal_to_json(value)?)))
                .collect::<Option<Map<_, _>>>()?,
        ),
    })
}

/// Converts literals following the type they are written for.
pub(crate) struct ValueBuilder<'a> {
    pub(crate) registry: &'a TypeDefinitionRegistry,
    pub(crate) wiring: &'a RuntimeWiring,
}

impl ValueBuilder<'_> {
    pub(crate) fn build(&self, literal: &ast::Value, ty: &ast::Type) -> Value {
        if matches!(literal, ast::Value::Null) {
            return Value::Null;
        }
        match ty {
            ast::Type::Named(name) | ast::Type::NonNullNamed(name) => {
                self.build_named(literal, name)
            }
            ast::Type::List(inner) | ast::Type::NonNullList(inner) => match literal {
                ast::Value::List(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| self.build(item, inner))
                        .collect(),
                ),
                _ => Value::Array(vec![self.build(literal, inner)]),
            },
        }
    }

    fn build_named(&self, literal: &ast::Value, type_name: &str) -> Value {
        let Some(definition) = self.registry.get_type(type_name) else {
            tracing::warn!(type_name, "cannot convert literal of undefined type, using null");
            return Value::Null;
        };
        match definition {
            TypeDefinition::Scalar(_) => {
                let coercing = self.wiring.coercing_for(definition);
                let parsed = match &coercing {
                    Some(coercing) => coercing.parse_literal(literal),
                    None => PassThroughCoercing.parse_literal(literal),
                };
                parsed.unwrap_or_else(|error| {
                    tracing::warn!(type_name, %error, "cannot convert scalar literal, using null");
                    Value::Null
                })
            }
            TypeDefinition::Enum(_) => {
                let ast::Value::Enum(value) = literal else {
                    tracing::warn!(type_name, "expected an enum value literal, using null");
                    return Value::Null;
                };
                self.wiring
                    .enum_values_provider_for(definition)
                    .and_then(|provider| provider.value(value))
                    .unwrap_or_else(|| Value::String(value.to_string()))
            }
            TypeDefinition::InputObject(_) => {
                let ast::Value::Object(fields) = literal else {
                    tracing::warn!(type_name, "expected an object literal, using null");
                    return Value::Null;
                };
                let declared = self.registry.input_fields(type_name);
                let mut object = Map::new();
                for (name, value) in fields {
                    match declared.get(name) {
                        Some(field) => {
                            object.insert(name.to_string(), self.build(value, &field.ty));
                        }
                        None => {
                            tracing::warn!(type_name, field = %name, "dropping unknown input field");
                        }
                    }
                }
                Value::Object(object)
            }
            TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
                tracing::warn!(type_name, "output type used for a literal, using null");
                Value::Null
            }
        }
    }
}
