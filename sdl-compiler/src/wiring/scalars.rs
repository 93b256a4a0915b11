use std::sync::Arc;

use apollo_compiler::ast;
use serde_json::Number;
use serde_json::Value;

use super::Coercing;
use super::CoercingError;
use crate::generator::literal_to_json;

/// Coercing for built-in scalars by name.
pub(crate) fn built_in_coercing(name: &str) -> Option<Arc<dyn Coercing>> {
    match name {
        "Int" => Some(Arc::new(IntCoercing)),
        "Float" => Some(Arc::new(FloatCoercing)),
        "String" => Some(Arc::new(StringCoercing)),
        "Boolean" => Some(Arc::new(BooleanCoercing)),
        "ID" => Some(Arc::new(IdCoercing)),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a Boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a String",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn literal_kind(literal: &ast::Value) -> &'static str {
    match literal {
        ast::Value::Null => "null",
        ast::Value::Enum(_) => "an enum value",
        ast::Value::Variable(_) => "a variable",
        ast::Value::String(_) => "a String",
        ast::Value::Float(_) => "a Float",
        ast::Value::Int(_) => "an Int",
        ast::Value::Boolean(_) => "a Boolean",
        ast::Value::List(_) => "a list",
        ast::Value::Object(_) => "an object",
    }
}

fn int_from_number(number: &Number) -> Option<i32> {
    if let Some(int) = number.as_i64() {
        return i32::try_from(int).ok();
    }
    let float = number.as_f64()?;
    if float.fract() == 0.0 && float >= f64::from(i32::MIN) && float <= f64::from(i32::MAX) {
        Some(float as i32)
    } else {
        None
    }
}

fn float_value(float: f64) -> Option<Value> {
    Number::from_f64(float).map(Value::Number)
}

/// A signed 32-bit integer.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntCoercing;

impl Coercing for IntCoercing {
    fn serialize(&self, value: &Value) -> Result<Value, CoercingError> {
        let int = match value {
            Value::Number(number) => int_from_number(number),
            Value::String(string) => string.trim().parse::<i32>().ok(),
            Value::Bool(boolean) => Some(i32::from(*boolean)),
            _ => None,
        };
        int.map(Value::from).ok_or_else(|| {
            CoercingError::Serialize(format!("expected a value that can be an Int, got {value}"))
        })
    }

    fn parse_value(&self, value: &Value) -> Result<Value, CoercingError> {
        match value {
            Value::Number(number) => int_from_number(number).map(Value::from).ok_or_else(|| {
                CoercingError::ParseValue(format!("{number} is not a 32-bit integer"))
            }),
            _ => Err(CoercingError::ParseValue(format!(
                "expected an Int, got {}",
                type_name(value)
            ))),
        }
    }

    fn parse_literal(&self, literal: &ast::Value) -> Result<Value, CoercingError> {
        match literal {
            ast::Value::Int(int) => int.try_to_i32().map(Value::from).map_err(|_| {
                CoercingError::ParseLiteral(format!(
                    "{} is outside the range of a 32-bit integer",
                    int.as_str()
                ))
            }),
            _ => Err(CoercingError::ParseLiteral(format!(
                "expected an Int, got {}",
                literal_kind(literal)
            ))),
        }
    }
}

/// A double-precision floating point number.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatCoercing;

impl Coercing for FloatCoercing {
    fn serialize(&self, value: &Value) -> Result<Value, CoercingError> {
        let float = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(string) => string.trim().parse::<f64>().ok(),
            Value::Bool(boolean) => Some(if *boolean { 1.0 } else { 0.0 }),
            _ => None,
        };
        float.and_then(float_value).ok_or_else(|| {
            CoercingError::Serialize(format!("expected a value that can be a Float, got {value}"))
        })
    }

    fn parse_value(&self, value: &Value) -> Result<Value, CoercingError> {
        match value {
            Value::Number(number) => number.as_f64().and_then(float_value).ok_or_else(|| {
                CoercingError::ParseValue(format!("{number} is not a finite number"))
            }),
            _ => Err(CoercingError::ParseValue(format!(
                "expected a Float, got {}",
                type_name(value)
            ))),
        }
    }

    fn parse_literal(&self, literal: &ast::Value) -> Result<Value, CoercingError> {
        let float = match literal {
            ast::Value::Float(float) => float.try_to_f64().ok(),
            ast::Value::Int(int) => int.try_to_f64().ok(),
            _ => {
                return Err(CoercingError::ParseLiteral(format!(
                    "expected a Float, got {}",
                    literal_kind(literal)
                )));
            }
        };
        float.and_then(float_value).ok_or_else(|| {
            CoercingError::ParseLiteral(format!("{literal} is not a finite number"))
        })
    }
}

/// UTF-8 text.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringCoercing;

impl Coercing for StringCoercing {
    fn serialize(&self, value: &Value) -> Result<Value, CoercingError> {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(number) => Ok(Value::String(number.to_string())),
            Value::Bool(boolean) => Ok(Value::String(boolean.to_string())),
            _ => Err(CoercingError::Serialize(format!(
                "expected a value that can be a String, got {}",
                type_name(value)
            ))),
        }
    }

    fn parse_value(&self, value: &Value) -> Result<Value, CoercingError> {
        match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(CoercingError::ParseValue(format!(
                "expected a String, got {}",
                type_name(value)
            ))),
        }
    }

    fn parse_literal(&self, literal: &ast::Value) -> Result<Value, CoercingError> {
        match literal {
            ast::Value::String(string) => Ok(Value::String(string.clone())),
            _ => Err(CoercingError::ParseLiteral(format!(
                "expected a String, got {}",
                literal_kind(literal)
            ))),
        }
    }
}

/// `true` or `false`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanCoercing;

impl Coercing for BooleanCoercing {
    fn serialize(&self, value: &Value) -> Result<Value, CoercingError> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(string) if string == "true" || string == "false" => {
                Ok(Value::Bool(string == "true"))
            }
            Value::Number(number) => Ok(Value::Bool(number.as_f64() != Some(0.0))),
            _ => Err(CoercingError::Serialize(format!(
                "expected a value that can be a Boolean, got {}",
                type_name(value)
            ))),
        }
    }

    fn parse_value(&self, value: &Value) -> Result<Value, CoercingError> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(CoercingError::ParseValue(format!(
                "expected a Boolean, got {}",
                type_name(value)
            ))),
        }
    }

    fn parse_literal(&self, literal: &ast::Value) -> Result<Value, CoercingError> {
        match literal {
            ast::Value::Boolean(boolean) => Ok(Value::Bool(*boolean)),
            _ => Err(CoercingError::ParseLiteral(format!(
                "expected a Boolean, got {}",
                literal_kind(literal)
            ))),
        }
    }
}

/// An opaque identifier, serialized as a string. Integer inputs are accepted.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdCoercing;

impl Coercing for IdCoercing {
    fn serialize(&self, value: &Value) -> Result<Value, CoercingError> {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Ok(Value::String(number.to_string()))
            }
            _ => Err(CoercingError::Serialize(format!(
                "expected a value that can be an ID, got {}",
                type_name(value)
            ))),
        }
    }

    fn parse_value(&self, value: &Value) -> Result<Value, CoercingError> {
        self.serialize(value)
            .map_err(|_| CoercingError::ParseValue(format!("expected an ID, got {value}")))
    }

    fn parse_literal(&self, literal: &ast::Value) -> Result<Value, CoercingError> {
        match literal {
            ast::Value::String(string) => Ok(Value::String(string.clone())),
            ast::Value::Int(int) => Ok(Value::String(int.as_str().to_owned())),
            _ => Err(CoercingError::ParseLiteral(format!(
                "expected an ID, got {}",
                literal_kind(literal)
            ))),
        }
    }
}

/// Accepts any value unchanged. Used for scalars of schemas that are never executed.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThroughCoercing;

impl Coercing for PassThroughCoercing {
    fn serialize(&self, value: &Value) -> Result<Value, CoercingError> {
        Ok(value.clone())
    }

    fn parse_value(&self, value: &Value) -> Result<Value, CoercingError> {
        Ok(value.clone())
    }

    fn parse_literal(&self, literal: &ast::Value) -> Result<Value, CoercingError> {
        literal_to_json(literal).ok_or_else(|| {
            CoercingError::ParseLiteral(format!("{literal} cannot be a constant value"))
        })
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn literal(source: &str) -> ast::Value {
        let document = ast::Document::parse(
            format!("directive @d(v: String) on SCALAR scalar S @d(v: {source})"),
            "literal.graphql",
        )
        .unwrap();
        match &document.definitions[1] {
            ast::Definition::ScalarTypeDefinition(def) => {
                (*def.directives[0].arguments[0].value).clone()
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn int_literals_must_fit_in_32_bits() {
        assert_eq!(IntCoercing.parse_literal(&literal("42")), Ok(json!(42)));
        assert!(IntCoercing.parse_literal(&literal("2147483648")).is_err());
        assert!(IntCoercing.parse_literal(&literal("4.5")).is_err());
        assert!(IntCoercing.parse_literal(&literal(r#""1""#)).is_err());
    }

    #[test]
    fn float_literals_accept_ints() {
        assert_eq!(FloatCoercing.parse_literal(&literal("4")), Ok(json!(4.0)));
        assert_eq!(FloatCoercing.parse_literal(&literal("4.5")), Ok(json!(4.5)));
        assert!(FloatCoercing.parse_literal(&literal("true")).is_err());
    }

    #[test]
    fn id_literals_accept_strings_and_ints() {
        assert_eq!(IdCoercing.parse_literal(&literal("7")), Ok(json!("7")));
        assert_eq!(IdCoercing.parse_literal(&literal(r#""a""#)), Ok(json!("a")));
        assert!(IdCoercing.parse_literal(&literal("7.5")).is_err());
    }

    #[test]
    fn string_and_boolean_literals_are_strict() {
        assert_eq!(
            StringCoercing.parse_literal(&literal(r#""x""#)),
            Ok(json!("x"))
        );
        assert!(StringCoercing.parse_literal(&literal("1")).is_err());
        assert_eq!(BooleanCoercing.parse_literal(&literal("false")), Ok(json!(false)));
        assert!(BooleanCoercing.parse_literal(&literal("FALSE")).is_err());
    }

    #[test]
    fn serialize_is_lenient() {
        assert_eq!(IntCoercing.serialize(&json!("12")), Ok(json!(12)));
        assert_eq!(IntCoercing.serialize(&json!(3.0)), Ok(json!(3)));
        assert!(IntCoercing.serialize(&json!(3.5)).is_err());
        assert_eq!(StringCoercing.serialize(&json!(true)), Ok(json!("true")));
        assert_eq!(IdCoercing.serialize(&json!(5)), Ok(json!("5")));
    }

    #[test]
    fn pass_through_converts_constant_literals() {
        assert_eq!(
            PassThroughCoercing.parse_literal(&literal(r#"{ a: [1, "b", null, C] }"#)),
            Ok(json!({ "a": [1, "b", null, "C"] }))
        );
        let variable = ast::Value::Variable(name!("v"));
        assert!(PassThroughCoercing.parse_literal(&variable).is_err());
    }
}
