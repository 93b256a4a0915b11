//! Renders a built schema as SDL.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Write;
use std::sync::Arc;

use apollo_compiler::Name;
use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::Value;

use super::AppliedDirective;
use super::DirectiveDeclaration;
use super::FieldDefinition;
use super::InputValueDefinition;
use super::NamedTypeRef;
use super::Schema;
use super::SchemaType;
use crate::registry::built_ins::DEPRECATED_DIRECTIVE_NAME;
use crate::registry::is_built_in_directive;
use crate::registry::is_built_in_scalar;

const INDENT: &str = "  ";

impl Schema {
    /// The schema as SDL. Built-in scalars and directives are left out.
    pub fn to_sdl(&self) -> String {
        self.to_string()
    }

    fn has_default_root_names(&self) -> bool {
        self.query_type.name == "Query"
            && self
                .mutation_type
                .as_ref()
                .is_none_or(|object| object.name == "Mutation")
            && self
                .subscription_type
                .as_ref()
                .is_none_or(|object| object.name == "Subscription")
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut blocks = Vec::new();
        if !self.has_default_root_names() {
            let mut block = String::from("schema {\n");
            writeln!(block, "{INDENT}query: {}", self.query_type.name)?;
            if let Some(mutation) = &self.mutation_type {
                writeln!(block, "{INDENT}mutation: {}", mutation.name)?;
            }
            if let Some(subscription) = &self.subscription_type {
                writeln!(block, "{INDENT}subscription: {}", subscription.name)?;
            }
            block.push('}');
            blocks.push(block);
        }
        for directive in self.directives.values() {
            if !is_built_in_directive(&directive.name) {
                blocks.push(print_directive_declaration(directive)?);
            }
        }
        for ty in self.types.values() {
            if matches!(ty, SchemaType::Scalar(_)) && is_built_in_scalar(ty.name()) {
                continue;
            }
            blocks.push(print_type(ty)?);
        }
        for block in blocks {
            writeln!(f, "{block}\n")?;
        }
        Ok(())
    }
}

fn print_type(ty: &SchemaType) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_description(&mut out, ty.description(), "")?;
    match ty {
        SchemaType::Scalar(scalar) => {
            write!(out, "scalar {}", scalar.name)?;
            write_directives(&mut out, &scalar.directives, None)?;
        }
        SchemaType::Object(object) => {
            write!(out, "type {}", object.name)?;
            write_implements(&mut out, &object.interfaces)?;
            write_directives(&mut out, &object.directives, None)?;
            write_fields(&mut out, &object.fields)?;
        }
        SchemaType::Interface(interface) => {
            write!(out, "interface {}", interface.name)?;
            write_implements(&mut out, &interface.interfaces)?;
            write_directives(&mut out, &interface.directives, None)?;
            write_fields(&mut out, &interface.fields)?;
        }
        SchemaType::Union(union_) => {
            write!(out, "union {}", union_.name)?;
            write_directives(&mut out, &union_.directives, None)?;
            if !union_.members.is_empty() {
                write!(
                    out,
                    " = {}",
                    union_.members.iter().map(NamedTypeRef::name).join(" | ")
                )?;
            }
        }
        SchemaType::Enum(enum_) => {
            write!(out, "enum {}", enum_.name)?;
            write_directives(&mut out, &enum_.directives, None)?;
            if !enum_.values.is_empty() {
                out.push_str(" {\n");
                for value in enum_.values.values() {
                    write_description(&mut out, value.description.as_deref(), INDENT)?;
                    write!(out, "{INDENT}{}", value.name)?;
                    write_directives(
                        &mut out,
                        &value.directives,
                        value.deprecation_reason.as_deref(),
                    )?;
                    out.push('\n');
                }
                out.push('}');
            }
        }
        SchemaType::InputObject(input_object) => {
            write!(out, "input {}", input_object.name)?;
            write_directives(&mut out, &input_object.directives, None)?;
            if !input_object.fields.is_empty() {
                out.push_str(" {\n");
                for field in input_object.fields.values() {
                    write_description(&mut out, field.description.as_deref(), INDENT)?;
                    out.push_str(INDENT);
                    write_input_value(&mut out, field)?;
                    out.push('\n');
                }
                out.push('}');
            }
        }
    }
    Ok(out)
}

fn print_directive_declaration(directive: &DirectiveDeclaration) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_description(&mut out, directive.description.as_deref(), "")?;
    write!(out, "directive @{}", directive.name)?;
    write_arguments(&mut out, &directive.arguments)?;
    if directive.repeatable {
        out.push_str(" repeatable");
    }
    write!(out, " on {}", directive.locations.iter().join(" | "))?;
    Ok(out)
}

fn write_implements(out: &mut String, interfaces: &[NamedTypeRef]) -> fmt::Result {
    if !interfaces.is_empty() {
        write!(
            out,
            " implements {}",
            interfaces.iter().map(NamedTypeRef::name).join(" & ")
        )?;
    }
    Ok(())
}

fn write_fields(
    out: &mut String,
    fields: &IndexMap<Name, Arc<FieldDefinition>>,
) -> fmt::Result {
    if fields.is_empty() {
        return Ok(());
    }
    out.push_str(" {\n");
    for field in fields.values() {
        write_description(out, field.description.as_deref(), INDENT)?;
        write!(out, "{INDENT}{}", field.name)?;
        write_arguments(out, &field.arguments)?;
        write!(out, ": {}", field.ty)?;
        write_directives(out, &field.directives, field.deprecation_reason.as_deref())?;
        out.push('\n');
    }
    out.push('}');
    Ok(())
}

fn write_arguments(
    out: &mut String,
    arguments: &IndexMap<Name, Arc<InputValueDefinition>>,
) -> fmt::Result {
    if arguments.is_empty() {
        return Ok(());
    }
    out.push('(');
    for (i, argument) in arguments.values().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if let Some(description) = &argument.description {
            write!(out, "{} ", string_literal(description))?;
        }
        write_input_value(out, argument)?;
    }
    out.push(')');
    Ok(())
}

fn write_input_value(out: &mut String, value: &InputValueDefinition) -> fmt::Result {
    write!(out, "{}: {}", value.name, value.ty)?;
    if let Some(literal) = &value.default_literal {
        write!(out, " = {}", **literal)?;
    } else if let Some(default_value) = &value.default_value {
        write!(out, " = {}", json_to_sdl(default_value))?;
    }
    write_directives(out, &value.directives, value.deprecation_reason.as_deref())
}

/// Writes applied directives. A deprecation reason that no `@deprecated` application accounts
/// for, such as one set by a directive wiring, is printed as one.
fn write_directives(
    out: &mut String,
    directives: &[AppliedDirective],
    deprecation_reason: Option<&str>,
) -> fmt::Result {
    for directive in directives {
        write!(out, " @{}", directive.name)?;
        if !directive.arguments.is_empty() {
            let arguments = directive
                .arguments
                .iter()
                .map(|(name, argument)| match &argument.literal {
                    Some(literal) => format!("{name}: {}", **literal),
                    None => format!("{name}: {}", json_to_sdl(&argument.value)),
                })
                .join(", ");
            write!(out, "({arguments})")?;
        }
    }
    if let Some(reason) = deprecation_reason {
        if !directives
            .iter()
            .any(|directive| directive.name == DEPRECATED_DIRECTIVE_NAME)
        {
            write!(out, " @deprecated(reason: {})", string_literal(reason))?;
        }
    }
    Ok(())
}

fn write_description(out: &mut String, description: Option<&str>, indent: &str) -> fmt::Result {
    let Some(description) = description else {
        return Ok(());
    };
    if description.contains('\n') {
        writeln!(out, r#"{indent}""""#)?;
        for line in description.lines() {
            writeln!(out, "{indent}{}", line.replace(r#"""""#, r#"\""""#))?;
        }
        writeln!(out, r#"{indent}""""#)
    } else {
        writeln!(out, "{indent}{}", string_literal(description))
    }
}

fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str(r#"\""#),
            '\\' => out.push_str(r"\\"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\t' => out.push_str(r"\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Runtime values have no enum literals, so enum values print as strings.
fn json_to_sdl(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(boolean) => boolean.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(string) => string_literal(string),
        Value::Array(items) => format!("[{}]", items.iter().map(json_to_sdl).join(", ")),
        Value::Object(fields) => format!(
            "{{{}}}",
            fields
                .iter()
                .map(|(name, value)| format!("{name}: {}", json_to_sdl(value)))
                .join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_literals_are_escaped() {
        assert_eq!(string_literal("a \"b\"\n"), r#""a \"b\"\n""#);
    }

    #[test]
    fn runtime_values_print_as_literals() {
        assert_eq!(
            json_to_sdl(&json!({ "a": [1, "x", null], "b": true })),
            r#"{a: [1, "x", null], b: true}"#
        );
    }
}
