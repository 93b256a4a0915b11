use std::path::Path;

use apollo_compiler::ast;

use crate::error::ParseErrors;
use crate::error::SchemaBuildError;
use crate::registry::TypeDefinitionRegistry;

/// Parses SDL documents into a [`TypeDefinitionRegistry`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
    /// Parses one document. `path` is only used in diagnostics.
    ///
    /// Syntax errors fail the whole document. Problems with the definitions themselves, such as
    /// redefinitions, are recorded on the registry instead.
    pub fn parse(
        source: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<TypeDefinitionRegistry, SchemaBuildError> {
        let mut registry = TypeDefinitionRegistry::new();
        Self::parse_into(&mut registry, source, path)?;
        Ok(registry)
    }

    /// Parses several documents into one registry, as if they were a single document.
    pub fn parse_all<S, P>(
        documents: impl IntoIterator<Item = (S, P)>,
    ) -> Result<TypeDefinitionRegistry, SchemaBuildError>
    where
        S: Into<String>,
        P: AsRef<Path>,
    {
        let mut registry = TypeDefinitionRegistry::new();
        for (source, path) in documents {
            Self::parse_into(&mut registry, source, path)?;
        }
        Ok(registry)
    }

    fn parse_into(
        registry: &mut TypeDefinitionRegistry,
        source: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<(), SchemaBuildError> {
        let document = ast::Document::parse(source.into(), path.as_ref()).map_err(|invalid| {
            SchemaBuildError::Parse(ParseErrors {
                errors: invalid.errors,
            })
        })?;
        tracing::trace!(
            path = %path.as_ref().display(),
            definitions = document.definitions.len(),
            "parsed schema document"
        );
        registry.add_document(document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_are_parse_errors() {
        let error = SchemaParser::parse("type Query {", "broken.graphql").unwrap_err();
        assert!(matches!(error, SchemaBuildError::Parse(_)), "{error}");
    }

    #[test]
    fn documents_share_one_registry() {
        let registry = SchemaParser::parse_all([
            ("type Query { a: A }", "query.graphql"),
            ("type A { b: Int }", "a.graphql"),
        ])
        .unwrap();
        assert!(registry.has_type("A"));
        assert_eq!(registry.sources().len(), 2);
    }
}
