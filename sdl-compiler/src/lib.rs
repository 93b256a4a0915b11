//! ## Usage
//!
//! Compiles GraphQL SDL type definitions into an executable schema:
//!
//! 1. [`SchemaParser`] parses documents into a [`TypeDefinitionRegistry`], which records
//!    redefinitions as it goes.
//! 2. [`SchemaTypeChecker`] validates the registry and returns every problem it finds as a
//!    structured [`Diagnostic`].
//! 3. [`SchemaGenerator`] builds a [`Schema`] graph, attaching host behavior from a
//!    [`RuntimeWiring`], then lets schema directive wirings rewrite the result.
//!
//! ```
//! use sdl_compiler::RuntimeWiring;
//! use sdl_compiler::SchemaGenerator;
//! use sdl_compiler::SchemaParser;
//!
//! let registry = SchemaParser::parse("type Query { hello: String }", "schema.graphql").unwrap();
//! let schema = SchemaGenerator::default()
//!     .make_executable_schema(registry, &RuntimeWiring::default())
//!     .unwrap();
//! assert!(schema.problems().is_empty());
//! assert!(schema.query_type().field("hello").is_some());
//! ```

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

mod cancellation;
pub mod directive_wiring;
pub mod error;
mod generator;
mod parser;
pub mod registry;
pub mod schema;
mod validation;
pub mod wiring;

pub use crate::cancellation::CancellationToken;
pub use crate::error::Cancelled;
pub use crate::error::Diagnostic;
pub use crate::error::DiagnosticCode;
pub use crate::error::SchemaBuildError;
pub use crate::error::SchemaCoordinate;
pub use crate::generator::SchemaGenerator;
pub use crate::generator::SchemaGeneratorOptions;
pub use crate::parser::SchemaParser;
pub use crate::registry::TypeDefinitionRegistry;
pub use crate::schema::Schema;
pub use crate::validation::SchemaTypeChecker;
pub use crate::wiring::RuntimeWiring;
