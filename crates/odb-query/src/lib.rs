//! Query builder for OrientDB-style statements
//!
//! This crate provides a fluent dispatcher over a registry of command
//! variants. Each variant owns the clause state of one statement kind
//! (SELECT, INSERT, GRANT, CREATE INDEX, ...) and renders it to text.
//!
//! ## Features
//!
//! - **Command registry**: dotted operation identifiers mapped to factories,
//!   overridable per caller
//! - **Fluent dispatcher**: starting verbs swap the active command, refining
//!   verbs delegate to it and fail with a typed error when unsupported
//! - **Record identifiers**: `#cluster:position` parsing with a configurable
//!   policy deciding what `truncate` treats as a record
//! - **TOML configuration**: identifier policy and command aliases
//!
//! ## Usage
//!
//! ```rust
//! use odb_query::Query;
//!
//! # fn main() -> odb_query::QueryResult<()> {
//! let mut query = Query::new(["Person"]);
//! query.truncate("#12:0", false)?;
//! assert_eq!(query.raw(), "TRUNCATE RECORD #12:0");
//!
//! query.index("name", "unique", Some("Person"))?;
//! assert_eq!(query.raw(), "CREATE INDEX Person.name unique");
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod query;
pub mod registry;
pub mod rid;
pub mod statement;
pub mod value;

// Re-exports
pub use command::{Command, CommandArgs};
pub use config::QueryConfig;
pub use error::{QueryError, QueryResult};
pub use query::Query;
pub use registry::{CommandFactory, CommandRegistry, CommandRegistryBuilder};
pub use rid::{classify_truncate, Rid, RidPolicy, TruncateTarget};
pub use statement::Token;
