//! TRUNCATE CLASS / CLUSTER / RECORD

use super::{mismatch, require_non_empty, statement_command, Command, CommandArgs};
use crate::error::QueryResult;
use crate::rid::{Rid, RidPolicy};
use crate::statement::Statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncateKind {
    Class,
    Cluster,
    Record,
}

impl TruncateKind {
    fn name(self) -> &'static str {
        match self {
            TruncateKind::Class => "truncate.class",
            TruncateKind::Cluster => "truncate.cluster",
            TruncateKind::Record => "truncate.record",
        }
    }

    fn schema(self) -> &'static str {
        match self {
            TruncateKind::Class => "TRUNCATE CLASS :Name",
            TruncateKind::Cluster => "TRUNCATE CLUSTER :Name",
            TruncateKind::Record => "TRUNCATE RECORD :Name",
        }
    }
}

/// Truncates a class, a cluster or a single record.
///
/// Record targets must be record identifiers and render normalized
/// (`12:0` becomes `#12:0`).
#[derive(Debug, Clone)]
pub struct Truncate {
    kind: TruncateKind,
    statement: Statement,
}

impl Truncate {
    pub fn new(kind: TruncateKind, entity: impl Into<String>) -> QueryResult<Self> {
        let entity = entity.into();
        require_non_empty(kind.name(), "entity", &entity)?;

        let name = match kind {
            TruncateKind::Record => Rid::parse_with(&entity, RidPolicy::Lenient)?.to_string(),
            TruncateKind::Class | TruncateKind::Cluster => entity,
        };

        let mut statement = Statement::new(kind.schema());
        statement.set_one("Name", name);
        Ok(Self { kind, statement })
    }

    pub fn from_args(kind: TruncateKind, args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Entity { entity } => Self::new(kind, entity),
            other => Err(mismatch(kind.name(), &other)),
        }
    }

    pub fn kind(&self) -> TruncateKind {
        self.kind
    }
}

impl Command for Truncate {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    statement_command!();
}
