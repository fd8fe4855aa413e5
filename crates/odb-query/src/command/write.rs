//! Data-modifying commands: INSERT, DELETE, UPDATE and the collection
//! updates (ADD, REMOVE, PUT).

use super::{
    impl_filterable, mismatch, require_non_empty, statement_command, Command, CommandArgs,
    Filterable, Settable, Writable,
};
use crate::error::{QueryError, QueryResult};
use crate::statement::{Statement, TokenFormat};
use crate::value::{format_value, quote};
use serde_json::Value;

// ============================================================================
// INSERT
// ============================================================================

/// `INSERT INTO target (fields) VALUES (values)`
#[derive(Debug, Clone)]
pub struct Insert {
    statement: Statement,
}

impl Default for Insert {
    fn default() -> Self {
        Self::new()
    }
}

impl Insert {
    pub fn new() -> Self {
        Self {
            statement: Statement::new("INSERT INTO :Target (:Fields) VALUES (:Values)"),
        }
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Insert => Ok(Self::new()),
            other => Err(mismatch("insert", &other)),
        }
    }
}

impl Command for Insert {
    fn name(&self) -> &'static str {
        "insert"
    }

    statement_command!();

    fn writable(&mut self) -> Option<&mut dyn Writable> {
        Some(self)
    }
}

impl Writable for Insert {
    fn fields(&mut self, fields: &[&str], append: bool) {
        self.statement.set("Fields", fields.iter().copied(), append, false);
    }

    fn values(&mut self, values: &[Value], append: bool) {
        self.statement
            .set("Values", values.iter().map(format_value), append, false);
    }

    fn into_(&mut self, target: &str) {
        self.statement.set_one("Target", target);
    }
}

// ============================================================================
// DELETE
// ============================================================================

/// `DELETE FROM class [WHERE ...]`
#[derive(Debug, Clone)]
pub struct Delete {
    statement: Statement,
}

impl Delete {
    pub fn new(from: impl Into<String>) -> QueryResult<Self> {
        let from = from.into();
        require_non_empty("delete", "target", &from)?;

        let mut statement =
            Statement::new("DELETE FROM :Class :Where").with_format("Where", TokenFormat::Spaced);
        statement.set_one("Class", from);
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Delete { from } => Self::new(from),
            other => Err(mismatch("delete", &other)),
        }
    }
}

impl Command for Delete {
    fn name(&self) -> &'static str {
        "delete"
    }

    statement_command!();

    fn filterable(&mut self) -> Option<&mut dyn Filterable> {
        Some(self)
    }
}

impl_filterable!(Delete);

// ============================================================================
// UPDATE
// ============================================================================

/// `UPDATE class SET field = value, ... [WHERE ...]`
#[derive(Debug, Clone)]
pub struct Update {
    statement: Statement,
}

impl Update {
    pub fn new(class: impl Into<String>) -> QueryResult<Self> {
        let class = class.into();
        require_non_empty("update", "class", &class)?;

        let mut statement = Statement::new("UPDATE :Class SET :Updates :Where")
            .with_format("Where", TokenFormat::Spaced);
        statement.set_one("Class", class);
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Update { class } => Self::new(class),
            other => Err(mismatch("update", &other)),
        }
    }
}

impl Command for Update {
    fn name(&self) -> &'static str {
        "update"
    }

    statement_command!();

    fn filterable(&mut self) -> Option<&mut dyn Filterable> {
        Some(self)
    }

    fn settable(&mut self) -> Option<&mut dyn Settable> {
        Some(self)
    }
}

impl_filterable!(Update);

impl Settable for Update {
    fn set(&mut self, pairs: &[(&str, Value)], append: bool) {
        let assignments = pairs
            .iter()
            .map(|(field, value)| format!("{} = {}", field, format_value(value)));
        self.statement.set("Updates", assignments, append, false);
    }
}

// ============================================================================
// UPDATE ... ADD / REMOVE / PUT
// ============================================================================

/// Collection operation of an [`UpdateCollection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOp {
    Add,
    Remove,
    Put,
}

impl CollectionOp {
    fn keyword(self) -> &'static str {
        match self {
            CollectionOp::Add => "ADD",
            CollectionOp::Remove => "REMOVE",
            CollectionOp::Put => "PUT",
        }
    }

    fn name(self) -> &'static str {
        match self {
            CollectionOp::Add => "update.add",
            CollectionOp::Remove => "update.remove",
            CollectionOp::Put => "update.put",
        }
    }
}

/// `UPDATE class ADD|REMOVE|PUT field = value, ... [WHERE ...]`
///
/// PUT values are maps: `{"key": value}` renders as `field = "key", value`.
#[derive(Debug, Clone)]
pub struct UpdateCollection {
    op: CollectionOp,
    statement: Statement,
}

impl UpdateCollection {
    pub fn new(
        op: CollectionOp,
        updates: &[(String, Value)],
        class: impl Into<String>,
        append: bool,
    ) -> QueryResult<Self> {
        let class = class.into();
        require_non_empty(op.name(), "class", &class)?;

        let mut assignments = Vec::with_capacity(updates.len());
        for (field, value) in updates {
            match (op, value) {
                (CollectionOp::Put, Value::Object(entries)) => {
                    assignments.extend(entries.iter().map(|(key, v)| {
                        format!("{} = {}, {}", field, quote(key), format_value(v))
                    }));
                }
                (CollectionOp::Put, _) => {
                    return Err(QueryError::invalid(
                        op.name(),
                        format!("value for '{}' must be a map", field),
                    ));
                }
                _ => assignments.push(format!("{} = {}", field, format_value(value))),
            }
        }

        let mut statement = Statement::new("UPDATE :Class :Operation :Updates :Where")
            .with_format("Where", TokenFormat::Spaced);
        statement.set_one("Class", class);
        statement.set_one("Operation", op.keyword());
        statement.set("Updates", assignments, append, false);

        Ok(Self { op, statement })
    }

    pub fn from_args(op: CollectionOp, args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Collection {
                updates,
                class,
                append,
            } => Self::new(op, &updates, class, append),
            other => Err(mismatch(op.name(), &other)),
        }
    }

    pub fn op(&self) -> CollectionOp {
        self.op
    }
}

impl Command for UpdateCollection {
    fn name(&self) -> &'static str {
        self.op.name()
    }

    statement_command!();

    fn filterable(&mut self) -> Option<&mut dyn Filterable> {
        Some(self)
    }
}

impl_filterable!(UpdateCollection);
