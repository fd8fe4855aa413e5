//! Index management and index-addressed statements.

use super::{
    impl_filterable, mismatch, require_non_empty, statement_command, Command, CommandArgs,
    Filterable, Scoped,
};
use crate::error::{QueryError, QueryResult};
use crate::rid::Rid;
use crate::statement::{Statement, TokenFormat};
use crate::value::format_value;
use serde_json::Value;

fn named_statement(command: &'static str, schema: &'static str, name: String) -> QueryResult<Statement> {
    require_non_empty(command, "index name", &name)?;

    let mut statement = Statement::new(schema);
    statement.set_one("Name", name);
    Ok(statement)
}

// ============================================================================
// CREATE / DROP
// ============================================================================

/// `CREATE INDEX [Class.]property type`
#[derive(Debug, Clone)]
pub struct IndexCreate {
    statement: Statement,
}

impl IndexCreate {
    pub fn new(
        property: impl Into<String>,
        kind: impl Into<String>,
        class: Option<String>,
    ) -> QueryResult<Self> {
        let property = property.into();
        let kind = kind.into();
        require_non_empty("index.create", "property", &property)?;
        require_non_empty("index.create", "index type", &kind)?;

        let mut statement = Statement::new("CREATE INDEX :IndexClass:Property :Type")
            .with_format("IndexClass", TokenFormat::Qualifier);
        statement.set_one("Property", property);
        statement.set_one("Type", kind);
        statement.set("IndexClass", class, false, false);
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::IndexCreate {
                property,
                kind,
                class,
            } => Self::new(property, kind, class),
            other => Err(mismatch("index.create", &other)),
        }
    }
}

impl Command for IndexCreate {
    fn name(&self) -> &'static str {
        "index.create"
    }

    statement_command!();

    fn scoped(&mut self) -> Option<&mut dyn Scoped> {
        Some(self)
    }
}

impl Scoped for IndexCreate {
    fn on(&mut self, target: &str) {
        self.statement.set_one("IndexClass", target);
    }
}

/// `DROP INDEX [Class.]property`
#[derive(Debug, Clone)]
pub struct IndexDrop {
    statement: Statement,
}

impl IndexDrop {
    pub fn new(property: impl Into<String>, class: Option<String>) -> QueryResult<Self> {
        let property = property.into();
        require_non_empty("index.drop", "property", &property)?;

        let mut statement = Statement::new("DROP INDEX :IndexClass:Property")
            .with_format("IndexClass", TokenFormat::Qualifier);
        statement.set_one("Property", property);
        statement.set("IndexClass", class, false, false);
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::IndexDrop { property, class } => Self::new(property, class),
            other => Err(mismatch("index.drop", &other)),
        }
    }
}

impl Command for IndexDrop {
    fn name(&self) -> &'static str {
        "index.drop"
    }

    statement_command!();

    fn scoped(&mut self) -> Option<&mut dyn Scoped> {
        Some(self)
    }
}

impl Scoped for IndexDrop {
    fn on(&mut self, target: &str) {
        self.statement.set_one("IndexClass", target);
    }
}

// ============================================================================
// Statements addressed to a named index
// ============================================================================

/// `SELECT count(*) AS size FROM index:name`
#[derive(Debug, Clone)]
pub struct IndexCount {
    statement: Statement,
}

impl IndexCount {
    pub fn new(name: impl Into<String>) -> QueryResult<Self> {
        let statement = named_statement(
            "index.count",
            "SELECT count(*) AS size FROM index::Name",
            name.into(),
        )?;
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::IndexName { name } => Self::new(name),
            other => Err(mismatch("index.count", &other)),
        }
    }
}

impl Command for IndexCount {
    fn name(&self) -> &'static str {
        "index.count"
    }

    statement_command!();
}

/// `INSERT INTO index:name (key, rid) VALUES (key, #rid)`
#[derive(Debug, Clone)]
pub struct IndexPut {
    statement: Statement,
}

impl IndexPut {
    pub fn new(name: impl Into<String>, key: &Value, rid: &str) -> QueryResult<Self> {
        let mut statement = named_statement(
            "index.put",
            "INSERT INTO index::Name (key, rid) VALUES (:Key, :Value)",
            name.into(),
        )?;
        let rid: Rid = rid.parse()?;
        statement.set_one("Key", format_value(key));
        statement.set_one("Value", rid.to_string());
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::IndexEntry {
                name,
                key,
                rid: Some(rid),
            } => Self::new(name, &key, &rid),
            CommandArgs::IndexEntry { rid: None, .. } => Err(QueryError::invalid(
                "index.put",
                "a record identifier is required",
            )),
            other => Err(mismatch("index.put", &other)),
        }
    }
}

impl Command for IndexPut {
    fn name(&self) -> &'static str {
        "index.put"
    }

    statement_command!();
}

/// `DELETE FROM index:name WHERE key = key [AND rid = #rid]`
#[derive(Debug, Clone)]
pub struct IndexRemove {
    statement: Statement,
}

impl IndexRemove {
    pub fn new(name: impl Into<String>, key: &Value, rid: Option<&str>) -> QueryResult<Self> {
        let mut statement = named_statement(
            "index.remove",
            "DELETE FROM index::Name WHERE key = :Key :RidCondition",
            name.into(),
        )?
        .with_format("RidCondition", TokenFormat::Clause("AND rid ="));
        statement.set_one("Key", format_value(key));
        if let Some(rid) = rid {
            let rid: Rid = rid.parse()?;
            statement.set_one("RidCondition", rid.to_string());
        }
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::IndexEntry { name, key, rid } => Self::new(name, &key, rid.as_deref()),
            other => Err(mismatch("index.remove", &other)),
        }
    }
}

impl Command for IndexRemove {
    fn name(&self) -> &'static str {
        "index.remove"
    }

    statement_command!();
}

/// `REBUILD INDEX name`; `*` rebuilds every index
#[derive(Debug, Clone)]
pub struct IndexRebuild {
    statement: Statement,
}

impl IndexRebuild {
    pub fn new(name: impl Into<String>) -> QueryResult<Self> {
        let statement = named_statement("index.rebuild", "REBUILD INDEX :Name", name.into())?;
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::IndexName { name } => Self::new(name),
            other => Err(mismatch("index.rebuild", &other)),
        }
    }
}

impl Command for IndexRebuild {
    fn name(&self) -> &'static str {
        "index.rebuild"
    }

    statement_command!();
}

/// `SELECT FROM index:name [WHERE ...]`
#[derive(Debug, Clone)]
pub struct IndexLookup {
    statement: Statement,
}

impl IndexLookup {
    pub fn new(name: impl Into<String>) -> QueryResult<Self> {
        let statement = named_statement(
            "index.lookup",
            "SELECT FROM index::Name :Where",
            name.into(),
        )?
        .with_format("Where", TokenFormat::Spaced);
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::IndexName { name } => Self::new(name),
            other => Err(mismatch("index.lookup", &other)),
        }
    }
}

impl Command for IndexLookup {
    fn name(&self) -> &'static str {
        "index.lookup"
    }

    statement_command!();

    fn filterable(&mut self) -> Option<&mut dyn Filterable> {
        Some(self)
    }
}

impl_filterable!(IndexLookup);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_and_drop() {
        let create = IndexCreate::new("name", "unique", Some("Person".into())).unwrap();
        assert_eq!(create.raw(), "CREATE INDEX Person.name unique");

        let mut bare = IndexCreate::new("name", "notunique", None).unwrap();
        assert_eq!(bare.raw(), "CREATE INDEX name notunique");
        bare.on("City");
        assert_eq!(bare.raw(), "CREATE INDEX City.name notunique");

        let drop = IndexDrop::new("name", Some("Person".into())).unwrap();
        assert_eq!(drop.raw(), "DROP INDEX Person.name");
    }

    #[test]
    fn test_named_statements() {
        assert_eq!(
            IndexCount::new("people").unwrap().raw(),
            "SELECT count(*) AS size FROM index:people"
        );
        assert_eq!(
            IndexRebuild::new("*").unwrap().raw(),
            "REBUILD INDEX *"
        );
    }

    #[test]
    fn test_put_and_remove() {
        let put = IndexPut::new("people", &json!("ada"), "#12:0").unwrap();
        assert_eq!(
            put.raw(),
            r#"INSERT INTO index:people (key, rid) VALUES ("ada", #12:0)"#
        );

        let remove = IndexRemove::new("people", &json!("ada"), None).unwrap();
        assert_eq!(remove.raw(), r#"DELETE FROM index:people WHERE key = "ada""#);

        let remove = IndexRemove::new("people", &json!("ada"), Some("12:0")).unwrap();
        assert_eq!(
            remove.raw(),
            r#"DELETE FROM index:people WHERE key = "ada" AND rid = #12:0"#
        );
    }

    #[test]
    fn test_put_requires_rid() {
        let args = CommandArgs::IndexEntry {
            name: "people".into(),
            key: json!("ada"),
            rid: None,
        };
        assert!(matches!(
            IndexPut::from_args(args),
            Err(QueryError::InvalidArguments { command: "index.put", .. })
        ));
    }

    #[test]
    fn test_lookup_filters() {
        let mut lookup = IndexLookup::new("people").unwrap();
        lookup.where_("key = ?", Some(&json!("ada")));
        assert_eq!(lookup.raw(), r#"SELECT FROM index:people WHERE key = "ada""#);
    }
}
