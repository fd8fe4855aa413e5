//! Class and property schema commands.

use super::{
    mismatch, require_non_empty, statement_command, Alterable, Command, CommandArgs, Scoped,
};
use crate::error::QueryResult;
use crate::statement::{Statement, TokenFormat};

fn class_statement(command: &'static str, schema: &'static str, class: String) -> QueryResult<Statement> {
    require_non_empty(command, "class", &class)?;

    let mut statement = Statement::new(schema);
    statement.set_one("Class", class);
    Ok(statement)
}

/// The owning class renders as a `Class.` prefix once `on` is called.
fn property_statement(
    command: &'static str,
    schema: &'static str,
    property: String,
) -> QueryResult<Statement> {
    require_non_empty(command, "property", &property)?;

    let mut statement = Statement::new(schema).with_format("Class", TokenFormat::Qualifier);
    statement.set_one("Property", property);
    Ok(statement)
}

// ============================================================================
// Classes
// ============================================================================

/// `CREATE CLASS name`
#[derive(Debug, Clone)]
pub struct ClassCreate {
    statement: Statement,
}

impl ClassCreate {
    pub fn new(class: impl Into<String>) -> QueryResult<Self> {
        let statement = class_statement("class.create", "CREATE CLASS :Class", class.into())?;
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Class { class } => Self::new(class),
            other => Err(mismatch("class.create", &other)),
        }
    }
}

impl Command for ClassCreate {
    fn name(&self) -> &'static str {
        "class.create"
    }

    statement_command!();
}

/// `DROP CLASS name`
#[derive(Debug, Clone)]
pub struct ClassDrop {
    statement: Statement,
}

impl ClassDrop {
    pub fn new(class: impl Into<String>) -> QueryResult<Self> {
        let statement = class_statement("class.drop", "DROP CLASS :Class", class.into())?;
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Class { class } => Self::new(class),
            other => Err(mismatch("class.drop", &other)),
        }
    }
}

impl Command for ClassDrop {
    fn name(&self) -> &'static str {
        "class.drop"
    }

    statement_command!();
}

/// `ALTER CLASS name attribute value`
#[derive(Debug, Clone)]
pub struct ClassAlter {
    statement: Statement,
}

impl ClassAlter {
    pub fn new(
        class: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> QueryResult<Self> {
        let statement = class_statement(
            "class.alter",
            "ALTER CLASS :Class :Attribute :Value",
            class.into(),
        )?;
        let mut alter = Self { statement };
        alter.changing(&attribute.into(), &value.into());
        Ok(alter)
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::ClassAlter {
                class,
                attribute,
                value,
            } => Self::new(class, attribute, value),
            other => Err(mismatch("class.alter", &other)),
        }
    }
}

impl Command for ClassAlter {
    fn name(&self) -> &'static str {
        "class.alter"
    }

    statement_command!();

    fn alterable(&mut self) -> Option<&mut dyn Alterable> {
        Some(self)
    }
}

impl Alterable for ClassAlter {
    fn changing(&mut self, attribute: &str, value: &str) {
        self.statement.set_one("Attribute", attribute);
        self.statement.set_one("Value", value);
    }
}

// ============================================================================
// Properties
// ============================================================================

/// `CREATE PROPERTY Class.name type [linked]`
#[derive(Debug, Clone)]
pub struct PropertyCreate {
    statement: Statement,
}

impl PropertyCreate {
    pub fn new(
        property: impl Into<String>,
        kind: Option<String>,
        linked: Option<String>,
    ) -> QueryResult<Self> {
        let mut statement = property_statement(
            "property.create",
            "CREATE PROPERTY :Class:Property :Type :Linked",
            property.into(),
        )?;
        statement.set("Type", kind, false, false);
        statement.set("Linked", linked, false, false);
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Property {
                property,
                kind,
                linked,
            } => Self::new(property, kind, linked),
            other => Err(mismatch("property.create", &other)),
        }
    }
}

impl Command for PropertyCreate {
    fn name(&self) -> &'static str {
        "property.create"
    }

    statement_command!();

    fn scoped(&mut self) -> Option<&mut dyn Scoped> {
        Some(self)
    }
}

impl Scoped for PropertyCreate {
    fn on(&mut self, target: &str) {
        self.statement.set_one("Class", target);
    }
}

/// `DROP PROPERTY Class.name`
#[derive(Debug, Clone)]
pub struct PropertyDrop {
    statement: Statement,
}

impl PropertyDrop {
    pub fn new(property: impl Into<String>) -> QueryResult<Self> {
        let statement = property_statement(
            "property.drop",
            "DROP PROPERTY :Class:Property",
            property.into(),
        )?;
        Ok(Self { statement })
    }

    /// Type and linked class are accepted with the shared property
    /// argument shape and ignored.
    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Property { property, .. } => Self::new(property),
            other => Err(mismatch("property.drop", &other)),
        }
    }
}

impl Command for PropertyDrop {
    fn name(&self) -> &'static str {
        "property.drop"
    }

    statement_command!();

    fn scoped(&mut self) -> Option<&mut dyn Scoped> {
        Some(self)
    }
}

impl Scoped for PropertyDrop {
    fn on(&mut self, target: &str) {
        self.statement.set_one("Class", target);
    }
}

/// `ALTER PROPERTY Class.name attribute value`
#[derive(Debug, Clone)]
pub struct PropertyAlter {
    statement: Statement,
}

impl PropertyAlter {
    pub fn new(property: impl Into<String>) -> QueryResult<Self> {
        let statement = property_statement(
            "property.alter",
            "ALTER PROPERTY :Class:Property :Attribute :Value",
            property.into(),
        )?;
        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Property { property, .. } => Self::new(property),
            other => Err(mismatch("property.alter", &other)),
        }
    }
}

impl Command for PropertyAlter {
    fn name(&self) -> &'static str {
        "property.alter"
    }

    statement_command!();

    fn scoped(&mut self) -> Option<&mut dyn Scoped> {
        Some(self)
    }

    fn alterable(&mut self) -> Option<&mut dyn Alterable> {
        Some(self)
    }
}

impl Scoped for PropertyAlter {
    fn on(&mut self, target: &str) {
        self.statement.set_one("Class", target);
    }
}

impl Alterable for PropertyAlter {
    fn changing(&mut self, attribute: &str, value: &str) {
        self.statement.set_one("Attribute", attribute);
        self.statement.set_one("Value", value);
    }
}
