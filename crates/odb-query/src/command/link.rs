//! CREATE LINK

use super::{
    mismatch, require_non_empty, statement_command, Addressed, Command, CommandArgs, Typed,
};
use crate::error::QueryResult;
use crate::statement::{Statement, TokenFormat};

const SCHEMA: &str =
    "CREATE LINK :Name :Type FROM :SourceClass:SourceProperty :Destination :Inverse";

/// `CREATE LINK alias [TYPE kind] FROM Class.property [TO Class.property] [INVERSE]`
///
/// Turns a property holding foreign keys into real links. `type_` sets the
/// link type, `to` the destination `Class.property`.
#[derive(Debug, Clone)]
pub struct Link {
    statement: Statement,
}

impl Link {
    pub fn new(
        class: impl Into<String>,
        property: impl Into<String>,
        alias: impl Into<String>,
        inverse: bool,
    ) -> QueryResult<Self> {
        let class = class.into();
        let property = property.into();
        require_non_empty("link", "class", &class)?;
        require_non_empty("link", "property", &property)?;

        let mut statement = Statement::new(SCHEMA)
            .with_format("Type", TokenFormat::Clause("TYPE"))
            .with_format("SourceClass", TokenFormat::Qualifier)
            .with_format("Destination", TokenFormat::Clause("TO"));
        statement.set_one("Name", alias);
        statement.set_one("SourceClass", class);
        statement.set_one("SourceProperty", property);
        if inverse {
            statement.set_one("Inverse", "INVERSE");
        }

        Ok(Self { statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Link {
                class,
                property,
                alias,
                inverse,
            } => Self::new(class, property, alias, inverse),
            other => Err(mismatch("link", &other)),
        }
    }
}

impl Command for Link {
    fn name(&self) -> &'static str {
        "link"
    }

    statement_command!();

    fn addressed(&mut self) -> Option<&mut dyn Addressed> {
        Some(self)
    }

    fn typed(&mut self) -> Option<&mut dyn Typed> {
        Some(self)
    }
}

impl Addressed for Link {
    fn to(&mut self, target: &str) {
        self.statement.set_one("Destination", target);
    }
}

impl Typed for Link {
    fn type_(&mut self, kind: &str) {
        self.statement.set_one("Type", kind);
    }
}
