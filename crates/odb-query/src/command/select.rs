//! SELECT command.

use super::{
    impl_filterable, impl_paginated, mismatch, statement_command, Command, CommandArgs,
    Filterable, Orderable, Paginated, Projectable, Sourced,
};
use crate::error::QueryResult;
use crate::statement::{Statement, TokenFormat};

const SCHEMA: &str = "SELECT :Projections FROM :Target :Where :OrderBy :Skip :Limit";

/// `SELECT [projections] FROM target [WHERE ...] [ORDER BY ...] [SKIP n] [LIMIT n]`
#[derive(Debug, Clone)]
pub struct Select {
    statement: Statement,
}

impl Select {
    pub fn new<I, S>(target: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut statement = Statement::new(SCHEMA)
            .with_format("Target", TokenFormat::Target)
            .with_format("Where", TokenFormat::Spaced)
            .with_format("OrderBy", TokenFormat::Clause("ORDER BY"))
            .with_format("Skip", TokenFormat::Clause("SKIP"))
            .with_format("Limit", TokenFormat::Clause("LIMIT"));
        statement.set("Target", target, false, false);

        Self { statement }
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Select { target } => Ok(Self::new(target)),
            other => Err(mismatch("select", &other)),
        }
    }
}

impl Command for Select {
    fn name(&self) -> &'static str {
        "select"
    }

    fn can_hydrate(&self) -> bool {
        true
    }

    statement_command!();

    fn filterable(&mut self) -> Option<&mut dyn Filterable> {
        Some(self)
    }

    fn orderable(&mut self) -> Option<&mut dyn Orderable> {
        Some(self)
    }

    fn paginated(&mut self) -> Option<&mut dyn Paginated> {
        Some(self)
    }

    fn projectable(&mut self) -> Option<&mut dyn Projectable> {
        Some(self)
    }

    fn sourced(&mut self) -> Option<&mut dyn Sourced> {
        Some(self)
    }
}

impl_filterable!(Select);
impl_paginated!(Select);

impl Projectable for Select {
    fn select(&mut self, projections: &[&str], append: bool) {
        self.statement
            .set("Projections", projections.iter().copied(), append, false);
    }
}

impl Sourced for Select {
    fn from(&mut self, target: &[&str], append: bool) {
        self.statement.set("Target", target.iter().copied(), append, false);
    }
}

impl Orderable for Select {
    fn order_by(&mut self, order: &str, append: bool, first: bool) {
        self.statement.set("OrderBy", [order], append, first);
    }
}
