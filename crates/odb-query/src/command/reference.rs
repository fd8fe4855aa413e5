//! FIND REFERENCES

use super::{mismatch, statement_command, Command, CommandArgs, ReferenceScoped};
use crate::error::QueryResult;
use crate::rid::Rid;
use crate::statement::{Statement, TokenFormat};

/// `FIND REFERENCES #rid [ClassA, ClassB]`
#[derive(Debug, Clone)]
pub struct FindReferences {
    rid: Rid,
    statement: Statement,
}

impl FindReferences {
    pub fn new(rid: &str) -> QueryResult<Self> {
        let rid: Rid = rid.parse()?;

        let mut statement = Statement::new("FIND REFERENCES :Rid :ClassList")
            .with_format("ClassList", TokenFormat::Bracketed);
        statement.set_one("Rid", rid.to_string());
        Ok(Self { rid, statement })
    }

    pub fn from_args(args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Reference { rid } => Self::new(&rid),
            other => Err(mismatch("references.find", &other)),
        }
    }

    pub fn rid(&self) -> Rid {
        self.rid
    }
}

impl Command for FindReferences {
    fn name(&self) -> &'static str {
        "references.find"
    }

    statement_command!();

    fn reference_scoped(&mut self) -> Option<&mut dyn ReferenceScoped> {
        Some(self)
    }
}

impl ReferenceScoped for FindReferences {
    fn in_(&mut self, classes: &[&str], append: bool) {
        self.statement
            .set("ClassList", classes.iter().copied(), append, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_references() {
        let find = FindReferences::new("#12:0").unwrap();
        assert_eq!(find.raw(), "FIND REFERENCES #12:0");
        assert_eq!(find.rid(), Rid::new(12, 0));
    }

    #[test]
    fn test_find_references_in_classes() {
        let mut find = FindReferences::new("12:0").unwrap();
        find.in_(&["Person"], true);
        find.in_(&["Company"], true);
        assert_eq!(find.raw(), "FIND REFERENCES #12:0 [Person, Company]");

        find.in_(&[], false);
        assert_eq!(find.raw(), "FIND REFERENCES #12:0");
    }

    #[test]
    fn test_find_references_requires_rid() {
        assert!(FindReferences::new("Person").is_err());
    }
}
