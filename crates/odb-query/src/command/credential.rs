//! GRANT / REVOKE

use super::{
    mismatch, require_non_empty, statement_command, Addressed, Command, CommandArgs, Scoped,
};
use crate::error::QueryResult;
use crate::statement::Statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Grant,
    Revoke,
}

impl CredentialKind {
    fn name(self) -> &'static str {
        match self {
            CredentialKind::Grant => "grant",
            CredentialKind::Revoke => "revoke",
        }
    }

    fn schema(self) -> &'static str {
        match self {
            CredentialKind::Grant => "GRANT :Permission ON :Resource TO :Role",
            CredentialKind::Revoke => "REVOKE :Permission ON :Resource FROM :Role",
        }
    }
}

/// `GRANT permission ON resource TO role` and its REVOKE counterpart.
/// `on` sets the resource, `to` the role.
#[derive(Debug, Clone)]
pub struct Credential {
    kind: CredentialKind,
    statement: Statement,
}

impl Credential {
    pub fn new(kind: CredentialKind, permission: impl Into<String>) -> QueryResult<Self> {
        let permission = permission.into();
        require_non_empty(kind.name(), "permission", &permission)?;

        let mut statement = Statement::new(kind.schema());
        statement.set_one("Permission", permission);
        Ok(Self { kind, statement })
    }

    pub fn grant(permission: impl Into<String>) -> QueryResult<Self> {
        Self::new(CredentialKind::Grant, permission)
    }

    pub fn revoke(permission: impl Into<String>) -> QueryResult<Self> {
        Self::new(CredentialKind::Revoke, permission)
    }

    pub fn from_args(kind: CredentialKind, args: CommandArgs) -> QueryResult<Self> {
        match args {
            CommandArgs::Credential { permission } => Self::new(kind, permission),
            other => Err(mismatch(kind.name(), &other)),
        }
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }
}

impl Command for Credential {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    statement_command!();

    fn scoped(&mut self) -> Option<&mut dyn Scoped> {
        Some(self)
    }

    fn addressed(&mut self) -> Option<&mut dyn Addressed> {
        Some(self)
    }
}

impl Scoped for Credential {
    fn on(&mut self, target: &str) {
        self.statement.set_one("Resource", target);
    }
}

impl Addressed for Credential {
    fn to(&mut self, target: &str) {
        self.statement.set_one("Role", target);
    }
}
