//! Command variants.
//!
//! A command owns the clause state of one statement and knows how to
//! render it. Refinements are grouped into narrow capability traits; a
//! command advertises the families it supports through the accessor
//! methods on [`Command`], and everything it does not advertise is
//! rejected by the dispatcher with a typed error.

mod credential;
mod index;
mod link;
mod reference;
mod schema;
mod select;
mod truncate;
mod write;

pub use credential::{Credential, CredentialKind};
pub use index::{
    IndexCount, IndexCreate, IndexDrop, IndexLookup, IndexPut, IndexRebuild, IndexRemove,
};
pub use link::Link;
pub use reference::FindReferences;
pub use schema::{ClassAlter, ClassCreate, ClassDrop, PropertyAlter, PropertyCreate, PropertyDrop};
pub use select::Select;
pub use truncate::{Truncate, TruncateKind};
pub use write::{CollectionOp, Delete, Insert, Update, UpdateCollection};

use crate::error::{QueryError, QueryResult};
use crate::statement::{Statement, Token};
use crate::value::bind;
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// Common contract of every command variant.
pub trait Command: fmt::Debug + Send + Sync {
    /// Short name used in errors and logs
    fn name(&self) -> &'static str;

    /// Render the statement text
    fn raw(&self) -> String;

    /// Structured view of the statement: tokens with their raw values
    fn tokens(&self) -> Vec<Token>;

    /// Whether results of this command map back onto records
    fn can_hydrate(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn filterable(&mut self) -> Option<&mut dyn Filterable> {
        None
    }

    fn orderable(&mut self) -> Option<&mut dyn Orderable> {
        None
    }

    fn paginated(&mut self) -> Option<&mut dyn Paginated> {
        None
    }

    fn projectable(&mut self) -> Option<&mut dyn Projectable> {
        None
    }

    fn sourced(&mut self) -> Option<&mut dyn Sourced> {
        None
    }

    fn writable(&mut self) -> Option<&mut dyn Writable> {
        None
    }

    fn settable(&mut self) -> Option<&mut dyn Settable> {
        None
    }

    fn scoped(&mut self) -> Option<&mut dyn Scoped> {
        None
    }

    fn addressed(&mut self) -> Option<&mut dyn Addressed> {
        None
    }

    fn typed(&mut self) -> Option<&mut dyn Typed> {
        None
    }

    fn reference_scoped(&mut self) -> Option<&mut dyn ReferenceScoped> {
        None
    }

    fn alterable(&mut self) -> Option<&mut dyn Alterable> {
        None
    }
}

// ============================================================================
// Capability traits
// ============================================================================

/// WHERE conditions. `?` placeholders in a condition are bound from `value`.
pub trait Filterable {
    fn where_(&mut self, condition: &str, value: Option<&Value>);
    fn and_where(&mut self, condition: &str, value: Option<&Value>);
    fn or_where(&mut self, condition: &str, value: Option<&Value>);
    fn reset_where(&mut self);
    /// Replace the conditions with `key BETWEEN left AND right`
    fn between(&mut self, key: &str, left: &Value, right: &Value);
}

pub trait Orderable {
    /// With `first` the ordering goes in front of existing ones
    fn order_by(&mut self, order: &str, append: bool, first: bool);
}

pub trait Paginated {
    fn limit(&mut self, limit: usize);
    fn skip(&mut self, records: usize);
}

pub trait Projectable {
    fn select(&mut self, projections: &[&str], append: bool);
}

pub trait Sourced {
    fn from(&mut self, target: &[&str], append: bool);
}

/// Field/value lists of an insert
pub trait Writable {
    fn fields(&mut self, fields: &[&str], append: bool);
    fn values(&mut self, values: &[Value], append: bool);
    /// Trailing underscore avoids shadowing `Into::into`
    fn into_(&mut self, target: &str);
}

/// `field = value` assignments of an update
pub trait Settable {
    fn set(&mut self, pairs: &[(&str, Value)], append: bool);
}

pub trait Scoped {
    fn on(&mut self, target: &str);
}

pub trait Addressed {
    fn to(&mut self, target: &str);
}

pub trait Typed {
    fn type_(&mut self, kind: &str);
}

pub trait ReferenceScoped {
    fn in_(&mut self, classes: &[&str], append: bool);
}

pub trait Alterable {
    fn changing(&mut self, attribute: &str, value: &str);
}

// ============================================================================
// Constructor arguments
// ============================================================================

/// Constructor arguments, one shape per starting-verb family.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandArgs {
    Select {
        target: Vec<String>,
    },
    Insert,
    Delete {
        from: String,
    },
    Update {
        class: String,
    },
    Collection {
        updates: Vec<(String, Value)>,
        class: String,
        append: bool,
    },
    Credential {
        permission: String,
    },
    Class {
        class: String,
    },
    ClassAlter {
        class: String,
        attribute: String,
        value: String,
    },
    Property {
        property: String,
        kind: Option<String>,
        linked: Option<String>,
    },
    Entity {
        entity: String,
    },
    Reference {
        rid: String,
    },
    IndexCreate {
        property: String,
        kind: String,
        class: Option<String>,
    },
    IndexDrop {
        property: String,
        class: Option<String>,
    },
    IndexName {
        name: String,
    },
    IndexEntry {
        name: String,
        key: Value,
        rid: Option<String>,
    },
    Link {
        class: String,
        property: String,
        alias: String,
        inverse: bool,
    },
}

impl CommandArgs {
    /// Name of the argument shape, for error messages
    pub fn shape(&self) -> &'static str {
        match self {
            CommandArgs::Select { .. } => "select",
            CommandArgs::Insert => "insert",
            CommandArgs::Delete { .. } => "delete",
            CommandArgs::Update { .. } => "update",
            CommandArgs::Collection { .. } => "collection",
            CommandArgs::Credential { .. } => "credential",
            CommandArgs::Class { .. } => "class",
            CommandArgs::ClassAlter { .. } => "class alter",
            CommandArgs::Property { .. } => "property",
            CommandArgs::Entity { .. } => "entity",
            CommandArgs::Reference { .. } => "reference",
            CommandArgs::IndexCreate { .. } => "index create",
            CommandArgs::IndexDrop { .. } => "index drop",
            CommandArgs::IndexName { .. } => "index name",
            CommandArgs::IndexEntry { .. } => "index entry",
            CommandArgs::Link { .. } => "link",
        }
    }
}

pub(crate) fn mismatch(command: &'static str, args: &CommandArgs) -> QueryError {
    QueryError::invalid(
        command,
        format!("cannot construct from {} arguments", args.shape()),
    )
}

pub(crate) fn require_non_empty(
    command: &'static str,
    what: &str,
    value: &str,
) -> QueryResult<()> {
    if value.trim().is_empty() {
        return Err(QueryError::invalid(command, format!("{} must not be empty", what)));
    }
    Ok(())
}

// ============================================================================
// Shared refinement implementations
// ============================================================================

/// Push a WHERE/AND/OR condition onto the `Where` token.
pub(crate) fn push_condition(
    stmt: &mut Statement,
    clause: &str,
    condition: &str,
    value: Option<&Value>,
    append: bool,
) {
    let condition = format!("{} {}", clause, bind(condition, value));
    stmt.set("Where", [condition], append, false);
}

/// Implements [`Filterable`] over a command's `statement` field. The
/// command's schema must carry a `:Where` token.
macro_rules! impl_filterable {
    ($ty:ty) => {
        impl $crate::command::Filterable for $ty {
            fn where_(&mut self, condition: &str, value: Option<&serde_json::Value>) {
                $crate::command::push_condition(&mut self.statement, "WHERE", condition, value, false);
            }

            fn and_where(&mut self, condition: &str, value: Option<&serde_json::Value>) {
                $crate::command::push_condition(&mut self.statement, "AND", condition, value, true);
            }

            fn or_where(&mut self, condition: &str, value: Option<&serde_json::Value>) {
                $crate::command::push_condition(&mut self.statement, "OR", condition, value, true);
            }

            fn reset_where(&mut self) {
                self.statement.clear("Where");
            }

            fn between(
                &mut self,
                key: &str,
                left: &serde_json::Value,
                right: &serde_json::Value,
            ) {
                let condition = format!(
                    "{} BETWEEN {} AND {}",
                    key,
                    $crate::value::format_value(left),
                    $crate::value::format_value(right)
                );
                $crate::command::push_condition(&mut self.statement, "WHERE", &condition, None, false);
            }
        }
    };
}

/// Implements [`Paginated`] over a command's `statement` field (`:Limit`
/// and `:Skip` tokens).
macro_rules! impl_paginated {
    ($ty:ty) => {
        impl $crate::command::Paginated for $ty {
            fn limit(&mut self, limit: usize) {
                self.statement.set_one("Limit", limit.to_string());
            }

            fn skip(&mut self, records: usize) {
                self.statement.set_one("Skip", records.to_string());
            }
        }
    };
}

/// Rendering and downcasting boilerplate shared by statement-backed commands.
macro_rules! statement_command {
    () => {
        fn raw(&self) -> String {
            self.statement.render()
        }

        fn tokens(&self) -> Vec<$crate::statement::Token> {
            self.statement.tokens()
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}

pub(crate) use impl_filterable;
pub(crate) use impl_paginated;
pub(crate) use statement_command;
