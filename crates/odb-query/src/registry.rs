//! Command registry.
//!
//! Maps dotted operation identifiers (`"select"`, `"index.create"`,
//! `"truncate.record"`, ...) to command factories. The registry is seeded
//! with the built-in commands; caller entries registered under an existing
//! identifier replace the built-in one in place, new identifiers are
//! appended.

use crate::command::{
    ClassAlter, ClassCreate, ClassDrop, CollectionOp, Command, CommandArgs, Credential,
    CredentialKind, Delete, FindReferences, IndexCount, IndexCreate, IndexDrop, IndexLookup,
    IndexPut, IndexRebuild, IndexRemove, Insert, Link, PropertyAlter, PropertyCreate,
    PropertyDrop, Select, Truncate, TruncateKind, Update, UpdateCollection,
};
use crate::error::{QueryError, QueryResult};
use std::fmt;
use std::sync::Arc;

/// Builds a command from constructor arguments.
///
/// Implemented for any `Fn(CommandArgs) -> QueryResult<Box<dyn Command>>`,
/// so plain functions and closures register directly.
pub trait CommandFactory: Send + Sync {
    fn build(&self, args: CommandArgs) -> QueryResult<Box<dyn Command>>;
}

impl<F> CommandFactory for F
where
    F: Fn(CommandArgs) -> QueryResult<Box<dyn Command>> + Send + Sync,
{
    fn build(&self, args: CommandArgs) -> QueryResult<Box<dyn Command>> {
        self(args)
    }
}

type Constructor = fn(CommandArgs) -> QueryResult<Box<dyn Command>>;

fn boxed<C: Command + 'static>(command: QueryResult<C>) -> QueryResult<Box<dyn Command>> {
    command.map(|c| Box::new(c) as Box<dyn Command>)
}

/// Built-in commands in registration order
fn default_commands() -> [(&'static str, Constructor); 27] {
    let commands: [(&'static str, Constructor); 27] = [
        ("select", |a| boxed(Select::from_args(a))),
        ("insert", |a| boxed(Insert::from_args(a))),
        ("delete", |a| boxed(Delete::from_args(a))),
        ("update", |a| boxed(Update::from_args(a))),
        ("update.add", |a| {
            boxed(UpdateCollection::from_args(CollectionOp::Add, a))
        }),
        ("update.remove", |a| {
            boxed(UpdateCollection::from_args(CollectionOp::Remove, a))
        }),
        ("update.put", |a| {
            boxed(UpdateCollection::from_args(CollectionOp::Put, a))
        }),
        ("grant", |a| {
            boxed(Credential::from_args(CredentialKind::Grant, a))
        }),
        ("revoke", |a| {
            boxed(Credential::from_args(CredentialKind::Revoke, a))
        }),
        ("class.create", |a| boxed(ClassCreate::from_args(a))),
        ("class.drop", |a| boxed(ClassDrop::from_args(a))),
        ("class.alter", |a| boxed(ClassAlter::from_args(a))),
        ("truncate.class", |a| {
            boxed(Truncate::from_args(TruncateKind::Class, a))
        }),
        ("truncate.cluster", |a| {
            boxed(Truncate::from_args(TruncateKind::Cluster, a))
        }),
        ("truncate.record", |a| {
            boxed(Truncate::from_args(TruncateKind::Record, a))
        }),
        ("references.find", |a| boxed(FindReferences::from_args(a))),
        ("property.create", |a| boxed(PropertyCreate::from_args(a))),
        ("property.drop", |a| boxed(PropertyDrop::from_args(a))),
        ("property.alter", |a| boxed(PropertyAlter::from_args(a))),
        ("index.drop", |a| boxed(IndexDrop::from_args(a))),
        ("index.create", |a| boxed(IndexCreate::from_args(a))),
        ("index.count", |a| boxed(IndexCount::from_args(a))),
        ("index.put", |a| boxed(IndexPut::from_args(a))),
        ("index.remove", |a| boxed(IndexRemove::from_args(a))),
        ("index.lookup", |a| boxed(IndexLookup::from_args(a))),
        ("index.rebuild", |a| boxed(IndexRebuild::from_args(a))),
        ("link", |a| boxed(Link::from_args(a))),
    ];
    commands
}

/// Ordered mapping from operation identifier to command factory.
#[derive(Clone)]
pub struct CommandRegistry {
    entries: Vec<(String, Arc<dyn CommandFactory>)>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl CommandRegistry {
    /// Registry seeded with every built-in command
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for (id, constructor) in default_commands() {
            registry.register(id, Arc::new(constructor));
        }
        registry
    }

    /// Registry with no commands at all
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a factory; an existing entry for `id` is replaced in place.
    pub fn register(&mut self, id: impl Into<String>, factory: Arc<dyn CommandFactory>) {
        let id = id.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => {
                tracing::debug!(id = %id, "overriding registered command");
                entry.1 = factory;
            }
            None => self.entries.push((id, factory)),
        }
    }

    /// Merge caller entries over the current ones; overrides win on collision.
    pub fn extend<I, K>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (K, Arc<dyn CommandFactory>)>,
        K: Into<String>,
    {
        for (id, factory) in overrides {
            self.register(id, factory);
        }
    }

    /// Make `id` resolve to whatever factory `target` currently resolves to.
    pub fn alias(&mut self, id: impl Into<String>, target: &str) -> QueryResult<()> {
        let factory = self.resolve(target)?;
        let id = id.into();
        tracing::debug!(id = %id, to = target, "aliasing command");
        self.register(id, factory);
        Ok(())
    }

    /// Look up the factory for `id`.
    pub fn resolve(&self, id: &str) -> QueryResult<Arc<dyn CommandFactory>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, factory)| Arc::clone(factory))
            .ok_or_else(|| QueryError::not_found(id))
    }

    /// Resolve `id` and construct a command from `args`.
    pub fn build(&self, id: &str, args: CommandArgs) -> QueryResult<Box<dyn Command>> {
        self.resolve(id)?.build(args)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == id)
    }

    /// Registered identifiers in registration order
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for ergonomic registry construction
pub struct CommandRegistryBuilder {
    registry: CommandRegistry,
}

impl Default for CommandRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistryBuilder {
    /// Start from an empty registry
    pub fn new() -> Self {
        Self {
            registry: CommandRegistry::empty(),
        }
    }

    /// Add every built-in command
    pub fn with_defaults(mut self) -> Self {
        self.registry.extend(CommandRegistry::new().entries);
        self
    }

    /// Add or replace a command
    pub fn with_command(mut self, id: impl Into<String>, factory: impl CommandFactory + 'static) -> Self {
        self.registry.register(id, Arc::new(factory));
        self
    }

    pub fn build(self) -> CommandRegistry {
        self.registry
    }
}
