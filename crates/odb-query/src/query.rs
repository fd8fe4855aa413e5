//! Fluent query dispatcher.
//!
//! [`Query`] owns a [`CommandRegistry`] and exactly one active command.
//! Starting verbs (`insert`, `delete`, `truncate`, `index`, ...) resolve
//! their operation identifier, build a fresh command and replace the active
//! one. Refining verbs (`where_`, `fields`, `limit`, ...) forward to the
//! active command through its capability accessors and fail with
//! [`QueryError::UnsupportedRefinement`] when the command lacks that
//! capability.
//!
//! Every verb returns `&mut Query`, so calls chain:
//!
//! ```
//! use odb_query::Query;
//! use serde_json::json;
//!
//! # fn main() -> odb_query::QueryResult<()> {
//! let mut query = Query::new(["Person"]);
//! query
//!     .select(&["name"], true)?
//!     .where_("age > ?", Some(json!(18)))?
//!     .limit(10)?;
//! assert_eq!(query.raw(), "SELECT name FROM Person WHERE age > 18 LIMIT 10");
//!
//! query.insert()?.into_("Person")?.fields(&["name"], true)?.values(&[json!("Ada")], true)?;
//! assert_eq!(query.raw(), r#"INSERT INTO Person (name) VALUES ("Ada")"#);
//! # Ok(())
//! # }
//! ```

use crate::command::{Command, CommandArgs, Select};
use crate::config::QueryConfig;
use crate::error::{QueryError, QueryResult};
use crate::registry::{CommandFactory, CommandRegistry};
use crate::rid::{classify_truncate, Rid, RidPolicy, TruncateTarget};
use crate::statement::Token;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Forward a refinement to a command's capability, or fail with
/// `UnsupportedRefinement`. Evaluates to `QueryResult<()>`.
macro_rules! apply {
    ($command:expr, $access:ident, $refinement:literal, |$cap:ident| $body:expr) => {{
        let command: &mut dyn Command = $command;
        let name = command.name();
        tracing::trace!(command = name, refinement = $refinement, "delegating refinement");
        match command.$access() {
            Some($cap) => {
                $body;
                Ok(())
            }
            None => {
                tracing::warn!(
                    command = name,
                    refinement = $refinement,
                    "refinement not supported by command"
                );
                Err(QueryError::unsupported(name, $refinement))
            }
        }
    }};
}

/// [`apply!`] on the active command, returning the query for chaining.
macro_rules! refine {
    ($self:ident, $access:ident, $refinement:literal, |$cap:ident| $body:expr) => {{
        apply!($self.command.as_mut(), $access, $refinement, |$cap| $body)?;
        Ok($self)
    }};
}

/// Builder facade over the command registry.
#[derive(Debug)]
pub struct Query {
    registry: CommandRegistry,
    rid_policy: RidPolicy,
    command: Box<dyn Command>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl Query {
    /// Query over the built-in registry, starting as `SELECT FROM target`.
    pub fn new<I, S>(target: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registry: CommandRegistry::new(),
            rid_policy: RidPolicy::default(),
            command: Box::new(Select::new(target)),
        }
    }

    /// Query over the built-in registry merged with `overrides`.
    ///
    /// The initial command is built through the registry, so overriding
    /// `"select"` changes it too.
    pub fn with_commands<I, S, O, K>(target: I, overrides: O) -> QueryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        O: IntoIterator<Item = (K, Arc<dyn CommandFactory>)>,
        K: Into<String>,
    {
        let mut registry = CommandRegistry::new();
        registry.extend(overrides);
        Self::with_registry(target, registry)
    }

    /// Query over an explicit registry. Fails with `CommandNotFound` when
    /// the registry has no `"select"` entry.
    pub fn with_registry<I, S>(target: I, registry: CommandRegistry) -> QueryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = target.into_iter().map(Into::into).collect();
        let command = registry.build("select", CommandArgs::Select { target })?;

        Ok(Self {
            registry,
            rid_policy: RidPolicy::default(),
            command,
        })
    }

    /// Query over the built-in registry, `overrides`, then `config` aliases.
    pub fn with_config<I, S, O, K>(target: I, overrides: O, config: &QueryConfig) -> QueryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        O: IntoIterator<Item = (K, Arc<dyn CommandFactory>)>,
        K: Into<String>,
    {
        let mut registry = CommandRegistry::new();
        registry.extend(overrides);
        config.apply(&mut registry)?;

        let mut query = Self::with_registry(target, registry)?;
        query.rid_policy = config.rid_policy;
        Ok(query)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn rid_policy(&self) -> RidPolicy {
        self.rid_policy
    }

    pub fn set_rid_policy(&mut self, policy: RidPolicy) -> &mut Self {
        self.rid_policy = policy;
        self
    }

    /// The active command
    pub fn command(&self) -> &dyn Command {
        self.command.as_ref()
    }

    pub fn command_mut(&mut self) -> &mut dyn Command {
        self.command.as_mut()
    }

    /// The active command as a concrete type, if it is one
    pub fn command_as<T: Command + 'static>(&self) -> Option<&T> {
        self.command.as_any().downcast_ref::<T>()
    }

    pub fn into_command(self) -> Box<dyn Command> {
        self.command
    }

    /// Build the command registered under `id` and make it the active one.
    pub fn start(&mut self, id: &str, args: CommandArgs) -> QueryResult<&mut Self> {
        let command = self.registry.build(id, args)?;
        Ok(self.install(id, command))
    }

    fn install(&mut self, id: &str, command: Box<dyn Command>) -> &mut Self {
        tracing::debug!(id, command = command.name(), "installed active command");
        self.command = command;
        self
    }

    // ========================================================================
    // Starting verbs
    // ========================================================================

    /// `SELECT FROM target`
    pub fn select_from(&mut self, target: &[&str]) -> QueryResult<&mut Self> {
        let target = target.iter().map(|t| t.to_string()).collect();
        self.start("select", CommandArgs::Select { target })
    }

    pub fn insert(&mut self) -> QueryResult<&mut Self> {
        self.start("insert", CommandArgs::Insert)
    }

    pub fn delete(&mut self, from: &str) -> QueryResult<&mut Self> {
        self.start("delete", CommandArgs::Delete { from: from.into() })
    }

    pub fn update(&mut self, class: &str) -> QueryResult<&mut Self> {
        self.start("update", CommandArgs::Update { class: class.into() })
    }

    /// `UPDATE class ADD field = value`
    pub fn add(&mut self, updates: &[(&str, Value)], class: &str, append: bool) -> QueryResult<&mut Self> {
        self.start("update.add", collection_args(updates, class, append))
    }

    /// `UPDATE class REMOVE field = value`
    pub fn remove(&mut self, updates: &[(&str, Value)], class: &str, append: bool) -> QueryResult<&mut Self> {
        self.start("update.remove", collection_args(updates, class, append))
    }

    /// `UPDATE class PUT field = "key", value`; each value is a map
    pub fn put(&mut self, values: &[(&str, Value)], class: &str, append: bool) -> QueryResult<&mut Self> {
        self.start("update.put", collection_args(values, class, append))
    }

    pub fn grant(&mut self, permission: &str) -> QueryResult<&mut Self> {
        self.start(
            "grant",
            CommandArgs::Credential {
                permission: permission.into(),
            },
        )
    }

    pub fn revoke(&mut self, permission: &str) -> QueryResult<&mut Self> {
        self.start(
            "revoke",
            CommandArgs::Credential {
                permission: permission.into(),
            },
        )
    }

    /// Create a class, or a property of `class` when `property` is given.
    pub fn create(
        &mut self,
        class: &str,
        property: Option<&str>,
        kind: Option<&str>,
        linked: Option<&str>,
    ) -> QueryResult<&mut Self> {
        self.class_or_property("create", class, property, kind, linked)
    }

    /// Drop a class, or a property of `class` when `property` is given.
    pub fn drop(&mut self, class: &str, property: Option<&str>) -> QueryResult<&mut Self> {
        self.class_or_property("drop", class, property, None, None)
    }

    /// `ALTER CLASS class attribute value`
    pub fn alter(&mut self, class: &str, attribute: &str, value: &str) -> QueryResult<&mut Self> {
        self.start(
            "class.alter",
            CommandArgs::ClassAlter {
                class: class.into(),
                attribute: attribute.into(),
                value: value.into(),
            },
        )
    }

    /// `ALTER PROPERTY class.property attribute value`
    pub fn alter_property(
        &mut self,
        class: &str,
        property: &str,
        attribute: &str,
        value: &str,
    ) -> QueryResult<&mut Self> {
        let id = "property.alter";
        let mut command = self.registry.build(id, property_args(property, None, None))?;
        apply!(command.as_mut(), scoped, "on", |s| s.on(class))?;
        apply!(command.as_mut(), alterable, "changing", |a| a.changing(attribute, value))?;
        Ok(self.install(id, command))
    }

    /// Truncate a record, class or cluster depending on what `entity` looks
    /// like: anything shaped like a record identifier under the current
    /// [`RidPolicy`] truncates that record; other names truncate the class,
    /// or the cluster when `and_cluster` is set. A record identifier whose
    /// numbers overflow fails with `InvalidRid`.
    pub fn truncate(&mut self, entity: &str, and_cluster: bool) -> QueryResult<&mut Self> {
        let target = classify_truncate(entity, and_cluster, self.rid_policy)?;
        tracing::debug!(entity, target = target.operation_id(), "classified truncate target");
        self.truncate_target(&target, entity)
    }

    /// `TRUNCATE RECORD rid`, without classification
    pub fn truncate_record(&mut self, rid: &str) -> QueryResult<&mut Self> {
        let rid = Rid::parse_with(rid, RidPolicy::Lenient)?;
        self.truncate_target(&TruncateTarget::Record(rid), &rid.to_string())
    }

    /// `TRUNCATE CLASS name`, without classification
    pub fn truncate_class(&mut self, class: &str) -> QueryResult<&mut Self> {
        self.truncate_target(&TruncateTarget::Class, class)
    }

    /// `TRUNCATE CLUSTER name`, without classification
    pub fn truncate_cluster(&mut self, cluster: &str) -> QueryResult<&mut Self> {
        self.truncate_target(&TruncateTarget::Cluster, cluster)
    }

    /// `FIND REFERENCES rid [classes]`
    pub fn find_references(&mut self, rid: &str, classes: &[&str], append: bool) -> QueryResult<&mut Self> {
        let id = "references.find";
        let mut command = self.registry.build(id, CommandArgs::Reference { rid: rid.into() })?;
        apply!(command.as_mut(), reference_scoped, "in", |r| r.in_(classes, append))?;
        Ok(self.install(id, command))
    }

    /// `CREATE INDEX [class.]property kind`
    pub fn index(&mut self, property: &str, kind: &str, class: Option<&str>) -> QueryResult<&mut Self> {
        self.start(
            "index.create",
            CommandArgs::IndexCreate {
                property: property.into(),
                kind: kind.into(),
                class: class.map(Into::into),
            },
        )
    }

    /// `DROP INDEX [class.]property`
    pub fn unindex(&mut self, property: &str, class: Option<&str>) -> QueryResult<&mut Self> {
        self.start(
            "index.drop",
            CommandArgs::IndexDrop {
                property: property.into(),
                class: class.map(Into::into),
            },
        )
    }

    pub fn index_count(&mut self, name: &str) -> QueryResult<&mut Self> {
        self.start("index.count", index_name(name))
    }

    pub fn index_put(&mut self, name: &str, key: Value, rid: &str) -> QueryResult<&mut Self> {
        self.start(
            "index.put",
            CommandArgs::IndexEntry {
                name: name.into(),
                key,
                rid: Some(rid.into()),
            },
        )
    }

    pub fn index_remove(&mut self, name: &str, key: Value, rid: Option<&str>) -> QueryResult<&mut Self> {
        self.start(
            "index.remove",
            CommandArgs::IndexEntry {
                name: name.into(),
                key,
                rid: rid.map(Into::into),
            },
        )
    }

    pub fn rebuild(&mut self, name: &str) -> QueryResult<&mut Self> {
        self.start("index.rebuild", index_name(name))
    }

    pub fn lookup(&mut self, name: &str) -> QueryResult<&mut Self> {
        self.start("index.lookup", index_name(name))
    }

    /// `CREATE LINK alias FROM class.property [INVERSE]`
    pub fn link(&mut self, class: &str, property: &str, alias: &str, inverse: bool) -> QueryResult<&mut Self> {
        self.start(
            "link",
            CommandArgs::Link {
                class: class.into(),
                property: property.into(),
                alias: alias.into(),
                inverse,
            },
        )
    }

    // ========================================================================
    // Refining verbs
    // ========================================================================

    pub fn where_(&mut self, condition: &str, value: Option<Value>) -> QueryResult<&mut Self> {
        refine!(self, filterable, "where", |f| f.where_(condition, value.as_ref()))
    }

    pub fn and_where(&mut self, condition: &str, value: Option<Value>) -> QueryResult<&mut Self> {
        refine!(self, filterable, "and_where", |f| f.and_where(condition, value.as_ref()))
    }

    pub fn or_where(&mut self, condition: &str, value: Option<Value>) -> QueryResult<&mut Self> {
        refine!(self, filterable, "or_where", |f| f.or_where(condition, value.as_ref()))
    }

    pub fn reset_where(&mut self) -> QueryResult<&mut Self> {
        refine!(self, filterable, "reset_where", |f| f.reset_where())
    }

    pub fn between(&mut self, key: &str, left: Value, right: Value) -> QueryResult<&mut Self> {
        refine!(self, filterable, "between", |f| f.between(key, &left, &right))
    }

    pub fn order_by(&mut self, order: &str, append: bool, first: bool) -> QueryResult<&mut Self> {
        refine!(self, orderable, "order_by", |o| o.order_by(order, append, first))
    }

    pub fn limit(&mut self, limit: usize) -> QueryResult<&mut Self> {
        refine!(self, paginated, "limit", |p| p.limit(limit))
    }

    pub fn skip(&mut self, records: usize) -> QueryResult<&mut Self> {
        refine!(self, paginated, "skip", |p| p.skip(records))
    }

    /// Projections of a select
    pub fn select(&mut self, projections: &[&str], append: bool) -> QueryResult<&mut Self> {
        refine!(self, projectable, "select", |p| p.select(projections, append))
    }

    pub fn from(&mut self, target: &[&str], append: bool) -> QueryResult<&mut Self> {
        refine!(self, sourced, "from", |s| s.from(target, append))
    }

    pub fn fields(&mut self, fields: &[&str], append: bool) -> QueryResult<&mut Self> {
        refine!(self, writable, "fields", |w| w.fields(fields, append))
    }

    pub fn values(&mut self, values: &[Value], append: bool) -> QueryResult<&mut Self> {
        refine!(self, writable, "values", |w| w.values(values, append))
    }

    pub fn into_(&mut self, target: &str) -> QueryResult<&mut Self> {
        refine!(self, writable, "into", |w| w.into_(target))
    }

    /// `field = value` assignments of an update
    pub fn set(&mut self, pairs: &[(&str, Value)], append: bool) -> QueryResult<&mut Self> {
        refine!(self, settable, "set", |s| s.set(pairs, append))
    }

    pub fn on(&mut self, target: &str) -> QueryResult<&mut Self> {
        refine!(self, scoped, "on", |s| s.on(target))
    }

    pub fn to(&mut self, target: &str) -> QueryResult<&mut Self> {
        refine!(self, addressed, "to", |a| a.to(target))
    }

    pub fn type_(&mut self, kind: &str) -> QueryResult<&mut Self> {
        refine!(self, typed, "type", |t| t.type_(kind))
    }

    pub fn in_(&mut self, classes: &[&str], append: bool) -> QueryResult<&mut Self> {
        refine!(self, reference_scoped, "in", |r| r.in_(classes, append))
    }

    pub fn changing(&mut self, attribute: &str, value: &str) -> QueryResult<&mut Self> {
        refine!(self, alterable, "changing", |a| a.changing(attribute, value))
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    pub fn raw(&self) -> String {
        self.command.raw()
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.command.tokens()
    }

    pub fn can_hydrate(&self) -> bool {
        self.command.can_hydrate()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn class_or_property(
        &mut self,
        action: &str,
        class: &str,
        property: Option<&str>,
        kind: Option<&str>,
        linked: Option<&str>,
    ) -> QueryResult<&mut Self> {
        match property.filter(|p| !p.is_empty()) {
            Some(property) => {
                let id = format!("property.{}", action);
                let mut command = self.registry.build(&id, property_args(property, kind, linked))?;
                apply!(command.as_mut(), scoped, "on", |s| s.on(class))?;
                Ok(self.install(&id, command))
            }
            None => self.start(
                &format!("class.{}", action),
                CommandArgs::Class {
                    class: class.into(),
                },
            ),
        }
    }

    fn truncate_target(&mut self, target: &TruncateTarget, entity: &str) -> QueryResult<&mut Self> {
        self.start(
            target.operation_id(),
            CommandArgs::Entity {
                entity: entity.into(),
            },
        )
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw())
    }
}

fn collection_args(updates: &[(&str, Value)], class: &str, append: bool) -> CommandArgs {
    CommandArgs::Collection {
        updates: updates
            .iter()
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect(),
        class: class.into(),
        append,
    }
}

fn property_args(property: &str, kind: Option<&str>, linked: Option<&str>) -> CommandArgs {
    CommandArgs::Property {
        property: property.into(),
        kind: kind.map(Into::into),
        linked: linked.map(Into::into),
    }
}

fn index_name(name: &str) -> CommandArgs {
    CommandArgs::IndexName { name: name.into() }
}
