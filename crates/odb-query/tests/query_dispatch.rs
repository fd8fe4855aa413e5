//! End-to-end tests for the fluent dispatcher and its registry.

use odb_query::command::{
    ClassCreate, ClassDrop, Credential, CredentialKind, Delete, FindReferences, IndexCount, IndexCreate,
    IndexDrop, IndexLookup, IndexPut, IndexRebuild, IndexRemove, Insert, Link, PropertyCreate,
    PropertyDrop, Select, Truncate, TruncateKind, Update, UpdateCollection,
};
use odb_query::statement::Token;
use odb_query::{
    Command, CommandArgs, CommandFactory, CommandRegistry, CommandRegistryBuilder, Query,
    QueryConfig, QueryError, QueryResult, RidPolicy,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use test_case::test_case;

fn query() -> Query {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
    Query::new(["Person"])
}

fn token_values(query: &Query, name: &str) -> Vec<String> {
    query
        .tokens()
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.values)
        .unwrap_or_else(|| panic!("no token {}", name))
}

// ============================================================================
// Starting verbs map to their command variant
// ============================================================================

#[test]
fn test_starting_verbs_install_variants() {
    let mut q = query();

    q.insert().unwrap();
    assert!(q.command_as::<Insert>().is_some());

    q.delete("Person").unwrap();
    assert!(q.command_as::<Delete>().is_some());

    q.update("Person").unwrap();
    assert!(q.command_as::<Update>().is_some());

    q.add(&[("friends", json!("#10:3"))], "#12:0", false).unwrap();
    assert!(q.command_as::<UpdateCollection>().is_some());
    assert_eq!(q.command().name(), "update.add");

    q.grant("READ").unwrap();
    assert!(q.command_as::<Credential>().is_some());

    q.create("Person", None, None, None).unwrap();
    assert!(q.command_as::<ClassCreate>().is_some());

    q.drop("Person", None).unwrap();
    assert!(q.command_as::<ClassDrop>().is_some());

    q.drop("Person", Some("name")).unwrap();
    assert!(q.command_as::<PropertyDrop>().is_some());

    q.find_references("#12:0", &[], true).unwrap();
    assert!(q.command_as::<FindReferences>().is_some());

    q.index("name", "unique", None).unwrap();
    assert!(q.command_as::<IndexCreate>().is_some());

    q.unindex("name", Some("Person")).unwrap();
    assert!(q.command_as::<IndexDrop>().is_some());

    q.index_count("people").unwrap();
    assert!(q.command_as::<IndexCount>().is_some());

    q.index_put("people", json!("ada"), "#12:0").unwrap();
    assert!(q.command_as::<IndexPut>().is_some());

    q.index_remove("people", json!("ada"), None).unwrap();
    assert!(q.command_as::<IndexRemove>().is_some());

    q.rebuild("*").unwrap();
    assert!(q.command_as::<IndexRebuild>().is_some());

    q.lookup("people").unwrap();
    assert!(q.command_as::<IndexLookup>().is_some());

    q.link("Comment", "postId", "post", false).unwrap();
    assert!(q.command_as::<Link>().is_some());

    q.select_from(&["City"]).unwrap();
    assert!(q.command_as::<Select>().is_some());
}

#[test_case("grant", "READ", "GRANT READ ON database.class.Person TO reader" ; "grant")]
#[test_case("revoke", "UPDATE", "REVOKE UPDATE ON database.class.Person FROM reader" ; "revoke")]
fn test_credentials(verb: &str, permission: &str, expected: &str) {
    let mut q = query();
    let started = if verb == "grant" {
        q.grant(permission)
    } else {
        q.revoke(permission)
    };
    started
        .unwrap()
        .on("database.class.Person")
        .unwrap()
        .to("reader")
        .unwrap();

    let kind = if verb == "grant" {
        CredentialKind::Grant
    } else {
        CredentialKind::Revoke
    };
    assert_eq!(q.command_as::<Credential>().map(Credential::kind), Some(kind));
    assert_eq!(q.command().name(), verb);
    assert_eq!(q.raw(), expected);
}

// ============================================================================
// Update collections and index management
// ============================================================================

#[test]
fn test_remove_from_collection() {
    let mut q = query();
    q.remove(&[("tags", json!("old"))], "Post", false).unwrap();

    assert_eq!(q.command().name(), "update.remove");
    assert_eq!(q.raw(), r#"UPDATE Post REMOVE tags = "old""#);
}

#[test]
fn test_put_into_map() {
    let mut q = query();
    q.put(&[("addresses", json!({"home": "#11:1"}))], "Person", false)
        .unwrap();

    assert_eq!(q.command().name(), "update.put");
    assert_eq!(q.raw(), r#"UPDATE Person PUT addresses = "home", #11:1"#);
}

#[test]
fn test_put_rejects_non_map() {
    let mut q = query();
    assert!(matches!(
        q.put(&[("addresses", json!("home"))], "Person", false),
        Err(QueryError::InvalidArguments { command: "update.put", .. })
    ));
    assert!(q.command_as::<Select>().is_some());
}

#[test]
fn test_unindex() {
    let mut q = query();
    assert_eq!(q.unindex("name", Some("Person")).unwrap().raw(), "DROP INDEX Person.name");
    assert_eq!(q.unindex("name", None).unwrap().raw(), "DROP INDEX name");
}

// ============================================================================
// Truncate classification
// ============================================================================

#[test_case("#12:0", false, TruncateKind::Record, "TRUNCATE RECORD #12:0" ; "prefixed rid")]
#[test_case("12:0", false, TruncateKind::Record, "TRUNCATE RECORD #12:0" ; "bare rid")]
#[test_case("Person", false, TruncateKind::Class, "TRUNCATE CLASS Person" ; "class")]
#[test_case("person", true, TruncateKind::Cluster, "TRUNCATE CLUSTER person" ; "cluster")]
#[test_case("#12:0", true, TruncateKind::Record, "TRUNCATE RECORD #12:0" ; "rid wins over cluster flag")]
fn test_truncate(entity: &str, and_cluster: bool, kind: TruncateKind, expected: &str) {
    let mut q = query();
    q.truncate(entity, and_cluster).unwrap();

    assert_eq!(q.command_as::<Truncate>().map(Truncate::kind), Some(kind));
    assert_eq!(q.raw(), expected);
}

#[test_case("#4294967296:0" ; "cluster overflow")]
#[test_case("12:99999999999999999999" ; "position overflow")]
fn test_truncate_overflowing_rid(entity: &str) {
    let mut q = query();
    assert!(matches!(
        q.truncate(entity, true),
        Err(QueryError::InvalidRid(_))
    ));
    assert!(q.command_as::<Select>().is_some());
}

#[test]
fn test_explicit_truncate_verbs() {
    let mut q = query();
    assert_eq!(q.truncate_record("5:1").unwrap().raw(), "TRUNCATE RECORD #5:1");
    assert_eq!(q.truncate_class("Person").unwrap().raw(), "TRUNCATE CLASS Person");
    assert_eq!(q.truncate_cluster("person").unwrap().raw(), "TRUNCATE CLUSTER person");
}

// ============================================================================
// Class or property schema commands
// ============================================================================

#[test]
fn test_create_property_tokens() {
    let mut q = query();
    q.create("Person", Some("name"), Some("string"), None).unwrap();

    assert!(q.command_as::<PropertyCreate>().is_some());
    assert_eq!(token_values(&q, "Property"), ["name"]);
    assert_eq!(token_values(&q, "Type"), ["string"]);
    assert!(token_values(&q, "Linked").is_empty());
    assert_eq!(token_values(&q, "Class"), ["Person"]);
}

#[test]
fn test_create_linked_property() {
    let mut q = query();
    q.create("Person", Some("friends"), Some("LINKSET"), Some("Person"))
        .unwrap();
    assert_eq!(q.raw(), "CREATE PROPERTY Person.friends LINKSET Person");
}

#[test]
fn test_alter_class_and_property() {
    let mut q = query();
    q.alter("Person", "SUPERCLASS", "V").unwrap();
    assert_eq!(q.raw(), "ALTER CLASS Person SUPERCLASS V");

    q.alter_property("Person", "name", "MANDATORY", "true")
        .unwrap();
    assert_eq!(q.raw(), "ALTER PROPERTY Person.name MANDATORY true");
}

// ============================================================================
// Refinement chaining
// ============================================================================

#[test]
fn test_chaining_after_insert() {
    let mut q = query();
    q.insert()
        .unwrap()
        .fields(&["name", "age"], true)
        .unwrap()
        .values(&[json!("Ada"), json!(36)], true)
        .unwrap()
        .into_("Person")
        .unwrap();

    assert_eq!(q.raw(), r#"INSERT INTO Person (name, age) VALUES ("Ada", 36)"#);
}

#[test]
fn test_select_refinements() {
    let mut q = query();
    q.select(&["name"], true)
        .unwrap()
        .where_("age > ?", Some(json!(18)))
        .unwrap()
        .or_where("name = ?", Some(json!("Ada")))
        .unwrap()
        .order_by("name", true, false)
        .unwrap()
        .skip(5)
        .unwrap()
        .limit(10)
        .unwrap();

    insta::assert_snapshot!(
        q.raw(),
        @r#"SELECT name FROM Person WHERE age > 18 OR name = "Ada" ORDER BY name SKIP 5 LIMIT 10"#
    );
}

#[test]
fn test_reset_where() {
    let mut q = query();
    q.where_("a = 1", None)
        .unwrap()
        .or_where("b = 2", None)
        .unwrap()
        .reset_where()
        .unwrap();
    assert_eq!(q.raw(), "SELECT FROM Person");
}

#[test]
fn test_from_replaces_or_extends_target() {
    let mut q = query();
    q.from(&["City"], false).unwrap();
    assert_eq!(q.raw(), "SELECT FROM City");

    q.from(&["Town"], true).unwrap();
    assert_eq!(q.raw(), "SELECT FROM [City, Town]");
}

#[test]
fn test_string_values_keep_inner_spaces() {
    let mut q = query();
    q.where_("name = ?", Some(json!("a  b"))).unwrap();
    assert_eq!(q.raw(), r#"SELECT FROM Person WHERE name = "a  b""#);

    q.insert()
        .unwrap()
        .into_("Person")
        .unwrap()
        .fields(&["name"], true)
        .unwrap()
        .values(&[json!("a  b")], true)
        .unwrap();
    assert_eq!(q.raw(), r#"INSERT INTO Person (name) VALUES ("a  b")"#);

    q.update("Person")
        .unwrap()
        .set(&[("name", json!("a   b"))], true)
        .unwrap();
    assert_eq!(q.raw(), r#"UPDATE Person SET name = "a   b""#);

    q.index_remove("people", json!("x  y"), None).unwrap();
    assert_eq!(q.raw(), r#"DELETE FROM index:people WHERE key = "x  y""#);
}

#[test]
fn test_update_set_and_where() {
    let mut q = query();
    q.update("Person")
        .unwrap()
        .set(&[("name", json!("Ada"))], true)
        .unwrap()
        .where_("@rid = ?", Some(json!("#12:0")))
        .unwrap();

    assert_eq!(q.raw(), r#"UPDATE Person SET name = "Ada" WHERE @rid = #12:0"#);
}

#[test]
fn test_find_references_in_classes() {
    let mut q = query();
    q.find_references("12:0", &["Person", "Company"], true)
        .unwrap();
    assert_eq!(q.raw(), "FIND REFERENCES #12:0 [Person, Company]");
}

#[test]
fn test_link_refinements() {
    let mut q = query();
    q.link("Comment", "postId", "post", true)
        .unwrap()
        .type_("LINKSET")
        .unwrap()
        .to("Post.id")
        .unwrap();
    assert_eq!(
        q.raw(),
        "CREATE LINK post TYPE LINKSET FROM Comment.postId TO Post.id INVERSE"
    );
}

#[test_case(|q: &mut Query| q.limit(10).map(|_| ()), "limit" ; "limit")]
#[test_case(|q: &mut Query| q.where_("a = 1", None).map(|_| ()), "where" ; "where")]
#[test_case(|q: &mut Query| q.order_by("a", true, false).map(|_| ()), "order_by" ; "order by")]
#[test_case(|q: &mut Query| q.on("Person").map(|_| ()), "on" ; "on")]
fn test_unsupported_on_insert(refine: fn(&mut Query) -> QueryResult<()>, refinement: &str) {
    let mut q = query();
    q.insert().unwrap();

    match refine(&mut q) {
        Err(QueryError::UnsupportedRefinement {
            command,
            refinement: actual,
        }) => {
            assert_eq!(command, "insert");
            assert_eq!(actual, refinement);
        }
        other => panic!("expected unsupported refinement, got {:?}", other),
    }
    assert_eq!(q.raw(), "INSERT INTO () VALUES ()");
}

#[test]
fn test_rendering_is_idempotent() {
    let mut q = query();
    q.where_("a = ?", Some(json!(1))).unwrap();

    let first = q.raw();
    assert_eq!(q.raw(), first);
    assert_eq!(q.to_string(), first);
    assert_eq!(q.tokens(), q.tokens());
}

#[test]
fn test_can_hydrate_only_for_select() {
    let mut q = query();
    assert!(q.can_hydrate());

    q.insert().unwrap();
    assert!(!q.can_hydrate());
}

// ============================================================================
// Registry overrides
// ============================================================================

/// Stand-in select that always renders the same text
#[derive(Debug)]
struct FixedSelect {
    target: Vec<String>,
}

impl Command for FixedSelect {
    fn name(&self) -> &'static str {
        "fixed.select"
    }

    fn raw(&self) -> String {
        format!("SELECT * FROM {}", self.target.join(", "))
    }

    fn tokens(&self) -> Vec<Token> {
        vec![Token {
            name: "Target".into(),
            values: self.target.clone(),
        }]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn fixed_select(args: CommandArgs) -> QueryResult<Box<dyn Command>> {
    match args {
        CommandArgs::Select { target } => Ok(Box::new(FixedSelect { target })),
        _ => Ok(Box::new(FixedSelect { target: vec![] })),
    }
}

#[test]
fn test_select_override() {
    let factory: Arc<dyn CommandFactory> = Arc::new(fixed_select);
    let mut q = Query::with_commands(["Person"], [("select", factory)]).unwrap();

    assert!(q.command_as::<FixedSelect>().is_some());
    assert_eq!(q.raw(), "SELECT * FROM Person");
    assert_eq!(q.registry().len(), 27);

    // other built-ins are untouched
    q.insert().unwrap();
    assert!(q.command_as::<Insert>().is_some());

    // overridden command advertises no capabilities
    q.select_from(&["City"]).unwrap();
    assert!(matches!(
        q.limit(1),
        Err(QueryError::UnsupportedRefinement { command: "fixed.select", .. })
    ));
}

/// Property command that advertises no capabilities
#[derive(Debug)]
struct BareProperty;

impl Command for BareProperty {
    fn name(&self) -> &'static str {
        "bare"
    }

    fn raw(&self) -> String {
        "BARE".into()
    }

    fn tokens(&self) -> Vec<Token> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn bare_property(_args: CommandArgs) -> QueryResult<Box<dyn Command>> {
    Ok(Box::new(BareProperty))
}

#[test_case(|q: &mut Query| q.create("Person", Some("name"), Some("string"), None).map(|_| ()), "on" ; "create property")]
#[test_case(|q: &mut Query| q.drop("Person", Some("name")).map(|_| ()), "on" ; "drop property")]
#[test_case(|q: &mut Query| q.alter_property("Person", "name", "MANDATORY", "true").map(|_| ()), "on" ; "alter property")]
#[test_case(|q: &mut Query| q.find_references("#12:0", &["Person"], true).map(|_| ()), "in" ; "find references")]
fn test_failed_follow_up_keeps_active_command(
    start: fn(&mut Query) -> QueryResult<()>,
    refinement: &str,
) {
    let ids = [
        "property.create",
        "property.drop",
        "property.alter",
        "references.find",
    ];
    let overrides: Vec<(&str, Arc<dyn CommandFactory>)> = ids
        .into_iter()
        .map(|id| {
            let factory: Arc<dyn CommandFactory> = Arc::new(bare_property);
            (id, factory)
        })
        .collect();
    let mut q = Query::with_commands(["Person"], overrides).unwrap();
    q.insert().unwrap();

    match start(&mut q) {
        Err(QueryError::UnsupportedRefinement {
            command: "bare",
            refinement: actual,
        }) => assert_eq!(actual, refinement),
        other => panic!("expected unsupported refinement, got {:?}", other),
    }
    assert!(q.command_as::<Insert>().is_some());
    assert_eq!(q.command().name(), "insert");
}

#[test]
fn test_empty_registry_has_no_select() {
    let err = Query::with_registry(["Person"], CommandRegistry::empty()).unwrap_err();
    assert!(matches!(err, QueryError::CommandNotFound { ref id } if id == "select"));
    assert_eq!(err.to_string(), "command select not found in registry");
}

#[test]
fn test_missing_operation() {
    let registry = CommandRegistryBuilder::new()
        .with_command("select", fixed_select)
        .build();
    let mut q = Query::with_registry(["Person"], registry).unwrap();

    assert!(matches!(
        q.truncate("Person", false),
        Err(QueryError::CommandNotFound { ref id }) if id == "truncate.class"
    ));
    assert_eq!(q.raw(), "SELECT * FROM Person");
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_strict_policy_from_config() {
    let config = QueryConfig::from_toml_str(r#"rid_policy = "strict""#).unwrap();
    let mut q = Query::with_config(
        ["Person"],
        Vec::<(String, Arc<dyn CommandFactory>)>::new(),
        &config,
    )
    .unwrap();
    assert_eq!(q.rid_policy(), RidPolicy::Strict);

    q.truncate("12:0", false).unwrap();
    assert_eq!(q.raw(), "TRUNCATE CLASS 12:0");

    q.truncate("#12:0", false).unwrap();
    assert_eq!(q.raw(), "TRUNCATE RECORD #12:0");
}

#[test]
fn test_config_aliases() {
    let config = QueryConfig::from_toml_str(
        r#"
        [aliases]
        "truncate.class" = "truncate.cluster"
        "#,
    )
    .unwrap();
    let mut q = Query::with_config(
        ["Person"],
        Vec::<(String, Arc<dyn CommandFactory>)>::new(),
        &config,
    )
    .unwrap();

    q.truncate("person", false).unwrap();
    assert_eq!(q.raw(), "TRUNCATE CLUSTER person");
}
