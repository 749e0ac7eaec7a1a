//! End-to-end CRUD against SQLite.

#![cfg(feature = "sqlite")]

mod common;

use sommy::data_types::{boolean, integer, string, text};
use sommy::drivers::sqlite::SqliteBackend;
use sommy::{
    ConnectionConfig, DefineOptions, EntityConfig, Fields, OrmError, Predicate, SchemaDescriptor, SelectOptions,
    Sommy, Value,
};
use std::sync::Arc;

fn user_schema() -> SchemaDescriptor {
    SchemaDescriptor::new()
        .column("id", integer().primary_key().auto_increment())
        .column("name", string(100))
        .column("email", string(150))
}

fn setup() -> (Sommy, Arc<EntityConfig>) {
    common::init_logger();
    let sommy = Sommy::connect(&ConnectionConfig::sqlite_memory()).expect("Failed to open sqlite");
    sommy.authenticate().expect("Failed to authenticate");
    let users = sommy.define("User", user_schema(), DefineOptions::new());
    users.sync().expect("Failed to create table");
    (sommy, users)
}

fn seed(users: &Arc<EntityConfig>, names: &[&str]) {
    for name in names {
        users
            .create(Fields::new().with("name", *name).with("email", format!("{name}@example.com")))
            .expect("Failed to insert")
            .expect("Insert produced no key");
    }
}

#[test]
fn test_clinton_scenario() {
    let (_sommy, users) = setup();
    let created = users
        .create(Fields::new().with("name", "Clinton").with("email", "clinton@example.com"))
        .unwrap();
    assert!(created.is_some());

    let found = users
        .find_all(&Predicate::new().eq("email", "clinton@example.com"), &SelectOptions::new())
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get("name"), Some(&Value::from("Clinton")));
    assert!(matches!(found[0].get("id"), Some(Value::Int(_))));
}

#[test]
fn test_round_trip_by_generated_key() {
    let (_sommy, users) = setup();
    let record = users
        .create(Fields::new().with("name", "Ada").with("email", "ada@example.com"))
        .unwrap()
        .unwrap();
    let key = record.primary_key_value().cloned().unwrap();

    let fetched = users
        .find_one(&Predicate::new().eq("id", key.clone()), &SelectOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(fetched.get("id"), Some(&key));
    assert_eq!(fetched.get("name"), record.get("name"));
    assert_eq!(fetched.get("email"), record.get("email"));
}

#[test]
fn test_empty_insert_and_update_do_nothing() {
    let (sommy, users) = setup();
    seed(&users, &["a"]);

    assert!(users.create(Fields::new()).unwrap().is_none());
    assert_eq!(sommy.query_interface().insert("user", &Fields::new()).unwrap(), None);
    assert_eq!(users.update(&Fields::new(), &Predicate::new()).unwrap(), 0);
    assert_eq!(users.find_all(&Predicate::new(), &SelectOptions::new()).unwrap().len(), 1);
}

#[test]
fn test_in_list_and_empty_list() {
    let (_sommy, users) = setup();
    seed(&users, &["a", "b", "c", "d"]);

    let matched = users
        .find_all(
            &Predicate::new().any_of("name", ["a", "c", "zzz"]),
            &SelectOptions::new().order_by("name", "asc"),
        )
        .unwrap();
    let names: Vec<_> = matched.iter().filter_map(|r| r.get("name")).collect();
    assert_eq!(names, vec![&Value::from("a"), &Value::from("c")]);

    let none = users
        .find_all(&Predicate::new().any_of("name", Vec::<String>::new()), &SelectOptions::new())
        .unwrap();
    assert!(none.is_empty());
    assert_eq!(users.destroy(&Predicate::new().any_of("name", Vec::<i64>::new())).unwrap(), 0);
}

#[test]
fn test_null_predicate() {
    let (_sommy, users) = setup();
    seed(&users, &["a", "b"]);
    users.create(Fields::new().with("name", "no-mail")).unwrap();

    let without = users
        .find_all(&Predicate::new().eq("email", Value::Null), &SelectOptions::new())
        .unwrap();
    assert_eq!(without.len(), 1);
    assert_eq!(without[0].get("name"), Some(&Value::from("no-mail")));
}

#[test]
fn test_order_limit_offset() {
    let (_sommy, users) = setup();
    seed(&users, &["a", "b", "c", "d", "e"]);

    let page = users
        .find_all(
            &Predicate::new(),
            &SelectOptions::new().order_by("name", "DESC").limit(2).offset(1),
        )
        .unwrap();
    let names: Vec<_> = page.iter().filter_map(|r| r.get("name").and_then(Value::as_str)).collect();
    assert_eq!(names, vec!["d", "c"]);

    let tail = users
        .find_all(&Predicate::new(), &SelectOptions::new().order_raw("id ASC").offset(3))
        .unwrap();
    assert_eq!(tail.len(), 2);
}

#[test]
fn test_record_save_update_delete() {
    let (_sommy, users) = setup();
    let mut record = users.new_record();
    record.set("name", "Grace").unwrap();
    assert!(record.save().unwrap());
    assert!(!record.is_new());

    record.set("email", "grace@example.com").unwrap();
    assert!(record.save().unwrap());
    let stored = users.find_by_pk(record.primary_key_value().cloned().unwrap()).unwrap().unwrap();
    assert_eq!(stored.get("email"), Some(&Value::from("grace@example.com")));

    assert_eq!(record.delete().unwrap(), 1);
    assert_eq!(record.delete().unwrap(), 0);
}

#[test]
fn test_column_ddl_and_drop_table() {
    let (sommy, users) = setup();
    seed(&users, &["a"]);
    let qi = sommy.query_interface();

    qi.add_column("user", "bio", &text()).unwrap();
    qi.add_column("user", "active", &boolean().not_null().default_value(true))
        .unwrap();
    let rows = qi.select("user", &Predicate::new(), &SelectOptions::new()).unwrap();
    assert_eq!(rows[0].get("active"), Some(&Value::Int(1)));
    assert_eq!(rows[0].get("bio"), Some(&Value::Null));

    qi.remove_column("user", "bio").unwrap();
    let rows = qi.select("user", &Predicate::new(), &SelectOptions::new()).unwrap();
    assert!(!rows[0].contains("bio"));

    users.drop_table().unwrap();
    let err = users.find_all(&Predicate::new(), &SelectOptions::new()).unwrap_err();
    assert!(err.is_execution());
    users.drop_table().unwrap();
}

#[test]
fn test_constraint_violation_is_execution_error() {
    let (sommy, _users) = setup();
    let tags = sommy.define(
        "Tag",
        SchemaDescriptor::new()
            .column("id", integer().primary_key().auto_increment())
            .column("slug", string(40).unique().not_null()),
        DefineOptions::new(),
    );
    tags.sync().unwrap();
    tags.create(Fields::new().with("slug", "rust")).unwrap();
    let err = tags.create(Fields::new().with("slug", "rust")).unwrap_err();
    assert!(matches!(err, OrmError::Execution { .. }));
}

#[test]
fn test_transaction_commit_and_rollback() {
    let (sommy, users) = setup();
    let conn = sommy.connection();

    conn.transaction(|conn| {
        conn.query_interface()
            .insert("user", &Fields::new().with("name", "kept"))
            .map(|_| ())
    })
    .unwrap();

    let result: sommy::Result<()> = conn.transaction(|conn| {
        conn.query_interface().insert("user", &Fields::new().with("name", "dropped"))?;
        Err(OrmError::Build("abort".to_string()))
    });
    assert!(result.is_err());

    let names: Vec<_> = users
        .find_all(&Predicate::new(), &SelectOptions::new())
        .unwrap()
        .into_iter()
        .filter_map(|r| r.get("name").cloned())
        .collect();
    assert_eq!(names, vec![Value::from("kept")]);
}

#[test]
fn test_file_backed_database_persists() {
    common::init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let config = ConnectionConfig::sqlite_file(path.to_string_lossy().to_string());

    {
        let sommy = Sommy::connect(&config).unwrap();
        let users = sommy.define("User", user_schema(), DefineOptions::new());
        users.sync().unwrap();
        seed(&users, &["persisted"]);
    }

    let sommy = Sommy::connect(&config).unwrap();
    let users = sommy.define("User", user_schema(), DefineOptions::new());
    let found = users.find_by_pk(1).unwrap().unwrap();
    assert_eq!(found.get("name"), Some(&Value::from("persisted")));

    let native = sommy.connection().backend::<SqliteBackend>().unwrap();
    let count: i64 = native
        .with_connection(|c| c.query_row("SELECT COUNT(*) FROM \"user\"", [], |row| row.get(0)))
        .unwrap()
        .unwrap();
    assert_eq!(count, 1);
}
