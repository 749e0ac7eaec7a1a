//! CRUD against a real PostgreSQL server started with testcontainers.
//!
//! Requires Docker; run with `--features postgres`.

#![cfg(feature = "postgres")]

mod common;

use sommy::data_types::{boolean, decimal, integer, json, string, uuid};
use sommy::{ConnectionConfig, DefineOptions, Dialect, Fields, Predicate, SchemaDescriptor, SelectOptions, Sommy, Value};
use testcontainers::clients::Cli;
use testcontainers_modules::postgres::Postgres;

fn connect(port: u16) -> Sommy {
    common::init_logger();
    let config = ConnectionConfig::new(Dialect::Pgsql)
        .with_host("127.0.0.1")
        .with_port(port)
        .with_database("postgres")
        .with_credentials("postgres", "postgres");
    let sommy = Sommy::connect(&config).expect("Failed to connect to postgres");
    sommy.authenticate().expect("Failed to authenticate");
    sommy
}

#[test]
fn test_postgres_entity_crud() {
    let docker = Cli::default();
    let node = docker.run(Postgres::default());
    let sommy = connect(node.get_host_port_ipv4(5432));

    let users = sommy.define(
        "User",
        SchemaDescriptor::new()
            .column("id", integer().primary_key().auto_increment())
            .column("name", string(100))
            .column("email", string(150))
            .column("active", boolean().default_value(true)),
        DefineOptions::new().table_name("users"),
    );
    users.sync().unwrap();

    let record = users
        .create(Fields::new().with("name", "Clinton").with("email", "clinton@example.com"))
        .unwrap()
        .unwrap();
    assert_eq!(record.get("id"), Some(&Value::Int(1)));

    let found = users
        .find_all(&Predicate::new().eq("email", "clinton@example.com"), &SelectOptions::new())
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get("name"), Some(&Value::from("Clinton")));
    assert_eq!(found[0].get("active"), Some(&Value::Bool(true)));

    users.create(Fields::new().with("name", "Ada")).unwrap();
    let none = users
        .find_all(&Predicate::new().any_of("name", Vec::<String>::new()), &SelectOptions::new())
        .unwrap();
    assert!(none.is_empty());
    let no_mail = users
        .find_all(&Predicate::new().is_null("email"), &SelectOptions::new())
        .unwrap();
    assert_eq!(no_mail.len(), 1);

    let updated = users
        .update(&Fields::new().with("active", false), &Predicate::new().any_of("id", [1, 2]))
        .unwrap();
    assert_eq!(updated, 2);
    assert_eq!(users.destroy(&Predicate::new().eq("name", "Ada")).unwrap(), 1);
    users.drop_table().unwrap();
}

#[test]
fn test_postgres_value_types() {
    let docker = Cli::default();
    let node = docker.run(Postgres::default());
    let sommy = connect(node.get_host_port_ipv4(5432));

    let items = sommy.define(
        "Item",
        SchemaDescriptor::new()
            .column("id", integer().primary_key().auto_increment())
            .column("price", decimal(10, 2))
            .column("meta", json())
            .column("token", uuid()),
        DefineOptions::new(),
    );
    items.sync().unwrap();

    let token = "67e55044-10b1-426f-9247-bb680e5fe0c8";
    let record = items
        .create(
            Fields::new()
                .with("price", 12)
                .with("meta", serde_json::json!({"tags": ["a"]}))
                .with("token", token),
        )
        .unwrap()
        .unwrap();

    let fetched = items.find_by_pk(record.get("id").cloned().unwrap()).unwrap().unwrap();
    assert_eq!(fetched.get("price").map(ToString::to_string).as_deref(), Some("12.00"));
    assert_eq!(fetched.get("meta"), Some(&Value::Json(serde_json::json!({"tags": ["a"]}))));
    assert_eq!(fetched.get("token").map(ToString::to_string).as_deref(), Some(token));
}

#[test]
fn test_postgres_transaction_rollback() {
    let docker = Cli::default();
    let node = docker.run(Postgres::default());
    let sommy = connect(node.get_host_port_ipv4(5432));
    let qi = sommy.query_interface();
    qi.create_table("logs", &SchemaDescriptor::new().column("line", string(20)), false)
        .unwrap();

    let result: sommy::Result<()> = sommy.connection().transaction(|conn| {
        conn.query_interface().insert("logs", &Fields::new().with("line", "x"))?;
        Err(sommy::OrmError::Build("abort".to_string()))
    });
    assert!(result.is_err());
    let rows = qi.select("logs", &Predicate::new(), &SelectOptions::new()).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_postgres_insert_without_sequence_commits_in_transaction() {
    let docker = Cli::default();
    let node = docker.run(Postgres::default());
    let sommy = connect(node.get_host_port_ipv4(5432));
    let qi = sommy.query_interface();
    qi.create_table("tags", &SchemaDescriptor::new().column("slug", string(20)), false)
        .unwrap();

    let key = sommy
        .connection()
        .transaction(|conn| {
            conn.query_interface().insert("tags", &Fields::new().with("slug", "rust"))?;
            conn.query_interface().insert("tags", &Fields::new().with("slug", "sql"))
        })
        .unwrap();
    assert_eq!(key, None);
    assert!(!sommy.connection().in_transaction());

    let rows = qi.select("tags", &Predicate::new(), &SelectOptions::new()).unwrap();
    assert_eq!(rows.len(), 2);
}
