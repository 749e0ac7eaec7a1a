//! Declare an entity on an in-memory SQLite database, insert a row and query it.
//!
//! Run with `RUST_LOG=debug cargo run --example basic` to see every statement.

use sommy::data_types::{integer, string};
use sommy::{ConnectionConfig, DefineOptions, Fields, Predicate, SchemaDescriptor, SelectOptions, Sommy};

fn main() -> sommy::Result<()> {
    env_logger::init();

    let sommy = Sommy::connect(&ConnectionConfig::sqlite_memory())?;
    sommy.authenticate()?;

    let users = sommy.define(
        "User",
        SchemaDescriptor::new()
            .column("id", integer().primary_key().auto_increment())
            .column("name", string(100))
            .column("email", string(150)),
        DefineOptions::new().table_name("users"),
    );
    users.sync()?;

    let mut user = users.new_record();
    user.set("name", "Clinton")?;
    user.set("email", "clinton@example.com")?;
    user.save()?;
    println!("Inserted user with id {:?}", user.primary_key_value());

    let found = users.find_all(
        &Predicate::new().eq("email", "clinton@example.com"),
        &SelectOptions::new(),
    )?;
    for user in &found {
        println!("{}", serde_json::to_string(user).unwrap_or_default());
    }
    Ok(())
}
