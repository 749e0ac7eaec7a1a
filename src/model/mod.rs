//! Entity façade
//!
//! - **`EntityConfig`** - one declared entity: table, schema, primary key, connection
//! - **`Record`** - a mutable row of an entity with save/insert/delete

pub mod entity;
pub mod record;

pub use entity::EntityConfig;
pub use record::Record;
