//! Statement building and execution.
//!
//! # Architecture
//!
//! - **Column**: attribute definitions, their constructors and dialect type mapping
//! - **Table**: the schema descriptor of one entity
//! - **Predicate**: column filters compiled into parameterized `WHERE` clauses
//! - **Select**: column list, ordering and pagination
//! - **Builder**: DDL and DML statements per dialect (`SqlBuilder`)
//! - **Interface**: the builder's statements executed on a connection (`QueryInterface`)
//!
//! # Examples
//!
//! ```
//! use sommy::query::{Predicate, SelectOptions, SqlBuilder};
//! use sommy::Dialect;
//!
//! let builder = SqlBuilder::new(&Dialect::Mysql);
//! let statement = builder
//!     .select(
//!         "users",
//!         &Predicate::new().eq("order", 3),
//!         &SelectOptions::new().limit(1),
//!     )
//!     .unwrap();
//! assert_eq!(statement.sql, "SELECT * FROM `users` WHERE `order` = :order_0 LIMIT 1");
//! ```

pub mod builder;
pub mod column;
pub mod interface;
pub mod predicate;
pub mod select;
pub mod statement;
pub mod table;

pub use builder::SqlBuilder;
pub use column::{AttributeDefinition, AttributeOptions, TypeTag};
pub use interface::QueryInterface;
pub use predicate::{build_where, Condition, Predicate};
pub use select::{Direction, Order, SelectOptions};
pub use statement::{ParamNames, PlaceholderStyle, Statement};
pub use table::SchemaDescriptor;
