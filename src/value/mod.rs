//! Value type system
//!
//! - **`Value`** - the scalar carried by records, predicates and bound parameters
//! - **`Fields`** - insertion-ordered column → value map used for rows and records
//! - **`TryGetable`** - typed, error-aware extraction out of a `Value`

pub mod fields;
pub mod try_getable;
pub mod types;

pub use fields::Fields;
pub use try_getable::{TryGetable, ValueExtractionError};
pub use types::Value;
