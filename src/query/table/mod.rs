pub mod definition;

pub use definition::{SchemaDescriptor, DEFAULT_PRIMARY_KEY};
