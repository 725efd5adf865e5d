#![doc = include_str!("../README.md")]

#[macro_use]
mod name;
pub mod collections;
pub mod executable;
pub mod execution;
mod node;
pub mod promise;
pub mod response;
pub mod schema;

pub use self::executable::ExecutableDocument;
pub use self::execution::Execution;
pub use self::name::InvalidNameError;
pub use self::name::Name;
pub use self::node::Node;
pub use self::response::ExecutionResult;
pub use self::schema::Schema;
pub use self::schema::SchemaConfig;

/// Re-export of the version of the `serde_json_bytes` crate used for [`JsonValue`] and [`JsonMap`]
pub use serde_json_bytes;

/// A JSON-compatible dynamically-typed value.
///
/// Note: [`serde_json_bytes::Value`] is similar
/// to [`serde_json::Value`][serde_json_bytes::serde_json::Value]
/// but uses its reference-counted [`ByteString`][serde_json_bytes::ByteString]
/// for string values and map keys.
pub type JsonValue = serde_json_bytes::Value;

/// A JSON-compatible object/map with string keys and dynamically-typed values.
pub type JsonMap = serde_json_bytes::Map<serde_json_bytes::ByteString, JsonValue>;
