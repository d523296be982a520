//! Conversion between serde types and Firestore document fields.

mod common;
mod deserializer;
mod error;
mod serializer;
mod value;

pub use common::TraceKey;
pub use deserializer::from_fields;
pub use error::{Error, Result};
pub use serializer::{to_fields, to_value};
pub use value::Fields;
