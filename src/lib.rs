mod config;
mod converter;
pub mod database;
pub mod filter;
pub mod proto;
pub mod serde_document;
pub mod service;
pub mod store;
mod util;

pub use config::DatabaseSetting;
pub use converter::{Converter, SerdeConverter};
pub use database::{CollectionLocation, Database, DocumentLocation, WriteHandle};
pub use filter::{Condition, Filter, Operator};
pub use serde_document::Fields;
pub use store::{memory::MemoryBackend, BackendError, DocumentBackend, StoredDocument};
