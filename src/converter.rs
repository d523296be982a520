use crate::serde_document::{self, Fields};
use serde::{de::DeserializeOwned, Serialize};

/// Translates between a typed document and its stored fields.
pub trait Converter<T> {
    fn to_fields(&self, document: &T) -> serde_document::Result<Fields>;
    fn from_fields(&self, fields: Fields) -> serde_document::Result<T>;
}

/// Goes through `serde_document` for any serde type.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerdeConverter;

impl<T> Converter<T> for SerdeConverter
where
    T: Serialize + DeserializeOwned,
{
    fn to_fields(&self, document: &T) -> serde_document::Result<Fields> {
        serde_document::to_fields(document)
    }

    fn from_fields(&self, fields: Fields) -> serde_document::Result<T> {
        serde_document::from_fields(fields)
    }
}
