mod error;

pub use error::Error;

use crate::{
    config::DatabaseSetting,
    converter::Converter,
    filter::Filter,
    serde_document::{self, Fields},
    service::firestore::{self, FirestoreBackend},
    store::DocumentBackend,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

const WRITE_REQUIRED: &str = "collection, id, and document are required";
const READ_ONE_REQUIRED: &str = "collection and id are required";
const READ_MANY_REQUIRED: &str = "collection is required";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentLocation<'a> {
    pub collection: &'a str,
    pub id: &'a str,
}

impl<'a> DocumentLocation<'a> {
    pub fn new(collection: &'a str, id: &'a str) -> Self {
        DocumentLocation { collection, id }
    }

    fn is_complete(&self) -> bool {
        !self.collection.is_empty() && !self.id.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionLocation<'a> {
    pub collection: &'a str,
}

impl<'a> CollectionLocation<'a> {
    pub fn new(collection: &'a str) -> Self {
        CollectionLocation { collection }
    }
}

/// Outcome of a `Database::write`.
///
/// Dropping the handle does not cancel the write.
#[must_use = "the write runs either way; call `wait` to see whether it succeeded"]
pub struct WriteHandle {
    state: WriteState,
}

enum WriteState {
    Finished(Result<(), Error>),
    Running(JoinHandle<Result<(), Error>>),
}

impl WriteHandle {
    fn finished(result: Result<(), Error>) -> Self {
        WriteHandle {
            state: WriteState::Finished(result),
        }
    }

    pub async fn wait(self) -> Result<(), Error> {
        match self.state {
            WriteState::Finished(result) => result,
            WriteState::Running(task) => match task.await {
                Ok(result) => result,
                Err(e) => Err(Error::Task(e.to_string())),
            },
        }
    }
}

/// Typed reads and writes on the collections of one document store.
///
/// Clones share the same backend session.
#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn DocumentBackend>,
}

impl Database {
    pub async fn connect(setting: &DatabaseSetting) -> Result<Self, firestore::Error> {
        let backend = FirestoreBackend::connect(setting).await?;
        Ok(Database::with_backend(Arc::new(backend)))
    }

    pub fn with_backend(backend: Arc<dyn DocumentBackend>) -> Self {
        Database { backend }
    }

    /// Creates or replaces a document without waiting for the store.
    ///
    /// Must be called inside a tokio runtime. A document encoding to null,
    /// such as `None`, counts as missing.
    pub fn write<T>(&self, location: DocumentLocation<'_>, document: &T) -> WriteHandle
    where
        T: Serialize + ?Sized,
    {
        self.submit(location, || serde_document::to_fields(document))
    }

    pub fn write_with<T, C>(
        &self,
        location: DocumentLocation<'_>,
        document: &T,
        converter: &C,
    ) -> WriteHandle
    where
        C: Converter<T>,
    {
        self.submit(location, || converter.to_fields(document))
    }

    fn submit<F>(&self, location: DocumentLocation<'_>, encode: F) -> WriteHandle
    where
        F: FnOnce() -> serde_document::Result<Fields>,
    {
        if !location.is_complete() {
            return rejected_write(location, Error::ArgumentsRequired(WRITE_REQUIRED));
        }
        let fields = match encode() {
            Ok(fields) => fields,
            Err(serde_document::Error::NullDocument) => {
                return rejected_write(location, Error::ArgumentsRequired(WRITE_REQUIRED));
            }
            Err(e) => return rejected_write(location, Error::Encode(e)),
        };

        let backend = Arc::clone(&self.backend);
        let collection = location.collection.to_string();
        let id = location.id.to_string();
        let task = tokio::spawn(async move {
            match backend.set(&collection, &id, fields).await {
                Ok(()) => {
                    debug!(collection = %collection, id = %id, "wrote document");
                    Ok(())
                }
                Err(e) => {
                    error!(
                        collection = %collection,
                        id = %id,
                        error = %e,
                        "failed to write document"
                    );
                    Err(Error::Store(e))
                }
            }
        });
        WriteHandle {
            state: WriteState::Running(task),
        }
    }

    /// Reads a single document, `None` when it does not exist.
    pub async fn read_one<T>(&self, location: DocumentLocation<'_>) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
    {
        self.get(location, serde_document::from_fields).await
    }

    pub async fn read_one_with<T, C>(
        &self,
        location: DocumentLocation<'_>,
        converter: &C,
    ) -> Result<Option<T>, Error>
    where
        C: Converter<T>,
    {
        self.get(location, |fields| converter.from_fields(fields)).await
    }

    async fn get<T, F>(
        &self,
        location: DocumentLocation<'_>,
        decode: F,
    ) -> Result<Option<T>, Error>
    where
        F: FnOnce(Fields) -> serde_document::Result<T>,
    {
        if !location.is_complete() {
            return Err(Error::ArgumentsRequired(READ_ONE_REQUIRED));
        }
        let DocumentLocation { collection, id } = location;
        let fields = match self.backend.get(collection, id).await.map_err(Error::Store)? {
            Some(fields) => fields,
            None => {
                debug!(collection = %collection, id = %id, "document not found");
                return Ok(None);
            }
        };
        let document = decode(fields).map_err(|source| Error::Decode {
            collection: collection.to_string(),
            id: id.to_string(),
            source,
        })?;
        Ok(Some(document))
    }

    /// Reads the documents of a collection in id order.
    ///
    /// Without a filter every document is returned; otherwise only those
    /// matching all of its conditions, up to its limit.
    pub async fn read_many<T>(
        &self,
        location: CollectionLocation<'_>,
        filter: Option<&Filter>,
    ) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
    {
        self.list(location, filter, serde_document::from_fields).await
    }

    pub async fn read_many_with<T, C>(
        &self,
        location: CollectionLocation<'_>,
        filter: Option<&Filter>,
        converter: &C,
    ) -> Result<Vec<T>, Error>
    where
        C: Converter<T>,
    {
        self.list(location, filter, |fields| converter.from_fields(fields)).await
    }

    async fn list<T, F>(
        &self,
        location: CollectionLocation<'_>,
        filter: Option<&Filter>,
        decode: F,
    ) -> Result<Vec<T>, Error>
    where
        F: Fn(Fields) -> serde_document::Result<T>,
    {
        let collection = location.collection;
        if collection.is_empty() {
            return Err(Error::ArgumentsRequired(READ_MANY_REQUIRED));
        }
        let documents = self
            .backend
            .list(collection, filter)
            .await
            .map_err(Error::Store)?;
        debug!(collection = %collection, count = documents.len(), "read documents");
        documents
            .into_iter()
            .map(|document| {
                let id = document.id;
                decode(document.fields).map_err(|source| Error::Decode {
                    collection: collection.to_string(),
                    id,
                    source,
                })
            })
            .collect()
    }
}

fn rejected_write(location: DocumentLocation<'_>, e: Error) -> WriteHandle {
    error!(
        collection = %location.collection,
        id = %location.id,
        error = %e,
        "document was not written"
    );
    WriteHandle::finished(Err(e))
}
