use crate::{serde_document, store::BackendError};

#[derive(Debug)]
pub enum Error {
    ArgumentsRequired(&'static str),
    Encode(serde_document::Error),
    Decode {
        collection: String,
        id: String,
        source: serde_document::Error,
    },
    Store(BackendError),
    Task(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ArgumentsRequired(message) => f.write_str(message),
            Error::Encode(e) => write!(f, "could not encode document: {}", e),
            Error::Decode {
                collection,
                id,
                source,
            } => write!(f, "could not decode {}/{}: {}", collection, id, source),
            Error::Store(e) => e.fmt(f),
            Error::Task(message) => write!(f, "write task did not complete: {}", message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Encode(e) => Some(e),
            Error::Decode { source, .. } => Some(source),
            Error::Store(e) => Some(e.as_ref()),
            Error::ArgumentsRequired(_) | Error::Task(_) => None,
        }
    }
}

impl From<serde_document::Error> for Error {
    fn from(err: serde_document::Error) -> Self {
        Error::Encode(err)
    }
}
