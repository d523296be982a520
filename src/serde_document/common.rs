use crate::proto::google::firestore::v1::Value;
use std::fmt::Display;

#[derive(Clone, Debug, PartialEq)]
pub enum TraceKey {
    Root,
    Map(String, Box<TraceKey>),
    Array(Box<TraceKey>),
}

impl TraceKey {
    pub(crate) fn field(path: impl Into<String>) -> Self {
        TraceKey::Map(path.into(), Box::new(TraceKey::Root))
    }
}

impl Display for TraceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TraceKey::Root => write!(f, ""),
            TraceKey::Map(key, parent) => write!(f, "{}/{}", parent, key),
            TraceKey::Array(parent) => write!(f, "{}[]", parent),
        }
    }
}

pub(crate) struct TracedValue(pub(crate) TraceKey, pub(crate) Value);
