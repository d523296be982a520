use super::{BackendError, DocumentBackend, StoredDocument};
use crate::{
    filter::{Condition, Filter, Operator},
    proto::google::firestore::v1::{value::ValueType, Value},
    serde_document::Fields,
};
use async_trait::async_trait;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicUsize, Ordering as AtomicOrdering},
};
use tokio::sync::Mutex;
use tracing::trace;

type Collection = BTreeMap<String, Fields>;

/// A document store kept in process memory.
///
/// Behaves like Firestore for the operations `Database` uses, including
/// query filters, which makes it usable as a test double.
pub struct MemoryBackend {
    collections: Mutex<HashMap<String, Collection>>,
    requests: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend {
            collections: Mutex::new(HashMap::new()),
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of requests served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(AtomicOrdering::SeqCst)
    }

    fn count_request(&self) {
        self.requests.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        MemoryBackend::new()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), BackendError> {
        self.count_request();
        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_string())
            .or_insert_with(BTreeMap::new)
            .insert(id.to_string(), fields);
        trace!(collection = %collection, id = %id, "stored document");
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Fields>, BackendError> {
        self.count_request();
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn list(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<StoredDocument>, BackendError> {
        self.count_request();
        let collections = self.collections.lock().await;
        let documents = match collections.get(collection) {
            Some(documents) => documents,
            None => return Ok(Vec::new()),
        };
        let matching = documents
            .iter()
            .filter(|(_, fields)| filter.map_or(true, |filter| matches(filter, fields)))
            .map(|(id, fields)| StoredDocument {
                id: id.clone(),
                fields: fields.clone(),
            });
        let limit = filter
            .and_then(Filter::max_results)
            .map_or(usize::MAX, |limit| limit as usize);
        Ok(matching.take(limit).collect())
    }
}

fn matches(filter: &Filter, fields: &Fields) -> bool {
    filter
        .conditions()
        .iter()
        .all(|condition| condition_matches(condition, fields))
}

fn condition_matches(condition: &Condition, fields: &Fields) -> bool {
    let field = match lookup(fields, condition.field_path()) {
        Some(field) => field,
        None => return false,
    };
    let expected = condition.value();
    match condition.op() {
        Operator::LessThan => compare(field, expected) == Some(Ordering::Less),
        Operator::LessThanOrEqual => match compare(field, expected) {
            Some(Ordering::Less) | Some(Ordering::Equal) => true,
            _ => false,
        },
        Operator::GreaterThan => compare(field, expected) == Some(Ordering::Greater),
        Operator::GreaterThanOrEqual => match compare(field, expected) {
            Some(Ordering::Greater) | Some(Ordering::Equal) => true,
            _ => false,
        },
        Operator::Equal => equals(field, expected),
        Operator::NotEqual => field.is_some_value() && !equals(field, expected),
        Operator::ArrayContains => field
            .array_values()
            .map_or(false, |values| values.iter().any(|v| equals(v, expected))),
        Operator::In => candidates(expected).any(|candidate| equals(field, candidate)),
        Operator::ArrayContainsAny => field.array_values().map_or(false, |values| {
            values
                .iter()
                .any(|v| candidates(expected).any(|candidate| equals(v, candidate)))
        }),
        Operator::NotIn => {
            field.is_some_value() && !candidates(expected).any(|candidate| equals(field, candidate))
        }
    }
}

fn candidates(value: &Value) -> impl Iterator<Item = &Value> {
    value.array_values().into_iter().flatten()
}

fn lookup<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = match current.value_type.as_ref()? {
            ValueType::MapValue(map) => map.fields.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

fn equals(a: &Value, b: &Value) -> bool {
    compare(a, b) == Some(Ordering::Equal)
}

// Firestore's cross-type ordering; values of different kinds never compare.
fn type_order(value: &Value) -> u8 {
    match value.value_type {
        None | Some(ValueType::NullValue(_)) => 0,
        Some(ValueType::BooleanValue(_)) => 1,
        Some(ValueType::IntegerValue(_)) | Some(ValueType::DoubleValue(_)) => 2,
        Some(ValueType::TimestampValue(_)) => 3,
        Some(ValueType::StringValue(_)) => 4,
        Some(ValueType::BytesValue(_)) => 5,
        Some(ValueType::ReferenceValue(_)) => 6,
        Some(ValueType::GeoPointValue(_)) => 7,
        Some(ValueType::ArrayValue(_)) => 8,
        Some(ValueType::MapValue(_)) => 9,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if type_order(a) != type_order(b) {
        return None;
    }
    match (a.value_type.as_ref(), b.value_type.as_ref()) {
        (Some(ValueType::BooleanValue(a)), Some(ValueType::BooleanValue(b))) => Some(a.cmp(b)),
        (Some(ValueType::IntegerValue(a)), Some(ValueType::IntegerValue(b))) => Some(a.cmp(b)),
        (Some(ValueType::TimestampValue(a)), Some(ValueType::TimestampValue(b))) => {
            Some((a.seconds, a.nanos).cmp(&(b.seconds, b.nanos)))
        }
        (Some(ValueType::StringValue(a)), Some(ValueType::StringValue(b))) => Some(a.cmp(b)),
        (Some(ValueType::BytesValue(a)), Some(ValueType::BytesValue(b))) => Some(a.cmp(b)),
        (Some(ValueType::ReferenceValue(a)), Some(ValueType::ReferenceValue(b))) => {
            Some(a.cmp(b))
        }
        (Some(ValueType::GeoPointValue(a)), Some(ValueType::GeoPointValue(b))) => {
            match a.latitude.partial_cmp(&b.latitude)? {
                Ordering::Equal => a.longitude.partial_cmp(&b.longitude),
                ordering => Some(ordering),
            }
        }
        (Some(ValueType::ArrayValue(a)), Some(ValueType::ArrayValue(b))) => {
            compare_sequences(a.values.iter(), b.values.iter())
        }
        (Some(ValueType::MapValue(a)), Some(ValueType::MapValue(b))) => {
            let a: BTreeMap<_, _> = a.fields.iter().collect();
            let b: BTreeMap<_, _> = b.fields.iter().collect();
            let mut a = a.into_iter();
            let mut b = b.into_iter();
            loop {
                match (a.next(), b.next()) {
                    (None, None) => return Some(Ordering::Equal),
                    (None, Some(_)) => return Some(Ordering::Less),
                    (Some(_), None) => return Some(Ordering::Greater),
                    (Some((a_key, a_value)), Some((b_key, b_value))) => {
                        match a_key.cmp(b_key) {
                            Ordering::Equal => {}
                            ordering => return Some(ordering),
                        }
                        match compare(a_value, b_value)? {
                            Ordering::Equal => {}
                            ordering => return Some(ordering),
                        }
                    }
                }
            }
        }
        (a_type, b_type) => {
            if type_order(a) == 0 {
                return Some(Ordering::Equal);
            }
            let a = number(a_type)?;
            let b = number(b_type)?;
            a.partial_cmp(&b)
        }
    }
}

fn number(value_type: Option<&ValueType>) -> Option<f64> {
    match value_type? {
        ValueType::IntegerValue(i) => Some(*i as f64),
        ValueType::DoubleValue(f) => Some(*f),
        _ => None,
    }
}

fn compare_sequences<'a>(
    mut a: impl Iterator<Item = &'a Value>,
    mut b: impl Iterator<Item = &'a Value>,
) -> Option<Ordering> {
    loop {
        match (a.next(), b.next()) {
            (None, None) => return Some(Ordering::Equal),
            (None, Some(_)) => return Some(Ordering::Less),
            (Some(_), None) => return Some(Ordering::Greater),
            (Some(a), Some(b)) => match compare(a, b)? {
                Ordering::Equal => {}
                ordering => return Some(ordering),
            },
        }
    }
}
