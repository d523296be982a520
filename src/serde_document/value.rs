use crate::proto::google::firestore::v1::{value::ValueType, ArrayValue, MapValue, Value};
use std::{collections::HashMap, fmt::Display, iter::FromIterator};

/// The storage form of a document: field name to Firestore value.
pub type Fields = HashMap<String, Value>;

impl Value {
    pub fn new(value_type: ValueType) -> Self {
        Value {
            value_type: Some(value_type),
        }
    }

    pub fn null() -> Self {
        Value::new(ValueType::NullValue(0))
    }

    pub fn boolean(value: bool) -> Self {
        Value::new(ValueType::BooleanValue(value))
    }

    pub fn integer(value: i64) -> Self {
        Value::new(ValueType::IntegerValue(value))
    }

    pub fn double(value: f64) -> Self {
        Value::new(ValueType::DoubleValue(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::new(ValueType::StringValue(value.into()))
    }

    pub fn bytes(value: Vec<u8>) -> Self {
        Value::new(ValueType::BytesValue(value))
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::new(ValueType::ArrayValue(ArrayValue { values }))
    }

    pub fn map(fields: Fields) -> Self {
        Value::new(ValueType::MapValue(MapValue { fields }))
    }

    pub(crate) fn is_some_value(&self) -> bool {
        match self.value_type {
            None | Some(ValueType::NullValue(_)) => false,
            _ => true,
        }
    }

    pub(crate) fn integer_value(&self) -> Option<i64> {
        match self.value_type.as_ref()? {
            ValueType::IntegerValue(i) => Some(*i),
            ValueType::TimestampValue(t) => Some(t.seconds),
            _ => None,
        }
    }

    pub(crate) fn double_value(&self) -> Option<f64> {
        match self.value_type.as_ref()? {
            ValueType::DoubleValue(f) => Some(*f),
            ValueType::IntegerValue(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub(crate) fn array_values(&self) -> Option<&Vec<Value>> {
        match self.value_type.as_ref()? {
            ValueType::ArrayValue(array) => Some(&array.values),
            _ => None,
        }
    }

    pub(crate) fn into_byte_value(self) -> Option<Vec<u8>> {
        match self.value_type? {
            ValueType::BytesValue(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn into_array_value(self) -> Option<Vec<Value>> {
        match self.value_type? {
            ValueType::ArrayValue(value) => Some(value.values),
            _ => None,
        }
    }

    pub(crate) fn has_map_value(&self) -> bool {
        match self.value_type {
            Some(ValueType::MapValue(_))
            | Some(ValueType::GeoPointValue(_))
            | Some(ValueType::TimestampValue(_)) => true,
            _ => false,
        }
    }

    pub(crate) fn into_map_value(self) -> Option<Fields> {
        match self.value_type? {
            ValueType::MapValue(value) => Some(value.fields),
            ValueType::GeoPointValue(value) => {
                let map = HashMap::from_iter(vec![
                    ("latitude".into(), Value::double(value.latitude)),
                    ("longitude".into(), Value::double(value.longitude)),
                ]);
                Some(map)
            }
            ValueType::TimestampValue(value) => {
                let map = HashMap::from_iter(vec![
                    ("seconds".into(), Value::integer(value.seconds)),
                    ("nanos".into(), Value::integer(value.nanos.into())),
                ]);
                Some(map)
            }
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.value_type.as_ref() {
            None => write!(f, "Empty"),
            Some(ValueType::NullValue(value)) => write!(f, "Null {:?}", value),
            Some(ValueType::BooleanValue(value)) => write!(f, "Boolean {:?}", value),
            Some(ValueType::IntegerValue(value)) => write!(f, "Integer {:?}", value),
            Some(ValueType::DoubleValue(value)) => write!(f, "Double {:?}", value),
            Some(ValueType::TimestampValue(value)) => write!(f, "Timestamp {:?}", value),
            Some(ValueType::StringValue(value)) => write!(f, "String {:?}", value),
            Some(ValueType::BytesValue(value)) => write!(f, "Bytes {:?}", value),
            Some(ValueType::ReferenceValue(value)) => write!(f, "Reference {:?}", value),
            Some(ValueType::GeoPointValue(value)) => write!(f, "GeoPoint {:?}", value),
            Some(ValueType::ArrayValue(value)) => write!(f, "Array {:?}", value),
            Some(ValueType::MapValue(value)) => write!(f, "Map {:?}", value),
        }
    }
}
