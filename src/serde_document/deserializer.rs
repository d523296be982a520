use super::{
    common::TracedValue,
    error::{Error, Result},
    value::Fields,
    TraceKey,
};
use crate::proto::google::firestore::v1::{value::ValueType, Value};
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, EnumAccess, MapAccess, SeqAccess, VariantAccess,
    Visitor,
};
use std::{convert::TryFrom, iter::Peekable, mem};

struct Deserializer {
    current: Frame,
    parents: Vec<Frame>,
}

impl Deserializer {
    fn from_fields(input: Fields) -> Self {
        Deserializer {
            current: Frame::root(input),
            parents: Vec::new(),
        }
    }
}

enum Frame {
    Map(MapFrame),
    Array(ArrayFrame),
}

struct MapFrame {
    key: TraceKey,
    entries: Peekable<Box<dyn Iterator<Item = (String, Value)>>>,
    pending: Option<TracedValue>,
}

struct ArrayFrame {
    key: TraceKey,
    values: Peekable<Box<dyn Iterator<Item = Value>>>,
}

impl Frame {
    fn map(key: &TraceKey, input: Fields) -> Self {
        Frame::Map(MapFrame {
            key: key.clone(),
            entries: (Box::new(input.into_iter()) as Box<dyn Iterator<Item = _>>).peekable(),
            pending: None,
        })
    }

    fn array(key: &TraceKey, input: Vec<Value>) -> Self {
        Frame::Array(ArrayFrame {
            key: key.clone(),
            values: (Box::new(input.into_iter()) as Box<dyn Iterator<Item = _>>).peekable(),
        })
    }

    fn root(input: Fields) -> Self {
        Frame::Map(MapFrame {
            key: TraceKey::Root,
            entries: (Box::new(std::iter::empty()) as Box<dyn Iterator<Item = _>>).peekable(),
            pending: Some(TracedValue(TraceKey::Root, Value::map(input))),
        })
    }
}

/// Decodes stored document fields into `T`.
///
/// Type mismatches are reported with the path of the offending field.
pub fn from_fields<T>(fields: Fields) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut deserializer = Deserializer::from_fields(fields);
    T::deserialize(&mut deserializer)
}

enum Token {
    Key(String),
    Value(TracedValue),
    End,
}

impl Token {
    fn traced_value(self) -> Result<TracedValue> {
        match self {
            Token::Value(traced_value) => Ok(traced_value),
            _ => Err(Error::ExpectedValue),
        }
    }
}

enum PeekedToken<'a> {
    Key(&'a String),
    Value(&'a Value),
    End,
}

impl<'a> PeekedToken<'a> {
    fn value(self) -> Result<&'a Value> {
        match self {
            PeekedToken::Value(value) => Ok(value),
            _ => Err(Error::ExpectedValue),
        }
    }
}

#[derive(Clone, Copy)]
enum ValueKind {
    Key,
    Null,
    Boolean,
    Integer,
    Double,
    String,
    Bytes,
    Array,
    Map,
}

impl ValueKind {
    fn of(value: &Value) -> Self {
        match value.value_type {
            None | Some(ValueType::NullValue(_)) => ValueKind::Null,
            Some(ValueType::BooleanValue(_)) => ValueKind::Boolean,
            Some(ValueType::IntegerValue(_)) => ValueKind::Integer,
            Some(ValueType::DoubleValue(_)) => ValueKind::Double,
            Some(ValueType::StringValue(_)) | Some(ValueType::ReferenceValue(_)) => {
                ValueKind::String
            }
            Some(ValueType::BytesValue(_)) => ValueKind::Bytes,
            Some(ValueType::ArrayValue(_)) => ValueKind::Array,
            Some(ValueType::MapValue(_))
            | Some(ValueType::TimestampValue(_))
            | Some(ValueType::GeoPointValue(_)) => ValueKind::Map,
        }
    }
}

impl Deserializer {
    fn pop(&mut self) -> Result<Token> {
        fn pop_parents(de: &mut Deserializer) -> Result<Token> {
            match de.parents.pop() {
                None => Err(Error::Eof),
                Some(frame) => {
                    de.current = frame;
                    Ok(Token::End)
                }
            }
        }
        match self.current {
            Frame::Map(ref mut frame) => match frame.pending.take() {
                Some(value) => Ok(Token::Value(value)),
                None => match frame.entries.next() {
                    None => pop_parents(self),
                    Some((key, value)) => {
                        frame.pending = Some(TracedValue(
                            TraceKey::Map(key.clone(), Box::new(frame.key.clone())),
                            value,
                        ));
                        Ok(Token::Key(key))
                    }
                },
            },
            Frame::Array(ref mut frame) => match frame.values.next() {
                None => pop_parents(self),
                Some(value) => {
                    let traced = TracedValue(TraceKey::Array(Box::new(frame.key.clone())), value);
                    Ok(Token::Value(traced))
                }
            },
        }
    }

    fn peek(&mut self) -> Result<PeekedToken> {
        fn peek_parents(parents: &[Frame]) -> Result<PeekedToken> {
            match parents.last() {
                None => Err(Error::Eof),
                Some(_) => Ok(PeekedToken::End),
            }
        }
        match self.current {
            Frame::Map(ref mut frame) => match frame.pending {
                Some(TracedValue(_, ref value)) => Ok(PeekedToken::Value(value)),
                None => match frame.entries.peek() {
                    None => peek_parents(&self.parents),
                    Some(entry) => Ok(PeekedToken::Key(&entry.0)),
                },
            },
            Frame::Array(ref mut frame) => match frame.values.peek() {
                None => peek_parents(&self.parents),
                Some(value) => Ok(PeekedToken::Value(value)),
            },
        }
    }

    fn peek_kind(&mut self) -> Result<ValueKind> {
        match self.peek()? {
            PeekedToken::Key(_) => Ok(ValueKind::Key),
            PeekedToken::Value(value) => Ok(ValueKind::of(value)),
            PeekedToken::End => Err(Error::ExpectedValue),
        }
    }

    fn push(&mut self, frame: Frame) {
        let replaced = mem::replace(&mut self.current, frame);
        self.parents.push(replaced);
    }

    fn get_bool(&mut self) -> Result<bool> {
        let TracedValue(key, value) = self.pop()?.traced_value()?;
        if let Some(ValueType::BooleanValue(value)) = value.value_type {
            Ok(value)
        } else {
            Err(Error::ExpectedBoolean(key, value))
        }
    }

    fn get_string(&mut self) -> Result<String> {
        match self.pop()? {
            Token::Key(key) => Ok(key),
            Token::Value(TracedValue(key, value)) => match value.value_type {
                Some(ValueType::StringValue(value)) | Some(ValueType::ReferenceValue(value)) => {
                    Ok(value)
                }
                _ => Err(Error::ExpectedString(key, value)),
            },
            Token::End => Err(Error::ExpectedValue),
        }
    }

    fn get_unsigned<T>(&mut self) -> Result<T>
    where
        T: TryFrom<u64>,
    {
        let TracedValue(key, value) = self.pop()?.traced_value()?;
        match value.integer_value() {
            Some(i) if i >= 0 => {
                T::try_from(i as u64).or(Err(Error::CouldNotConvertNumber(key, value)))
            }
            Some(_) => Err(Error::CouldNotConvertNumber(key, value)),
            None => Err(Error::ExpectedInteger(key, value)),
        }
    }

    fn get_signed<T>(&mut self) -> Result<T>
    where
        T: TryFrom<i64>,
    {
        let TracedValue(key, value) = self.pop()?.traced_value()?;
        match value.integer_value() {
            Some(i) => T::try_from(i).or(Err(Error::CouldNotConvertNumber(key, value))),
            None => Err(Error::ExpectedInteger(key, value)),
        }
    }

    fn get_f64(&mut self) -> Result<f64> {
        let TracedValue(key, value) = self.pop()?.traced_value()?;
        match value.double_value() {
            Some(f) => Ok(f),
            None => Err(Error::ExpectedDouble(key, value)),
        }
    }

    fn get_f32(&mut self) -> Result<f32> {
        let TracedValue(key, value) = self.pop()?.traced_value()?;
        match value.double_value() {
            Some(f) if !f.is_finite() || (f >= f32::MIN as f64 && f <= f32::MAX as f64) => {
                Ok(f as f32)
            }
            Some(_) => Err(Error::CouldNotConvertNumber(key, value)),
            None => Err(Error::ExpectedDouble(key, value)),
        }
    }

    fn get_bytes(&mut self) -> Result<Vec<u8>> {
        let TracedValue(key, value) = self.pop()?.traced_value()?;
        if let Some(ValueType::BytesValue(_)) = value.value_type {
            Ok(value.into_byte_value().unwrap_or_default())
        } else {
            Err(Error::ExpectedBytes(key, value))
        }
    }

    fn expect_end(&mut self, error: Error) -> Result<()> {
        if let Token::End = self.pop()? {
            Ok(())
        } else {
            Err(error)
        }
    }
}

macro_rules! visit_primitives {
    ($($method:ident => $visit:ident($get:ident)),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                visitor.$visit(self.$get()?)
            }
        )*
    };
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.peek_kind()? {
            ValueKind::Key | ValueKind::String => self.deserialize_string(visitor),
            ValueKind::Null => self.deserialize_unit(visitor),
            ValueKind::Boolean => self.deserialize_bool(visitor),
            ValueKind::Integer => self.deserialize_i64(visitor),
            ValueKind::Double => self.deserialize_f64(visitor),
            ValueKind::Bytes => self.deserialize_byte_buf(visitor),
            ValueKind::Array => self.deserialize_seq(visitor),
            ValueKind::Map => self.deserialize_map(visitor),
        }
    }

    visit_primitives! {
        deserialize_bool => visit_bool(get_bool),
        deserialize_i8 => visit_i8(get_signed),
        deserialize_i16 => visit_i16(get_signed),
        deserialize_i32 => visit_i32(get_signed),
        deserialize_i64 => visit_i64(get_signed),
        deserialize_u8 => visit_u8(get_unsigned),
        deserialize_u16 => visit_u16(get_unsigned),
        deserialize_u32 => visit_u32(get_unsigned),
        deserialize_u64 => visit_u64(get_unsigned),
        deserialize_f32 => visit_f32(get_f32),
        deserialize_f64 => visit_f64(get_f64),
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_string(self.get_string()?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_byte_buf(self.get_bytes()?)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.peek()?.value()?.is_some_value() {
            return visitor.visit_some(self);
        }
        self.pop()?;
        visitor.visit_none()
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let TracedValue(key, value) = self.pop()?.traced_value()?;
        if value.is_some_value() {
            Err(Error::ExpectedNull(key, value))
        } else {
            visitor.visit_unit()
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let TracedValue(key, value) = self.pop()?.traced_value()?;
        if let Some(ValueType::ArrayValue(_)) = value.value_type {
            let values = value.into_array_value().unwrap_or_default();
            self.push(Frame::array(&key, values));
            let result = visitor.visit_seq(Entries::new(&mut *self))?;
            self.expect_end(Error::ExpectedArrayEnd(key))?;
            Ok(result)
        } else {
            Err(Error::ExpectedArray(key, value))
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let TracedValue(key, value) = self.pop()?.traced_value()?;
        if value.has_map_value() {
            let map = value.into_map_value().unwrap_or_default();
            self.push(Frame::map(&key, map));
            let result = visitor.visit_map(Entries::new(&mut *self))?;
            self.expect_end(Error::ExpectedMapEnd(key))?;
            Ok(result)
        } else {
            Err(Error::ExpectedMap(key, value))
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let is_map = match self.peek()? {
            PeekedToken::Key(_) => Some(false),
            PeekedToken::Value(value) => match value.value_type {
                Some(ValueType::StringValue(_)) => Some(false),
                Some(ValueType::MapValue(_)) => Some(true),
                _ => None,
            },
            PeekedToken::End => return Err(Error::ExpectedValue),
        };
        match is_map {
            Some(true) => {}
            Some(false) => return visitor.visit_enum(Enum::new(self)),
            None => {
                let TracedValue(key, value) = self.pop()?.traced_value()?;
                return Err(Error::ExpectedEnum(key, value));
            }
        }

        let TracedValue(key, value) = self.pop()?.traced_value()?;
        let map = value.into_map_value().unwrap_or_default();
        self.push(Frame::map(&key, map));
        let result = visitor.visit_enum(Enum::new(&mut *self))?;
        self.expect_end(Error::ExpectedMapEnd(key))?;
        Ok(result)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.pop()?;
        visitor.visit_unit()
    }
}

struct Entries<'a> {
    de: &'a mut Deserializer,
}

impl<'a> Entries<'a> {
    fn new(de: &'a mut Deserializer) -> Self {
        Entries { de }
    }
}

impl<'a, 'de> SeqAccess<'de> for Entries<'a> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        if let PeekedToken::End = self.de.peek()? {
            Ok(None)
        } else {
            Ok(Some(seed.deserialize(&mut *self.de)?))
        }
    }
}

impl<'a, 'de> MapAccess<'de> for Entries<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if let PeekedToken::End = self.de.peek()? {
            Ok(None)
        } else {
            Ok(Some(seed.deserialize(&mut *self.de)?))
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.de)
    }
}

struct Enum<'a> {
    de: &'a mut Deserializer,
}

impl<'a> Enum<'a> {
    fn new(de: &'a mut Deserializer) -> Self {
        Enum { de }
    }
}

impl<'de, 'a> EnumAccess<'de> for Enum<'a> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: DeserializeSeed<'de>,
    {
        Ok((seed.deserialize(&mut *self.de)?, self))
    }
}

impl<'de, 'a> VariantAccess<'de> for Enum<'a> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self.de)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self.de, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self.de, visitor)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{from_fields, Error, TraceKey};
    use crate::proto::google::{
        firestore::v1::{value::ValueType, Value},
        r#type::LatLng,
    };
    use maplit::hashmap;
    use prost_types::Timestamp;
    use serde::Deserialize;
    use std::collections::HashMap;

    fn child1(value: i64) -> Value {
        Value::map(hashmap! {
            "value".into() => Value::integer(value),
        })
    }

    fn child2(value: impl Into<String>) -> Value {
        Value::map(hashmap! {
            "value".into() => Value::string(value),
        })
    }

    fn geopoint(latitude: f64, longitude: f64) -> Value {
        Value::new(ValueType::GeoPointValue(LatLng {
            latitude,
            longitude,
        }))
    }

    fn timestamp(seconds: i64, nanos: i32) -> Value {
        Value::new(ValueType::TimestampValue(Timestamp { seconds, nanos }))
    }

    #[derive(Deserialize, PartialEq, Debug)]
    struct ValueHolder<T> {
        value: T,
    }

    #[derive(Deserialize, PartialEq, Debug)]
    struct NewType(ValueHolder<i32>);

    #[derive(Deserialize, PartialEq, Debug)]
    struct Tuple(String, ValueHolder<i32>);

    #[derive(Deserialize, PartialEq, Debug)]
    enum E {
        Unit,
        NewType(ValueHolder<i32>),
        Tuple(String, ValueHolder<i32>),
        Struct { value: f64 },
    }

    #[derive(Deserialize, PartialEq, Debug)]
    struct Unit;

    #[test]
    fn test_fields() {
        #[derive(Deserialize, PartialEq, Debug)]
        struct Test {
            s: String,
            u_8: u8,
            u_64: u64,
            i_8: i8,
            i_64: i64,
            b: bool,
            c: char,
            f_32: f32,
            f_64: f64,
            f_from_int: f64,
            #[serde(with = "serde_bytes")]
            bytes: Vec<u8>,
            reference: String,
            option_some: Option<i64>,
            option_none: Option<i64>,
            option_empty: Option<i64>,
            unit: (),
            unit_struct: Unit,
            newtype: NewType,
            tuple: Tuple,
            child: ValueHolder<i32>,
            map: HashMap<String, i32>,
            geo: HashMap<String, f64>,
            time: HashMap<String, i64>,
            i_time: i64,
            int_vec: Vec<i64>,
            child_array: [ValueHolder<i32>; 3],
            child_tuple: (ValueHolder<i32>, ValueHolder<String>),
            enum_unit: E,
            enum_newtype: E,
            enum_tuple: E,
            enum_struct: E,
        }

        let fields: HashMap<String, Value> = hashmap! {
            "s".into() => Value::string("hoge"),
            "u_8".into() => Value::integer(8),
            "u_64".into() => Value::integer(64),
            "i_8".into() => Value::integer(-8),
            "i_64".into() => Value::integer(-64),
            "b".into() => Value::boolean(true),
            "c".into() => Value::string("x"),
            "f_32".into() => Value::double(0.1),
            "f_64".into() => Value::double(0.2),
            "f_from_int".into() => Value::integer(3),
            "bytes".into() => Value::bytes(vec![0, 1, 2]),
            "reference".into() => Value::new(ValueType::ReferenceValue("projects/p/databases/(default)/documents/a/b".into())),
            "option_some".into() => Value::integer(10),
            "option_none".into() => Value::null(),
            "unit".into() => Value::null(),
            "unit_struct".into() => Value::null(),
            "newtype".into() => child1(8),
            "tuple".into() => Value::array(vec![Value::string("aaa"), child1(9)]),
            "child".into() => child1(2),
            "map".into() => Value::map(hashmap! {
                "x".into() => Value::integer(8),
                "y".into() => Value::integer(9),
            }),
            "geo".into() => geopoint(35.6, 139.7),
            "time".into() => timestamp(1609200000, 100000000),
            "i_time".into() => timestamp(1609200001, 100000001),
            "int_vec".into() => Value::array((1..=3).map(Value::integer).collect()),
            "child_array".into() => Value::array((2..=4).map(child1).collect()),
            "child_tuple".into() => Value::array(vec![child1(5), child2("piyo")]),
            "enum_unit".into() => Value::string("Unit"),
            "enum_newtype".into() => Value::map(hashmap! { "NewType".into() => child1(6) }),
            "enum_tuple".into() => Value::map(hashmap! {
                "Tuple".into() => Value::array(vec![Value::string("fuga"), child1(7)]),
            }),
            "enum_struct".into() => Value::map(hashmap! {
                "Struct".into() => Value::map(hashmap! { "value".into() => Value::double(0.3) }),
            }),
        };

        let test: Test = from_fields(fields).unwrap();
        let expected = Test {
            s: "hoge".into(),
            u_8: 8,
            u_64: 64,
            i_8: -8,
            i_64: -64,
            b: true,
            c: 'x',
            f_32: 0.1,
            f_64: 0.2,
            f_from_int: 3.0,
            bytes: vec![0, 1, 2],
            reference: "projects/p/databases/(default)/documents/a/b".into(),
            option_some: Some(10),
            option_none: None,
            option_empty: None,
            unit: (),
            unit_struct: Unit,
            newtype: NewType(ValueHolder { value: 8 }),
            tuple: Tuple("aaa".into(), ValueHolder { value: 9 }),
            child: ValueHolder { value: 2 },
            map: hashmap! { "x".into() => 8, "y".into() => 9 },
            geo: hashmap! { "latitude".into() => 35.6, "longitude".into() => 139.7 },
            time: hashmap! { "seconds".into() => 1609200000, "nanos".into() => 100000000 },
            i_time: 1609200001,
            int_vec: vec![1, 2, 3],
            child_array: [
                ValueHolder { value: 2 },
                ValueHolder { value: 3 },
                ValueHolder { value: 4 },
            ],
            child_tuple: (
                ValueHolder { value: 5 },
                ValueHolder {
                    value: "piyo".into(),
                },
            ),
            enum_unit: E::Unit,
            enum_newtype: E::NewType(ValueHolder { value: 6 }),
            enum_tuple: E::Tuple("fuga".into(), ValueHolder { value: 7 }),
            enum_struct: E::Struct { value: 0.3 },
        };
        assert_eq!(expected, test);
    }

    #[test]
    fn test_ignore_field() {
        let fields = hashmap! {
            "value".into() => Value::integer(1),
            "b".into() => Value::integer(2),
        };
        assert_eq!(ValueHolder { value: 1 }, from_fields(fields).unwrap());
    }

    #[test]
    fn test_untyped_target() {
        #[derive(Deserialize, PartialEq, Debug)]
        #[serde(untagged)]
        enum Loose {
            Number(i64),
            Text(String),
            List(Vec<Loose>),
        }

        let fields = hashmap! {
            "value".into() => Value::array(vec![Value::integer(1), Value::string("two")]),
        };
        let holder: ValueHolder<Loose> = from_fields(fields).unwrap();
        assert_eq!(
            Loose::List(vec![Loose::Number(1), Loose::Text("two".into())]),
            holder.value
        );
    }

    #[test]
    fn test_nested_map_error() {
        #[derive(Deserialize, Debug)]
        struct A {
            #[allow(dead_code)]
            b: B,
        }
        #[derive(Deserialize, Debug)]
        struct B {
            #[allow(dead_code)]
            c: C,
        }
        #[derive(Deserialize, Debug)]
        struct C {
            #[allow(dead_code)]
            value: i64,
        }

        let c = hashmap! { "value".into() => Value::string("a") };
        let b = hashmap! { "c".into() => Value::map(c) };
        let a = hashmap! { "b".into() => Value::map(b) };
        let error = from_fields::<A>(a).unwrap_err();
        assert_eq!(
            "expected an integer at /b/c/value, found String \"a\"",
            error.to_string()
        );
    }

    #[test]
    fn test_array_error() {
        #[derive(Deserialize, Debug)]
        struct A {
            #[allow(dead_code)]
            v: Vec<i64>,
        }

        let a = hashmap! {
            "v".into() => Value::array(vec![Value::integer(1), Value::string("hoge")]),
        };
        let error = from_fields::<A>(a).unwrap_err();
        assert_eq!(
            "expected an integer at /v[], found String \"hoge\"",
            error.to_string()
        );
    }

    #[test]
    fn test_expected_value_error() {
        let fields: HashMap<String, Value> = hashmap! { "value".into() => Value::string("hoge") };
        let key = TraceKey::field("value");
        assert_eq!(
            Error::ExpectedMap(key.clone(), Value::string("hoge")),
            from_fields::<ValueHolder<HashMap<String, i64>>>(fields.clone()).unwrap_err()
        );
        assert_eq!(
            Error::ExpectedBoolean(key.clone(), Value::string("hoge")),
            from_fields::<ValueHolder<bool>>(fields.clone()).unwrap_err()
        );
        assert_eq!(
            Error::ExpectedInteger(key.clone(), Value::string("hoge")),
            from_fields::<ValueHolder<u64>>(fields.clone()).unwrap_err()
        );
        assert_eq!(
            Error::ExpectedDouble(key.clone(), Value::string("hoge")),
            from_fields::<ValueHolder<f64>>(fields.clone()).unwrap_err()
        );
        assert_eq!(
            Error::ExpectedNull(key.clone(), Value::string("hoge")),
            from_fields::<ValueHolder<()>>(fields.clone()).unwrap_err()
        );
        assert_eq!(
            Error::ExpectedArray(key.clone(), Value::string("hoge")),
            from_fields::<ValueHolder<Vec<i64>>>(fields).unwrap_err()
        );

        let fields: HashMap<String, Value> = hashmap! { "value".into() => Value::integer(0) };
        assert_eq!(
            Error::ExpectedString(key.clone(), Value::integer(0)),
            from_fields::<ValueHolder<String>>(fields.clone()).unwrap_err()
        );
        assert_eq!(
            Error::ExpectedEnum(key, Value::integer(0)),
            from_fields::<ValueHolder<E>>(fields).unwrap_err()
        );
    }

    #[test]
    fn test_convert_error() {
        let key = TraceKey::field("value");
        let fields = hashmap! { "value".into() => Value::integer(-1) };
        assert_eq!(
            Error::CouldNotConvertNumber(key.clone(), Value::integer(-1)),
            from_fields::<ValueHolder<u64>>(fields).unwrap_err()
        );
        let fields = hashmap! { "value".into() => Value::integer(256) };
        assert_eq!(
            Error::CouldNotConvertNumber(key.clone(), Value::integer(256)),
            from_fields::<ValueHolder<u8>>(fields).unwrap_err()
        );
        let fields = hashmap! { "value".into() => Value::double(-3.40282348E+38) };
        assert_eq!(
            Error::CouldNotConvertNumber(key, Value::double(-3.40282348E+38)),
            from_fields::<ValueHolder<f32>>(fields).unwrap_err()
        );
    }

    #[test]
    fn test_end_error() {
        let key = TraceKey::field("value");
        let value = Value::integer(1);
        let array = Value::array(vec![value.clone(), value.clone(), value]);
        let fields = hashmap! { "value".into() => array };
        assert_eq!(
            Error::ExpectedArrayEnd(key),
            from_fields::<ValueHolder<(i32, i32)>>(fields).unwrap_err()
        );
    }
}
