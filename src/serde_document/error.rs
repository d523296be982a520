use super::TraceKey;
use crate::proto::google::firestore::v1::Value;
use serde::{de, ser};
use std::fmt::{self, Debug, Display};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, PartialEq)]
pub enum Error {
    Message(String),

    Eof,
    ExpectedValue,
    NullDocument,

    ExpectedBoolean(TraceKey, Value),
    ExpectedInteger(TraceKey, Value),
    ExpectedDouble(TraceKey, Value),
    ExpectedString(TraceKey, Value),
    ExpectedBytes(TraceKey, Value),
    ExpectedNull(TraceKey, Value),
    ExpectedArray(TraceKey, Value),
    ExpectedMap(TraceKey, Value),
    ExpectedEnum(TraceKey, Value),
    CouldNotConvertNumber(TraceKey, Value),
    ExpectedArrayEnd(TraceKey),
    ExpectedMapEnd(TraceKey),

    ExpectedDocument(Value),
    KeyMustBeAString(Value),
    IntegerOverflow(u64),
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

fn mismatch(f: &mut fmt::Formatter, expected: &str, key: &TraceKey, value: &Value) -> fmt::Result {
    write!(f, "expected {} at {}, found {}", expected, key, value)
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) => f.write_str(msg),
            Error::Eof => f.write_str("unexpected end of input"),
            Error::ExpectedValue => f.write_str("expected a value, found a map key"),
            Error::NullDocument => f.write_str("document is null"),

            Error::ExpectedBoolean(key, value) => mismatch(f, "a boolean", key, value),
            Error::ExpectedInteger(key, value) => mismatch(f, "an integer", key, value),
            Error::ExpectedDouble(key, value) => mismatch(f, "a double", key, value),
            Error::ExpectedString(key, value) => mismatch(f, "a string", key, value),
            Error::ExpectedBytes(key, value) => mismatch(f, "bytes", key, value),
            Error::ExpectedNull(key, value) => mismatch(f, "null", key, value),
            Error::ExpectedArray(key, value) => mismatch(f, "an array", key, value),
            Error::ExpectedMap(key, value) => mismatch(f, "a map", key, value),
            Error::ExpectedEnum(key, value) => mismatch(f, "an enum", key, value),
            Error::CouldNotConvertNumber(key, value) => {
                write!(f, "{} at {} is out of range for the target type", value, key)
            }
            Error::ExpectedArrayEnd(key) => write!(f, "array at {} has too many elements", key),
            Error::ExpectedMapEnd(key) => write!(f, "map at {} has unconsumed entries", key),

            Error::ExpectedDocument(value) => {
                write!(f, "document must encode to a map, found {}", value)
            }
            Error::KeyMustBeAString(value) => write!(f, "map key must be a string, found {}", value),
            Error::IntegerOverflow(value) => write!(f, "{} overflows a signed 64-bit integer", value),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}
