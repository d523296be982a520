use crate::{
    proto::google::firestore::v1::Value,
    serde_document::{self, TraceKey},
};
use serde::Serialize;
use std::convert::TryFrom;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    ArrayContains,
    In,
    ArrayContainsAny,
    NotIn,
}

impl Operator {
    fn takes_array(self) -> bool {
        match self {
            Operator::In | Operator::ArrayContainsAny | Operator::NotIn => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    field_path: String,
    op: Operator,
    value: Value,
}

impl Condition {
    pub fn field_path(&self) -> &str {
        &self.field_path
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Conditions a collection read must satisfy, all of which have to match.
///
/// ```ignore
/// let filter = Filter::new()
///     .condition("age", Operator::GreaterThanOrEqual, &20)?
///     .condition("address.city", Operator::Equal, "tokyo")?
///     .limit(10);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
    limit: Option<u32>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    /// Adds a condition on a dotted field path.
    ///
    /// `In`, `NotIn` and `ArrayContainsAny` need a value that encodes to an array.
    pub fn condition<T>(
        mut self,
        field_path: impl Into<String>,
        op: Operator,
        value: &T,
    ) -> serde_document::Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let field_path = field_path.into();
        let value = serde_document::to_value(value)?;
        if op.takes_array() && value.array_values().is_none() {
            return Err(serde_document::Error::ExpectedArray(
                TraceKey::field(field_path),
                value,
            ));
        }
        self.conditions.push(Condition {
            field_path,
            op,
            value,
        });
        Ok(self)
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn max_results(&self) -> Option<u32> {
        self.limit
    }

    pub(crate) fn limit_i32(&self) -> Option<i32> {
        self.limit
            .map(|limit| i32::try_from(limit).unwrap_or(i32::MAX))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.limit.is_none()
    }
}
