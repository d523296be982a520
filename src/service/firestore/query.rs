use crate::{
    filter::{Condition, Filter, Operator},
    proto::google::firestore::v1::{
        structured_query::{
            self, composite_filter, field_filter, filter::FilterType, CollectionSelector,
            CompositeFilter, FieldFilter, FieldReference,
        },
        StructuredQuery,
    },
};

pub(crate) fn structured_query(collection: &str, filter: &Filter) -> StructuredQuery {
    let mut filters: Vec<structured_query::Filter> =
        filter.conditions().iter().map(field_filter).collect();
    let r#where = match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(structured_query::Filter {
            filter_type: Some(FilterType::CompositeFilter(CompositeFilter {
                op: composite_filter::Operator::And as i32,
                filters,
            })),
        }),
    };
    StructuredQuery {
        from: vec![CollectionSelector {
            collection_id: collection.to_string(),
            all_descendants: false,
        }],
        r#where,
        offset: 0,
        limit: filter.limit_i32(),
    }
}

fn field_filter(condition: &Condition) -> structured_query::Filter {
    structured_query::Filter {
        filter_type: Some(FilterType::FieldFilter(FieldFilter {
            field: Some(FieldReference {
                field_path: field_path(condition.field_path()),
            }),
            op: operator(condition.op()) as i32,
            value: Some(condition.value().clone()),
        })),
    }
}

fn operator(op: Operator) -> field_filter::Operator {
    match op {
        Operator::LessThan => field_filter::Operator::LessThan,
        Operator::LessThanOrEqual => field_filter::Operator::LessThanOrEqual,
        Operator::GreaterThan => field_filter::Operator::GreaterThan,
        Operator::GreaterThanOrEqual => field_filter::Operator::GreaterThanOrEqual,
        Operator::Equal => field_filter::Operator::Equal,
        Operator::NotEqual => field_filter::Operator::NotEqual,
        Operator::ArrayContains => field_filter::Operator::ArrayContains,
        Operator::In => field_filter::Operator::In,
        Operator::ArrayContainsAny => field_filter::Operator::ArrayContainsAny,
        Operator::NotIn => field_filter::Operator::NotIn,
    }
}

// Segments that are not plain identifiers have to be quoted with backticks.
fn field_path(dotted: &str) -> String {
    dotted
        .split('.')
        .map(|segment| {
            let mut chars = segment.chars();
            let simple = match chars.next() {
                Some(first) => {
                    (first.is_ascii_alphabetic() || first == '_')
                        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                }
                None => false,
            };
            if simple {
                segment.to_string()
            } else {
                let escaped = segment.replace('\\', "\\\\").replace('`', "\\`");
                format!("`{}`", escaped)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::{field_path, structured_query};
    use crate::{
        filter::{Filter, Operator},
        proto::google::firestore::v1::{
            structured_query::{composite_filter, field_filter, filter::FilterType},
            Value,
        },
    };

    #[test]
    fn test_single_condition() {
        let filter = Filter::new()
            .condition("age", Operator::GreaterThan, &20)
            .unwrap();
        let query = structured_query("people", &filter);

        assert_eq!("people", query.from[0].collection_id);
        assert_eq!(None, query.limit);
        match query.r#where.and_then(|filter| filter.filter_type) {
            Some(FilterType::FieldFilter(field)) => {
                assert_eq!("age", field.field.unwrap().field_path);
                assert_eq!(field_filter::Operator::GreaterThan as i32, field.op);
                assert_eq!(Some(Value::integer(20)), field.value);
            }
            _ => panic!("expected a field filter"),
        }
    }

    #[test]
    fn test_conjunction() {
        let filter = Filter::new()
            .condition("age", Operator::GreaterThan, &20)
            .unwrap()
            .condition("city", Operator::Equal, "tokyo")
            .unwrap()
            .limit(3);
        let query = structured_query("people", &filter);

        assert_eq!(Some(3), query.limit);
        match query.r#where.and_then(|filter| filter.filter_type) {
            Some(FilterType::CompositeFilter(composite)) => {
                assert_eq!(composite_filter::Operator::And as i32, composite.op);
                assert_eq!(2, composite.filters.len());
            }
            _ => panic!("expected a composite filter"),
        }
    }

    #[test]
    fn test_no_condition() {
        let query = structured_query("people", &Filter::new());
        assert_eq!(None, query.r#where);
    }

    #[test]
    fn test_field_path() {
        assert_eq!("address.city", field_path("address.city"));
        assert_eq!("`first name`", field_path("first name"));
        assert_eq!("a.`1st`", field_path("a.1st"));
        assert_eq!("`back\\`tick`", field_path("back`tick"));
    }
}
