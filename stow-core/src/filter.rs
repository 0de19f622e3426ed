use crate::{
    AsValue, Conjunction, Error, FilterValue, Operation, QueryField, QueryGroup, QueryNode, Result,
    StowError, Value,
};
use serde_json::{Map, Value as Json};
use std::str::FromStr;

const CONJUNCTION: &str = "Conjunction";
const OPERATION: &str = "Operation";
const VALUE: &str = "Value";

/// Filter specification of a single named entry.
///
/// An ordered list of `(name, Filter)` is the typed replacement of an
/// anonymous object: plain values compare by equality, `Operation` carries an
/// explicit operation, `Group` nests another list under its own conjunction
/// (the name of a group entry is only a label).
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Value(Value),
    Operation(Operation, FilterValue),
    Group(Conjunction, Vec<(String, Filter)>),
}

impl Filter {
    pub fn op(operation: Operation, value: impl Into<FilterValue>) -> Self {
        Filter::Operation(operation, value.into())
    }

    pub fn is_in<T: AsValue>(values: impl IntoIterator<Item = T>) -> Self {
        Filter::Operation(
            Operation::In,
            FilterValue::List(values.into_iter().map(AsValue::as_value).collect()),
        )
    }

    pub fn between(left: impl Into<Value>, right: impl Into<Value>) -> Self {
        Filter::Operation(Operation::Between, FilterValue::Range(left.into(), right.into()))
    }

    pub fn group<K: Into<String>>(
        conjunction: Conjunction,
        items: impl IntoIterator<Item = (K, Filter)>,
    ) -> Self {
        Filter::Group(
            conjunction,
            items.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )
    }
}

impl<T: Into<Value>> From<T> for Filter {
    fn from(value: T) -> Self {
        Filter::Value(value.into())
    }
}

impl QueryGroup {
    /// Builds an AND group from an ordered list of named filters.
    pub fn parse<K: Into<String>>(items: impl IntoIterator<Item = (K, Filter)>) -> Result<Self> {
        Self::parse_with(Conjunction::And, items)
    }

    pub fn parse_with<K: Into<String>>(
        conjunction: Conjunction,
        items: impl IntoIterator<Item = (K, Filter)>,
    ) -> Result<Self> {
        let mut group = QueryGroup::new(conjunction);
        for (name, filter) in items {
            let name: String = name.into();
            if name.trim().is_empty() {
                return Err(Error::new(StowError::NullReference("field name".into())));
            }
            let node: QueryNode = match filter {
                Filter::Value(value) => QueryField::new(name, value).into(),
                Filter::Operation(operation, value) => {
                    QueryField::with_operation(name, operation, value)?.into()
                }
                Filter::Group(conjunction, items) => Self::parse_with(conjunction, items)?.into(),
            };
            group.children.push(node);
        }
        Ok(group)
    }

    /// Builds a group from a dynamic object.
    ///
    /// Every property becomes an equality unless its value is an object with
    /// `Operation` and `Value`. An object carrying `Conjunction` becomes a
    /// nested group, the same key at the top level sets the conjunction of the
    /// returned group.
    pub fn parse_json(source: &Json) -> Result<Self> {
        match source {
            Json::Null => Err(Error::new(StowError::NullReference("source".into()))),
            Json::Object(object) => parse_object(object),
            other => Err(Error::new(StowError::InvalidExpression(format!(
                "Expected an object to parse a filter from, found `{other}`"
            )))),
        }
    }
}

fn parse_object(object: &Map<String, Json>) -> Result<QueryGroup> {
    let mut group = QueryGroup::new(Conjunction::And);
    for (key, value) in object {
        if key.eq_ignore_ascii_case(CONJUNCTION) {
            group.conjunction = parse_conjunction(value)?;
            continue;
        }
        let node: QueryNode = match value {
            Json::Object(inner) if get(inner, CONJUNCTION).is_some() => parse_object(inner)?.into(),
            Json::Object(inner) if get(inner, OPERATION).is_some() => {
                let operation = match get(inner, OPERATION) {
                    Some(Json::String(v)) => Operation::from_str(v)?,
                    Some(other) => {
                        return Err(Error::new(StowError::InvalidOperation(format!(
                            "`{other}` is not a valid operation for `{key}`"
                        ))));
                    }
                    None => Operation::Equal,
                };
                let operand = get(inner, VALUE).unwrap_or(&Json::Null);
                let value = match operation {
                    Operation::In | Operation::NotIn => match operand {
                        Json::Array(items) => FilterValue::List(
                            items.iter().map(json_to_value).collect::<Result<_>>()?,
                        ),
                        _ => FilterValue::List(vec![json_to_value(operand)?]),
                    },
                    Operation::Between | Operation::NotBetween => match operand {
                        Json::Array(items) if items.len() == 2 => FilterValue::Range(
                            json_to_value(&items[0])?,
                            json_to_value(&items[1])?,
                        ),
                        _ => {
                            return Err(Error::new(StowError::InvalidOperation(format!(
                                "{operation:?} on `{key}` expects an array of two values"
                            ))));
                        }
                    },
                    _ => FilterValue::Single(json_to_value(operand)?),
                };
                QueryField::with_operation(key.clone(), operation, value)?.into()
            }
            _ => QueryField::new(key.clone(), json_to_value(value)?).into(),
        };
        group.children.push(node);
    }
    Ok(group)
}

fn get<'a>(object: &'a Map<String, Json>, key: &str) -> Option<&'a Json> {
    object
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn parse_conjunction(value: &Json) -> Result<Conjunction> {
    match value {
        Json::String(v) => Conjunction::from_str(v),
        other => Err(Error::new(StowError::InvalidOperation(format!(
            "`{other}` is not a valid conjunction"
        )))),
    }
}

fn json_to_value(value: &Json) -> Result<Value> {
    Ok(match value {
        Json::Null => Value::Null,
        Json::Bool(v) => Value::Boolean(Some(*v)),
        Json::Number(v) => {
            if let Some(v) = v.as_i64() {
                Value::Int64(Some(v))
            } else if let Some(v) = v.as_u64() {
                Value::UInt64(Some(v))
            } else {
                Value::Float64(v.as_f64())
            }
        }
        Json::String(v) => Value::Varchar(Some(v.clone())),
        other => {
            return Err(Error::new(StowError::InvalidExpression(format!(
                "`{other}` cannot be used as a filter value"
            ))));
        }
    })
}
