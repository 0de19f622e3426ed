use crate::{AsValue, Error, Field, Result, StowError, Value};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Like,
    NotLike,
    Between,
    NotBetween,
    In,
    NotIn,
}

impl Operation {
    pub fn text(&self) -> &'static str {
        match self {
            Operation::Equal => "=",
            Operation::NotEqual => "<>",
            Operation::LessThan => "<",
            Operation::GreaterThan => ">",
            Operation::LessThanOrEqual => "<=",
            Operation::GreaterThanOrEqual => ">=",
            Operation::Like => "LIKE",
            Operation::NotLike => "NOT LIKE",
            Operation::Between => "BETWEEN",
            Operation::NotBetween => "NOT BETWEEN",
            Operation::In => "IN",
            Operation::NotIn => "NOT IN",
        }
    }

    /// The operation obtained by swapping the operands.
    pub fn flip(&self) -> Operation {
        match self {
            Operation::LessThan => Operation::GreaterThan,
            Operation::GreaterThan => Operation::LessThan,
            Operation::LessThanOrEqual => Operation::GreaterThanOrEqual,
            Operation::GreaterThanOrEqual => Operation::LessThanOrEqual,
            other => *other,
        }
    }
}

impl FromStr for Operation {
    type Err = Error;
    fn from_str(value: &str) -> Result<Self> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "equal" | "=" | "==" => Operation::Equal,
            "notequal" | "<>" | "!=" => Operation::NotEqual,
            "lessthan" | "<" => Operation::LessThan,
            "greaterthan" | ">" => Operation::GreaterThan,
            "lessthanorequal" | "<=" => Operation::LessThanOrEqual,
            "greaterthanorequal" | ">=" => Operation::GreaterThanOrEqual,
            "like" => Operation::Like,
            "notlike" | "not like" => Operation::NotLike,
            "between" => Operation::Between,
            "notbetween" | "not between" => Operation::NotBetween,
            "in" => Operation::In,
            "notin" | "not in" => Operation::NotIn,
            _ => {
                return Err(Error::new(StowError::InvalidOperation(format!(
                    "`{value}` is not a valid operation"
                ))));
            }
        })
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn text(&self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl FromStr for Conjunction {
    type Err = Error;
    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "and" | "&&" => Ok(Conjunction::And),
            "or" | "||" => Ok(Conjunction::Or),
            _ => Err(Error::new(StowError::InvalidOperation(format!(
                "`{value}` is not a valid conjunction"
            )))),
        }
    }
}

/// Database function wrapping the column of a [`QueryField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Upper,
    Lower,
    Trim,
    LeftTrim,
    RightTrim,
}

impl Function {
    pub fn render(&self, column: &str) -> String {
        let name = match self {
            Function::Upper => "UPPER",
            Function::Lower => "LOWER",
            Function::Trim => "TRIM",
            Function::LeftTrim => "LTRIM",
            Function::RightTrim => "RTRIM",
        };
        format!("{name}({column})")
    }
}

/// Value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name without the dialect prefix.
    pub name: String,
    pub value: Value,
    /// Database type override taken from the type map.
    pub db_type: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            db_type: None,
        }
    }
}

/// Operand of a [`QueryField`], its shape depends on the operation.
#[derive(Debug, Clone, PartialEq, Hash)]
pub enum FilterValue {
    Single(Value),
    List(Vec<Value>),
    Range(Value, Value),
}

impl<T: Into<Value>> From<T> for FilterValue {
    fn from(value: T) -> Self {
        FilterValue::Single(value.into())
    }
}

/// Leaf of the predicate tree: `column <operation> value`.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct QueryField {
    pub field: Field,
    pub operation: Operation,
    pub value: FilterValue,
    pub function: Option<Function>,
}

impl QueryField {
    /// Equality with a single value.
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            field: Field::new(name),
            operation: Operation::Equal,
            value: FilterValue::Single(value.into()),
            function: None,
        }
    }

    /// Fails when the shape of `value` does not fit `operation`.
    pub fn with_operation(
        name: impl Into<Cow<'static, str>>,
        operation: Operation,
        value: impl Into<FilterValue>,
    ) -> Result<Self> {
        let value = value.into();
        let valid = match operation {
            Operation::In | Operation::NotIn => matches!(value, FilterValue::List(..)),
            Operation::Between | Operation::NotBetween => matches!(value, FilterValue::Range(..)),
            _ => matches!(value, FilterValue::Single(..)),
        };
        let field = Field::new(name);
        if !valid {
            return Err(Error::new(StowError::InvalidOperation(format!(
                "The operation {:?} on `{}` does not accept the value {:?}",
                operation, field, value
            ))));
        }
        Ok(Self {
            field,
            operation,
            value,
            function: None,
        })
    }

    pub fn is_in<T: AsValue>(
        name: impl Into<Cow<'static, str>>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            field: Field::new(name),
            operation: Operation::In,
            value: FilterValue::List(values.into_iter().map(AsValue::as_value).collect()),
            function: None,
        }
    }

    pub fn between(
        name: impl Into<Cow<'static, str>>,
        left: impl Into<Value>,
        right: impl Into<Value>,
    ) -> Self {
        Self {
            field: Field::new(name),
            operation: Operation::Between,
            value: FilterValue::Range(left.into(), right.into()),
            function: None,
        }
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.function = Some(function);
        self
    }

    pub fn negate(mut self) -> Self {
        self.operation = match self.operation {
            Operation::Equal => Operation::NotEqual,
            Operation::NotEqual => Operation::Equal,
            Operation::LessThan => Operation::GreaterThanOrEqual,
            Operation::GreaterThan => Operation::LessThanOrEqual,
            Operation::LessThanOrEqual => Operation::GreaterThan,
            Operation::GreaterThanOrEqual => Operation::LessThan,
            Operation::Like => Operation::NotLike,
            Operation::NotLike => Operation::Like,
            Operation::Between => Operation::NotBetween,
            Operation::NotBetween => Operation::Between,
            Operation::In => Operation::NotIn,
            Operation::NotIn => Operation::In,
        };
        self
    }
}
