use crate::{
    ClassProperty, Conjunction, Error, FilterValue, Function, Operation, QueryField, QueryGroup,
    QueryNode, Result, StowError, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

/// Typed predicate over the properties of an entity.
///
/// Usually produced by the `expr!` macro, it can also be built with the
/// methods below. Only the subset that maps to a [`QueryGroup`] is accepted
/// by [`QueryGroup::parse_expression`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Property of the entity, by Rust name.
    Property(&'static str),
    Value(Value),
    List(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Method call: name, receiver, arguments.
    Call(&'static str, Box<Expr>, Vec<Expr>),
}

impl<T: Into<Value>> From<T> for Expr {
    fn from(value: T) -> Self {
        Expr::Value(value.into())
    }
}

impl Expr {
    pub fn property(name: &'static str) -> Self {
        Expr::Property(name)
    }

    fn binary(self, op: BinaryOp, rhs: impl Into<Expr>) -> Self {
        Expr::Binary(op, Box::new(self), Box::new(rhs.into()))
    }

    pub fn equal(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Equal, rhs)
    }

    pub fn not_equal(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::NotEqual, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Less, rhs)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::LessEqual, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Greater, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::GreaterEqual, rhs)
    }

    pub fn and(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn not(self) -> Self {
        Expr::Unary(UnaryOp::Not, Box::new(self))
    }

    pub fn call(self, method: &'static str, args: Vec<Expr>) -> Self {
        Expr::Call(method, Box::new(self), args)
    }

    pub fn to_uppercase(self) -> Self {
        self.call("to_uppercase", vec![])
    }

    pub fn to_lowercase(self) -> Self {
        self.call("to_lowercase", vec![])
    }

    pub fn trim(self) -> Self {
        self.call("trim", vec![])
    }

    pub fn contains(self, value: impl Into<Expr>) -> Self {
        self.call("contains", vec![value.into()])
    }

    pub fn starts_with(self, value: impl Into<Expr>) -> Self {
        self.call("starts_with", vec![value.into()])
    }

    pub fn ends_with(self, value: impl Into<Expr>) -> Self {
        self.call("ends_with", vec![value.into()])
    }

    pub fn is_in<T: Into<Value>>(self, values: impl IntoIterator<Item = T>) -> Self {
        let list = Expr::List(values.into_iter().map(|v| Expr::Value(v.into())).collect());
        self.call("is_in", vec![list])
    }

    pub fn between(self, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        self.call("between", vec![left.into(), right.into()])
    }
}

fn unsupported(expr: &Expr) -> Error {
    Error::new(StowError::InvalidQueryExpression(format!("{expr:?}")))
}

struct ExpressionParser<'a> {
    properties: &'a [ClassProperty],
}

impl<'a> ExpressionParser<'a> {
    fn column(&self, name: &str) -> Result<&'a str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.column.as_str())
            .ok_or_else(|| {
                Error::new(StowError::PropertyNotFound {
                    entity: self
                        .properties
                        .first()
                        .map(|p| p.entity.to_string())
                        .unwrap_or_default(),
                    property: name.to_string(),
                })
            })
    }

    /// A property reference, possibly wrapped in a database function.
    fn field(&self, expr: &Expr) -> Result<Option<(&'a str, Option<Function>)>> {
        Ok(match expr {
            Expr::Property(name) => Some((self.column(name)?, None)),
            Expr::Call(method, receiver, args) if args.is_empty() => {
                let function = match *method {
                    "to_uppercase" => Function::Upper,
                    "to_lowercase" => Function::Lower,
                    "trim" => Function::Trim,
                    "trim_start" => Function::LeftTrim,
                    "trim_end" => Function::RightTrim,
                    _ => return Ok(None),
                };
                match self.field(receiver)? {
                    Some((column, None)) => Some((column, Some(function))),
                    _ => return Err(unsupported(expr)),
                }
            }
            _ => None,
        })
    }

    fn value(&self, expr: &Expr) -> Option<Value> {
        match expr {
            Expr::Value(v) => Some(v.clone()),
            Expr::Unary(UnaryOp::Negative, inner) => match self.value(inner)? {
                Value::Int8(v) => Some(Value::Int8(v.map(|v| -v))),
                Value::Int16(v) => Some(Value::Int16(v.map(|v| -v))),
                Value::Int32(v) => Some(Value::Int32(v.map(|v| -v))),
                Value::Int64(v) => Some(Value::Int64(v.map(|v| -v))),
                Value::Float32(v) => Some(Value::Float32(v.map(|v| -v))),
                Value::Float64(v) => Some(Value::Float64(v.map(|v| -v))),
                Value::Decimal(v) => Some(Value::Decimal(v.map(|v| -v))),
                _ => None,
            },
            _ => None,
        }
    }

    fn node(&self, expr: &Expr) -> Result<QueryNode> {
        match expr {
            Expr::Binary(op @ (BinaryOp::And | BinaryOp::Or), lhs, rhs) => {
                let conjunction = if *op == BinaryOp::And {
                    Conjunction::And
                } else {
                    Conjunction::Or
                };
                let mut group = QueryGroup::new(conjunction);
                for side in [lhs, rhs] {
                    match self.node(side)? {
                        QueryNode::Group(g) if g.conjunction == conjunction && !g.is_not => {
                            group.children.extend(g.children)
                        }
                        node => group.children.push(node),
                    }
                }
                Ok(group.into())
            }
            Expr::Binary(op, lhs, rhs) => {
                let operation = match op {
                    BinaryOp::Equal => Operation::Equal,
                    BinaryOp::NotEqual => Operation::NotEqual,
                    BinaryOp::Less => Operation::LessThan,
                    BinaryOp::LessEqual => Operation::LessThanOrEqual,
                    BinaryOp::Greater => Operation::GreaterThan,
                    BinaryOp::GreaterEqual => Operation::GreaterThanOrEqual,
                    _ => return Err(unsupported(expr)),
                };
                let (column, function, operation, value) =
                    match (self.field(lhs)?, self.value(rhs)) {
                        (Some((column, function)), Some(value)) => {
                            (column, function, operation, value)
                        }
                        _ => match (self.field(rhs)?, self.value(lhs)) {
                            (Some((column, function)), Some(value)) => {
                                (column, function, operation.flip(), value)
                            }
                            _ => return Err(unsupported(expr)),
                        },
                    };
                let mut field = QueryField::with_operation(column.to_string(), operation, value)?;
                field.function = function;
                Ok(field.into())
            }
            Expr::Unary(UnaryOp::Not, inner) => {
                let group = match self.node(inner)? {
                    QueryNode::Group(g) => g,
                    QueryNode::Field(f) => QueryGroup::and([f]),
                };
                Ok(group.not().into())
            }
            Expr::Call(method, receiver, args) => {
                let Some((column, function)) = self.field(receiver)? else {
                    return Err(unsupported(expr));
                };
                let (operation, value) = match (*method, args.as_slice()) {
                    ("contains" | "starts_with" | "ends_with", [arg]) => {
                        let Some(Value::Varchar(Some(text))) = self.value(arg) else {
                            return Err(unsupported(expr));
                        };
                        let pattern = match *method {
                            "contains" => format!("%{text}%"),
                            "starts_with" => format!("{text}%"),
                            _ => format!("%{text}"),
                        };
                        (Operation::Like, FilterValue::Single(Value::Varchar(Some(pattern))))
                    }
                    ("is_in", [Expr::List(items)]) => {
                        let values = items
                            .iter()
                            .map(|v| self.value(v).ok_or_else(|| unsupported(v)))
                            .collect::<Result<Vec<_>>>()?;
                        (Operation::In, FilterValue::List(values))
                    }
                    ("between", [left, right]) => match (self.value(left), self.value(right)) {
                        (Some(left), Some(right)) => {
                            (Operation::Between, FilterValue::Range(left, right))
                        }
                        _ => return Err(unsupported(expr)),
                    },
                    _ => return Err(unsupported(expr)),
                };
                let mut field = QueryField::with_operation(column.to_string(), operation, value)?;
                field.function = function;
                Ok(field.into())
            }
            Expr::Property(..) => {
                let Some((column, function)) = self.field(expr)? else {
                    return Err(unsupported(expr));
                };
                let mut field = QueryField::new(column.to_string(), true);
                field.function = function;
                Ok(field.into())
            }
            _ => Err(unsupported(expr)),
        }
    }
}

impl QueryGroup {
    /// Builds a group from a typed predicate over `properties`.
    ///
    /// Comparisons between a property and a value become fields (the operands
    /// may appear in any order), `&&` and `||` become groups, `!` negates a
    /// group. Anything else is an invalid query expression.
    pub fn parse_expression(expr: &Expr, properties: &[ClassProperty]) -> Result<QueryGroup> {
        let parser = ExpressionParser { properties };
        Ok(match parser.node(expr)? {
            QueryNode::Group(group) => group,
            QueryNode::Field(field) => QueryGroup::and([field]),
        })
    }
}
