use crate::{Error, Result, StowError};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
    mem,
};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::well_known::Rfc3339,
    macros::format_description,
};
use uuid::Uuid;

/// Dynamically typed SQL scalar.
///
/// Every variant carries an `Option` payload: `None` is a typed NULL, which
/// lets a value double as the type prototype of a column or property.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Int8(v) => v.hash(state),
            Value::Int16(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::UInt8(v) => v.hash(state),
            Value::UInt16(v) => v.hash(state),
            Value::UInt32(v) => v.hash(state),
            Value::UInt64(v) => v.hash(state),
            Value::Float32(v) => v.map(f32::to_bits).hash(state),
            Value::Float64(v) => v.map(f64::to_bits).hash(state),
            Value::Decimal(v) => v.hash(state),
            Value::Varchar(v) => v.hash(state),
            Value::Blob(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Time(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::TimestampWithTimezone(v) => v.hash(state),
            Value::Uuid(v) => v.hash(state),
        }
    }
}

macro_rules! conversion_error {
    ($value:expr, $target:expr) => {
        Error::new(StowError::Conversion(format!(
            "{} `{}` into {}",
            $value.type_name(),
            $value,
            $target.type_name()
        )))
    };
}

impl Value {
    /// True for `Null` and for any variant without a payload.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// The same variant without payload.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int8(..) => Value::Int8(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::UInt8(..) => Value::UInt8(None),
            Value::UInt16(..) => Value::UInt16(None),
            Value::UInt32(..) => Value::UInt32(None),
            Value::UInt64(..) => Value::UInt64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(None),
            Value::Uuid(..) => Value::Uuid(None),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(..) => "Boolean",
            Value::Int8(..) => "Int8",
            Value::Int16(..) => "Int16",
            Value::Int32(..) => "Int32",
            Value::Int64(..) => "Int64",
            Value::UInt8(..) => "UInt8",
            Value::UInt16(..) => "UInt16",
            Value::UInt32(..) => "UInt32",
            Value::UInt64(..) => "UInt64",
            Value::Float32(..) => "Float32",
            Value::Float64(..) => "Float64",
            Value::Decimal(..) => "Decimal",
            Value::Varchar(..) => "Varchar",
            Value::Blob(..) => "Blob",
            Value::Date(..) => "Date",
            Value::Time(..) => "Time",
            Value::Timestamp(..) => "Timestamp",
            Value::TimestampWithTimezone(..) => "TimestampWithTimezone",
            Value::Uuid(..) => "Uuid",
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Boolean(Some(v)) => Some(*v as i128),
            Value::Int8(Some(v)) => Some(*v as i128),
            Value::Int16(Some(v)) => Some(*v as i128),
            Value::Int32(Some(v)) => Some(*v as i128),
            Value::Int64(Some(v)) => Some(*v as i128),
            Value::UInt8(Some(v)) => Some(*v as i128),
            Value::UInt16(Some(v)) => Some(*v as i128),
            Value::UInt32(Some(v)) => Some(*v as i128),
            Value::UInt64(Some(v)) => Some(*v as i128),
            Value::Float32(Some(v)) if v.fract() == 0.0 => v.to_i128(),
            Value::Float64(Some(v)) if v.fract() == 0.0 => v.to_i128(),
            Value::Decimal(Some(v)) if v.fract().is_zero() => v.to_i128(),
            Value::Varchar(Some(v)) => v.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(Some(v)) => Some(*v as f64),
            Value::Float64(Some(v)) => Some(*v),
            Value::Decimal(Some(v)) => v.to_f64(),
            Value::Varchar(Some(v)) => v.trim().parse().ok(),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(Some(v)) => Some(*v),
            Value::Float32(Some(v)) => Decimal::from_f32(*v),
            Value::Float64(Some(v)) => Decimal::from_f64(*v),
            Value::Varchar(Some(v)) => v.trim().parse().ok(),
            _ => self.as_i128().and_then(Decimal::from_i128),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Value::Varchar(Some(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Coerces this value into the variant of `prototype`.
    ///
    /// Numeric conversions are range checked, text is parsed when the target
    /// is numeric, temporal, boolean or uuid. A NULL converts into the typed
    /// NULL of the prototype.
    pub fn convert_to(self, prototype: &Value) -> Result<Value> {
        if self.is_null() {
            return Ok(prototype.as_null());
        }
        if self.same_type(prototype) || matches!(prototype, Value::Null) {
            return Ok(self);
        }
        macro_rules! integer {
            ($variant:path, $target:ty) => {
                self.as_i128()
                    .and_then(|v| <$target>::try_from(v).ok())
                    .map(|v| $variant(Some(v)))
                    .ok_or_else(|| conversion_error!(self, prototype))
            };
        }
        match prototype {
            Value::Boolean(..) => match &self {
                Value::Varchar(Some(v)) => match v.trim().to_ascii_lowercase().as_str() {
                    "true" | "t" | "yes" | "1" => Ok(Value::Boolean(Some(true))),
                    "false" | "f" | "no" | "0" => Ok(Value::Boolean(Some(false))),
                    _ => Err(conversion_error!(self, prototype)),
                },
                _ => self
                    .as_i128()
                    .map(|v| Value::Boolean(Some(v != 0)))
                    .ok_or_else(|| conversion_error!(self, prototype)),
            },
            Value::Int8(..) => integer!(Value::Int8, i8),
            Value::Int16(..) => integer!(Value::Int16, i16),
            Value::Int32(..) => integer!(Value::Int32, i32),
            Value::Int64(..) => integer!(Value::Int64, i64),
            Value::UInt8(..) => integer!(Value::UInt8, u8),
            Value::UInt16(..) => integer!(Value::UInt16, u16),
            Value::UInt32(..) => integer!(Value::UInt32, u32),
            Value::UInt64(..) => integer!(Value::UInt64, u64),
            Value::Float32(..) => self
                .as_f64()
                .map(|v| Value::Float32(Some(v as f32)))
                .ok_or_else(|| conversion_error!(self, prototype)),
            Value::Float64(..) => self
                .as_f64()
                .map(|v| Value::Float64(Some(v)))
                .ok_or_else(|| conversion_error!(self, prototype)),
            Value::Decimal(..) => self
                .as_decimal()
                .map(|v| Value::Decimal(Some(v)))
                .ok_or_else(|| conversion_error!(self, prototype)),
            Value::Varchar(..) => Ok(Value::Varchar(Some(self.to_string()))),
            Value::Blob(..) => match self {
                Value::Varchar(Some(v)) => Ok(Value::Blob(Some(v.into_bytes().into()))),
                other => Err(conversion_error!(other, prototype)),
            },
            Value::Date(..) => match &self {
                Value::Timestamp(Some(v)) => Ok(Value::Date(Some(v.date()))),
                Value::TimestampWithTimezone(Some(v)) => Ok(Value::Date(Some(v.date()))),
                _ => self
                    .as_text()
                    .and_then(|v| Date::parse(v.trim(), format_description!("[year]-[month]-[day]")).ok())
                    .map(|v| Value::Date(Some(v)))
                    .ok_or_else(|| conversion_error!(self, prototype)),
            },
            Value::Time(..) => match &self {
                Value::Timestamp(Some(v)) => Ok(Value::Time(Some(v.time()))),
                _ => self
                    .as_text()
                    .and_then(|v| parse_time(v.trim()))
                    .map(|v| Value::Time(Some(v)))
                    .ok_or_else(|| conversion_error!(self, prototype)),
            },
            Value::Timestamp(..) => match &self {
                Value::TimestampWithTimezone(Some(v)) => Ok(Value::Timestamp(Some(
                    PrimitiveDateTime::new(v.date(), v.time()),
                ))),
                Value::Date(Some(v)) => Ok(Value::Timestamp(Some(v.midnight()))),
                _ => self
                    .as_text()
                    .and_then(|v| parse_timestamp(v.trim()))
                    .map(|v| Value::Timestamp(Some(v)))
                    .ok_or_else(|| conversion_error!(self, prototype)),
            },
            Value::TimestampWithTimezone(..) => match &self {
                Value::Timestamp(Some(v)) => {
                    Ok(Value::TimestampWithTimezone(Some(v.assume_utc())))
                }
                _ => self
                    .as_text()
                    .and_then(|v| OffsetDateTime::parse(v.trim(), &Rfc3339).ok())
                    .map(|v| Value::TimestampWithTimezone(Some(v)))
                    .ok_or_else(|| conversion_error!(self, prototype)),
            },
            Value::Uuid(..) => match &self {
                Value::Blob(Some(v)) => Uuid::from_slice(v)
                    .map(|v| Value::Uuid(Some(v)))
                    .map_err(|_| conversion_error!(self, prototype)),
                _ => self
                    .as_text()
                    .and_then(|v| Uuid::parse_str(v.trim()).ok())
                    .map(|v| Value::Uuid(Some(v)))
                    .ok_or_else(|| conversion_error!(self, prototype)),
            },
            Value::Null => Ok(self),
        }
    }
}

fn parse_time(value: &str) -> Option<Time> {
    Time::parse(value, format_description!("[hour]:[minute]:[second].[subsecond]"))
        .or_else(|_| Time::parse(value, format_description!("[hour]:[minute]:[second]")))
        .or_else(|_| Time::parse(value, format_description!("[hour]:[minute]")))
        .ok()
}

fn parse_timestamp(value: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .ok()
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! show {
            ($v:expr) => {
                match $v {
                    Some(v) => write!(f, "{}", v),
                    None => f.write_str("NULL"),
                }
            };
        }
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => show!(v),
            Value::Int8(v) => show!(v),
            Value::Int16(v) => show!(v),
            Value::Int32(v) => show!(v),
            Value::Int64(v) => show!(v),
            Value::UInt8(v) => show!(v),
            Value::UInt16(v) => show!(v),
            Value::UInt32(v) => show!(v),
            Value::UInt64(v) => show!(v),
            Value::Float32(v) => show!(v),
            Value::Float64(v) => show!(v),
            Value::Decimal(v) => show!(v),
            Value::Varchar(v) => show!(v),
            Value::Blob(v) => match v {
                Some(v) => {
                    f.write_str("0x")?;
                    for b in v.iter() {
                        write!(f, "{:02X}", b)?;
                    }
                    Ok(())
                }
                None => f.write_str("NULL"),
            },
            Value::Date(v) => show!(v),
            Value::Time(v) => show!(v),
            Value::Timestamp(v) => show!(v),
            Value::TimestampWithTimezone(v) => show!(v),
            Value::Uuid(v) => show!(v),
        }
    }
}
