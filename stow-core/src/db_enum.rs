use crate::{EnumHandling, Error, Result, StowError, Value};
use std::any;

/// Enum stored in the database either by name or by discriminant.
///
/// ```rust
/// use stow_core::DbEnum;
/// #[derive(Clone, Default, PartialEq)]
/// enum Status { #[default] Active, Closed }
/// impl DbEnum for Status {
///     fn variants() -> &'static [(&'static str, i64, Self)] {
///         &[("Active", 0, Status::Active), ("Closed", 1, Status::Closed)]
///     }
/// }
/// assert_eq!(Status::Closed.db_name(), "Closed");
/// ```
pub trait DbEnum: Clone + Default + PartialEq + Send + Sync + 'static {
    /// Every member as `(name, discriminant, value)`.
    fn variants() -> &'static [(&'static str, i64, Self)];

    fn db_name(&self) -> &'static str {
        Self::variants()
            .iter()
            .find(|(.., v)| v == self)
            .map(|(name, ..)| *name)
            .unwrap_or_default()
    }
}

/// Enums are persisted by name.
pub fn encode_enum<T: DbEnum>(value: &T) -> Value {
    Value::Varchar(Some(value.db_name().into()))
}

pub fn decode_enum<T: DbEnum>(value: &Value, handling: EnumHandling) -> Result<T> {
    let variants = T::variants();
    let found = match value {
        Value::Varchar(Some(text)) => {
            let text = text.trim();
            variants
                .iter()
                .find(|(name, ..)| *name == text)
                .or_else(|| {
                    if handling != EnumHandling::Cast {
                        return None;
                    }
                    variants
                        .iter()
                        .find(|(name, ..)| name.eq_ignore_ascii_case(text))
                        .or_else(|| {
                            let number = text.parse::<i64>().ok()?;
                            variants.iter().find(|(_, d, _)| *d == number)
                        })
                })
        }
        Value::Int8(Some(v)) => variants.iter().find(|(_, d, _)| *d == *v as i64),
        Value::Int16(Some(v)) => variants.iter().find(|(_, d, _)| *d == *v as i64),
        Value::Int32(Some(v)) => variants.iter().find(|(_, d, _)| *d == *v as i64),
        Value::Int64(Some(v)) => variants.iter().find(|(_, d, _)| *d == *v),
        Value::UInt8(Some(v)) => variants.iter().find(|(_, d, _)| *d == *v as i64),
        Value::UInt16(Some(v)) => variants.iter().find(|(_, d, _)| *d == *v as i64),
        Value::UInt32(Some(v)) => variants.iter().find(|(_, d, _)| *d == *v as i64),
        _ => None,
    };
    match (found, handling) {
        (Some((.., v)), _) => Ok(v.clone()),
        (None, EnumHandling::UseDefault) => Ok(T::default()),
        (None, ..) => Err(Error::new(StowError::Conversion(format!(
            "{} `{}` into the enum {}",
            value.type_name(),
            value,
            any::type_name::<T>()
        )))),
    }
}
