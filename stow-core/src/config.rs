use crate::{Error, Result, StowError};
use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};

/// How database values are turned into property values.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversionType {
    /// The database value must already have the exact type of the property.
    #[default]
    Default,
    /// Convertible values are coerced (numeric widths, text, temporal types).
    Automatic,
}

/// What happens when a database value does not match any enum member.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnumHandling {
    #[default]
    ThrowError,
    UseDefault,
    Cast,
}

/// Which key is returned by insert and merge operations.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyColumnReturnBehavior {
    Primary,
    Identity,
    PrimaryOrElseIdentity,
    #[default]
    IdentityOrElsePrimary,
}

/// Lifetime of the connection owned by a repository.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionPersistency {
    /// A new connection is opened for each operation and dropped right after.
    #[default]
    PerCall,
    /// One connection is opened lazily and reused for the lifetime of the repository.
    Instance,
}

macro_rules! impl_from_str {
    ($name:ty, $($text:literal => $variant:expr),+ $(,)?) => {
        impl FromStr for $name {
            type Err = Error;
            fn from_str(value: &str) -> Result<Self> {
                let normalized = value.trim().to_ascii_lowercase().replace(['_', '-'], "");
                match normalized.as_str() {
                    $($text => Ok($variant),)+
                    _ => Err(Error::new(StowError::InvalidOperation(format!(
                        "`{}` is not a valid {}",
                        value,
                        stringify!($name),
                    )))),
                }
            }
        }
    };
}

impl_from_str!(ConversionType,
    "default" => ConversionType::Default,
    "automatic" => ConversionType::Automatic,
);
impl_from_str!(EnumHandling,
    "throwerror" => EnumHandling::ThrowError,
    "usedefault" => EnumHandling::UseDefault,
    "cast" => EnumHandling::Cast,
);
impl_from_str!(KeyColumnReturnBehavior,
    "primary" => KeyColumnReturnBehavior::Primary,
    "identity" => KeyColumnReturnBehavior::Identity,
    "primaryorelseidentity" => KeyColumnReturnBehavior::PrimaryOrElseIdentity,
    "identityorelseprimary" => KeyColumnReturnBehavior::IdentityOrElsePrimary,
);
impl_from_str!(ConnectionPersistency,
    "percall" => ConnectionPersistency::PerCall,
    "instance" => ConnectionPersistency::Instance,
);

/// Library wide options, carried by [`crate::Stow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfigurationOptions {
    pub conversion_type: ConversionType,
    pub enum_handling: EnumHandling,
    pub default_batch_operation_size: usize,
    pub default_cache_item_expiration_in_minutes: u64,
    pub key_column_return_behavior: KeyColumnReturnBehavior,
}

impl Default for GlobalConfigurationOptions {
    fn default() -> Self {
        Self {
            conversion_type: Default::default(),
            enum_handling: Default::default(),
            default_batch_operation_size: 10,
            default_cache_item_expiration_in_minutes: 180,
            key_column_return_behavior: Default::default(),
        }
    }
}

impl GlobalConfigurationOptions {
    /// Defaults overridden by the `STOW_*` environment variables that are set.
    pub fn from_env() -> Result<Self> {
        let mut result = Self::default();
        fn read<T: FromStr>(name: &str) -> Result<Option<T>>
        where
            T::Err: Into<Error>,
        {
            match env::var(name) {
                Ok(v) => v
                    .parse::<T>()
                    .map(Some)
                    .map_err(|e| Into::<Error>::into(e).context(format!("While reading `{name}`"))),
                Err(_) => Ok(None),
            }
        }
        if let Some(v) = read("STOW_CONVERSION_TYPE")? {
            result.conversion_type = v;
        }
        if let Some(v) = read("STOW_ENUM_HANDLING")? {
            result.enum_handling = v;
        }
        if let Some(v) = read("STOW_DEFAULT_BATCH_OPERATION_SIZE")? {
            result.default_batch_operation_size = v;
        }
        if let Some(v) = read("STOW_DEFAULT_CACHE_ITEM_EXPIRATION_IN_MINUTES")? {
            result.default_cache_item_expiration_in_minutes = v;
        }
        if let Some(v) = read("STOW_KEY_COLUMN_RETURN_BEHAVIOR")? {
            result.key_column_return_behavior = v;
        }
        Ok(result)
    }
}
