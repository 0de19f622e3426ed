#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::env;
    use stow::{
        ConnectionPersistency, ConversionType, EnumHandling, GlobalConfigurationOptions,
        KeyColumnReturnBehavior, StowError,
    };

    #[test]
    fn config_defaults() {
        let options = GlobalConfigurationOptions::default();
        assert_eq!(options.conversion_type, ConversionType::Default);
        assert_eq!(options.enum_handling, EnumHandling::ThrowError);
        assert_eq!(options.default_batch_operation_size, 10);
        assert_eq!(options.default_cache_item_expiration_in_minutes, 180);
        assert_eq!(
            options.key_column_return_behavior,
            KeyColumnReturnBehavior::IdentityOrElsePrimary
        );
        assert_eq!(ConnectionPersistency::default(), ConnectionPersistency::PerCall);
    }

    #[test]
    fn config_from_str() {
        assert_eq!(
            "automatic".parse::<ConversionType>().unwrap(),
            ConversionType::Automatic
        );
        assert_eq!(
            "Use-Default".parse::<EnumHandling>().unwrap(),
            EnumHandling::UseDefault
        );
        assert_eq!(
            " PRIMARY_OR_ELSE_IDENTITY ".parse::<KeyColumnReturnBehavior>().unwrap(),
            KeyColumnReturnBehavior::PrimaryOrElseIdentity
        );
        assert_eq!(
            "Instance".parse::<ConnectionPersistency>().unwrap(),
            ConnectionPersistency::Instance
        );
        let error = "sometimes".parse::<ConnectionPersistency>().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::InvalidOperation(..))
        ));
    }

    #[test]
    fn config_serde() {
        let options: GlobalConfigurationOptions = serde_json::from_value(json!({
            "default_batch_operation_size": 50,
            "enum_handling": "Cast"
        }))
        .expect("Could not deserialize the options");
        assert_eq!(options.default_batch_operation_size, 50);
        assert_eq!(options.enum_handling, EnumHandling::Cast);
        assert_eq!(options.default_cache_item_expiration_in_minutes, 180);
        assert_eq!(
            serde_json::to_value(ConversionType::Automatic).unwrap(),
            json!("Automatic")
        );
    }

    #[test]
    fn config_from_env() {
        // Only this test touches the STOW_* variables
        unsafe {
            env::set_var("STOW_CONVERSION_TYPE", "automatic");
            env::set_var("STOW_DEFAULT_BATCH_OPERATION_SIZE", "25");
            env::set_var("STOW_KEY_COLUMN_RETURN_BEHAVIOR", "primary");
        }
        let options = GlobalConfigurationOptions::from_env().expect("Could not read the environment");
        assert_eq!(options.conversion_type, ConversionType::Automatic);
        assert_eq!(options.default_batch_operation_size, 25);
        assert_eq!(
            options.key_column_return_behavior,
            KeyColumnReturnBehavior::Primary
        );
        assert_eq!(options.enum_handling, EnumHandling::ThrowError);

        unsafe {
            env::set_var("STOW_DEFAULT_BATCH_OPERATION_SIZE", "many");
        }
        let error = GlobalConfigurationOptions::from_env().unwrap_err();
        assert!(format!("{error:#}").contains("STOW_DEFAULT_BATCH_OPERATION_SIZE"));

        unsafe {
            env::set_var("STOW_DEFAULT_BATCH_OPERATION_SIZE", "25");
            env::set_var("STOW_ENUM_HANDLING", "never");
        }
        let error = GlobalConfigurationOptions::from_env().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::InvalidOperation(..))
        ));

        unsafe {
            for name in [
                "STOW_CONVERSION_TYPE",
                "STOW_DEFAULT_BATCH_OPERATION_SIZE",
                "STOW_KEY_COLUMN_RETURN_BEHAVIOR",
                "STOW_ENUM_HANDLING",
            ] {
                env::remove_var(name);
            }
        }
        assert_eq!(
            GlobalConfigurationOptions::from_env().unwrap(),
            GlobalConfigurationOptions::default()
        );
    }
}
