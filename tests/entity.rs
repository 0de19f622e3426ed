#[cfg(test)]
mod tests {
    use std::any::TypeId;
    use stow::{
        ClassProperty, ConversionType, DbEnum, EnumHandling, Entity, EntityMap, ErrorKind,
        GlobalConfigurationOptions, PropertyHandler, Result, RowLabeled, RowReader, Stow,
        StowError, Value, decode_enum, error_kind,
    };

    #[derive(Debug, Default, Clone, PartialEq)]
    enum Status {
        #[default]
        Active,
        Closed,
    }

    impl DbEnum for Status {
        fn variants() -> &'static [(&'static str, i64, Self)] {
            &[("Active", 0, Status::Active), ("Closed", 1, Status::Closed)]
        }
    }

    #[derive(Entity, Debug, Default, Clone, PartialEq)]
    #[stow(table = "[dbo].[People]")]
    struct Customer {
        #[stow(primary, identity)]
        id: i64,
        #[stow(column = "FullName")]
        name: String,
        age: Option<i32>,
        #[stow(enumeration)]
        status: Status,
        #[stow(ignore)]
        cached: Option<String>,
    }

    #[derive(Entity, Debug, Default)]
    struct Tag {
        #[stow(primary)]
        code: String,
        r#type: Option<String>,
    }

    struct Shout;

    impl PropertyHandler for Shout {
        fn get(&self, value: Value, _property: &ClassProperty) -> Result<Value> {
            Ok(match value {
                Value::Varchar(Some(v)) => Value::Varchar(Some(v.to_uppercase())),
                other => other,
            })
        }
        fn set(&self, value: Value, _property: &ClassProperty) -> Result<Value> {
            Ok(match value {
                Value::Varchar(Some(v)) => Value::Varchar(Some(v.to_lowercase())),
                other => other,
            })
        }
    }

    fn customer_row(id: Value) -> RowLabeled {
        RowLabeled::new(
            vec!["ID".to_string(), "fullname".into(), "Status".into()].into(),
            vec![id, Value::Varchar(Some("Ada".into())), Value::Varchar(Some("Closed".into()))]
                .into(),
        )
    }

    #[test]
    fn entity_properties() {
        assert_eq!(Customer::table_name(), "[dbo].[People]");
        assert_eq!(Tag::table_name(), "Tag");
        let properties = Customer::properties();
        assert_eq!(
            properties.iter().map(|p| p.name).collect::<Vec<_>>(),
            ["id", "name", "age", "status"]
        );
        assert_eq!(properties[1].column, "FullName");
        assert!(properties[0].primary && properties[0].identity);
        assert!(!properties[1].primary && !properties[1].identity);
        assert!(properties[2].nullable);
        assert!(!properties[0].nullable);
        assert_eq!(properties[0].value, Value::Int64(None));
        assert_eq!(properties[2].value, Value::Int32(None));
        assert!(properties[3].enumeration);
        assert_eq!(properties[3].value, Value::Varchar(None));
        assert_eq!(properties[3].type_id, TypeId::of::<Status>());
        assert_eq!(Tag::properties()[1].column, "type");
    }

    #[test]
    fn entity_property_values() {
        let options = GlobalConfigurationOptions::default();
        let mut customer = Customer {
            id: 1,
            name: "Ada".into(),
            age: None,
            status: Status::Closed,
            cached: Some("ignored".into()),
        };
        assert_eq!(customer.property_value(0), Value::Int64(Some(1)));
        assert_eq!(customer.property_value(2), Value::Int32(None));
        assert_eq!(customer.property_value(3), Value::Varchar(Some("Closed".into())));
        assert_eq!(customer.property_value(9), Value::Null);

        customer
            .set_property_value(0, Value::Int64(Some(42)), &options)
            .expect("Could not set the id");
        assert_eq!(customer.id, 42);
        customer
            .set_property_value(3, Value::Varchar(Some("Active".into())), &options)
            .expect("Could not set the status");
        assert_eq!(customer.status, Status::Active);

        let error = customer
            .set_property_value(0, Value::Int32(Some(7)), &options)
            .unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Conversion));
        let automatic = GlobalConfigurationOptions {
            conversion_type: ConversionType::Automatic,
            ..Default::default()
        };
        customer
            .set_property_value(0, Value::Int32(Some(7)), &automatic)
            .expect("Automatic conversion should widen the integer");
        assert_eq!(customer.id, 7);

        let error = customer
            .set_property_value(4, Value::Null, &options)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::PropertyNotFound { .. })
        ));
    }

    #[test]
    fn entity_from_row() {
        let stow = Stow::default();
        let properties = stow.properties::<Customer>();
        let row = customer_row(Value::Int64(Some(3)));
        let customer = Customer::from_row(&RowReader::new(&row, &properties, stow.options()))
            .expect("Could not read the row");
        assert_eq!(
            customer,
            Customer {
                id: 3,
                name: "Ada".into(),
                age: None,
                status: Status::Closed,
                cached: None,
            }
        );

        let row = customer_row(Value::Varchar(Some("3".into())));
        assert!(Customer::from_row(&RowReader::new(&row, &properties, stow.options())).is_err());
        let automatic = GlobalConfigurationOptions {
            conversion_type: ConversionType::Automatic,
            ..Default::default()
        };
        let customer = Customer::from_row(&RowReader::new(&row, &properties, &automatic))
            .expect("Text should convert into the id");
        assert_eq!(customer.id, 3);
    }

    #[test]
    fn entity_map() {
        let stow = Stow::default();
        assert_eq!(stow.table_name::<Customer>(), "[dbo].[People]");
        assert_eq!(stow.properties::<Customer>()[1].column, "FullName");

        EntityMap::<Customer>::new()
            .table("[crm].[Customer]")
            .column("name", "Name")
            .primary("name")
            .identity("age")
            .apply(stow.registry(), false)
            .expect("Could not map the customer");
        assert_eq!(stow.table_name::<Customer>(), "[crm].[Customer]");
        // Resolved properties are cached until flushed
        assert_eq!(stow.properties::<Customer>()[1].column, "FullName");
        stow.flush();
        let properties = stow.properties::<Customer>();
        assert_eq!(properties[1].column, "Name");
        assert!(properties[1].is_primary && !properties[0].is_primary);
        assert!(properties[2].is_identity && !properties[0].is_identity);

        let error = EntityMap::<Customer>::new()
            .table("Customers")
            .apply(stow.registry(), false)
            .unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Conflict));
        EntityMap::<Customer>::new()
            .table("Customers")
            .apply(stow.registry(), true)
            .expect("A forced mapping replaces the previous one");
        assert_eq!(stow.table_name::<Customer>(), "Customers");

        let error = EntityMap::<Customer>::new()
            .column("height", "Height")
            .apply(stow.registry(), false)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::PropertyNotFound { property, .. }) if property == "height"
        ));
    }

    #[test]
    fn entity_type_map() {
        let stow = Stow::default();
        stow.registry()
            .map_type::<String>("NVARCHAR(100)", false)
            .expect("Could not map String");
        let error = stow
            .registry()
            .map_type::<String>("TEXT", false)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::DuplicateTypeMap(..))
        ));
        let properties = stow.properties::<Customer>();
        assert_eq!(properties[1].db_type.as_deref(), Some("NVARCHAR(100)"));
        assert_eq!(properties[0].db_type, None);
        assert_eq!(properties[1].as_db_field().database_type.as_deref(), Some("NVARCHAR(100)"));
        assert_eq!(stow.properties::<Tag>()[0].db_type.as_deref(), Some("NVARCHAR(100)"));
    }

    #[test]
    fn entity_property_handler() {
        let stow = Stow::default();
        EntityMap::<Customer>::new()
            .handler("name", Shout)
            .apply(stow.registry(), false)
            .expect("Could not register the handler");
        let properties = stow.properties::<Customer>();
        assert!(properties[1].handler.is_some());
        assert!(properties[0].handler.is_none());
        let row = customer_row(Value::Int64(Some(1)));
        let customer = Customer::from_row(&RowReader::new(&row, &properties, stow.options()))
            .expect("Could not read the row");
        assert_eq!(customer.name, "ADA");
    }

    #[test]
    fn enum_handling() {
        let closed = Value::Varchar(Some("closed".into()));
        assert!(decode_enum::<Status>(&closed, EnumHandling::ThrowError).is_err());
        assert_eq!(
            decode_enum::<Status>(&closed, EnumHandling::Cast).unwrap(),
            Status::Closed
        );
        assert_eq!(
            decode_enum::<Status>(&Value::Varchar(Some("1".into())), EnumHandling::Cast).unwrap(),
            Status::Closed
        );
        assert_eq!(
            decode_enum::<Status>(&Value::Int32(Some(1)), EnumHandling::ThrowError).unwrap(),
            Status::Closed
        );
        assert_eq!(
            decode_enum::<Status>(&Value::Varchar(Some("Gone".into())), EnumHandling::UseDefault)
                .unwrap(),
            Status::Active
        );
        let error = decode_enum::<Status>(&Value::Int64(Some(9)), EnumHandling::Cast).unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Conversion));
        assert_eq!(Status::Closed.db_name(), "Closed");
    }
}
