#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use stow::{AsValue, ConversionType, StowError, Value, convert_value};
    use time::{
        Time,
        macros::{date, datetime},
    };
    use uuid::Uuid;

    #[test]
    fn value_native() {
        assert_eq!(42_i32.as_value(), Value::Int32(Some(42)));
        assert_eq!(true.as_value(), Value::Boolean(Some(true)));
        assert_eq!(String::from("Ada").as_value(), Value::Varchar(Some("Ada".into())));
        assert_eq!(None::<i64>.as_value(), Value::Int64(None));
        assert_eq!(Some(1.5_f64).as_value(), Value::Float64(Some(1.5)));
        assert_eq!(<Option<u8> as AsValue>::as_empty_value(), Value::UInt8(None));
        assert!(<Option<u8> as AsValue>::is_nullable());
        assert!(!<u8 as AsValue>::is_nullable());
        assert_eq!(Value::from("text"), Value::Varchar(Some("text".into())));

        let n: i16 = AsValue::try_from_value(Value::Int16(Some(-3))).unwrap();
        assert_eq!(n, -3);
        let n: Option<i16> = AsValue::try_from_value(Value::Null).unwrap();
        assert_eq!(n, None);
        let error = i16::try_from_value(Value::Int32(Some(3))).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::Conversion(..))
        ));
    }

    #[test]
    fn value_convert_numbers() {
        assert_eq!(
            Value::Int64(Some(100)).convert_to(&Value::Int8(None)).unwrap(),
            Value::Int8(Some(100))
        );
        assert!(Value::Int64(Some(300)).convert_to(&Value::Int8(None)).is_err());
        assert!(Value::Int32(Some(-1)).convert_to(&Value::UInt32(None)).is_err());
        assert_eq!(
            Value::Float64(Some(2.0)).convert_to(&Value::Int32(None)).unwrap(),
            Value::Int32(Some(2))
        );
        assert!(Value::Float64(Some(2.5)).convert_to(&Value::Int32(None)).is_err());
        assert_eq!(
            Value::Varchar(Some(" 12 ".into())).convert_to(&Value::Int64(None)).unwrap(),
            Value::Int64(Some(12))
        );
        assert_eq!(
            Value::Varchar(Some("12.50".into())).convert_to(&Value::Decimal(None)).unwrap(),
            Value::Decimal(Some(Decimal::from_str("12.50").unwrap()))
        );
        assert_eq!(
            Value::Int32(Some(3)).convert_to(&Value::Float64(None)).unwrap(),
            Value::Float64(Some(3.0))
        );
        assert_eq!(
            Value::Int32(Some(5)).convert_to(&Value::Varchar(None)).unwrap(),
            Value::Varchar(Some("5".into()))
        );
        assert_eq!(
            Value::Null.convert_to(&Value::Int32(None)).unwrap(),
            Value::Int32(None)
        );
        assert_eq!(
            Value::Int16(Some(7)).convert_to(&Value::Null).unwrap(),
            Value::Int16(Some(7))
        );
    }

    #[test]
    fn value_convert_other() {
        assert_eq!(
            Value::Varchar(Some("Yes".into())).convert_to(&Value::Boolean(None)).unwrap(),
            Value::Boolean(Some(true))
        );
        assert_eq!(
            Value::Int64(Some(0)).convert_to(&Value::Boolean(None)).unwrap(),
            Value::Boolean(Some(false))
        );
        assert!(Value::Varchar(Some("maybe".into())).convert_to(&Value::Boolean(None)).is_err());
        assert_eq!(
            Value::Varchar(Some("2024-03-01".into())).convert_to(&Value::Date(None)).unwrap(),
            Value::Date(Some(date!(2024 - 03 - 01)))
        );
        assert_eq!(
            Value::Timestamp(Some(datetime!(2024-03-01 10:30:00)))
                .convert_to(&Value::Date(None))
                .unwrap(),
            Value::Date(Some(date!(2024 - 03 - 01)))
        );
        assert_eq!(
            Value::Varchar(Some("2024-03-01 10:30:00".into()))
                .convert_to(&Value::Timestamp(None))
                .unwrap(),
            Value::Timestamp(Some(datetime!(2024-03-01 10:30:00)))
        );
        assert_eq!(
            Value::Timestamp(Some(datetime!(2024-03-01 10:30:00)))
                .convert_to(&Value::Time(None))
                .unwrap(),
            Value::Time(Some(Time::from_hms(10, 30, 0).unwrap()))
        );
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            Value::Varchar(Some(uuid.to_string())).convert_to(&Value::Uuid(None)).unwrap(),
            Value::Uuid(Some(uuid))
        );
        assert_eq!(
            Value::Blob(Some(uuid.as_bytes().to_vec().into()))
                .convert_to(&Value::Uuid(None))
                .unwrap(),
            Value::Uuid(Some(uuid))
        );
    }

    #[test]
    fn value_convert_typed() {
        let n: i64 = convert_value(Value::Int32(Some(9)), ConversionType::Automatic).unwrap();
        assert_eq!(n, 9);
        assert!(convert_value::<i64>(Value::Int32(Some(9)), ConversionType::Default).is_err());
        assert!(convert_value::<i32>(Value::Null, ConversionType::Automatic).is_err());
        assert_eq!(
            convert_value::<Option<i32>>(Value::Null, ConversionType::Default).unwrap(),
            None
        );
        assert_eq!(
            convert_value::<Option<String>>(Value::Int64(Some(4)), ConversionType::Automatic)
                .unwrap(),
            Some("4".to_string())
        );
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Varchar(None).to_string(), "NULL");
        assert_eq!(Value::Int32(Some(-8)).to_string(), "-8");
        assert_eq!(Value::Blob(Some(vec![10, 255].into())).to_string(), "0x0AFF");
        assert_eq!(Value::Varchar(Some("Ada".into())).to_string(), "Ada");
        assert_eq!(Value::Int32(Some(1)).type_name(), "Int32");
    }
}
