#[cfg(test)]
mod tests {
    use serde_json::json;
    use stow::{Conjunction, Filter, Operation, QueryGroup, StowError, Value};
    use stow_mssql::MSSQL_SETTING;

    fn error_of(result: stow::Result<QueryGroup>) -> StowError {
        result
            .expect_err("The filter should be rejected")
            .downcast::<StowError>()
            .expect("Expected a StowError")
    }

    #[test]
    fn filter_list() {
        let group = QueryGroup::parse([
            ("Name", Filter::from("Ada")),
            ("Age", Filter::op(Operation::GreaterThan, 30)),
            ("Id", Filter::is_in([1, 2])),
            (
                "either",
                Filter::group(
                    Conjunction::Or,
                    [
                        ("Age", Filter::between(1, 5)),
                        ("Name", Filter::from(Value::Null)),
                    ],
                ),
            ),
        ])
        .expect("Could not parse the filter");
        let (text, parameters) = group.render(&MSSQL_SETTING, "", None);
        assert_eq!(
            text,
            "([Name] = @Name AND [Age] > @Age AND [Id] IN (@Id_In_0, @Id_In_1) AND ([Age] BETWEEN @Age_1_Left AND @Age_1_Right OR [Name] IS NULL))"
        );
        assert_eq!(parameters.len(), 6);
        assert_eq!(parameters[1].value, Value::Int32(Some(30)));

        let group = QueryGroup::parse_with(
            Conjunction::Or,
            [("Name", Filter::op(Operation::Like, "A%")), ("Name", Filter::op(Operation::Like, "B%"))],
        )
        .unwrap();
        assert_eq!(
            group.get_string(&MSSQL_SETTING),
            "([Name] LIKE @Name OR [Name] LIKE @Name_1)"
        );
    }

    #[test]
    fn filter_list_errors() {
        assert!(matches!(
            error_of(QueryGroup::parse([(" ", Filter::from(1))])),
            StowError::NullReference(..)
        ));
        assert!(matches!(
            error_of(QueryGroup::parse([("Age", Filter::op(Operation::In, 5))])),
            StowError::InvalidOperation(..)
        ));
    }

    #[test]
    fn filter_json() {
        let source = json!({
            "Name": "Ada",
            "Age": { "Operation": "GreaterThan", "Value": 30 },
            "Id": { "operation": "in", "value": [1, 2, 3] },
            "Range": {
                "Conjunction": "or",
                "Age": { "Operation": "Between", "Value": [1, 5] },
                "Deleted": null
            }
        });
        let group = QueryGroup::parse_json(&source).expect("Could not parse the filter");
        let (text, parameters) = group.render(&MSSQL_SETTING, "", None);
        assert_eq!(
            text,
            "([Name] = @Name AND [Age] > @Age AND [Id] IN (@Id_In_0, @Id_In_1, @Id_In_2) AND ([Age] BETWEEN @Age_1_Left AND @Age_1_Right OR [Deleted] IS NULL))"
        );
        assert_eq!(parameters[0].value, Value::Varchar(Some("Ada".into())));
        assert_eq!(parameters[1].value, Value::Int64(Some(30)));

        let group = QueryGroup::parse_json(&json!({
            "Conjunction": "Or",
            "Active": true,
            "Score": { "Operation": "<=", "Value": 2.5 },
            "Tag": { "Operation": "NotIn", "Value": "x" }
        }))
        .unwrap();
        assert_eq!(group.conjunction, Conjunction::Or);
        let (text, parameters) = group.render(&MSSQL_SETTING, "", None);
        assert_eq!(
            text,
            "([Active] = @Active OR [Score] <= @Score OR [Tag] NOT IN (@Tag_In_0))"
        );
        assert_eq!(parameters[0].value, Value::Boolean(Some(true)));
        assert_eq!(parameters[1].value, Value::Float64(Some(2.5)));

        assert!(QueryGroup::parse_json(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn filter_json_errors() {
        assert!(matches!(
            error_of(QueryGroup::parse_json(&json!(null))),
            StowError::NullReference(..)
        ));
        assert!(matches!(
            error_of(QueryGroup::parse_json(&json!([1, 2]))),
            StowError::InvalidExpression(..)
        ));
        assert!(matches!(
            error_of(QueryGroup::parse_json(&json!({ "Age": { "Operation": "Between", "Value": 3 } }))),
            StowError::InvalidOperation(..)
        ));
        assert!(matches!(
            error_of(QueryGroup::parse_json(&json!({ "Age": { "Operation": 5, "Value": 3 } }))),
            StowError::InvalidOperation(..)
        ));
        assert!(matches!(
            error_of(QueryGroup::parse_json(&json!({ "Age": { "Operation": "Around", "Value": 3 } }))),
            StowError::InvalidOperation(..)
        ));
        assert!(matches!(
            error_of(QueryGroup::parse_json(&json!({ "Name": { "First": "Ada" } }))),
            StowError::InvalidExpression(..)
        ));
        assert!(matches!(
            error_of(QueryGroup::parse_json(&json!({ "Conjunction": "xor", "Id": 1 }))),
            StowError::InvalidOperation(..)
        ));
    }
}
