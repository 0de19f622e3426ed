#[cfg(test)]
mod tests {
    use stow::{
        Conjunction, Function, Operation, Parameter, QueryField, QueryGroup, QueryNode, StowError,
        Value,
    };
    use stow_postgres::POSTGRES_SETTING;
    use stow_sqlite::SQLITE_SETTING;

    fn names(parameters: &[Parameter]) -> Vec<&str> {
        parameters.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn group_and() {
        let group = QueryGroup::and([QueryField::new("Name", "Ada"), QueryField::new("Age", 30)]);
        let (text, parameters) = group.render(&SQLITE_SETTING, "", None);
        assert_eq!(text, "([Name] = @Name AND [Age] = @Age)");
        assert_eq!(
            parameters,
            vec![
                Parameter::new("Name", Value::Varchar(Some("Ada".into()))),
                Parameter::new("Age", Value::Int32(Some(30))),
            ]
        );
        assert_eq!(group.fields().len(), 2);
    }

    #[test]
    fn group_repeated_names() {
        let group = QueryGroup::or([
            QueryField::new("Age", 1),
            QueryField::new("Age", 2),
            QueryField::new("age", 3),
        ]);
        let (text, parameters) = group.render(&SQLITE_SETTING, "", None);
        assert_eq!(text, "([Age] = @Age OR [Age] = @Age_1 OR [age] = @age_2)");
        assert_eq!(names(&parameters), ["Age", "Age_1", "age_2"]);
    }

    #[test]
    fn group_nested_not() {
        let mut group = QueryGroup::new(Conjunction::And);
        group
            .push(QueryField::new("Name", "Ada"))
            .push(QueryGroup::or([QueryField::new("Age", 1), QueryField::new("Age", 2)]).not());
        assert_eq!(
            group.get_string(&SQLITE_SETTING),
            "([Name] = @Name AND NOT ([Age] = @Age OR [Age] = @Age_1))"
        );
        assert_eq!(
            group.clone().not().not().get_string(&SQLITE_SETTING),
            group.get_string(&SQLITE_SETTING)
        );
    }

    #[test]
    fn group_empty() {
        let group = QueryGroup::and([QueryGroup::or(Vec::<QueryNode>::new())]);
        assert!(group.is_empty());
        assert_eq!(group.get_string(&SQLITE_SETTING), "");
        let group = QueryGroup::and([QueryNode::from(QueryGroup::default()), QueryField::new("Id", 1).into()]);
        assert!(!group.is_empty());
        assert_eq!(group.get_string(&SQLITE_SETTING), "([Id] = @Id)");
    }

    #[test]
    fn group_null() {
        let group = QueryGroup::and([
            QueryField::new("Name", Value::Null),
            QueryField::new("Age", Value::Int32(None)).negate(),
        ]);
        let (text, parameters) = group.render(&SQLITE_SETTING, "", None);
        assert_eq!(text, "([Name] IS NULL AND [Age] IS NOT NULL)");
        assert!(parameters.is_empty());
    }

    #[test]
    fn group_in() {
        let group = QueryGroup::and([QueryField::is_in("Age", [21, 35, 40])]);
        let (text, parameters) = group.render(&SQLITE_SETTING, "", None);
        assert_eq!(text, "([Age] IN (@Age_In_0, @Age_In_1, @Age_In_2))");
        assert_eq!(names(&parameters), ["Age_In_0", "Age_In_1", "Age_In_2"]);
        assert_eq!(parameters[2].value, Value::Int32(Some(40)));

        let group = QueryGroup::and([QueryField::is_in("Age", Vec::<i32>::new())]);
        assert_eq!(group.get_string(&SQLITE_SETTING), "(1 = 0)");
        let group = QueryGroup::and([QueryField::is_in("Age", Vec::<i32>::new()).negate()]);
        assert_eq!(group.get_string(&SQLITE_SETTING), "(1 = 1)");
    }

    #[test]
    fn group_between() {
        let group = QueryGroup::and([
            QueryField::between("Age", 18, 65),
            QueryField::between("Age", 70, 80).negate(),
        ]);
        let (text, parameters) = group.render(&SQLITE_SETTING, "", None);
        assert_eq!(
            text,
            "([Age] BETWEEN @Age_Left AND @Age_Right AND [Age] NOT BETWEEN @Age_1_Left AND @Age_1_Right)"
        );
        assert_eq!(
            names(&parameters),
            ["Age_Left", "Age_Right", "Age_1_Left", "Age_1_Right"]
        );
    }

    #[test]
    fn group_prefix_and_row() {
        let group = QueryGroup::and([QueryField::new("Id", 7), QueryField::new("Id", 8)]);
        let (text, parameters) = group.render(&SQLITE_SETTING, "_", Some(2));
        assert_eq!(text, "([Id] = @_Id_2 AND [Id] = @_Id_1_2)");
        assert_eq!(names(&parameters), ["_Id_2", "_Id_1_2"]);
    }

    #[test]
    fn group_suffix_collisions() {
        let group = QueryGroup::and([
            QueryField::new("Id", 1),
            QueryField::new("Id", 2),
            QueryField::new("Id_1", 3),
        ]);
        let (text, parameters) = group.render(&SQLITE_SETTING, "", None);
        assert_eq!(text, "([Id] = @Id AND [Id] = @Id_2 AND [Id_1] = @Id_1)");
        assert_eq!(
            parameters,
            vec![
                Parameter::new("Id", Value::Int32(Some(1))),
                Parameter::new("Id_2", Value::Int32(Some(2))),
                Parameter::new("Id_1", Value::Int32(Some(3))),
            ]
        );

        let group = QueryGroup::and([
            QueryField::is_in("Id", [1, 2]),
            QueryField::new("Id_In_0", 5),
        ]);
        let (text, parameters) = group.render(&SQLITE_SETTING, "", None);
        assert_eq!(
            text,
            "([Id] IN (@Id_1_In_0, @Id_1_In_1) AND [Id_In_0] = @Id_In_0)"
        );
        assert_eq!(names(&parameters), ["Id_1_In_0", "Id_1_In_1", "Id_In_0"]);

        let group = QueryGroup::and([
            QueryField::new("First Name", "Ada"),
            QueryField::new("First_Name", "Bob"),
            QueryField::between("Age", 1, 2),
            QueryField::new("Age_Left", 9),
        ]);
        let (text, parameters) = group.render(&SQLITE_SETTING, "_", Some(0));
        assert_eq!(
            text,
            "([First Name] = @_First_Name_0 AND [First_Name] = @_First_Name_1_0 AND [Age] BETWEEN @_Age_1_Left_0 AND @_Age_1_Right_0 AND [Age_Left] = @_Age_Left_0)"
        );
        let mut unique = names(&parameters);
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), parameters.len());
    }

    #[test]
    fn group_function_and_quoting() {
        let group = QueryGroup::and([
            QueryField::new("Name", "ADA").with_function(Function::Upper),
            QueryField::with_operation("First Name", Operation::Like, "A%").unwrap(),
        ]);
        assert_eq!(
            group.get_string(&POSTGRES_SETTING),
            r#"(UPPER("Name") = @Name AND "First Name" LIKE @First_Name)"#
        );
    }

    #[test]
    fn field_operation_shape() {
        let error = QueryField::with_operation("Age", Operation::In, 5).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::InvalidOperation(..))
        ));
        assert!(QueryField::with_operation("Age", Operation::Between, 5).is_err());
        assert!(QueryField::with_operation("Age", Operation::GreaterThan, 5).is_ok());
    }

    #[test]
    fn operation_text() {
        assert_eq!("<=".parse::<Operation>().unwrap(), Operation::LessThanOrEqual);
        assert_eq!("NotIn".parse::<Operation>().unwrap(), Operation::NotIn);
        assert_eq!(" like ".parse::<Operation>().unwrap(), Operation::Like);
        assert!("contains".parse::<Operation>().is_err());
        assert_eq!(Operation::LessThan.flip(), Operation::GreaterThan);
        assert_eq!(Operation::Equal.flip(), Operation::Equal);
        assert_eq!("||".parse::<Conjunction>().unwrap(), Conjunction::Or);
        assert_eq!("AND".parse::<Conjunction>().unwrap(), Conjunction::And);
        assert!("xor".parse::<Conjunction>().is_err());
    }
}
