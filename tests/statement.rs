#[cfg(test)]
mod tests {
    use indoc::indoc;
    use stow::{
        DbField, DbSetting, Field, KeyColumnReturnBehavior, OrderField, QueryField, QueryGroup,
        Result, StatementArgs, StatementBuilder, StowError, Value,
    };

    static ANSI_SETTING: DbSetting = DbSetting {
        name: "ansi",
        opening_quote: "\"",
        closing_quote: "\"",
        parameter_prefix: ":",
        schema_separator: ".",
        default_schema: None,
        is_use_upsert: true,
        is_multi_statement_executable: false,
        averageable_type: "NUMERIC",
    };

    /// Dialect that relies on every provided statement.
    struct Ansi;

    impl StatementBuilder for Ansi {
        fn db_setting(&self) -> &DbSetting {
            &ANSI_SETTING
        }

        fn identity_expression(&self, _identity: &DbField) -> String {
            "LASTVAL()".into()
        }
    }

    fn single_line(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn error_of(result: Result<String>) -> StowError {
        result
            .expect_err("The statement should not be created")
            .downcast::<StowError>()
            .expect("Expected a StowError")
    }

    #[test]
    fn ansi_query() {
        let fields = Field::from_names(["Id", "Name", "Age"]);
        let filter = QueryGroup::and([QueryField::new("Name", "Ada")]);
        let order = [OrderField::ascending("Name"), OrderField::descending("Age")];
        let args = StatementArgs::new("Person", &fields)
            .with_filter(Some(&filter))
            .with_order_by(&order)
            .with_top(Some(5))
            .with_hints(Some("NOLOCK"));
        assert_eq!(
            Ansi.create_query(&args).unwrap(),
            single_line(indoc! {r#"
                SELECT "Id", "Name", "Age" FROM "Person"
                WHERE ("Name" = :Name)
                ORDER BY "Name" ASC, "Age" DESC
                LIMIT 5 ;
            "#})
        );
        let args = StatementArgs::new("sales.Order", &fields);
        assert_eq!(
            Ansi.create_query_all(&args).unwrap(),
            r#"SELECT "Id", "Name", "Age" FROM "sales"."Order" ;"#
        );
        let args = StatementArgs::new("Person", &fields)
            .with_filter(Some(&filter))
            .with_order_by(&order[..1])
            .with_page(2, 25);
        assert_eq!(
            Ansi.create_batch_query(&args).unwrap(),
            r#"SELECT "Id", "Name", "Age" FROM "Person" WHERE ("Name" = :Name) ORDER BY "Name" ASC LIMIT 25 OFFSET 50 ;"#
        );
    }

    #[test]
    fn ansi_aggregates() {
        let fields = Field::from_names(["Age"]);
        let filter = QueryGroup::and([QueryField::with_operation(
            "Age",
            stow::Operation::GreaterThan,
            18,
        )
        .unwrap()]);
        let args = StatementArgs::new("Person", &fields).with_filter(Some(&filter));
        assert_eq!(
            Ansi.create_count_all(&args).unwrap(),
            r#"SELECT COUNT(*) AS "CountValue" FROM "Person" ;"#
        );
        assert_eq!(
            Ansi.create_average(&args).unwrap(),
            r#"SELECT AVG(CAST("Age" AS NUMERIC)) AS "AverageValue" FROM "Person" WHERE ("Age" > :Age) ;"#
        );
        assert_eq!(
            Ansi.create_sum_all(&args).unwrap(),
            r#"SELECT SUM("Age") AS "SumValue" FROM "Person" ;"#
        );
        assert_eq!(
            Ansi.create_exists(&args).unwrap(),
            r#"SELECT 1 AS "ExistsValue" FROM "Person" WHERE ("Age" > :Age) LIMIT 1 ;"#
        );
        let args = StatementArgs::new("Person", &[]);
        assert!(matches!(
            error_of(Ansi.create_min_all(&args)),
            StowError::EmptyArgument(..)
        ));
        assert!(Ansi.create_count_all(&args).is_ok());
    }

    #[test]
    fn ansi_insert() {
        let id = DbField::new("Id", Value::Int64(None)).primary().identity();
        let fields = Field::from_names(["Id", "Name"]);
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_identity(Some(&id));
        assert_eq!(
            Ansi.create_insert(&args).unwrap(),
            r#"INSERT INTO "Person" ( "Name" ) VALUES ( :Name ) ; SELECT LASTVAL() AS "Result" ;"#
        );

        let code = DbField::new("Code", Value::Varchar(None)).primary();
        let fields = Field::from_names(["Code", "Name"]);
        let args = StatementArgs::new("Tag", &fields).with_primary(Some(&code));
        assert_eq!(
            Ansi.create_insert(&args).unwrap(),
            r#"INSERT INTO "Tag" ( "Code", "Name" ) VALUES ( :Code, :Name ) ; SELECT :Code AS "Result" ;"#
        );
        let args = args.with_key_column_return_behavior(KeyColumnReturnBehavior::Identity);
        assert!(matches!(
            error_of(Ansi.create_insert(&args)),
            StowError::IdentityFieldNotFound(..)
        ));

        let serial = DbField::new("Id", Value::Int64(None)).identity();
        let fields = Field::from_names(["Id", "Code"]);
        let args = StatementArgs::new("Tag", &fields)
            .with_primary(Some(&code))
            .with_identity(Some(&serial));
        assert_eq!(
            Ansi.create_insert(&args).unwrap(),
            r#"INSERT INTO "Tag" ( "Code" ) VALUES ( :Code ) ; SELECT COALESCE(LASTVAL(), :Code) AS "Result" ;"#
        );
        let args = args.with_key_column_return_behavior(KeyColumnReturnBehavior::Primary);
        assert_eq!(
            Ansi.create_insert(&args).unwrap(),
            r#"INSERT INTO "Tag" ( "Code" ) VALUES ( :Code ) ; SELECT :Code AS "Result" ;"#
        );

        let fields = Field::from_names(["Id"]);
        let args = StatementArgs::new("Counter", &fields).with_identity(Some(&serial));
        assert_eq!(
            Ansi.create_insert(&args).unwrap(),
            r#"INSERT INTO "Counter" DEFAULT VALUES ; SELECT LASTVAL() AS "Result" ;"#
        );
    }

    #[test]
    fn ansi_update_and_delete() {
        let id = DbField::new("Id", Value::Int64(None)).primary();
        let fields = Field::from_names(["Id", "Name"]);
        let filter = QueryGroup::and([QueryField::new("Id", 7)]);
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_filter(Some(&filter));
        assert_eq!(
            Ansi.create_update(&args).unwrap(),
            r#"UPDATE "Person" SET "Name" = :Name WHERE ("Id" = :_Id) ;"#
        );
        assert_eq!(
            Ansi.create_delete(&args).unwrap(),
            r#"DELETE FROM "Person" WHERE ("Id" = :Id) ;"#
        );
        assert_eq!(
            Ansi.create_delete_all(&args).unwrap(),
            r#"DELETE FROM "Person" ;"#
        );
        assert_eq!(
            Ansi.create_truncate(&args).unwrap(),
            r#"TRUNCATE TABLE "Person" ;"#
        );
    }

    #[test]
    fn statement_errors() {
        let fields = Field::from_names(["Id", "Name"]);
        assert!(matches!(
            error_of(Ansi.create_query(&StatementArgs::new("Person", &[]))),
            StowError::EmptyArgument(..)
        ));
        assert!(matches!(
            error_of(Ansi.create_query(&StatementArgs::new("  ", &fields))),
            StowError::NullReference(..)
        ));

        let order = [OrderField::ascending("Age")];
        let args = StatementArgs::new("Person", &fields).with_order_by(&order);
        assert!(matches!(
            error_of(Ansi.create_query(&args)),
            StowError::InvalidOrderFields(..)
        ));
        let args = StatementArgs::new("Person", &fields).with_page(0, 10);
        assert!(matches!(
            error_of(Ansi.create_batch_query(&args)),
            StowError::InvalidOrderFields(..)
        ));
        let order = [OrderField::ascending("Id")];
        let args = StatementArgs::new("Person", &fields)
            .with_order_by(&order)
            .with_page(0, 0);
        assert!(matches!(
            error_of(Ansi.create_batch_query(&args)),
            StowError::InvalidOperation(..)
        ));

        let args = StatementArgs::new("Person", &fields);
        assert!(matches!(
            error_of(Ansi.create_update_all(&args)),
            StowError::MissingQualifierFields(..)
        ));
        assert!(matches!(
            error_of(Ansi.create_update(&args)),
            StowError::KeyFieldNotFound(..)
        ));
        let qualifiers = Field::from_names(["Missing"]);
        let args = StatementArgs::new("Person", &fields).with_qualifiers(&qualifiers);
        assert!(matches!(
            error_of(Ansi.create_update_all(&args)),
            StowError::InvalidQualifierFields(..)
        ));

        let code = DbField::new("Code", Value::Varchar(None)).primary();
        let id = DbField::new("Id", Value::Int64(None)).identity();
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&code))
            .with_identity(Some(&id));
        assert!(matches!(
            error_of(Ansi.create_update(&args)),
            StowError::InvalidOperation(..)
        ));
        assert!(matches!(
            error_of(Ansi.create_merge(&args)),
            StowError::InvalidOperation(..)
        ));

        let id = DbField::new("Id", Value::Int64(None)).primary();
        let only_key = Field::from_names(["Id"]);
        let args = StatementArgs::new("Person", &only_key).with_primary(Some(&id));
        assert!(matches!(
            error_of(Ansi.create_update(&args)),
            StowError::InvalidOperation(..)
        ));
    }
}
