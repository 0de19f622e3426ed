#[cfg(test)]
mod tests {
    use indoc::indoc;
    use std::sync::Arc;
    use stow::{
        DbField, DbHelper, Field, OrderField, QueryField, QueryGroup, StatementArgs,
        StatementBuilder, StowError, Value,
    };
    use stow_postgres::{
        POSTGRES_SETTING, PostgresDbHelper, PostgresDriver, PostgresStatementBuilder,
    };
    use stow_tests::{execute_tests, init_logs};

    fn builder() -> PostgresStatementBuilder {
        PostgresStatementBuilder::new(Arc::new(POSTGRES_SETTING.clone()))
    }

    fn single_line(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn query() {
        let fields = Field::from_names(["Id", "Name", "Age"]);
        let filter = QueryGroup::and([
            QueryField::new("Name", "Ada"),
            QueryField::new("Name", "Grace"),
        ]);
        let order = [OrderField::ascending("Name")];
        let args = StatementArgs::new("Person", &fields)
            .with_filter(Some(&filter))
            .with_order_by(&order)
            .with_top(Some(10));
        assert_eq!(
            builder().create_query(&args).expect("Failed to create the query"),
            r#"SELECT "Id", "Name", "Age" FROM "Person" WHERE ("Name" = @Name AND "Name" = @Name_1) ORDER BY "Name" ASC LIMIT 10 ;"#
        );
        let order = [OrderField::descending("Age")];
        let args = StatementArgs::new("Person", &fields)
            .with_order_by(&order)
            .with_page(0, 5);
        assert_eq!(
            builder()
                .create_batch_query(&args)
                .expect("Failed to create the batch query"),
            r#"SELECT "Id", "Name", "Age" FROM "Person" ORDER BY "Age" DESC LIMIT 5 OFFSET 0 ;"#
        );
        let args = StatementArgs::new("Person", &fields).with_page(0, 5);
        let error = builder()
            .create_batch_query(&args)
            .expect_err("A batch query without order must fail");
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::InvalidOrderFields(..))
        ));
    }

    #[test]
    fn insert() {
        let fields = Field::from_names(["Id", "Name", "Age"]);
        let id = DbField::new("Id", Value::Int64(None)).primary().identity();
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_identity(Some(&id));
        assert_eq!(
            builder().create_insert(&args).expect("Failed to create the insert"),
            r#"INSERT INTO "Person" ( "Name", "Age" ) VALUES ( @Name, @Age ) RETURNING "Id" AS "Result" ;"#
        );
        assert_eq!(
            builder()
                .create_insert_all(&args.with_batch_size(2))
                .expect("Failed to create the batch insert"),
            single_line(indoc! {r#"
                INSERT INTO "Person" ( "Name", "Age" ) VALUES ( @Name_0, @Age_0 )
                RETURNING "Id" AS "Result", 0 AS "OrderColumn" ;
                INSERT INTO "Person" ( "Name", "Age" ) VALUES ( @Name_1, @Age_1 )
                RETURNING "Id" AS "Result", 1 AS "OrderColumn" ;
            "#})
        );
    }

    #[test]
    fn merge() {
        let fields = Field::from_names(["Id", "Name", "Age"]);
        let id = DbField::new("Id", Value::Int64(None)).primary().identity();
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_identity(Some(&id));
        assert_eq!(
            builder().create_merge(&args).expect("Failed to create the merge"),
            single_line(indoc! {r#"
                INSERT INTO "Person" ( "Id", "Name", "Age" ) VALUES ( @Id, @Name, @Age )
                ON CONFLICT ( "Id" ) DO UPDATE SET "Name" = EXCLUDED."Name", "Age" = EXCLUDED."Age"
                RETURNING "Id" AS "Result" ;
            "#})
        );
        let qualifiers = [Field::new("Name")];
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_identity(Some(&id))
            .with_qualifiers(&qualifiers);
        assert_eq!(
            builder().create_merge(&args).expect("Failed to create the merge"),
            single_line(indoc! {r#"
                INSERT INTO "Person" ( "Name", "Age" ) VALUES ( @Name, @Age )
                ON CONFLICT ( "Name" ) DO UPDATE SET "Age" = EXCLUDED."Age"
                RETURNING "Id" AS "Result" ;
            "#})
        );
        let fields = Field::from_names(["Code"]);
        let code = DbField::new("Code", Value::Varchar(None)).primary();
        let args = StatementArgs::new("Country", &fields).with_primary(Some(&code));
        assert_eq!(
            builder().create_merge(&args).expect("Failed to create the merge"),
            r#"INSERT INTO "Country" ( "Code" ) VALUES ( @Code ) ON CONFLICT ( "Code" ) DO UPDATE SET "Code" = EXCLUDED."Code" RETURNING "Code" AS "Result" ;"#
        );
    }

    #[test]
    fn truncate_and_aggregates() {
        let args = StatementArgs::new("public.Person", &[]);
        assert_eq!(
            builder().create_truncate(&args).expect("Failed to create the truncate"),
            r#"TRUNCATE TABLE "public"."Person" ;"#
        );
        let fields = [Field::new("Age")];
        let args = StatementArgs::new("Person", &fields);
        assert_eq!(
            builder().create_average_all(&args).expect("Failed to create the average"),
            r#"SELECT AVG(CAST("Age" AS DOUBLE PRECISION)) AS "AverageValue" FROM "Person" ;"#
        );
        let args = StatementArgs::new("Person", &[]);
        let error = builder()
            .create_min_all(&args)
            .expect_err("A min without a field must fail");
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::EmptyArgument(..))
        ));
    }

    #[test]
    fn catalog() {
        let helper = PostgresDbHelper;
        let command = helper.fields_command(&POSTGRES_SETTING, "Person");
        assert!(command.text.contains("information_schema.columns"));
        assert_eq!(
            command.parameter("Schema"),
            Some(&Value::Varchar(Some("public".into())))
        );
        assert_eq!(helper.resolve_type("timestamp with time zone"), Value::TimestampWithTimezone(None));
        assert_eq!(helper.resolve_type("bigserial"), Value::Int64(None));
        assert_eq!(helper.resolve_type("jsonb"), Value::Varchar(None));
    }

    #[tokio::test]
    async fn postgres() {
        init_logs();
        execute_tests::<PostgresDriver>().await;
    }
}
