#[cfg(test)]
mod tests {
    use indoc::indoc;
    use std::sync::Arc;
    use stow::{
        DbField, DbHelper, Field, OrderField, QueryField, QueryGroup, RowLabeled, StatementArgs,
        StatementBuilder, Value,
    };
    use stow_mssql::{MSSQL_SETTING, MssqlDbHelper, MssqlDriver, MssqlStatementBuilder};
    use stow_tests::{execute_tests, init_logs};

    fn builder() -> MssqlStatementBuilder {
        MssqlStatementBuilder::new(Arc::new(MSSQL_SETTING.clone()))
    }

    fn single_line(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn query() {
        let fields = Field::from_names(["Id", "Name", "Age"]);
        let filter = QueryGroup::and([QueryField::new("Name", "Ada")]);
        let order = [OrderField::ascending("Name")];
        let args = StatementArgs::new("Person", &fields)
            .with_filter(Some(&filter))
            .with_order_by(&order)
            .with_top(Some(10))
            .with_hints(Some("NOLOCK"));
        assert_eq!(
            builder().create_query(&args).expect("Failed to create the query"),
            "SELECT TOP (10) [Id], [Name], [Age] FROM [Person] WITH (NOLOCK) WHERE ([Name] = @Name) ORDER BY [Name] ASC ;"
        );
        let order = [OrderField::descending("Age")];
        let args = StatementArgs::new("Person", &fields)
            .with_order_by(&order)
            .with_page(2, 10);
        assert_eq!(
            builder()
                .create_batch_query(&args)
                .expect("Failed to create the batch query"),
            "SELECT [Id], [Name], [Age] FROM [Person] ORDER BY [Age] DESC OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY ;"
        );
        let args = StatementArgs::new("Person", &fields).with_filter(Some(&filter));
        assert_eq!(
            builder().create_exists(&args).expect("Failed to create the exists"),
            "SELECT TOP (1) 1 AS [ExistsValue] FROM [Person] WHERE ([Name] = @Name) ;"
        );
    }

    #[test]
    fn insert() {
        let fields = Field::from_names(["Id", "Name", "Age"]);
        let mut id = DbField::new("Id", Value::Int32(None)).primary().identity();
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_identity(Some(&id));
        assert_eq!(
            builder().create_insert(&args).expect("Failed to create the insert"),
            "INSERT INTO [Person] ( [Name], [Age] ) VALUES ( @Name, @Age ) ; SELECT CONVERT(BIGINT, SCOPE_IDENTITY()) AS [Result] ;"
        );
        id.database_type = Some("int".into());
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_identity(Some(&id))
            .with_batch_size(2);
        assert_eq!(
            builder()
                .create_insert_all(&args)
                .expect("Failed to create the batch insert"),
            single_line(indoc! {"
                INSERT INTO [Person] ( [Name], [Age] ) VALUES ( @Name_0, @Age_0 ) ;
                SELECT CONVERT(INT, SCOPE_IDENTITY()) AS [Result], 0 AS [OrderColumn] ;
                INSERT INTO [Person] ( [Name], [Age] ) VALUES ( @Name_1, @Age_1 ) ;
                SELECT CONVERT(INT, SCOPE_IDENTITY()) AS [Result], 1 AS [OrderColumn] ;
            "})
        );
    }

    #[test]
    fn merge() {
        let fields = Field::from_names(["Id", "Name", "Age"]);
        let id = DbField::new("Id", Value::Int64(None)).primary().identity();
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_identity(Some(&id))
            .with_hints(Some("WITH (HOLDLOCK)"));
        assert_eq!(
            builder().create_merge(&args).expect("Failed to create the merge"),
            single_line(indoc! {"
                MERGE [Person] WITH (HOLDLOCK) AS T
                USING ( SELECT @Id AS [Id], @Name AS [Name], @Age AS [Age] ) AS S
                ON (S.[Id] = T.[Id])
                WHEN NOT MATCHED THEN INSERT ( [Name], [Age] ) VALUES ( S.[Name], S.[Age] )
                WHEN MATCHED THEN UPDATE SET T.[Name] = S.[Name], T.[Age] = S.[Age]
                OUTPUT INSERTED.[Id] AS [Result] ;
            "})
        );
        let qualifiers = [Field::new("Name")];
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_identity(Some(&id))
            .with_qualifiers(&qualifiers)
            .with_batch_size(2);
        let sql = builder()
            .create_merge_all(&args)
            .expect("Failed to create the batch merge");
        assert!(sql.contains("ON (S.[Name] = T.[Name])"));
        assert!(sql.contains("SELECT @Id_1 AS [Id], @Name_1 AS [Name], @Age_1 AS [Age]"));
        assert!(sql.ends_with("OUTPUT INSERTED.[Id] AS [Result], 1 AS [OrderColumn] ;"));
        assert_eq!(sql.matches("MERGE [Person]").count(), 2);
    }

    #[test]
    fn truncate_and_aggregates() {
        let args = StatementArgs::new("dbo.Person", &[]);
        assert_eq!(
            builder().create_truncate(&args).expect("Failed to create the truncate"),
            "TRUNCATE TABLE [dbo].[Person] ;"
        );
        let fields = [Field::new("Age")];
        let filter = QueryGroup::and([QueryField::new("Name", "Ada")]);
        let args = StatementArgs::new("Person", &fields).with_filter(Some(&filter));
        assert_eq!(
            builder().create_count_all(&args).expect("Failed to create the count"),
            "SELECT COUNT_BIG(1) AS [CountValue] FROM [Person] ;"
        );
        assert_eq!(
            builder().create_average(&args).expect("Failed to create the average"),
            "SELECT AVG(CONVERT(FLOAT, [Age])) AS [AverageValue] FROM [Person] WHERE ([Name] = @Name) ;"
        );
        assert_eq!(
            builder().create_sum_all(&args).expect("Failed to create the sum"),
            "SELECT SUM([Age]) AS [SumValue] FROM [Person] ;"
        );
    }

    #[test]
    fn catalog() {
        let helper = MssqlDbHelper;
        let command = helper.fields_command(&MSSQL_SETTING, "Person");
        assert!(command.text.contains("INFORMATION_SCHEMA.COLUMNS"));
        assert_eq!(
            command.parameter("Schema"),
            Some(&Value::Varchar(Some("dbo".into())))
        );
        assert_eq!(
            command.parameter("TableName"),
            Some(&Value::Varchar(Some("Person".into())))
        );
        let command = helper.fields_command(&MSSQL_SETTING, "[sales].[Order]");
        assert_eq!(
            command.parameter("Schema"),
            Some(&Value::Varchar(Some("sales".into())))
        );
        let row = RowLabeled::new(
            [
                "ColumnName",
                "IsPrimary",
                "IsIdentity",
                "IsNullable",
                "DataType",
                "Size",
                "Precision",
                "Scale",
                "HasDefaultValue",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            vec![
                Value::Varchar(Some("Id".into())),
                Value::Boolean(Some(true)),
                Value::Boolean(Some(true)),
                Value::Boolean(Some(false)),
                Value::Varchar(Some("bigint".into())),
                Value::Null,
                Value::UInt8(Some(19)),
                Value::Int32(Some(0)),
                Value::Boolean(Some(false)),
            ]
            .into(),
        );
        let field = helper.read_field(&row).expect("Failed to read the field");
        assert_eq!(field.name, "Id");
        assert!(field.is_primary && field.is_identity && !field.is_nullable);
        assert_eq!(field.value, Value::Int64(None));
        assert_eq!(field.precision, Some(19));
        assert_eq!(field.size, None);
        assert_eq!(field.database_type.as_deref(), Some("bigint"));
        assert_eq!(helper.resolve_type("datetime2"), Value::Timestamp(None));
        assert_eq!(helper.resolve_type("nvarchar"), Value::Varchar(None));
    }

    #[tokio::test]
    async fn mssql() {
        init_logs();
        execute_tests::<MssqlDriver>().await;
    }
}
