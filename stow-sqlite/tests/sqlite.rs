#[cfg(test)]
mod tests {
    use indoc::indoc;
    use std::sync::Arc;
    use stow::{
        DbField, DbHelper, Field, OrderField, QueryField, QueryGroup, RowLabeled,
        StatementArgs, StatementBuilder, Value,
    };
    use stow_sqlite::{SQLITE_SETTING, SqliteDbHelper, SqliteDriver, SqliteStatementBuilder};
    use stow_tests::{MockConnection, execute_tests, init_logs, row};

    fn builder() -> SqliteStatementBuilder {
        SqliteStatementBuilder::new(Arc::new(SQLITE_SETTING.clone()))
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
            "SELECT [Id], [Name], [Age] FROM [Person] WHERE ([Name] = @Name) ORDER BY [Name] ASC LIMIT 10 ;"
        );
        let args = StatementArgs::new("Person", &fields).with_order_by(&order);
        assert_eq!(
            builder()
                .create_batch_query(&args.with_page(2, 10))
                .expect("Failed to create the batch query"),
            "SELECT [Id], [Name], [Age] FROM [Person] ORDER BY [Name] ASC LIMIT 10 OFFSET 20 ;"
        );
        let args = StatementArgs::new("Person", &fields).with_filter(Some(&filter));
        assert_eq!(
            builder().create_exists(&args).expect("Failed to create the exists"),
            "SELECT 1 AS [ExistsValue] FROM [Person] WHERE ([Name] = @Name) LIMIT 1 ;"
        );
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
            "INSERT INTO [Person] ( [Name], [Age] ) VALUES ( @Name, @Age ) ; SELECT CAST(last_insert_rowid() AS INT) AS [Result] ;"
        );
        assert_eq!(
            builder()
                .create_insert_all(&args.clone().with_batch_size(2))
                .expect("Failed to create the batch insert"),
            single_line(indoc! {"
                INSERT INTO [Person] ( [Name], [Age] ) VALUES ( @Name_0, @Age_0 ) ;
                SELECT CAST(last_insert_rowid() AS INT) AS [Result], 0 AS [OrderColumn] ;
                INSERT INTO [Person] ( [Name], [Age] ) VALUES ( @Name_1, @Age_1 ) ;
                SELECT CAST(last_insert_rowid() AS INT) AS [Result], 1 AS [OrderColumn] ;
            "})
        );
    }

    #[test]
    fn update_and_merge() {
        let fields = Field::from_names(["Id", "Name", "Age"]);
        let id = DbField::new("Id", Value::Int64(None)).primary().identity();
        let args = StatementArgs::new("Person", &fields)
            .with_primary(Some(&id))
            .with_identity(Some(&id));
        assert_eq!(
            builder().create_update(&args).expect("Failed to create the update"),
            "UPDATE [Person] SET [Name] = @Name, [Age] = @Age WHERE ([Id] = @Id) ;"
        );
        assert_eq!(
            builder().create_merge(&args).expect("Failed to create the merge"),
            single_line(indoc! {"
                UPDATE [Person] SET [Name] = @Name, [Age] = @Age WHERE ([Id] = @Id) ;
                INSERT INTO [Person] ( [Name], [Age] ) SELECT @Name, @Age
                WHERE NOT EXISTS ( SELECT 1 FROM [Person] WHERE ([Id] = @Id) ) ;
                SELECT COALESCE((SELECT [Id] FROM [Person] WHERE ([Id] = @Id)), CAST(last_insert_rowid() AS INT)) AS [Result] ;
            "})
        );
    }

    #[test]
    fn truncate_and_aggregates() {
        let args = StatementArgs::new("Person", &[]);
        assert_eq!(
            builder().create_truncate(&args).expect("Failed to create the truncate"),
            "DELETE FROM [Person] ;"
        );
        let fields = [Field::new("Age")];
        let filter = QueryGroup::and([QueryField::new("Name", "Ada")]);
        let args = StatementArgs::new("Person", &fields).with_filter(Some(&filter));
        assert_eq!(
            builder().create_count(&args).expect("Failed to create the count"),
            "SELECT COUNT(*) AS [CountValue] FROM [Person] WHERE ([Name] = @Name) ;"
        );
        assert_eq!(
            builder().create_average_all(&args).expect("Failed to create the average"),
            "SELECT AVG(CAST([Age] AS REAL)) AS [AverageValue] FROM [Person] ;"
        );
        assert_eq!(
            builder().create_max(&args).expect("Failed to create the max"),
            "SELECT MAX([Age]) AS [MaxValue] FROM [Person] WHERE ([Name] = @Name) ;"
        );
    }

    fn column(name: &str, ty: &str, pk: i64) -> RowLabeled {
        RowLabeled::new(
            ["cid", "name", "type", "notnull", "dflt_value", "pk"]
                .into_iter()
                .map(String::from)
                .collect(),
            vec![
                Value::Int64(Some(0)),
                Value::Varchar(Some(name.into())),
                Value::Varchar(Some(ty.into())),
                Value::Int64(Some(pk)),
                Value::Null,
                Value::Int64(Some(pk)),
            ]
            .into(),
        )
    }

    #[test]
    fn catalog() {
        let helper = SqliteDbHelper;
        assert_eq!(
            helper.fields_command(&SQLITE_SETTING, "Person").text,
            "PRAGMA table_info([Person]) ;"
        );
        assert_eq!(
            helper.fields_command(&SQLITE_SETTING, "main.Person").text,
            "PRAGMA [main].table_info([Person]) ;"
        );
        let field = helper
            .read_field(&column("Price", "DECIMAL(18, 2)", 0))
            .expect("Failed to read the field");
        assert_eq!(field.value, Value::Decimal(None));
        assert_eq!((field.precision, field.scale), (Some(18), Some(2)));
        assert!(!field.is_primary);
        let field = helper
            .read_field(&column("Name", "VARCHAR(60)", 0))
            .expect("Failed to read the field");
        assert_eq!(field.value, Value::Varchar(None));
        assert_eq!(field.size, Some(60));
        assert_eq!(helper.resolve_type("BIGINT"), Value::Int64(None));
        assert_eq!(helper.resolve_type("DOUBLE PRECISION"), Value::Float64(None));
        assert_eq!(helper.resolve_type(""), Value::Blob(None));
    }

    /// Catalog columns of a table, `sql` is its `CREATE TABLE` statement.
    async fn catalog_fields(columns: Vec<RowLabeled>, sql: &'static str) -> Vec<DbField> {
        let mut connection = MockConnection::<SqliteDriver>::new(move |command| {
            Ok(if command.text.contains("table_info") {
                columns.iter().cloned().map(Into::into).collect()
            } else {
                vec![row(&["sql"], [Value::Varchar(Some(sql.into()))])]
            })
        });
        SqliteDbHelper
            .get_fields(&mut connection, &SQLITE_SETTING, "Person")
            .await
            .expect("Failed to read the columns")
    }

    fn identities(fields: &[DbField]) -> Vec<&str> {
        fields
            .iter()
            .filter(|f| f.is_identity)
            .map(|f| f.name.as_ref())
            .collect()
    }

    #[tokio::test]
    async fn identity_from_catalog() {
        let fields = catalog_fields(
            vec![column("Id", "INTEGER", 1), column("Name", "TEXT", 0)],
            "CREATE TABLE Person (Id INTEGER PRIMARY KEY, Name TEXT)",
        )
        .await;
        assert_eq!(fields.len(), 2);
        assert!(fields[0].is_primary && fields[0].is_identity);
        assert!(!fields[1].is_identity);
        assert!(fields.iter().all(|f| f.provider == "sqlite"));
    }

    /// SQLite reports no identity flag, the detection is a known heuristic
    /// over the declared type and the `CREATE TABLE` text.
    #[tokio::test]
    async fn identity_heuristic() {
        let fields = catalog_fields(
            vec![column("Id", "BIGINT", 1), column("Name", "TEXT", 0)],
            "CREATE TABLE Person (\"Id\" BIGINT PRIMARY KEY AUTOINCREMENT, Name TEXT)",
        )
        .await;
        assert_eq!(identities(&fields), ["Id"]);

        let fields = catalog_fields(
            vec![column("Code", "TEXT", 1), column("Name", "TEXT", 0)],
            "CREATE TABLE Person (Code TEXT PRIMARY KEY, Name TEXT)",
        )
        .await;
        assert!(fields[0].is_primary);
        assert!(identities(&fields).is_empty(), "A text key is not an identity");

        let fields = catalog_fields(
            vec![
                column("Id", "INTEGER", 1),
                column("Code", "TEXT", 2),
                column("Name", "TEXT", 0),
            ],
            "CREATE TABLE Person (Id INTEGER, Code TEXT, Name TEXT, PRIMARY KEY (Id, Code))",
        )
        .await;
        assert!(identities(&fields).is_empty(), "A composite key has no identity");

        let fields = catalog_fields(
            vec![
                column("Code", "TEXT", 1),
                column("AutoIncrement_Seed", "BIGINT", 0),
                column("Name", "TEXT", 0),
            ],
            indoc! {"
                CREATE TABLE Person (
                    Code TEXT PRIMARY KEY, -- not AUTOINCREMENT
                    AutoIncrement_Seed BIGINT DEFAULT 1,
                    Name TEXT DEFAULT 'AUTOINCREMENT' /* AUTOINCREMENT */
                )
            "},
        )
        .await;
        assert!(
            identities(&fields).is_empty(),
            "Only the definition of the key column may mark it"
        );
    }

    #[tokio::test]
    async fn sqlite() {
        init_logs();
        execute_tests::<SqliteDriver>().await;
    }
}
