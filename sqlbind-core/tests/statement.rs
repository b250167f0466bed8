mod mock;

#[cfg(test)]
mod tests {
    use crate::mock::{Call, MockConnection, SERVER_GONE, init_logs};
    use sqlbind_core::{
        DriverError, FailureKind, InsertOutcome, Model, Params, RecordRegistry, RecordType,
        Statement, StatementConfig, StatementError, StatementState, Stats, StatsSnapshot, Value,
    };
    use std::sync::Arc;

    fn isolated() -> (StatementConfig, Arc<Stats>) {
        let stats = Arc::new(Stats::new());
        let mut registry = RecordRegistry::new();
        registry.register(RecordType::closed("Server", ["id", "kind"]));
        registry.register(RecordType::open("Row"));
        (
            StatementConfig {
                registry: Arc::new(registry),
                stats: stats.clone(),
                default_type: None,
            },
            stats,
        )
    }

    fn servers() -> MockConnection {
        MockConnection::with_rows(
            ["id", "kind"],
            vec![
                [Value::Int64(Some(1)), Value::Varchar(Some("web".into()))],
                [Value::Int64(Some(2)), Value::Varchar(Some("db".into()))],
            ],
        )
    }

    #[test]
    fn named_binds() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(
            &connection,
            "SELECT * FROM servers WHERE id = ?int_id AND kind = ?str_val",
        );
        assert_eq!(statement.state(), StatementState::Init);
        statement.bind("int_id", 2).bind("str_val", "web");
        assert_eq!(statement.state(), StatementState::Bound);
        let row = statement.fetch_one(()).expect("Should fetch");
        assert!(row.is_some());
        assert_eq!(statement.state(), StatementState::Executed);
        assert_eq!(
            connection.prepared_sql(),
            ["SELECT * FROM servers WHERE id = ? AND kind = ?"]
        );
        assert_eq!(
            connection.binds(),
            [(
                "is".to_string(),
                vec![Value::Int32(Some(2)), Value::Varchar(Some("web".into()))]
            )]
        );
        assert_eq!(statement.signature(), "is");
    }

    #[test]
    fn positional_list() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(&connection, "SELECT * FROM servers WHERE id = ?");
        statement
            .fetch_all(vec![Value::from(1), "web".into()])
            .expect("Should fetch");
        assert_eq!(connection.prepared_sql(), ["SELECT * FROM servers WHERE id = ?"]);
        assert_eq!(connection.binds()[0].0, "is");
        assert_eq!(statement.bindings().values[1], Value::Varchar(Some("web".into())));
    }

    #[test]
    fn single_scalar() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(&connection, "SELECT * FROM servers WHERE id = ?");
        statement.fetch_one(2).expect("Should fetch");
        assert_eq!(connection.binds(), [("i".to_string(), vec![Value::Int32(Some(2))])]);
    }

    #[test]
    fn typed_binds() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(
            &connection,
            "INSERT INTO files VALUES (?a, ?b, ?c, ?int_d)",
        );
        statement
            .bind_string("a", 10)
            .bind_double("b", 3)
            .bind_blob("c", "raw")
            .bind_int("int_d", "5");
        statement.execute(()).expect("Should execute");
        assert_eq!(connection.binds()[0].0, "sdbi");

        // A plain bind drops the explicit type, a repeated bind overwrites the value
        statement.bind("a", 11).bind("a", 12);
        statement.execute(()).expect("Should execute");
        assert_eq!(connection.binds()[1].0, "idbi");
        assert_eq!(connection.binds()[1].1[0], Value::Int32(Some(12)));
    }

    #[test]
    fn named_params_passed_directly() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(&connection, "SELECT * FROM servers WHERE id = ?id");
        let rows = statement
            .fetch_all(Params::named([("id", 1), ("unused", 5)]))
            .expect("Should fetch");
        assert_eq!(rows.len(), 2);
        assert_eq!(connection.binds()[0].0, "i");
    }

    #[test]
    fn empty_params_honor_binds() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(&connection, "SELECT * FROM servers WHERE id = ?id");
        statement.bind("id", 1);
        statement
            .fetch_all(Params::from(Vec::<Value>::new()))
            .expect("Should fetch");
        assert_eq!(connection.binds(), [("i".to_string(), vec![Value::Int32(Some(1))])]);
    }

    #[test]
    fn missing_parameter_before_driver() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(&connection, "SELECT * FROM servers WHERE id = ?id");
        statement.bind("other", 1);
        let error = statement.fetch_one(()).expect_err("Should fail");
        assert!(matches!(
            StatementError::of(&error),
            Some(StatementError::MissingParameter { name }) if name == "id"
        ));
        assert!(connection.calls().is_empty());

        // Never bound at all
        let mut statement = Statement::new(&connection, "DELETE FROM servers WHERE id = ?id");
        assert!(statement.delete(()).is_err());
        assert!(connection.calls().is_empty());
    }

    #[test]
    fn no_placeholders() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(&connection, "SELECT * FROM servers");
        statement.prepare().expect("Should prepare");
        assert_eq!(statement.state(), StatementState::Prepared);
        assert!(connection.binds().is_empty());
        let rows = statement.fetch_all(()).expect("Should fetch");
        assert_eq!(rows.len(), 2);
        assert_eq!(connection.prepared_sql().len(), 1);
    }

    #[test]
    fn fetch_one_and_all_on_empty() {
        init_logs();
        let connection = MockConnection::new();
        let mut statement = Statement::new(&connection, "SELECT * FROM servers WHERE id = ?");
        assert_eq!(statement.fetch_one(99).expect("Should fetch"), None);
        let rows = statement.fetch_all(99).expect("Should fetch");
        assert!(rows.is_empty());
    }

    #[test]
    fn rows_are_independent() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(&connection, "SELECT * FROM servers");
        let mut rows = statement.fetch_all(()).expect("Should fetch");
        assert_eq!(rows.len(), 2);
        rows[0].set("kind", "cache");
        *rows[0].get_mut("id").expect("Has id") = Value::Int64(Some(40));
        assert_eq!(rows[1].get("kind"), Some(&Value::Varchar(Some("db".into()))));
        assert_eq!(rows[1].get("id"), Some(&Value::Int64(Some(2))));
        assert_eq!(rows[0].get_as::<String>("kind").expect("Is text"), "cache");
    }

    #[test]
    fn handles_released() {
        init_logs();
        let connection = servers();
        {
            let mut statement = Statement::new(&connection, "SELECT * FROM servers");
            statement.fetch_all(()).expect("Should fetch");
            assert!(!statement.is_open());
            assert_eq!(connection.open_handles(), 0);

            statement.execute(()).expect("Should execute");
            assert!(statement.is_open());
            assert_eq!(connection.open_handles(), 1);
        }
        assert_eq!(connection.open_handles(), 0);
        assert_eq!(
            connection.count(|v| matches!(v, Call::Prepare(..))),
            connection.count(|v| matches!(v, Call::Close(..)))
        );
    }

    #[test]
    fn reuse_prepared_handle() {
        init_logs();
        let connection = MockConnection::new();
        let (config, stats) = isolated();
        let mut statement = Statement::with_config(
            &connection,
            "INSERT INTO servers (id, kind) VALUES (?int_id, ?str_kind)",
            config,
        );
        for (id, kind) in [(1, "web"), (2, "db"), (3, "cache")] {
            statement.bind("int_id", id).bind("str_kind", kind);
            statement.execute(()).expect("Should execute");
        }
        assert_eq!(connection.prepared_sql().len(), 1);
        assert_eq!(connection.binds().len(), 3);
        assert_eq!(
            connection.binds()[2].1,
            [Value::Int32(Some(3)), Value::Varchar(Some("cache".into()))]
        );
        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                statements: 1,
                prepares: 1,
                executions: 3,
            }
        );
    }

    #[test]
    fn execute_again_after_fetch() {
        init_logs();
        let connection = servers();
        let mut statement = Statement::new(&connection, "SELECT * FROM servers WHERE id = ?id");
        statement.bind("id", 1);
        statement.fetch_all(()).expect("Should fetch");
        statement.fetch_all(()).expect("Should fetch");
        assert_eq!(connection.prepared_sql().len(), 2);
        assert_eq!(connection.binds()[0], connection.binds()[1]);
        assert_eq!(connection.open_handles(), 0);
    }

    #[test]
    fn prepare_failure_poisons() {
        init_logs();
        let connection = MockConnection::new();
        *connection.prepare_error.borrow_mut() = Some(DriverError::new(1064, "syntax error"));
        let (config, stats) = isolated();
        let mut statement = Statement::with_config(&connection, "SELEC 1", config);
        let error = statement.fetch_one(()).expect_err("Should fail");
        assert_eq!(
            StatementError::of(&error),
            Some(&StatementError::PrepareFailed {
                code: 1064,
                message: "syntax error".into()
            })
        );
        *connection.prepare_error.borrow_mut() = None;
        let error = statement.fetch_one(()).expect_err("Should still fail");
        assert!(matches!(
            StatementError::of(&error),
            Some(StatementError::PrepareFailed { code: 1064, .. })
        ));
        assert_eq!(connection.prepared_sql().len(), 1);
        assert_eq!(stats.snapshot().prepares, 1);
        assert_eq!(stats.snapshot().executions, 0);
    }

    #[test]
    fn execute_failure_classification() {
        init_logs();
        let connection = MockConnection::new();
        *connection.execute_error.borrow_mut() =
            Some(DriverError::new(SERVER_GONE, "MySQL server has gone away"));
        let mut statement = Statement::new(&connection, "UPDATE t SET a = 1");
        let error = statement.update(()).expect_err("Should fail");
        let failure = StatementError::of(&error).expect("Typed failure");
        assert!(failure.is_connection_lost());
        assert_eq!(statement.state(), StatementState::Executed);
        assert_eq!(connection.open_handles(), 0);

        *connection.execute_error.borrow_mut() = Some(DriverError::new(1062, "Duplicate entry"));
        let error = statement.update(()).expect_err("Should fail");
        assert!(matches!(
            StatementError::of(&error),
            Some(StatementError::ExecuteFailed {
                code: 1062,
                kind: FailureKind::Generic,
                ..
            })
        ));

        *connection.execute_error.borrow_mut() = None;
        connection.execute_result.set(Some(false));
        let error = statement.update(()).expect_err("Should fail");
        assert!(matches!(
            StatementError::of(&error),
            Some(StatementError::ExecuteFailed { code: 0, .. })
        ));
        assert_eq!(connection.open_handles(), 0);
    }

    #[test]
    fn bind_failure() {
        init_logs();
        let connection = MockConnection::new();
        *connection.bind_error.borrow_mut() = Some(DriverError::new(25, "column index out of range"));
        let mut statement = Statement::new(&connection, "SELECT ?");
        let error = statement.fetch_one(vec![1, 2]).expect_err("Should fail");
        assert!(matches!(
            StatementError::of(&error),
            Some(StatementError::BindFailed { code: 25, .. })
        ));
        assert_eq!(connection.open_handles(), 0);
        assert_eq!(connection.count(|v| matches!(v, Call::Execute(..))), 0);
    }

    #[test]
    fn invalid_result_type() {
        init_logs();
        let connection = servers();
        let (config, _) = isolated();
        let mut statement = Statement::with_config(&connection, "SELECT * FROM servers", config);
        let error = statement
            .set_result_type(Some("Nope"))
            .expect_err("Should fail");
        assert_eq!(
            StatementError::of(&error),
            Some(&StatementError::InvalidResultType {
                name: "Nope".into()
            })
        );
        assert!(connection.calls().is_empty());
    }

    #[test]
    fn hydrate_into_result_type() {
        init_logs();
        let connection = servers();
        let (config, _) = isolated();
        let mut statement = Statement::with_config(&connection, "SELECT * FROM servers", config);
        statement.set_result_type(Some("Server")).expect("Registered");
        let rows = statement.fetch_all(()).expect("Should fetch");
        assert!(rows.iter().all(|v| v.type_name() == "Server"));

        statement.set_result_type(None).expect("Always valid");
        let row = statement.fetch_one(()).expect("Should fetch").expect("Has rows");
        assert_eq!(row.type_name(), "Model");
    }

    #[test]
    fn unknown_field() {
        init_logs();
        let connection = MockConnection::with_rows(
            ["id", "kind", "extra"],
            vec![[1.into(), "web".into(), Value::Null]],
        );
        let (config, _) = isolated();
        let mut statement = Statement::with_config(&connection, "SELECT * FROM servers", config);
        statement.set_result_type(Some("Server")).expect("Registered");
        let error = statement.fetch_all(()).expect_err("Should fail");
        assert_eq!(
            StatementError::of(&error),
            Some(&StatementError::UnknownField {
                record: "Server".into(),
                field: "extra".into()
            })
        );
        assert_eq!(connection.open_handles(), 0);

        // Open shapes accept anything
        statement.set_result_type(Some("Row")).expect("Registered");
        assert_eq!(statement.fetch_all(()).expect("Should fetch").len(), 1);
    }

    #[test]
    fn default_type() {
        init_logs();
        let connection = servers();
        let (mut config, _) = isolated();
        config.default_type = config.registry.get("Row");
        let mut statement = Statement::with_config(&connection, "SELECT * FROM servers", config);
        let row: Model = statement.fetch_one(()).expect("Should fetch").expect("Has rows");
        assert_eq!(row.type_name(), "Row");
    }

    #[test]
    fn insert_outcome() {
        init_logs();
        let connection = MockConnection::new();
        let mut statement = Statement::new(&connection, "INSERT INTO servers (kind) VALUES (?)");
        connection.affected.set(1);
        connection.last_id.set(Some(42));
        assert_eq!(
            statement.insert("web").expect("Should insert"),
            InsertOutcome::GeneratedId(42)
        );
        connection.last_id.set(None);
        assert_eq!(
            statement.insert("web").expect("Should insert"),
            InsertOutcome::Affected(true)
        );
        connection.affected.set(0);
        connection.last_id.set(Some(0));
        let outcome = statement.insert("web").expect("Should insert");
        assert_eq!(outcome, InsertOutcome::Affected(false));
        assert!(!outcome.succeeded());
    }

    #[test]
    fn counters() {
        init_logs();
        let connection = servers();
        let (config, stats) = isolated();
        let mut first = Statement::with_config(&connection, "SELECT * FROM servers", config.clone());
        let _second = Statement::with_config(&connection, "SELECT 1", config);
        first.fetch_all(()).expect("Should fetch");
        first.fetch_all(()).expect("Should fetch");
        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                statements: 2,
                prepares: 2,
                executions: 2,
            }
        );
    }
}
