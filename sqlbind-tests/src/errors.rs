use sqlbind::{Connection, Database, FailureKind, Params, StatementError};

pub fn errors<C: Connection>(db: &Database<C>) {
    let error = db.prepare("   ").expect_err("Blank SQL");
    assert_eq!(StatementError::of(&error), Some(&StatementError::EmptySql));

    // Referenced but never bound
    let error = db
        .fetch_all(
            "SELECT * FROM users WHERE name = ?name AND email = ?email",
            Params::named([("email", "alice@example.com")]),
            None,
        )
        .expect_err("`name` is missing");
    assert_eq!(
        StatementError::of(&error),
        Some(&StatementError::MissingParameter {
            name: "name".into()
        })
    );

    // Rejected by the database while preparing, the statement stays failed
    let mut statement = db
        .prepare("SELEC name FROM users")
        .expect("Preparation is deferred");
    for _ in 0..2 {
        let error = statement.fetch_all(()).expect_err("Syntax error");
        assert!(matches!(
            StatementError::of(&error),
            Some(StatementError::PrepareFailed { .. })
        ));
    }
    drop(statement);
    let error = db
        .fetch_all("SELECT * FROM missing_table", (), None)
        .expect_err("No such table");
    assert!(matches!(
        StatementError::of(&error),
        Some(StatementError::PrepareFailed { message, .. }) if message.contains("missing_table")
    ));

    // Values the database refuses
    let error = db
        .fetch_all("SELECT name FROM users WHERE id = ? OR id = ?", 1, None)
        .expect_err("One value for two placeholders");
    assert!(matches!(
        StatementError::of(&error),
        Some(StatementError::BindFailed { .. })
    ));
    let mut statement = db
        .prepare("SELECT name FROM users WHERE id = ?id")
        .expect("Should prepare");
    statement.bind_int("id", "not a number");
    let error = statement.fetch_one(()).expect_err("Not an integer");
    assert!(matches!(
        StatementError::of(&error),
        Some(StatementError::BindFailed { .. })
    ));
    drop(statement);

    // Failing while running
    let error = db
        .insert(
            "INSERT INTO users (id, name) VALUES (?, 'duplicate')",
            1,
        )
        .expect_err("Primary key violation");
    match StatementError::of(&error) {
        Some(
            e @ StatementError::ExecuteFailed {
                kind: FailureKind::Generic,
                ..
            },
        ) => assert!(!e.is_connection_lost()),
        other => panic!("Unexpected failure: {other:?}"),
    }
    let error = db.query("DROP TABLE missing_table").expect_err("No such table");
    assert!(matches!(
        StatementError::of(&error),
        Some(StatementError::ExecuteFailed { .. })
    ));
}
