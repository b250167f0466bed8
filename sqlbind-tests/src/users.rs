use indoc::indoc;
use sqlbind::{Connection, Database, InsertOutcome, Params, RecordType, StatementState, Value};

pub fn users<C: Connection>(db: &mut Database<C>) {
    // Setup
    db.query("DROP TABLE IF EXISTS users")
        .expect("Failed to drop the users table");
    db.query(indoc! {"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            score REAL
        )
    "})
    .expect("Failed to create the users table");
    db.register_type(RecordType::closed("User", ["id", "name", "email", "score"]));

    // Named, with hinted and inferred types
    let mut insert = db
        .prepare("INSERT INTO users (name, email, score) VALUES (?str_name, ?email, ?dbl_score)")
        .expect("Should prepare");
    insert
        .bind("str_name", "alice")
        .bind("email", "alice@example.com")
        .bind("dbl_score", 7);
    let outcome = insert.insert(()).expect("Failed to insert alice");
    assert_eq!(insert.signature(), "ssd");
    assert_eq!(outcome, InsertOutcome::GeneratedId(1));
    let outcome = insert
        .insert(Params::named([
            ("str_name", Value::from("bob")),
            ("email", Value::Null),
            ("dbl_score", Value::from(3.5)),
        ]))
        .expect("Failed to insert bob");
    assert_eq!(outcome, InsertOutcome::GeneratedId(2));
    drop(insert);

    // Numeric text is coerced by the `str_` hint
    db.insert(
        "INSERT INTO users (name, score) VALUES (?str_name, ?score)",
        Params::named([("str_name", Value::from(1234)), ("score", Value::from(1.25))]),
    )
    .expect("Failed to insert 1234");

    // Named fetch
    let user = db
        .fetch_one(
            "SELECT * FROM users WHERE name = ?name",
            Params::named([("name", "alice")]),
            Some("User"),
        )
        .expect("Failed to fetch alice")
        .expect("Alice exists");
    assert_eq!(user.type_name(), "User");
    assert_eq!(user.get_as::<i64>("id").expect("Integer id"), 1);
    assert_eq!(
        user.get_as::<String>("email").expect("Text email"),
        "alice@example.com"
    );
    assert_eq!(user.get_as::<f64>("score").expect("Real score"), 7.0);

    // Positional fetch
    let users = db
        .fetch_all(
            "SELECT name, email FROM users WHERE id >= ? AND score < ? ORDER BY id",
            vec![Value::from(1), Value::from(5.0)],
            None,
        )
        .expect("Failed to fetch the users");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].type_name(), "Model");
    assert_eq!(users[0].get_as::<String>("name").expect("Text name"), "bob");
    assert_eq!(users[0].get("email"), Some(&Value::Null));
    assert_eq!(users[1].get_as::<String>("name").expect("Text name"), "1234");

    // Scalar fetch
    let user = db
        .fetch_one("SELECT name FROM users WHERE id = ?", 2, None)
        .expect("Failed to fetch bob")
        .expect("Bob exists");
    assert_eq!(user.get_as::<String>("name").expect("Text name"), "bob");
    let nobody = db
        .fetch_one("SELECT name FROM users WHERE id = ?", 99, None)
        .expect("Query should succeed");
    assert!(nobody.is_none());

    // Explicit types and the state machine
    let mut statement = db
        .prepare("SELECT COUNT(*) AS total FROM users WHERE name <> ?name AND id > ?minimum")
        .expect("Should prepare");
    assert_eq!(statement.state(), StatementState::Init);
    statement
        .bind_string("name", "alice")
        .bind_int("minimum", "0");
    assert_eq!(statement.state(), StatementState::Bound);
    statement.prepare().expect("Should reach prepared");
    assert_eq!(statement.state(), StatementState::Prepared);
    assert_eq!(statement.signature(), "si");
    assert_eq!(
        statement.prepared_sql(),
        Some("SELECT COUNT(*) AS total FROM users WHERE name <> ? AND id > ?")
    );
    let total = statement
        .fetch_one(())
        .expect("Should count")
        .expect("Always a row");
    assert_eq!(statement.state(), StatementState::Executed);
    assert!(!statement.is_open());
    assert_eq!(total.get_as::<i64>("total").expect("Integer count"), 2);
}
