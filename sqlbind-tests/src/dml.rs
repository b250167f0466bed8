use sqlbind::{Connection, Database, InsertOutcome, Params, RowsAffected, Value};

pub fn dml<C: Connection>(db: &Database<C>) {
    db.query("DROP TABLE IF EXISTS tags")
        .expect("Failed to drop the tags table");
    db.query("CREATE TABLE tags (name TEXT PRIMARY KEY, hits INTEGER NOT NULL) WITHOUT ROWID")
        .expect("Failed to create the tags table");

    // No generated identifier
    for name in ["red", "green", "blue"] {
        let outcome = db
            .insert(
                "INSERT INTO tags (name, hits) VALUES (?name, 0)",
                Params::named([("name", name)]),
            )
            .expect("Failed to insert a tag");
        assert_eq!(outcome, InsertOutcome::Affected(true));
        assert!(outcome.succeeded());
    }
    let outcome = db
        .insert(
            "INSERT INTO tags (name, hits) SELECT name, hits FROM tags WHERE name = ?",
            "missing",
        )
        .expect("Inserting nothing is not an error");
    assert_eq!(outcome, InsertOutcome::Affected(false));

    let updated = db
        .update(
            "UPDATE tags SET hits = hits + ?int_step WHERE name <> ?name",
            Params::named([("int_step", Value::from(5)), ("name", Value::from("red"))]),
        )
        .expect("Failed to update the tags");
    assert_eq!(updated, 2);
    let updated = db
        .update("UPDATE tags SET hits = 1 WHERE name = ?", "purple")
        .expect("Updating nothing is not an error");
    assert_eq!(updated, 0);

    let deleted = db
        .delete("DELETE FROM tags WHERE hits > ?", 0)
        .expect("Failed to delete the tags");
    assert_eq!(deleted, 2);
    let remaining = db
        .fetch_all("SELECT name, hits FROM tags", (), None)
        .expect("Failed to fetch the tags");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].get_as::<String>("name").expect("Text"), "red");
    assert_eq!(remaining[0].get_as::<i64>("hits").expect("Integer"), 0);

    // Statement level execute reports the raw counters
    let mut statement = db
        .prepare("DELETE FROM tags WHERE name = ?name")
        .expect("Should prepare");
    statement.bind("name", "red");
    let result = statement.execute(()).expect("Should delete red");
    assert_eq!(result.rows_affected, 1);
    let result = statement.execute(()).expect("Nothing left to delete");
    assert_eq!(result.rows_affected, 0);
    drop(statement);

    // Each table starts its own rowid sequence
    for table in ["first_notes", "second_notes"] {
        db.query(&format!("DROP TABLE IF EXISTS {table}"))
            .expect("Failed to drop the notes table");
        db.query(&format!(
            "CREATE TABLE {table} (id INTEGER PRIMARY KEY, body TEXT NOT NULL)"
        ))
        .expect("Failed to create the notes table");
    }
    for table in ["first_notes", "second_notes"] {
        let outcome = db
            .insert(format!("INSERT INTO {table} (body) VALUES (?)"), "hello")
            .expect("Failed to insert a note");
        assert_eq!(outcome, InsertOutcome::GeneratedId(1));
    }
    let outcome = db
        .insert(
            "INSERT INTO tags (name, hits) VALUES (?name, 0)",
            Params::named([("name", "after")]),
        )
        .expect("Failed to insert a tag");
    assert_eq!(outcome, InsertOutcome::Affected(true));
    let updated = db
        .update("UPDATE second_notes SET body = ? WHERE id = 1", "changed")
        .expect("Failed to update the note");
    assert_eq!(updated, 1);
    let mut statement = db
        .prepare("UPDATE first_notes SET body = ?body")
        .expect("Should prepare");
    statement.bind("body", "changed");
    assert_eq!(
        statement.execute(()).expect("Should update"),
        RowsAffected {
            rows_affected: 1,
            last_affected_id: None,
        }
    );
}
