use sqlbind::{Connection, Database, Params, Value};

/// The same statement executed many times keeps a single prepared handle
/// while the rewritten SQL does not change.
pub fn reuse<C: Connection>(db: &Database<C>) {
    db.query("DROP TABLE IF EXISTS counters")
        .expect("Failed to drop the counters table");
    db.query("CREATE TABLE counters (label TEXT NOT NULL, amount INTEGER NOT NULL)")
        .expect("Failed to create the counters table");

    let before = db.stats();
    let mut insert = db
        .prepare("INSERT INTO counters (label, amount) VALUES (?label, ?int_amount)")
        .expect("Should prepare");
    for i in 0..10 {
        insert
            .execute(Params::named([
                ("label", Value::from(format!("counter {}", i % 3))),
                ("int_amount", Value::from(i)),
            ]))
            .expect("Failed to insert a counter");
        assert!(insert.is_open());
    }
    insert.close();
    assert!(!insert.is_open());
    drop(insert);
    let after = db.stats();
    assert_eq!(after.statements - before.statements, 1);
    assert_eq!(after.prepares - before.prepares, 1);
    assert_eq!(after.executions - before.executions, 10);

    // Fetching again without parameters runs the last bindings
    let mut select = db
        .prepare("SELECT SUM(amount) AS total FROM counters WHERE label = ?label")
        .expect("Should prepare");
    select.bind("label", "counter 1");
    let first = select
        .fetch_one(())
        .expect("Should sum")
        .expect("Always a row");
    let second = select
        .fetch_one(())
        .expect("Should sum again")
        .expect("Always a row");
    assert_eq!(first.get_as::<i64>("total").expect("Integer sum"), 1 + 4 + 7);
    assert_eq!(first.values(), second.values());

    let rows = select
        .fetch_all(Params::named([("label", "counter 0")]))
        .expect("Should sum");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get_as::<i64>("total").expect("Integer sum"),
        3 + 6 + 9
    );
}
