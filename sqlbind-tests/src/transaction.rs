use sqlbind::{Connection, Database, StatementError};

pub fn transaction<C: Connection>(db: &Database<C>) {
    db.query("DROP TABLE IF EXISTS ledger")
        .expect("Failed to drop the ledger table");
    db.query("CREATE TABLE ledger (entry TEXT NOT NULL)")
        .expect("Failed to create the ledger table");
    let count = || {
        db.fetch_one("SELECT COUNT(*) AS entries FROM ledger", (), None)
            .expect("Failed to count the entries")
            .expect("Always a row")
            .get_as::<i64>("entries")
            .expect("Integer count")
    };

    assert!(!db.in_transaction());
    for error in [db.commit(), db.rollback()] {
        assert!(matches!(
            StatementError::of(&error.expect_err("Not in a transaction")),
            Some(StatementError::NotInTransaction { .. })
        ));
    }

    db.begin().expect("Could not begin a transaction");
    assert!(db.in_transaction());
    db.begin().expect("Nested begin is ignored");
    db.insert("INSERT INTO ledger (entry) VALUES (?)", "discarded")
        .expect("Failed to insert an entry");
    assert_eq!(count(), 1);
    db.rollback().expect("Could not roll back");
    assert!(!db.in_transaction());
    assert_eq!(count(), 0);

    db.begin().expect("Could not begin a transaction");
    db.insert("INSERT INTO ledger (entry) VALUES (?)", "kept")
        .expect("Failed to insert an entry");
    db.commit().expect("Could not commit");
    assert!(!db.in_transaction());
    assert_eq!(count(), 1);
}
