#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sqlbind::{ConnectionSettings, Database, LazyDatabase, Params, Value};
    use sqlbind_core::{Connection, StatementError};
    use sqlbind_sqlite::SqliteConnection;
    use sqlbind_tests::{init_logs, silent_logs};
    use std::{fs, path::Path, sync::Mutex};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn create_database() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        SqliteConnection::connect(&format!("sqlite://{}?mode=rwc", DB_PATH))
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
            .expect("Could not open the database");
        fs::remove_file(DB_PATH)
            .expect(format!("Failed to remove existing test database file {}", DB_PATH).as_str());
        silent_logs! {
            assert!(
                SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH)).is_err(),
                "Should not be able to open in read only unexisting database"
            );
        }
    }

    #[test]
    fn wrong_url() {
        silent_logs! {
            assert!(SqliteConnection::connect("mysql://localhost/some_value").is_err());
        };
    }

    #[test]
    fn in_memory() {
        init_logs();
        let db = Database::<SqliteConnection>::connect("sqlite://:memory:")
            .expect("Could not open an in memory database");
        db.query(indoc! {"
            CREATE TABLE files (
                path TEXT NOT NULL,
                content BLOB,
                size REAL
            )
        "})
        .expect("Failed to create the files table");

        let mut insert = db
            .prepare("INSERT INTO files (path, content, size) VALUES (?path, ?content, ?size)")
            .expect("Should prepare");
        insert
            .bind("path", "/etc/hosts")
            .bind_blob("content", b"127.0.0.1 localhost".as_slice())
            .bind_double("size", 19);
        insert.execute(()).expect("Failed to insert the file");
        assert_eq!(insert.signature(), "sbd");
        drop(insert);

        let file = db
            .fetch_one(
                "SELECT content, size, typeof(size) AS kind FROM files WHERE path = ?path",
                Params::named([("path", "/etc/hosts")]),
                None,
            )
            .expect("Failed to fetch the file")
            .expect("The file exists");
        assert_eq!(
            file.get("content"),
            Some(&Value::Blob(Some(b"127.0.0.1 localhost".as_slice().into())))
        );
        assert_eq!(file.get_as::<f64>("size").expect("Real"), 19.0);
        assert_eq!(file.get_as::<String>("kind").expect("Text"), "real");
    }

    #[test]
    fn multiple_statements() {
        init_logs();
        let db = Database::<SqliteConnection>::connect("sqlite://:memory:")
            .expect("Could not open an in memory database");
        let error = db
            .query("SELECT 1; SELECT 2;")
            .expect_err("Only one statement at a time");
        assert!(matches!(
            StatementError::of(&error),
            Some(StatementError::ExecuteFailed { .. })
        ));
    }

    #[test]
    fn lazy() {
        init_logs();
        let settings = ConnectionSettings::new("sqlite").option("mode", "memory");
        assert_eq!(settings.to_url(), "sqlite://?mode=memory");
        let lazy = LazyDatabase::<SqliteConnection>::new(settings);
        assert!(!lazy.is_connected());
        let db = lazy.database().expect("Should connect");
        let row = db
            .fetch_one("SELECT ? + ? AS total", vec![Value::from(2), Value::from(3)], None)
            .expect("Should compute")
            .expect("Always a row");
        assert_eq!(row.get_as::<i64>("total").expect("Integer"), 5);
        assert!(lazy.is_connected());
    }
}
