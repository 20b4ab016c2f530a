#[cfg(test)]
mod tests {
    use rowmap::{Connection, Database, Prepared, Rows, Value};
    use rowmap_sqlite::{SqliteConnection, SqliteDatabase};
    use rowmap_tests::{init_logs, silent_logs};
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
        init_logs();
        silent_logs! {
            assert!(
                SqliteConnection::connect("postgres://localhost:5432").is_err(),
                "Should not accept a url of another driver"
            );
            assert!(SqliteDatabase::connect("memory").is_err());
        }
    }

    #[test]
    fn prepare_one_statement() {
        init_logs();
        let mut connection =
            SqliteConnection::connect("sqlite://:memory:").expect("Could not open the database");
        connection
            .prepare("SELECT 1;  \n")
            .expect("Trailing blanks are allowed");
        silent_logs! {
            assert!(connection.prepare("SELECT 1; SELECT 2;").is_err());
            assert!(connection.prepare("   ").is_err());
            assert!(connection.prepare("SELEC 1").is_err());
        }
    }

    #[test]
    fn prepared_statement() {
        init_logs();
        let mut connection =
            SqliteConnection::connect("sqlite://:memory:").expect("Could not open the database");
        connection
            .prepare("CREATE TABLE t (a INTEGER, b TEXT, c BLOB, d REAL);")
            .and_then(|v| v.execute(&[]))
            .expect("Could not create the table");
        let insert = connection
            .prepare("INSERT INTO t (a, b, c, d) VALUES (?, ?, ?, ?);")
            .expect("Could not prepare the insert");
        assert_eq!(insert.to_string(), "INSERT INTO t (a, b, c, d) VALUES (?, ?, ?, ?);");
        for i in 1..=3 {
            let result = insert
                .execute(&[
                    Value::Int32(i),
                    Value::Varchar(format!("row {}", i)),
                    Value::Blob(vec![i as u8; 3]),
                    Value::Null,
                ])
                .expect("Could not insert");
            assert_eq!(result.rows_affected, 1);
            assert_eq!(result.last_affected_id, Some(i as i64));
        }
        silent_logs! {
            assert!(insert.execute(&[Value::Int32(1)]).is_err());
            assert!(
                insert
                    .execute(&[
                        Value::UInt64(u64::MAX),
                        Value::Null,
                        Value::Null,
                        Value::Null
                    ])
                    .is_err()
            );
        }

        let select = connection
            .prepare("SELECT a, b, c, d FROM t WHERE a >= ? ORDER BY a;")
            .expect("Could not prepare the select");
        let mut rows = select.query(&[Value::Int64(2)]).expect("Could not query");
        assert!(rows.row().is_err());
        assert!(rows.next().expect("Could not step"));
        assert_eq!(
            &*rows.row().expect("Could not read the row"),
            [
                Value::Int64(2),
                Value::Varchar("row 2".into()),
                Value::Blob(vec![2, 2, 2]),
                Value::Null,
            ]
        );
        assert!(rows.next().expect("Could not step"));
        assert!(!rows.next().expect("Could not step"));
        assert!(!rows.next().expect("Could not step"));

        let update = connection
            .prepare("UPDATE t SET d = ?;")
            .expect("Could not prepare the update");
        assert_eq!(
            update
                .execute(&[Value::Float64(0.5)])
                .expect("Could not update")
                .rows_affected,
            3
        );

        // Executing the statement again invalidates earlier rows
        let mut first = select.query(&[Value::Int64(0)]).expect("Could not query");
        assert!(first.next().expect("Could not step"));
        let mut second = select.clone().query(&[Value::Int64(3)]).expect("Could not query");
        assert!(first.next().is_err());
        assert!(second.next().expect("Could not step"));
        assert_eq!(second.row().expect("Could not read the row")[3], Value::Float64(0.5));
    }

    #[test]
    fn transaction() {
        init_logs();
        let mut db: SqliteDatabase =
            Database::connect("sqlite://:memory:").expect("Could not open the database");
        db.exec("CREATE TABLE t (a INTEGER);", &[])
            .expect("Could not create the table");
        db.begin().expect("Could not begin");
        db.exec("INSERT INTO t VALUES (1), (2);", &[])
            .expect("Could not insert");
        db.rollback().expect("Could not rollback");
        let mut rows = db
            .query_rows("SELECT COUNT(*) FROM t;", &[])
            .expect("Could not count");
        assert!(rows.next().expect("Could not step"));
        assert_eq!(rows.row().expect("Could not read")[0], Value::Int64(0));
    }

    #[test]
    fn failed_commit_leaves_no_transaction() {
        init_logs();
        let mut db: SqliteDatabase =
            Database::connect("sqlite://:memory:").expect("Could not open the database");
        for sql in [
            "PRAGMA foreign_keys = ON;",
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);",
            "CREATE TABLE child (parent INTEGER REFERENCES parent(id) DEFERRABLE INITIALLY DEFERRED);",
        ] {
            db.exec(sql, &[]).expect("Could not set up the tables");
        }
        db.begin().expect("Could not begin");
        db.exec("INSERT INTO child VALUES (42);", &[])
            .expect("The foreign key is only checked on commit");
        silent_logs! {
            assert!(db.commit().is_err());
        }
        assert!(!db.in_transaction());

        // The connection is idle again and the dangling row is gone
        db.begin().expect("Could not begin after the failed commit");
        db.exec("INSERT INTO parent VALUES (1);", &[])
            .expect("Could not insert");
        db.commit().expect("Could not commit");
        let mut rows = db
            .query_rows("SELECT (SELECT COUNT(*) FROM parent), (SELECT COUNT(*) FROM child);", &[])
            .expect("Could not count");
        assert!(rows.next().expect("Could not step"));
        assert_eq!(
            &*rows.row().expect("Could not read"),
            [Value::Int64(1), Value::Int64(0)]
        );
    }

    #[test]
    fn busy_inside_transaction() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/busy.sqlite";
        let _guard = MUTEX.lock().unwrap();
        let url = format!("sqlite://{}?mode=rwc", DB_PATH);
        let mut first: SqliteDatabase = Database::connect(&url).expect("Could not open the database");
        let mut second: SqliteDatabase = Database::connect(&url).expect("Could not open the database");
        first
            .exec("DROP TABLE IF EXISTS t;", &[])
            .and_then(|_| first.exec("CREATE TABLE t (a INTEGER);", &[]))
            .expect("Could not create the table");

        first.begin().expect("Could not begin");
        first
            .exec("INSERT INTO t VALUES (1);", &[])
            .expect("Could not insert");
        second.begin().expect("Could not begin");
        silent_logs! {
            // Waiting here would never end, the writer is on this same thread
            assert!(second.exec("INSERT INTO t VALUES (2);", &[]).is_err());
        }
        second.rollback().expect("Could not rollback");
        first.commit().expect("Could not commit");

        second
            .exec("INSERT INTO t VALUES (3);", &[])
            .expect("Could not insert once the lock is released");
        let mut rows = second
            .query_rows("SELECT COUNT(*) FROM t;", &[])
            .expect("Could not count");
        assert!(rows.next().expect("Could not step"));
        assert_eq!(rows.row().expect("Could not read")[0], Value::Int64(2));
    }
}
