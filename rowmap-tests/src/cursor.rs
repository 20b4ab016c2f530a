use rowmap::{Connection, Database, MapError, Record, Session};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Reading {
    #[rowmap(primary_key, table = "reading")]
    id: i64,
    #[rowmap(column = "sensor", index = "by_sensor1")]
    sensor: String,
    #[rowmap(column = "value", index = "by_sensor2")]
    value: f64,
}

fn readings() -> Vec<Reading> {
    (0..10)
        .map(|i| Reading {
            id: 0,
            sensor: if i % 2 == 0 { "even" } else { "odd" }.into(),
            value: i as f64 * 0.5,
        })
        .collect()
}

pub fn cursor<C: Connection>(url: &str) {
    let mut db = Database::<C>::connect(url).expect("Could not connect");
    db.create_table::<Reading>()
        .expect("Failed to create the reading table");
    let result = db.insert_all(&readings()).expect("Failed to insert the readings");
    assert_eq!(result.rows_affected, 10);

    // Every row is written into the same record
    let mut reading = Reading::default();
    let mut cursor = db
        .query(&mut reading, "WHERE sensor = ? ORDER BY value", &["odd".into()])
        .expect("Failed to query the odd readings");
    let mut values = Vec::new();
    while cursor.next().expect("Failed to advance the cursor") {
        assert_eq!(cursor.record().sensor, "odd");
        values.push(cursor.record().value);
    }
    assert_eq!(values, [0.5, 1.5, 2.5, 3.5, 4.5]);
    assert!(!cursor.next().expect("An exhausted cursor stays exhausted"));
    assert_eq!(cursor.into_inner().value, 4.5);

    // Running the same statement again invalidates the first cursor
    let mut first = Reading::default();
    let mut second = Reading::default();
    let mut cursor = db
        .query(&mut first, "ORDER BY value", &[])
        .expect("Failed to query the readings");
    assert!(cursor.next().expect("Failed to advance the cursor"));
    let mut other = db
        .query(&mut second, "ORDER BY value", &[])
        .expect("Failed to query the readings again");
    assert!(other.next().expect("Failed to advance the second cursor"));
    crate::silent_logs! {
        assert!(cursor.next().is_err());
    }
    drop(other);

    // Single row
    let mut reading = Reading::default();
    db.query_row(&mut reading, "WHERE value > ? ORDER BY value", &[4.2f64.into()])
        .expect("Failed to query one row");
    assert_eq!(reading.value, 4.5);
    let error = db
        .query_row(&mut reading, "WHERE value > ?", &[100.0f64.into()])
        .expect_err("No row should match")
        .downcast::<MapError>()
        .expect("Should be a MapError");
    assert_eq!(error, MapError::NoRows);

    // Through a session
    let session = Session::new(db);
    {
        let mut reading = Reading::default();
        let mut cursor =
            session.query(&mut reading, "WHERE sensor = ? ORDER BY value", &["even".into()]);
        let mut count = 0;
        while cursor.next() {
            count += 1;
        }
        assert_eq!(count, 5);
        assert_eq!(cursor.record().map(|v| v.value), Some(4.0));
    }
    assert!(session.ok());
    let mut reading = Reading::default();
    assert!(!session.query_row(&mut reading, "WHERE value < 0", &[]));
    assert_eq!(session.map_error(), Some(MapError::NoRows));
    session.clear_error();

    // A failing query leaves an empty cursor
    let mut reading = Reading::default();
    let mut cursor;
    crate::silent_logs! {
        cursor = session.query(&mut reading, "WHERE missing = 1", &[]);
    }
    assert!(!cursor.next());
    assert!(cursor.record().is_none());
    assert!(session.failed());
    assert!(session.error_message().contains("missing"));
}
