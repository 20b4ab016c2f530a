use rowmap::{Connection, MapError, Record, RowsAffected, Session};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Entry {
    #[rowmap(primary_key, table = "entry")]
    id: i64,
    #[rowmap(column = "A")]
    a: i64,
    #[rowmap(column = "B")]
    b: String,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Keyless {
    #[rowmap(column, table = "keyless")]
    value: i64,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct BadKey {
    #[rowmap(primary_key, table = "bad_key")]
    id: bool,
    #[rowmap(column)]
    value: i64,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Unmapped {
    id: i64,
    value: i64,
}

fn entry(a: i64) -> Entry {
    Entry {
        id: 0,
        a,
        b: format!("entry {}", a),
    }
}

pub fn sticky_error<C: Connection>(url: &str) {
    let session = Session::<C>::connect(url);
    session.create_table::<Entry>();
    session.insert_all(&[entry(1), entry(2)]);
    assert!(session.ok(), "{}", session.error_message());
    assert_eq!(session.error_message(), "");

    // First failure wins
    let mut record = entry(3);
    session.update(&record, &["Z"]);
    let first = Some(MapError::UnknownColumn {
        table: "entry".into(),
        column: "Z".into(),
    });
    assert_eq!(session.map_error(), first);
    crate::silent_logs! {
        assert_eq!(session.exec("NOT A STATEMENT", &[]), RowsAffected::default());
    }
    session.create_table::<Entry>();
    session.begin();
    session.commit();
    session.rollback();
    session.set_error(MapError::NoRows);
    assert_eq!(session.insert(&mut record), RowsAffected::default());
    assert_eq!(record.id, 0);
    assert_eq!(session.update(&record, &[]), RowsAffected::default());
    assert_eq!(session.delete::<Entry>("", &[]), RowsAffected::default());
    assert_eq!(session.truncate::<Entry>(), RowsAffected::default());
    let mut list = Vec::<Entry>::new();
    assert_eq!(session.retrieve(&mut list, "", &[]), 0);
    assert!(list.is_empty());
    assert!(!session.query_row(&mut record, "", &[]));
    assert!(!session.in_transaction());
    assert_eq!(session.map_error(), first);
    session.with_error(|e| {
        let e = e.expect("The error is latched");
        assert!(e.to_string().contains("`Z`"));
    });

    // Nothing ran while the error was latched
    let error = session.clear_error().expect("The error is latched");
    assert!(error.downcast_ref::<MapError>().is_some());
    assert!(session.ok());
    assert_eq!(session.retrieve(&mut list, "ORDER BY A", &[]), 2);
    assert_eq!(list.iter().map(|v| v.a).collect::<Vec<_>>(), [1, 2]);

    // Engine errors carry the engine message
    crate::silent_logs! {
        session.trace(true);
        session.exec("foo", &[]);
        session.trace(false);
    }
    assert!(session.failed());
    assert!(session.map_error().is_none());
    assert!(session.error_message().contains("syntax error"));
    session.clear_error();

    // Operation time mapping errors
    session.update(&Keyless::default(), &[]);
    assert!(matches!(
        session.map_error(),
        Some(MapError::MissingPrimaryKey { .. })
    ));
    session.clear_error();
    session.commit();
    assert_eq!(session.map_error(), Some(MapError::NoActiveTransaction));
    session.clear_error();
    session.begin();
    session.begin();
    assert_eq!(session.map_error(), Some(MapError::NestedTransaction));
    session.end();
    assert!(!session.in_transaction());
    session.clear_error();

    // Describe time errors
    session.create_table::<BadKey>();
    assert_eq!(
        session.map_error(),
        Some(MapError::PrimaryKeyTypeMismatch {
            field: "id",
            found: "bool"
        })
    );
    session.clear_error();
    session.create_table::<Unmapped>();
    assert!(matches!(
        session.map_error(),
        Some(MapError::NoManagedFields { .. })
    ));
    session.clear_error();

    // Application errors
    session.set_error(rowmap::Error::msg("application error"));
    assert_eq!(session.error_message(), "application error");
    session.set_error(rowmap::Error::msg("second error"));
    assert_eq!(session.error_message(), "application error");
    session.clear_error();

    // A keyless record inserts without write back
    session.create_table::<Keyless>();
    let mut keyless = Keyless { value: 5 };
    assert_eq!(session.insert(&mut keyless).rows_affected, 1);
    let mut stored = Keyless::default();
    assert!(session.query_row(&mut stored, "", &[]));
    assert_eq!(stored, keyless);
    assert!(session.ok(), "{}", session.error_message());
}

pub fn records_inspecting_session<C: Connection>(url: &str) {
    let session = Session::<C>::connect(url);
    let joined = session.join();
    session.create_table::<Entry>();
    let entries = [entry(1), entry(2), entry(3)];
    let result = session.insert_all(
        entries
            .iter()
            .filter(|v| session.ok() && joined.error_message().is_empty() && v.a != 2),
    );
    assert!(session.ok(), "{}", session.error_message());
    assert_eq!(result.rows_affected, 2);

    let mut more = [entry(4), entry(5)];
    session.insert_all(more.iter_mut().inspect(|_| assert!(!joined.in_transaction())));
    assert!(session.ok(), "{}", session.error_message());
    assert!(more.iter().all(|v| v.id > 0));
    let mut list = Vec::<Entry>::new();
    session.retrieve(&mut list, "ORDER BY A", &[]);
    assert_eq!(list.iter().map(|v| v.a).collect::<Vec<_>>(), [1, 3, 4, 5]);
}

pub fn closed_session<C: Connection>(url: &str) {
    let session = Session::<C>::connect(url);
    let joined = session.join();
    session.create_table::<Entry>();
    session.begin();
    session.insert(&entry(1));
    crate::silent_logs! {
        session.close();
    }
    assert!(session.ok(), "{}", session.error_message());
    assert!(session.is_closed());
    assert!(joined.is_closed());
    assert!(!session.in_transaction());
    session.insert(&entry(2));
    assert_eq!(session.map_error(), Some(MapError::ConnectionClosed));
    assert_eq!(joined.map_error(), Some(MapError::ConnectionClosed));
    joined.clear_error();
    joined.end();
    assert_eq!(session.map_error(), Some(MapError::ConnectionClosed));

    // A connection that cannot be opened latches the failure
    let session;
    crate::silent_logs! {
        session = Session::<C>::connect("unknown://nowhere");
    }
    assert!(session.failed());
    assert!(session.is_closed());
    assert!(session.map_error().is_none());
}
