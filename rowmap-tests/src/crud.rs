use rowmap::{Connection, Database, Record};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Triple {
    #[rowmap(primary_key, table = "triple")]
    id: i64,
    #[rowmap(column = "A")]
    a: i64,
    #[rowmap(column = "B")]
    b: i64,
    #[rowmap(column = "C")]
    c: i64,
}

impl Triple {
    fn new(v: i64) -> Self {
        Self {
            id: 0,
            a: v,
            b: v + 1,
            c: v + 2,
        }
    }
}

pub fn crud<C: Connection>(url: &str) {
    let mut db = Database::<C>::connect(url).expect("Could not connect");

    // Setup
    db.create_table::<Triple>()
        .expect("Failed to create the triple table");
    let mut list = Vec::<Triple>::new();
    assert_eq!(
        db.retrieve(&mut list, "", &[])
            .expect("Failed to select from an empty table"),
        0
    );
    assert!(list.is_empty());

    // Insert
    let mut record = Triple::new(2);
    let result = db.insert(&mut record).expect("Failed to insert");
    assert_eq!(result.rows_affected, 1);
    assert!(record.id > 0);
    assert_eq!(result.last_affected_id, Some(record.id));
    let mut found = Triple::default();
    db.query_row(&mut found, "WHERE rowid = ?", &[record.id.into()])
        .expect("Failed to select by id");
    assert_eq!(found, record);

    // Inserting by value leaves the record untouched
    let other = Triple::new(5);
    let result = db.insert(&other).expect("Failed to insert by value");
    assert_eq!(result.rows_affected, 1);
    assert_eq!(other.id, 0);

    // Update B and C only
    let mut changed = record.clone();
    changed.a += 1000;
    changed.b += 1000;
    changed.c += 1000;
    let result = db
        .update(&changed, &["B", "C"])
        .expect("Failed to update B and C");
    assert_eq!(result.rows_affected, 1);
    db.query_row(&mut found, "WHERE rowid = ?", &[record.id.into()])
        .expect("Failed to select the updated record");
    assert_eq!(
        found,
        Triple {
            id: record.id,
            a: 2,
            b: 1003,
            c: 1004,
        }
    );

    // Update every column
    changed.a += 1000;
    changed.b += 1000;
    changed.c += 1000;
    db.update(&changed, &["*"])
        .expect("Failed to update every column");
    db.query_row(&mut found, "WHERE rowid = ?", &[record.id.into()])
        .expect("Failed to select the updated record");
    assert_eq!(found, changed);
    assert_eq!((found.a, found.b, found.c), (2002, 2003, 2004));

    // Delete
    db.truncate::<Triple>().expect("Failed to truncate");
    db.insert_all((0..5).map(Triple::new).collect::<Vec<_>>().iter())
        .expect("Failed to insert the records");
    let mut before = Vec::new();
    db.retrieve::<Triple>(&mut before, "ORDER BY A", &[])
        .expect("Failed to select the records");
    assert_eq!(before.iter().map(|v| v.a).collect::<Vec<_>>(), [0, 1, 2, 3, 4]);
    let matching = before.iter().filter(|v| v.a == 0 || v.a == 4).count();
    let result = db
        .delete::<Triple>("WHERE A = ? OR A = ?", &[0i64.into(), 4i64.into()])
        .expect("Failed to delete");
    assert_eq!(result.rows_affected as usize, matching);
    let mut after = Vec::new();
    db.retrieve::<Triple>(&mut after, "ORDER BY A", &[])
        .expect("Failed to select the records");
    assert_eq!(before.len() - matching, after.len());
    assert_eq!(
        after
            .iter()
            .map(|v| (v.a, v.b, v.c))
            .collect::<Vec<_>>(),
        [(1, 2, 3), (2, 3, 4), (3, 4, 5)]
    );

    // Retrieve appends
    db.retrieve::<Triple>(&mut after, "WHERE A = ?", &[2i64.into()])
        .expect("Failed to select one record");
    assert_eq!(after.len(), 4);
    assert_eq!(after[3], after[1]);

    // Truncate
    let result = db.truncate::<Triple>().expect("Failed to truncate");
    assert_eq!(result.rows_affected, 3);
    let mut list = Vec::new();
    db.retrieve::<Triple>(&mut list, "", &[])
        .expect("Failed to select after truncate");
    assert!(list.is_empty());

    // Insert or replace
    let mut record = Triple::new(7);
    let result = db
        .insert_or_replace(&mut record)
        .expect("Failed to insert or replace");
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_affected_id, Some(record.id));

    // Creating the table again discards its content
    db.create_table::<Triple>()
        .expect("Failed to create the triple table again");
    db.retrieve::<Triple>(&mut list, "", &[])
        .expect("Failed to select from the new table");
    assert!(list.is_empty());

    // Statements are compiled once per text
    let cached = db.cached_statements();
    db.retrieve::<Triple>(&mut list, "", &[])
        .expect("Failed to select from the new table");
    assert_eq!(db.cached_statements(), cached);

    db.close().expect("Failed to close the connection");
}
