use rowmap::{Connection, Record, Session};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Musketeer {
    #[rowmap(primary_key, table = "rec")]
    id: i64,
    #[rowmap(column = "Name", index)]
    name: String,
}

pub fn musketeers<C: Connection>(url: &str) {
    let session = Session::<C>::connect(url);
    session.create_table::<Musketeer>();
    let mut musketeers = ["Athos", "Porthos", "Aramis"].map(|name| Musketeer {
        id: 0,
        name: name.into(),
    });
    session.insert_all(&mut musketeers);
    let mut list = Vec::<Musketeer>::new();
    session.retrieve(&mut list, "WHERE Name LIKE ? ORDER BY Name", &["A%".into()]);
    assert!(session.ok(), "{}", session.error_message());
    assert_eq!(
        list.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
        ["Aramis", "Athos"]
    );
    assert_eq!(list, [musketeers[2].clone(), musketeers[0].clone()]);

    // The literal form of the same filter
    list.clear();
    session.retrieve(&mut list, "WHERE Name LIKE 'A%' ORDER BY Name;", &[]);
    assert_eq!(list.len(), 2);

    // Recreating drops the data and the index, then builds both again
    session.trace(true);
    session.create_table::<Musketeer>();
    session.trace(false);
    list.clear();
    assert_eq!(session.retrieve(&mut list, "", &[]), 0);
    assert!(session.ok(), "{}", session.error_message());
    session.close();
    assert!(session.ok(), "{}", session.error_message());
}
