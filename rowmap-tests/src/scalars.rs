use rowmap::{Connection, Database, MapError, Record};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Scalars {
    #[rowmap(primary_key, table = "scalars")]
    id: i64,
    #[rowmap(column)]
    alpha: bool,
    #[rowmap(column)]
    bravo: i8,
    #[rowmap(column)]
    charlie: u16,
    #[rowmap(column)]
    delta: u32,
    #[rowmap(column)]
    echo: u64,
    #[rowmap(column)]
    foxtrot: isize,
    #[rowmap(column)]
    golf: usize,
    #[rowmap(column)]
    hotel: f32,
    #[rowmap(column)]
    india: f64,
    #[rowmap(column, index)]
    juliet: String,
    #[rowmap(column)]
    kilo: Vec<u8>,
    /// Not mapped, never stored nor read.
    lima: u128,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Narrow {
    #[rowmap(primary_key, table = "scalars")]
    id: i64,
    #[rowmap(column)]
    bravo: i8,
    #[rowmap(column = "delta")]
    narrow: u8,
}

pub fn scalars<C: Connection>(url: &str) {
    let mut db = Database::<C>::connect(url).expect("Could not connect");
    db.create_table::<Scalars>()
        .expect("Failed to create the scalars table");

    // Scalars 1
    let mut first = Scalars {
        id: 0,
        alpha: true,
        bravo: -128,
        charlie: 65535,
        delta: 4_000_000_000,
        echo: i64::MAX as u64,
        foxtrot: -77,
        golf: 77,
        hotel: 1.5,
        india: -0.125,
        juliet: "It's \"quoted\" ✓".into(),
        kilo: (0..=255).collect(),
        lima: 99,
    };
    db.insert(&mut first).expect("Failed to insert scalars 1");

    // Scalars 2
    let mut second = Scalars::default();
    db.insert(&mut second).expect("Failed to insert scalars 2");
    assert!(second.id > first.id);

    let mut list = Vec::<Scalars>::new();
    db.retrieve(&mut list, "ORDER BY rowid", &[])
        .expect("Failed to select the scalars");
    assert_eq!(list.len(), 2);
    let expected = Scalars { lima: 0, ..first };
    assert_eq!(list[0], expected);
    assert_eq!(list[0].kilo.len(), 256);
    assert_eq!(list[1], second);
    assert!(list[1].juliet.is_empty());
    assert!(list[1].kilo.is_empty());

    // Blob and text as arguments
    list.clear();
    db.retrieve(
        &mut list,
        "WHERE kilo = ? AND juliet = ?",
        &[expected.kilo.clone().into(), expected.juliet.clone().into()],
    )
    .expect("Failed to select by blob");
    assert_eq!(list, [expected]);

    // A value out of the range of the field fails the scan
    let mut narrow = Narrow::default();
    let error = db
        .query_row(&mut narrow, "WHERE rowid = ?", &[first.id.into()])
        .expect_err("Reading 4000000000 into a u8 should fail")
        .downcast::<MapError>()
        .expect("Should be a MapError");
    assert!(matches!(
        error,
        MapError::ArgumentTypeMismatch { expected: "u8", .. }
    ));
    db.query_row(&mut narrow, "WHERE rowid = ?", &[second.id.into()])
        .expect("Failed to read a value in range");
    assert_eq!(
        narrow,
        Narrow {
            id: second.id,
            bravo: 0,
            narrow: 0
        }
    );

    // u64 values past the signed range cannot be stored
    let mut big = Scalars {
        echo: u64::MAX,
        ..Default::default()
    };
    crate::silent_logs! {
        assert!(db.insert(&mut big).is_err());
    }
    assert_eq!(big.id, 0);
}
