use rowmap::{Connection, Record, Session};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Sample {
    #[rowmap(primary_key, table = "sample")]
    id: i64,
    #[rowmap(column, index = "by_label1")]
    label: String,
    #[rowmap(column)]
    counter: u64,
}

fn samples() -> Vec<Sample> {
    (0..100)
        .map(|i| Sample {
            id: 0,
            label: format!("*** {:4} ***", i),
            counter: i,
        })
        .collect()
}

pub fn bulk_insert<C: Connection>(url: &str) {
    let session = Session::<C>::connect(url);
    session.create_table::<Sample>();
    assert!(session.ok(), "{}", session.error_message());

    // All or nothing
    let mut list = samples();
    list[50].counter = u64::MAX;
    let result;
    crate::silent_logs! {
        result = session.insert_all(&mut list);
    }
    assert_eq!(result.rows_affected, 0);
    assert!(session.failed());
    assert!(!session.in_transaction());
    assert!(list.iter().all(|v| v.id == 0 || v.counter < 50));
    session.clear_error();
    let mut stored = Vec::<Sample>::new();
    assert_eq!(session.retrieve(&mut stored, "", &[]), 0);
    assert!(session.ok());

    // Every record gets its identifier
    let mut list = samples();
    let result = session.insert_all(&mut list);
    assert!(session.ok(), "{}", session.error_message());
    assert_eq!(result, session.result());
    assert_eq!(result.rows_affected, 100);
    assert_eq!(result.last_affected_id, Some(list[99].id));
    assert!(list.windows(2).all(|w| w[0].id < w[1].id));

    session.retrieve(
        &mut stored,
        "WHERE counter > ? AND counter < ? ORDER BY counter",
        &[95u64.into(), 99u64.into()],
    );
    assert!(session.ok(), "{}", session.error_message());
    assert_eq!(
        stored.iter().map(|v| v.label.as_str()).collect::<Vec<_>>(),
        ["***   96 ***", "***   97 ***", "***   98 ***"]
    );
    assert_eq!(stored[0], list[96]);
}
