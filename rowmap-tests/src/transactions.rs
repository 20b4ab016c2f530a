use rowmap::{Connection, Database, MapError, Record};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Account {
    #[rowmap(primary_key, table = "account")]
    id: i64,
    #[rowmap(column, index)]
    owner: String,
    #[rowmap(column)]
    balance: i64,
}

fn map_error(error: rowmap::Error) -> MapError {
    error.downcast::<MapError>().expect("Should be a MapError")
}

fn count<C: Connection>(db: &mut Database<C>) -> usize {
    let mut list = Vec::<Account>::new();
    db.retrieve(&mut list, "", &[])
        .expect("Failed to select the accounts")
}

pub fn transactions<C: Connection>(url: &str) {
    let mut db = Database::<C>::connect(url).expect("Could not connect");
    db.create_table::<Account>()
        .expect("Failed to create the account table");

    // Guards
    assert_eq!(
        map_error(db.commit().expect_err("Commit without a transaction")),
        MapError::NoActiveTransaction
    );
    assert_eq!(
        map_error(db.rollback().expect_err("Rollback without a transaction")),
        MapError::NoActiveTransaction
    );
    db.begin().expect("Could not begin a transaction");
    assert!(db.in_transaction());
    assert_eq!(
        map_error(db.begin().expect_err("Nested begin")),
        MapError::NestedTransaction
    );
    assert!(db.in_transaction());

    // Rollback discards
    let mut account = Account {
        id: 0,
        owner: "first".into(),
        balance: 100,
    };
    db.insert(&mut account).expect("Failed to insert");
    assert_eq!(count(&mut db), 1);
    db.rollback().expect("Failed to rollback");
    assert!(!db.in_transaction());
    assert_eq!(count(&mut db), 0);

    // Commit keeps
    db.begin().expect("Could not begin a transaction");
    db.insert(&mut account).expect("Failed to insert");
    db.end(true).expect("Failed to end the transaction");
    assert_eq!(count(&mut db), 1);

    // Statements run inside a caller transaction do not finish it
    db.begin().expect("Could not begin a transaction");
    account.balance = 50;
    db.update(&account, &["balance"]).expect("Failed to update");
    db.insert_all(&[account.clone(), account.clone()])
        .expect("Failed to insert");
    db.delete::<Account>("WHERE balance > ?", &[60i64.into()])
        .expect("Failed to delete");
    assert!(db.in_transaction());
    assert_eq!(count(&mut db), 3);
    db.end(false).expect("Failed to end the transaction");
    assert!(!db.in_transaction());
    let mut list = Vec::<Account>::new();
    db.retrieve(&mut list, "", &[])
        .expect("Failed to select the accounts");
    assert_eq!(list, [Account { balance: 100, ..account.clone() }]);

    // Closing with an open transaction rolls it back
    db.begin().expect("Could not begin a transaction");
    db.truncate::<Account>().expect("Failed to truncate");
    crate::silent_logs! {
        db.close().expect("Failed to close the connection");
    }
}
