use rowmap::{Connection, MapError, Record, Session};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Order {
    #[rowmap(primary_key, table = "orders")]
    id: i64,
    #[rowmap(column)]
    customer: String,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
#[rowmap(index(name = "by_order", columns("order_id", "position")))]
struct Line {
    #[rowmap(primary_key, table = "lines")]
    id: i64,
    #[rowmap(column)]
    order_id: i64,
    #[rowmap(column)]
    position: u32,
    #[rowmap(column)]
    item: String,
}

fn lines(order_id: i64) -> Vec<Line> {
    ["bread", "milk"]
        .iter()
        .zip(1..)
        .map(|(item, position)| Line {
            id: 0,
            order_id,
            position,
            item: item.to_string(),
        })
        .collect()
}

pub fn joined_sessions<C: Connection>(url: &str) {
    let orders = Session::<C>::connect(url);
    let lines_session = orders.join();
    orders.create_table::<Order>();
    lines_session.create_table::<Line>();
    assert!(orders.ok(), "{}", orders.error_message());

    // One transaction spans both tables
    orders.begin();
    assert!(lines_session.in_transaction());
    let mut order = Order {
        id: 0,
        customer: "Aramis".into(),
    };
    orders.insert(&mut order);
    lines_session.insert_all(&lines(order.id));
    assert!(lines_session.in_transaction());
    lines_session.end();
    assert!(!orders.in_transaction());
    assert!(orders.ok(), "{}", orders.error_message());
    let mut stored = Vec::<Line>::new();
    assert_eq!(
        lines_session.retrieve(
            &mut stored,
            "WHERE order_id = ? ORDER BY position",
            &[order.id.into()]
        ),
        2
    );
    assert_eq!(
        stored
            .iter()
            .map(|v| (v.order_id, v.position, v.item.as_str()))
            .collect::<Vec<_>>(),
        [(order.id, 1, "bread"), (order.id, 2, "milk")]
    );

    // A rollback through one session is visible from the other
    orders.begin();
    orders.insert(&Order {
        id: 0,
        customer: "Porthos".into(),
    });
    lines_session.rollback();
    assert!(!orders.in_transaction());
    orders.commit();
    assert_eq!(orders.map_error(), Some(MapError::NoActiveTransaction));
    assert_eq!(lines_session.map_error(), Some(MapError::NoActiveTransaction));
    orders.clear_error();
    let mut list = Vec::<Order>::new();
    assert_eq!(orders.retrieve(&mut list, "", &[]), 1);

    // A failure through one session rolls back the work of both
    orders.begin();
    orders.insert(&Order {
        id: 0,
        customer: "Athos".into(),
    });
    lines_session.update(&Line::default(), &["missing"]);
    orders.end();
    assert!(matches!(
        orders.map_error(),
        Some(MapError::UnknownColumn { .. })
    ));
    assert!(!lines_session.in_transaction());
    orders.clear_error();
    list.clear();
    assert_eq!(orders.retrieve(&mut list, "", &[]), 1);
    assert_eq!(list[0].customer, "Aramis");
    assert!(lines_session.ok());
}
