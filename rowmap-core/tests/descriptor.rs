#[cfg(test)]
mod tests {
    use rowmap_core::{
        Descriptor, FieldDef, IndexDef, MapError, Record, StorageClass, parse_index_tag,
    };
    use std::sync::Arc;

    fn build_error<R: Record>() -> MapError {
        Descriptor::<R>::build()
            .expect_err("the descriptor should be rejected")
            .downcast::<MapError>()
            .expect("should be a MapError")
    }

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Sample {
        id: i64,
        a: i32,
        b: String,
        c: Vec<u8>,
        ignored: Vec<String>,
    }
    impl Record for Sample {
        fn fields() -> Vec<FieldDef<Self>> {
            vec![
                FieldDef::new("id", |r: &Self| &r.id, |r: &mut Self| &mut r.id)
                    .primary_key()
                    .table("sample"),
                FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                    .column("A")
                    .index("ab1, a1"),
                FieldDef::new("b", |r: &Self| &r.b, |r: &mut Self| &mut r.b)
                    .column("*")
                    .index("ab2"),
                FieldDef::new("c", |r: &Self| &r.c, |r: &mut Self| &mut r.c).column("C"),
                FieldDef::new("ignored", |r: &Self| &r.ignored, |r: &mut Self| {
                    &mut r.ignored
                }),
            ]
        }
    }

    #[test]
    fn describe_sample() {
        let descriptor = Descriptor::<Sample>::build().unwrap();
        assert_eq!(descriptor.table(), "sample");
        assert_eq!(descriptor.primary_key().unwrap().field.name, "id");
        let columns: Vec<_> = descriptor.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, ["A", "b", "C"]);
        let storage: Vec<_> = descriptor.columns().iter().map(|c| c.scalar.storage).collect();
        assert_eq!(
            storage,
            [StorageClass::Numeric, StorageClass::Text, StorageClass::Binary]
        );
        assert_eq!(descriptor.column_list(), r#""A", "b", "C""#);
        assert_eq!(descriptor.placeholders(), "?, ?, ?");
        assert_eq!(descriptor.create_columns(), "\"A\" INTEGER,\n\"b\" TEXT,\n\"C\" BLOB");
        let indexes = descriptor.indexes();
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].name, "ab");
        assert_eq!(indexes[0].column_names().collect::<Vec<_>>(), ["A", "b"]);
        assert_eq!(indexes[1].name, "a");
        assert_eq!(indexes[1].columns, [("A".to_string(), 1)]);
    }

    #[test]
    fn describe_is_cached() {
        let first = Sample::descriptor().unwrap();
        let second = Descriptor::<Sample>::of().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn describe_concurrently() {
        #[derive(Default)]
        struct Concurrent {
            name: String,
        }
        impl Record for Concurrent {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("name", |r: &Self| &r.name, |r: &mut Self| &mut r.name)
                        .column("*")
                        .table("concurrent"),
                ]
            }
        }
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| Concurrent::descriptor().map(|v| Arc::as_ptr(&v) as usize)))
            .collect();
        let pointers: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        assert!(pointers.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn sequence_orders_index_columns() {
        #[derive(Default)]
        struct Reversed {
            x: u8,
            y: u16,
        }
        impl Record for Reversed {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("x", |r: &Self| &r.x, |r: &mut Self| &mut r.x)
                        .column("*")
                        .index("g2")
                        .table("reversed"),
                    FieldDef::new("y", |r: &Self| &r.y, |r: &mut Self| &mut r.y)
                        .column("*")
                        .index(" g1 "),
                ]
            }
        }
        let descriptor = Descriptor::<Reversed>::build().unwrap();
        assert_eq!(
            descriptor.indexes()[0].column_names().collect::<Vec<_>>(),
            ["y", "x"]
        );
        assert!(descriptor.primary_key().is_none());
    }

    #[test]
    fn structured_index() {
        #[derive(Default)]
        struct Structured {
            a: i64,
            b: f64,
        }
        impl Record for Structured {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                        .column("A")
                        .table("structured"),
                    FieldDef::new("b", |r: &Self| &r.b, |r: &mut Self| &mut r.b).column("B"),
                ]
            }
            fn indexes() -> Vec<IndexDef> {
                vec![IndexDef::new("by_ba", ["B", "A"])]
            }
        }
        let descriptor = Descriptor::<Structured>::build().unwrap();
        assert_eq!(descriptor.indexes()[0].name, "by_ba");
        assert_eq!(
            descriptor.indexes()[0].columns,
            [("B".to_string(), 1), ("A".to_string(), 2)]
        );
        assert_eq!(descriptor.columns()[1].scalar.sql_type, "REAL");
    }

    #[test]
    fn no_managed_fields() {
        #[derive(Default)]
        struct Empty {
            id: i64,
        }
        impl Record for Empty {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("id", |r: &Self| &r.id, |r: &mut Self| &mut r.id)
                        .primary_key()
                        .table("empty"),
                ]
            }
        }
        assert!(matches!(build_error::<Empty>(), MapError::NoManagedFields { .. }));
        assert!(Empty::descriptor().is_err());
    }

    #[test]
    fn missing_table_tag() {
        #[derive(Default)]
        struct NoTable {
            name: String,
        }
        impl Record for NoTable {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![FieldDef::new("name", |r: &Self| &r.name, |r: &mut Self| &mut r.name).column("*")]
            }
        }
        assert!(matches!(build_error::<NoTable>(), MapError::MissingTableTag { .. }));

        #[derive(Default)]
        struct EmptyTable {
            name: String,
        }
        impl Record for EmptyTable {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("name", |r: &Self| &r.name, |r: &mut Self| &mut r.name)
                        .column("*")
                        .table(""),
                ]
            }
        }
        assert!(matches!(build_error::<EmptyTable>(), MapError::MissingTableTag { .. }));
    }

    #[test]
    fn multiple_table_tags() {
        #[derive(Default)]
        struct TwoTables {
            a: i32,
            b: i32,
        }
        impl Record for TwoTables {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                        .column("*")
                        .table("one"),
                    FieldDef::new("b", |r: &Self| &r.b, |r: &mut Self| &mut r.b)
                        .column("*")
                        .table("two"),
                ]
            }
        }
        assert!(matches!(build_error::<TwoTables>(), MapError::MultipleTableTags { .. }));
    }

    #[test]
    fn primary_key_errors() {
        #[derive(Default)]
        struct TwoKeys {
            a: i64,
            b: i64,
            c: i32,
        }
        impl Record for TwoKeys {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a).primary_key(),
                    FieldDef::new("b", |r: &Self| &r.b, |r: &mut Self| &mut r.b).primary_key(),
                    FieldDef::new("c", |r: &Self| &r.c, |r: &mut Self| &mut r.c)
                        .column("*")
                        .table("two_keys"),
                ]
            }
        }
        assert!(matches!(build_error::<TwoKeys>(), MapError::MultiplePrimaryKeyTags { .. }));

        #[derive(Default)]
        struct NarrowKey {
            id: i32,
            c: i32,
        }
        impl Record for NarrowKey {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("id", |r: &Self| &r.id, |r: &mut Self| &mut r.id).primary_key(),
                    FieldDef::new("c", |r: &Self| &r.c, |r: &mut Self| &mut r.c)
                        .column("*")
                        .table("narrow_key"),
                ]
            }
        }
        assert_eq!(
            build_error::<NarrowKey>(),
            MapError::PrimaryKeyTypeMismatch {
                field: "id",
                found: "i32"
            }
        );
    }

    #[test]
    fn unsupported_field_type() {
        #[derive(Default)]
        struct Nested {
            tags: Vec<String>,
        }
        impl Record for Nested {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("tags", |r: &Self| &r.tags, |r: &mut Self| &mut r.tags)
                        .column("*")
                        .table("nested"),
                ]
            }
        }
        assert!(matches!(
            build_error::<Nested>(),
            MapError::UnsupportedFieldType { field: "tags", .. }
        ));
    }

    #[test]
    fn duplicate_column() {
        #[derive(Default)]
        struct Twice {
            a: i32,
            b: i32,
        }
        impl Record for Twice {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                        .column("X")
                        .table("twice"),
                    FieldDef::new("b", |r: &Self| &r.b, |r: &mut Self| &mut r.b).column("X"),
                ]
            }
        }
        assert_eq!(
            build_error::<Twice>(),
            MapError::DuplicateColumn { column: "X".into() }
        );
    }

    #[test]
    fn index_errors() {
        #[derive(Default)]
        struct Malformed {
            a: i32,
        }
        impl Record for Malformed {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                        .column("*")
                        .index("good1, bad")
                        .table("malformed"),
                ]
            }
        }
        assert_eq!(
            build_error::<Malformed>(),
            MapError::MalformedIndexTag {
                field: "a",
                segment: "bad".into()
            }
        );

        #[derive(Default)]
        struct SameSequence {
            a: i32,
            b: i32,
        }
        impl Record for SameSequence {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                        .column("*")
                        .index("g1")
                        .table("same_sequence"),
                    FieldDef::new("b", |r: &Self| &r.b, |r: &mut Self| &mut r.b)
                        .column("*")
                        .index("g1"),
                ]
            }
        }
        assert_eq!(
            build_error::<SameSequence>(),
            MapError::DuplicateIndexSequence {
                index: "g".into(),
                sequence: 1
            }
        );

        #[derive(Default)]
        struct UnknownIndexColumn {
            a: i32,
        }
        impl Record for UnknownIndexColumn {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                        .column("*")
                        .index("g1")
                        .table("unknown_index_column"),
                ]
            }
            fn indexes() -> Vec<IndexDef> {
                vec![IndexDef::new("g", ["a"]), IndexDef::new("h", ["z"])]
            }
        }
        assert_eq!(
            build_error::<UnknownIndexColumn>(),
            MapError::DuplicateIndex { index: "g".into() }
        );

        #[derive(Default)]
        struct MissingIndexColumn {
            a: i32,
        }
        impl Record for MissingIndexColumn {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                        .column("*")
                        .table("missing_index_column"),
                ]
            }
            fn indexes() -> Vec<IndexDef> {
                vec![IndexDef::new("h", ["a", "z"])]
            }
        }
        assert_eq!(
            build_error::<MissingIndexColumn>(),
            MapError::UnknownColumn {
                table: "missing_index_column".into(),
                column: "z".into()
            }
        );
    }

    #[test]
    fn row_id_column_is_reserved() {
        #[derive(Default)]
        struct Shadowing {
            id: i64,
            row: i64,
        }
        impl Record for Shadowing {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("id", |r: &Self| &r.id, |r: &mut Self| &mut r.id)
                        .primary_key()
                        .table("shadowing"),
                    FieldDef::new("row", |r: &Self| &r.row, |r: &mut Self| &mut r.row)
                        .column("RowId"),
                ]
            }
        }
        assert_eq!(
            build_error::<Shadowing>(),
            MapError::ReservedColumn {
                column: "RowId".into()
            }
        );
    }

    #[test]
    fn index_name_leading_underscore() {
        #[derive(Default)]
        struct Hidden {
            a: i32,
        }
        impl Record for Hidden {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                        .column("*")
                        .index("_c1")
                        .table("hidden"),
                ]
            }
        }
        assert_eq!(
            build_error::<Hidden>(),
            MapError::InvalidIndexName { index: "_c".into() }
        );

        #[derive(Default)]
        struct HiddenStructured {
            a: i32,
        }
        impl Record for HiddenStructured {
            fn fields() -> Vec<FieldDef<Self>> {
                vec![
                    FieldDef::new("a", |r: &Self| &r.a, |r: &mut Self| &mut r.a)
                        .column("*")
                        .table("hidden_structured"),
                ]
            }
            fn indexes() -> Vec<IndexDef> {
                vec![IndexDef::new("", ["a"])]
            }
        }
        assert_eq!(
            build_error::<HiddenStructured>(),
            MapError::InvalidIndexName { index: "".into() }
        );
    }

    #[test]
    fn index_tag_grammar() {
        assert_eq!(
            parse_index_tag("f", "name1, other2").unwrap(),
            [("name".to_string(), 1), ("other".to_string(), 2)]
        );
        assert_eq!(parse_index_tag("f", "*").unwrap(), [("f".to_string(), 1)]);
        assert_eq!(parse_index_tag("f", "by_date10").unwrap(), [("by_date".to_string(), 10)]);
        assert!(parse_index_tag("f", "1").is_err());
        assert!(parse_index_tag("f", "name").is_err());
        assert!(parse_index_tag("f", "na1me2").is_err());
        assert!(parse_index_tag("f", "").is_err());
    }
}
