#[cfg(test)]
mod tests {
    use rowmap::{Descriptor, IndexDef, MapError, Record, RecordRef, Tags, Value, insert_args};

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    #[rowmap(index(name = "by_city", columns("city", "Street")))]
    struct Customer {
        #[rowmap(primary_key, table = "customer")]
        id: i64,
        #[rowmap(column, index = "by_name2")]
        first_name: String,
        #[rowmap(column = "Last", index = "by_name1")]
        last_name: String,
        #[rowmap(column)]
        city: String,
        #[rowmap(column = "Street")]
        street: String,
        #[rowmap(column)]
        r#type: u8,
        notes: String,
    }

    #[test]
    fn derived_fields() {
        let fields = Customer::fields();
        assert_eq!(
            fields.iter().map(|v| v.name).collect::<Vec<_>>(),
            ["id", "first_name", "last_name", "city", "street", "type"]
        );
        assert_eq!(
            fields[0].tags,
            Tags {
                table: Some("customer"),
                primary_key: true,
                column: None,
                index: None,
            }
        );
        assert_eq!(
            fields[1].tags,
            Tags {
                table: None,
                primary_key: false,
                column: Some("*"),
                index: Some("by_name2"),
            }
        );
        assert_eq!(fields[2].tags.column, Some("Last"));
        assert_eq!(fields[5].type_name, "u8");
        assert_eq!(
            Customer::indexes(),
            [IndexDef::new("by_city", ["city", "Street"])]
        );
    }

    #[test]
    fn derived_descriptor() {
        let descriptor = Customer::descriptor().expect("Customer should be describable");
        assert_eq!(descriptor.table(), "customer");
        assert_eq!(descriptor.primary_key().map(|v| v.name.as_str()), Some("id"));
        assert_eq!(
            descriptor
                .columns()
                .iter()
                .map(|v| v.name.as_str())
                .collect::<Vec<_>>(),
            ["first_name", "Last", "city", "Street", "type"]
        );
        let indexes = descriptor.indexes();
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].name, "by_name");
        assert_eq!(
            indexes[0].column_names().collect::<Vec<_>>(),
            ["Last", "first_name"]
        );
        assert_eq!(indexes[1].name, "by_city");
        assert_eq!(
            indexes[1].column_names().collect::<Vec<_>>(),
            ["city", "Street"]
        );
        assert!(std::sync::Arc::ptr_eq(
            &descriptor,
            &Descriptor::<Customer>::of().unwrap()
        ));
    }

    #[test]
    fn derived_accessors() {
        let mut customer = Customer {
            id: 0,
            first_name: "Olivia".into(),
            last_name: "Black".into(),
            city: "Rome".into(),
            street: "Via Appia".into(),
            r#type: 3,
            notes: "not stored".into(),
        };
        let descriptor = Customer::descriptor().unwrap();
        let args = insert_args(&descriptor, RecordRef::from(&mut customer)).unwrap();
        assert_eq!(
            args.values,
            [
                Value::Varchar("Olivia".into()),
                Value::Varchar("Black".into()),
                Value::Varchar("Rome".into()),
                Value::Varchar("Via Appia".into()),
                Value::UInt8(3),
            ]
        );
        args.write_back.unwrap().write(17).unwrap();
        assert_eq!(customer.id, 17);
        assert_eq!(customer.notes, "not stored");
    }

    #[test]
    fn derived_errors() {
        #[derive(Record)]
        struct Unsupported {
            #[rowmap(column, table = "unsupported")]
            value: Option<i32>,
        }
        #[derive(Record)]
        struct TwoTables {
            #[rowmap(column, table = "a")]
            a: i32,
            #[rowmap(column, table = "b")]
            b: i32,
        }
        #[derive(Record)]
        struct BadIndex {
            #[rowmap(column, table = "bad_index", index = "12")]
            a: i32,
        }
        #[derive(Record)]
        #[rowmap(index(name = "by_z", columns("z")))]
        struct UnknownIndexColumn {
            #[rowmap(column, table = "unknown_index_column")]
            a: i32,
        }

        let error = |e: rowmap::Error| e.downcast::<MapError>().unwrap();
        assert!(matches!(
            error(Unsupported::descriptor().unwrap_err()),
            MapError::UnsupportedFieldType { field: "value", .. }
        ));
        assert!(matches!(
            error(TwoTables::descriptor().unwrap_err()),
            MapError::MultipleTableTags { .. }
        ));
        assert_eq!(
            error(BadIndex::descriptor().unwrap_err()),
            MapError::MalformedIndexTag {
                field: "a",
                segment: "12".into()
            }
        );
        assert_eq!(
            error(UnknownIndexColumn::descriptor().unwrap_err()),
            MapError::UnknownColumn {
                table: "unknown_index_column".into(),
                column: "z".into()
            }
        );
    }
}
