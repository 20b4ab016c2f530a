use crate::decode_field::{FieldMetadata, decode_field};
use quote::ToTokens;
use syn::{ItemStruct, LitStr, Token, parenthesized, parse::Parse};

pub(crate) struct IndexMetadata {
    pub(crate) name: String,
    pub(crate) columns: Vec<String>,
}

pub(crate) struct RecordMetadata {
    pub(crate) fields: Vec<FieldMetadata>,
    pub(crate) indexes: Vec<IndexMetadata>,
}

const INDEX_USAGE: &str = "`#[rowmap(index(name = \"by_ab\", columns(\"A\", \"B\")))]`";

pub fn decode_record(item: &ItemStruct) -> RecordMetadata {
    let fields = item.fields.iter().filter_map(decode_field).collect();
    let mut indexes = Vec::new();
    for attr in &item.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("rowmap") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `rowmap`, use it like: {}", INDEX_USAGE);
        };
        let _ = list.parse_nested_meta(|arg| {
            if !arg.path.is_ident("index") {
                panic!(
                    "Unknown attribute `{}` inside rowmap macro on a struct",
                    arg.path.to_token_stream()
                );
            }
            let mut index = IndexMetadata {
                name: String::new(),
                columns: Vec::new(),
            };
            let parsed = arg.parse_nested_meta(|inner| {
                if inner.path.is_ident("name") {
                    index.name = inner.value()?.parse::<LitStr>()?.value();
                } else if inner.path.is_ident("columns") {
                    let content;
                    parenthesized!(content in inner.input);
                    index.columns = content
                        .parse_terminated(<LitStr as Parse>::parse, Token![,])?
                        .into_iter()
                        .map(|v| v.value())
                        .collect();
                } else {
                    return Err(inner.error("expected `name` or `columns`"));
                }
                Ok(())
            });
            if parsed.is_err() || index.name.is_empty() || index.columns.is_empty() {
                panic!("Error while parsing `index`, use it like: {}", INDEX_USAGE);
            }
            indexes.push(index);
            Ok(())
        });
    }
    RecordMetadata { fields, indexes }
}
