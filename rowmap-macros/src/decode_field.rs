use quote::ToTokens;
use syn::{Field, Ident, LitStr, Token, ext::IdentExt, parse::ParseBuffer};

/// Annotations found on one field by `#[rowmap(...)]`.
pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) name: String,
    pub(crate) table: Option<String>,
    pub(crate) primary_key: bool,
    pub(crate) column: Option<String>,
    pub(crate) index: Option<String>,
}

/// Wildcard unless written as `key = "value"`.
fn optional_value(arg: &syn::meta::ParseNestedMeta, usage: &str) -> String {
    if !arg.input.peek(Token![=]) {
        return "*".into();
    }
    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
        panic!("Error while parsing `{}`, use it like: {}", arg.path.to_token_stream(), usage);
    };
    value.value()
}

/// `None` for fields without any `rowmap` attribute, those are not mapped.
pub fn decode_field(field: &Field) -> Option<FieldMetadata> {
    let ident = field
        .ident
        .clone()
        .expect("Field is expected to have a name");
    let mut metadata = FieldMetadata {
        name: ident.unraw().to_string(),
        ident,
        table: None,
        primary_key: false,
        column: None,
        index: None,
    };
    let mut annotated = false;
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("rowmap") {
            continue;
        }
        annotated = true;
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `rowmap`, use it like: `#[rowmap(attribute = value, ...)]`");
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("table") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `table`, use it like: `#[rowmap(table = \"my_table\")]`");
                };
                metadata.table = Some(v.value());
            } else if arg.path.is_ident("primary_key") {
                let Err(..) = arg.value() else {
                    // value() is Err for a bare path
                    panic!("Error while parsing `primary_key`, use it like: `#[rowmap(primary_key)]`");
                };
                metadata.primary_key = true;
            } else if arg.path.is_ident("column") {
                metadata.column = Some(optional_value(
                    &arg,
                    "`#[rowmap(column)]` or `#[rowmap(column = \"MyColumn\")]`",
                ));
            } else if arg.path.is_ident("index") {
                metadata.index = Some(optional_value(
                    &arg,
                    "`#[rowmap(index)]` or `#[rowmap(index = \"by_date1, by_name2\")]`",
                ));
            } else {
                panic!(
                    "Unknown attribute `{}` inside rowmap macro",
                    arg.path.to_token_stream()
                );
            }
            Ok(())
        });
    }
    annotated.then_some(metadata)
}
