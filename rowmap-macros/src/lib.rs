mod decode_field;
mod decode_record;

use decode_record::decode_record;
use proc_macro::TokenStream;
use quote::quote;
use syn::{Error, Fields, ItemStruct, parse_macro_input};

/// Implements `rowmap::Record` from `#[rowmap(...)]` annotations.
///
/// Field attributes: `table = "name"`, `primary_key`, `column` or `column = "name"`,
/// `index` or `index = "group1, other2"`. Struct attribute:
/// `index(name = "group", columns("A", "B"))`. Fields without attributes are not mapped.
#[proc_macro_derive(Record, attributes(rowmap))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    if !item.generics.params.is_empty() {
        return Error::new_spanned(&item.generics, "Record cannot be derived for a generic struct")
            .to_compile_error()
            .into();
    }
    if !matches!(item.fields, Fields::Named(..)) {
        return Error::new_spanned(&item.ident, "Record can only be derived for a struct with named fields")
            .to_compile_error()
            .into();
    }
    let name = &item.ident;
    let metadata = decode_record(&item);
    let fields = metadata.fields.iter().map(|field| {
        let ident = &field.ident;
        let field_name = &field.name;
        let table = field.table.as_ref().map(|v| quote!(.table(#v)));
        let primary_key = field.primary_key.then(|| quote!(.primary_key()));
        let column = field.column.as_ref().map(|v| quote!(.column(#v)));
        let index = field.index.as_ref().map(|v| quote!(.index(#v)));
        quote! {
            ::rowmap::FieldDef::<Self>::new(
                #field_name,
                |record: &Self| &record.#ident,
                |record: &mut Self| &mut record.#ident,
            )
            #table
            #primary_key
            #column
            #index
        }
    });
    let indexes = metadata.indexes.iter().map(|index| {
        let index_name = &index.name;
        let columns = &index.columns;
        quote!(::rowmap::IndexDef::new(#index_name, [#(#columns),*]))
    });
    quote! {
        impl ::rowmap::Record for #name {
            fn fields() -> ::std::vec::Vec<::rowmap::FieldDef<Self>> {
                ::std::vec![#(#fields),*]
            }
            fn indexes() -> ::std::vec::Vec<::rowmap::IndexDef> {
                ::std::vec![#(#indexes),*]
            }
        }
    }
    .into()
}
