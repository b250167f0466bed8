mod decode_record;
mod from_model;

use decode_record::decode_record;
use from_model::from_model;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Implements `sqlbind::Record` for a struct with named fields.
///
/// The struct becomes a closed record type: a row carrying a column that is
/// not one of its fields fails with `StatementError::UnknownField`.
///
/// - `#[record(name = "User")]` on the struct sets the record type name
///   (defaults to the struct name).
/// - `#[record(column = "user_name")]` on a field reads a differently named column.
/// - `#[record(ignore)]` on a field skips it, it is filled with `Default::default()`.
///
/// A column missing from the row leaves `Option` fields as `None` and is an
/// error for any other field.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let record = decode_record(parse_macro_input!(input as ItemStruct));
    let name = &record.item.ident;
    let (impl_generics, ty_generics, where_clause) = record.item.generics.split_for_impl();
    let record_name = &record.name;
    let columns = record.columns().map(|(_, column)| column);
    let from_model = from_model(&record);
    quote! {
        impl #impl_generics ::sqlbind::Record for #name #ty_generics #where_clause {
            fn record_type() -> ::std::sync::Arc<::sqlbind::RecordType> {
                static RECORD_TYPE: ::std::sync::LazyLock<::std::sync::Arc<::sqlbind::RecordType>> =
                    ::std::sync::LazyLock::new(|| {
                        let columns: &[&'static str] = &[#(#columns),*];
                        ::std::sync::Arc::new(::sqlbind::RecordType::closed(
                            #record_name,
                            columns.iter().copied(),
                        ))
                    });
                RECORD_TYPE.clone()
            }

            #from_model
        }
    }
    .into()
}
