use crate::decode_record::RecordMetadata;
use proc_macro2::TokenStream;
use quote::quote;

pub(crate) fn from_model(record: &RecordMetadata) -> TokenStream {
    let struct_name = &record.item.ident;
    let record_name = &record.name;
    let holders = record.columns().map(|(f, _)| {
        let ident = &f.ident;
        let ty = &f.ty;
        quote! {
            let mut #ident: Option<#ty> = None;
        }
    });
    let assignments = record.columns().map(|(f, column)| {
        let ident = &f.ident;
        let ty = &f.ty;
        quote! {
            if __n__ == #column {
                #ident = Some(
                    <#ty as ::sqlbind::AsValue>::try_from_value(__v__).with_context(|| {
                        format!("While reading the column `{}` of `{}`", #column, #record_name)
                    })?,
                );
                continue;
            }
        }
    });
    let fields = record.fields.iter().map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        match &f.column {
            Some(column) => quote! {
                #ident: match #ident {
                    Some(v) => v,
                    None => <#ty as ::sqlbind::AsValue>::try_from_value(::sqlbind::Value::Null)
                        .with_context(|| {
                            format!("Column `{}` is missing from the `{}` row", #column, #record_name)
                        })?,
                }
            },
            None => quote!(#ident: Default::default()),
        }
    });
    quote! {
        fn from_model(model: ::sqlbind::Model) -> ::sqlbind::Result<Self> {
            use ::sqlbind::Context;
            model.expect_type(#record_name)?;
            #(#holders)*
            for (__n__, __v__) in model {
                #(#assignments)*
                return Err(::sqlbind::Error::new(::sqlbind::StatementError::UnknownField {
                    record: #record_name.into(),
                    field: __n__,
                }));
            }
            Ok(#struct_name {
                #(#fields,)*
            })
        }
    }
}
