use syn::{Field, Fields, Ident, ItemStruct, LitStr, Type};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    /// Column name, `None` when the field is ignored.
    pub(crate) column: Option<String>,
}

pub(crate) struct RecordMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldMetadata>,
}

impl RecordMetadata {
    pub(crate) fn columns(&self) -> impl Iterator<Item = (&FieldMetadata, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.column.as_deref().map(|c| (f, c)))
    }
}

pub(crate) fn decode_record(item: ItemStruct) -> RecordMetadata {
    let mut name = item.ident.to_string();
    for attr in item.attrs.iter().filter(|v| v.path().is_ident("record")) {
        if let Err(e) = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = meta.value()?.parse::<LitStr>()?.value();
                Ok(())
            } else {
                Err(meta.error("unsupported attribute"))
            }
        }) {
            panic!(
                "Error while parsing `record` on `{}`: {e}, use it like #[record(name = \"{}\")]",
                item.ident, item.ident
            );
        }
    }
    let Fields::Named(..) = &item.fields else {
        panic!(
            "Record can only be derived on structs with named fields, `{}` is not one",
            item.ident
        );
    };
    let fields = item.fields.iter().map(decode_field).collect();
    RecordMetadata { item, name, fields }
}

fn decode_field(field: &Field) -> FieldMetadata {
    let Some(ident) = field.ident.clone() else {
        panic!("Record fields must be named");
    };
    let mut column = Some(ident.to_string());
    for attr in field.attrs.iter().filter(|v| v.path().is_ident("record")) {
        if let Err(e) = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                column = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else if meta.path.is_ident("ignore") {
                column = None;
                Ok(())
            } else {
                Err(meta.error("unsupported attribute"))
            }
        }) {
            panic!(
                "Error while parsing `record` on field `{ident}`: {e}, use it like #[record(column = \"name\")] or #[record(ignore)]"
            );
        }
    }
    FieldMetadata {
        ident,
        ty: field.ty.clone(),
        column,
    }
}
