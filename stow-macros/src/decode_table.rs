use crate::decode_column::{ColumnMetadata, decode_column};
use quote::ToTokens;
use syn::{Fields, ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) name: String,
    /// Every named field, ignored ones included.
    pub(crate) columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// The mapped columns, in declaration order.
    pub(crate) fn properties(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| !c.ignore)
    }
}

pub(crate) fn decode_table(item: ItemStruct) -> TableMetadata {
    let Fields::Named(..) = &item.fields else {
        panic!("Entity `{}` must be a struct with named fields", item.ident);
    };
    let columns = item.fields.iter().map(decode_column).collect();
    let mut name = item.ident.to_string();
    for attr in &item.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("stow") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `stow`, use it like: `#[stow(table = \"People\")]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("table") {
                    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `table`, use it like: `#[stow(table = \"[dbo].[People]\")]`"
                        );
                    };
                    name = value.value();
                } else {
                    panic!(
                        "Unknown attribute `{}` inside stow macro",
                        arg.path.to_token_stream()
                    );
                }
                Ok(())
            });
        }
    }
    TableMetadata {
        item,
        name,
        columns,
    }
}
