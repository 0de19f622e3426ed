use quote::ToTokens;
use syn::{Field, Ident, LitStr, Type, parse::ParseBuffer};

pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) column: String,
    pub(crate) primary: bool,
    pub(crate) identity: bool,
    pub(crate) enumeration: bool,
    pub(crate) ignore: bool,
}

fn flag(arg: &syn::meta::ParseNestedMeta, name: &str) {
    // value() fails for a bare path
    if arg.value().is_ok() {
        panic!("Error while parsing `{name}`, use it like: `#[stow({name})]`");
    }
}

pub(crate) fn decode_column(field: &Field) -> ColumnMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Field is expected to have a name");
    let column = ident.to_string().trim_start_matches("r#").to_string();
    let mut metadata = ColumnMetadata {
        ident,
        ty: field.ty.clone(),
        column,
        primary: false,
        identity: false,
        enumeration: false,
        ignore: false,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("stow") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `stow`, use it like: `#[stow(attribute, ...)]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("column") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!("Error while parsing `column`, use it like: `#[stow(column = \"FullName\")]`");
                    };
                    metadata.column = v.value();
                } else if arg.path.is_ident("primary") {
                    flag(&arg, "primary");
                    metadata.primary = true;
                } else if arg.path.is_ident("identity") {
                    flag(&arg, "identity");
                    metadata.identity = true;
                } else if arg.path.is_ident("enumeration") {
                    flag(&arg, "enumeration");
                    metadata.enumeration = true;
                } else if arg.path.is_ident("ignore") {
                    flag(&arg, "ignore");
                    metadata.ignore = true;
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
    metadata
}
