use crate::decode_table::TableMetadata;
use proc_macro2::TokenStream;
use quote::quote;

pub(crate) fn entity_trait(table: &TableMetadata) -> TokenStream {
    let name = &table.item.ident;
    let table_name = &table.name;
    let properties: Vec<_> = table.properties().collect();
    let defs = properties.iter().map(|c| {
        let ident = c.ident.to_string();
        let column = &c.column;
        let ty = &c.ty;
        let primary = c.primary;
        let identity = c.identity;
        let (nullable, value) = if c.enumeration {
            (quote!(false), quote!(::stow::Value::Varchar(None)))
        } else {
            (
                quote!(<#ty as ::stow::AsValue>::is_nullable()),
                quote!(<#ty as ::stow::AsValue>::as_empty_value()),
            )
        };
        let enumeration = c.enumeration;
        quote! {
            ::stow::PropertyDef {
                name: #ident,
                column: #column,
                primary: #primary,
                identity: #identity,
                nullable: #nullable,
                value: #value,
                enumeration: #enumeration,
                type_id: ::std::any::TypeId::of::<#ty>(),
            }
        }
    });
    let getters = properties.iter().enumerate().map(|(i, c)| {
        let ident = &c.ident;
        if c.enumeration {
            quote!(#i => ::stow::encode_enum(&self.#ident))
        } else {
            quote!(#i => ::stow::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
        }
    });
    let setters = properties.iter().enumerate().map(|(i, c)| {
        let ident = &c.ident;
        let ty = &c.ty;
        if c.enumeration {
            quote!(#i => self.#ident = ::stow::decode_enum::<#ty>(&value, options.enum_handling)?)
        } else {
            quote!(#i => self.#ident = ::stow::convert_value::<#ty>(value, options.conversion_type)?)
        }
    });
    let readers = properties.iter().enumerate().map(|(i, c)| {
        let ident = &c.ident;
        let ty = &c.ty;
        if c.enumeration {
            quote!(#ident: row.read_enum::<#ty>(#i)?)
        } else {
            quote!(#ident: row.read::<#ty>(#i)?)
        }
    });
    let ignored = table.columns.iter().filter(|c| c.ignore).map(|c| {
        let ident = &c.ident;
        quote!(#ident: ::std::default::Default::default())
    });
    quote! {
        impl ::stow::Entity for #name {
            fn table_name() -> &'static str {
                #table_name
            }

            fn properties() -> &'static [::stow::PropertyDef] {
                static RESULT: ::std::sync::LazyLock<Box<[::stow::PropertyDef]>> =
                    ::std::sync::LazyLock::new(|| vec![#(#defs),*].into_boxed_slice());
                &RESULT
            }

            fn property_value(&self, index: usize) -> ::stow::Value {
                match index {
                    #(#getters,)*
                    _ => ::stow::Value::Null,
                }
            }

            fn set_property_value(
                &mut self,
                index: usize,
                value: ::stow::Value,
                options: &::stow::GlobalConfigurationOptions,
            ) -> ::stow::Result<()> {
                match index {
                    #(#setters,)*
                    _ => {
                        return Err(::stow::Error::new(::stow::StowError::PropertyNotFound {
                            entity: ::std::any::type_name::<Self>().into(),
                            property: format!("#{index}"),
                        }));
                    }
                }
                Ok(())
            }

            fn from_row(row: &::stow::RowReader<'_>) -> ::stow::Result<Self> {
                Ok(Self {
                    #(#readers,)*
                    #(#ignored,)*
                })
            }
        }
    }
}
