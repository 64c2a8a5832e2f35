use crate::derive_utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[value_object] 宏实现
/// - 支持结构体（具名或 tuple）与枚举
/// - 合并/追加派生：Clone, (Debug 可控), Serialize, Deserialize, PartialEq, Eq
/// - 单字段 tuple 结构体额外生成 `value()` / `into_inner()` 访问器
/// - 参数：`#[value_object(debug = true|false)]`，默认 true
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as ValueObjectAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    let mut required: Vec<syn::Path> = vec![
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(Eq),
        syn::parse_quote!(::serde::Serialize),
        syn::parse_quote!(::serde::Deserialize),
    ];

    if cfg.derive_debug.unwrap_or(true) {
        required.insert(0, syn::parse_quote!(Debug));
    }

    match &mut input {
        Item::Struct(st) => {
            apply_derives(&mut st.attrs, required);

            let accessors = match &st.fields {
                syn::Fields::Unnamed(f) if f.unnamed.len() == 1 => {
                    let inner = &f.unnamed[0].ty;
                    let ident = &st.ident;
                    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();
                    quote! {
                        impl #impl_generics #ident #ty_generics #where_clause {
                            pub fn value(&self) -> &#inner {
                                &self.0
                            }

                            pub fn into_inner(self) -> #inner {
                                self.0
                            }
                        }
                    }
                }
                _ => quote! {},
            };

            TokenStream::from(quote! {
                #st
                #accessors
            })
        }
        Item::Enum(en) => {
            apply_derives(&mut en.attrs, required);
            TokenStream::from(quote! { #en })
        }
        other => syn::Error::new(other.span(), "#[value_object] only supports struct or enum")
            .to_compile_error()
            .into(),
    }
}

// -------- parsing --------

struct ValueObjectAttrConfig {
    derive_debug: Option<bool>,
}

impl Parse for ValueObjectAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut derive_debug: Option<bool> = None;

        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            if key != "debug" {
                return Err(syn::Error::new(
                    key.span(),
                    "unknown key in attribute; expected 'debug'",
                ));
            }
            let _eq: Token![=] = input.parse()?;
            let lit: syn::LitBool = input.parse()?;
            if derive_debug.replace(lit.value).is_some() {
                return Err(syn::Error::new(key.span(), "duplicate key 'debug' in attribute"));
            }

            if input.is_empty() {
                break;
            }
            let _comma: Token![,] = input.parse()?;
        }

        Ok(Self { derive_debug })
    }
}
