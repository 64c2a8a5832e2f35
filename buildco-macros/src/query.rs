use crate::attr::MessageAttrConfig;
use crate::derive_utils::apply_derives;
use crate::field_utils::ensure_envelope_field;
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, parse_macro_input};

/// #[query] 宏实现
/// - 若缺失则在最前追加 `#[serde(skip)] pub envelope: QueryEnvelope`，
///   使序列化结果只包含查询自身参数（缓存键不受 id/时间戳影响）
/// - 合并派生 `Debug`, `serde::Serialize`
/// - 实现 `::buildco_application::query::Query`（NAME / Output / CACHE / envelope）
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[query] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let Some(name) = cfg.name else {
        return syn::Error::new(st.ident.span(), "#[query] requires `name = \"...\"`")
            .to_compile_error()
            .into();
    };

    let Some(output) = cfg.output else {
        return syn::Error::new(st.ident.span(), "#[query] requires `output = Type`")
            .to_compile_error()
            .into();
    };

    if let Some(names) = cfg.invalidates.as_ref() {
        let span = names.first().map(|n| n.span()).unwrap_or_else(|| st.ident.span());
        return syn::Error::new(span, "'invalidates' is only valid on #[command]")
            .to_compile_error()
            .into();
    }

    let cache_policy = match (cfg.ttl, cfg.cache) {
        (Some(ttl), None) => {
            quote! { ::buildco_application::query::CachePolicy::Ttl(#ttl) }
        }
        (None, Some(flag)) if !flag.value => {
            quote! { ::buildco_application::query::CachePolicy::Disabled }
        }
        (None, _) => quote! { ::buildco_application::query::CachePolicy::Default },
        (Some(ttl), Some(_)) => {
            return syn::Error::new(ttl.span(), "'ttl' and 'cache' are mutually exclusive")
                .to_compile_error()
                .into();
        }
    };

    let envelope_ty: syn::Type = syn::parse_quote! { ::buildco_application::envelope::QueryEnvelope };
    let skip: syn::Attribute = syn::parse_quote! { #[serde(skip)] };

    match &mut st.fields {
        syn::Fields::Named(fields_named) => {
            ensure_envelope_field(fields_named, &envelope_ty, &[skip])
        }
        _ => {
            return syn::Error::new(st.span(), "#[query] supports only named-field struct")
                .to_compile_error()
                .into();
        }
    }

    apply_derives(
        &mut st.attrs,
        vec![
            syn::parse_quote!(Debug),
            syn::parse_quote!(::serde::Serialize),
        ],
    );

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let out = quote! {
        #st

        impl #impl_generics ::buildco_application::query::Query for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
            const CACHE: ::buildco_application::query::CachePolicy = #cache_policy;
            type Output = #output;

            fn envelope(&self) -> &::buildco_application::envelope::QueryEnvelope {
                &self.envelope
            }
        }
    };

    TokenStream::from(out)
}
