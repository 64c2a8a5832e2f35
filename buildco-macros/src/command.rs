use crate::attr::MessageAttrConfig;
use crate::derive_utils::apply_derives;
use crate::field_utils::ensure_envelope_field;
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, parse_macro_input};

/// #[command] 宏实现
/// - 若缺失则在最前追加 `pub envelope: CommandEnvelope`
/// - 合并派生 `Debug`
/// - 实现 `::buildco_application::command::Command`（NAME / Output / INVALIDATES / envelope）
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[command] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let Some(name) = cfg.name else {
        return syn::Error::new(st.ident.span(), "#[command] requires `name = \"...\"`")
            .to_compile_error()
            .into();
    };

    if let Some(lit) = cfg.ttl.as_ref() {
        return syn::Error::new(lit.span(), "'ttl' is only valid on #[query]")
            .to_compile_error()
            .into();
    }
    if let Some(lit) = cfg.cache.as_ref() {
        return syn::Error::new(lit.span(), "'cache' is only valid on #[query]")
            .to_compile_error()
            .into();
    }

    let envelope_ty: syn::Type =
        syn::parse_quote! { ::buildco_application::envelope::CommandEnvelope };

    match &mut st.fields {
        syn::Fields::Named(fields_named) => ensure_envelope_field(fields_named, &envelope_ty, &[]),
        _ => {
            return syn::Error::new(st.span(), "#[command] supports only named-field struct")
                .to_compile_error()
                .into();
        }
    }

    apply_derives(&mut st.attrs, vec![syn::parse_quote!(Debug)]);

    let output = cfg.output.unwrap_or_else(|| syn::parse_quote! { () });
    let invalidates = cfg.invalidates.unwrap_or_default();

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let out = quote! {
        #st

        impl #impl_generics ::buildco_application::command::Command for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
            const INVALIDATES: &'static [&'static str] = &[#(#invalidates),*];
            type Output = #output;

            fn envelope(&self) -> &::buildco_application::envelope::CommandEnvelope {
                &self.envelope
            }
        }
    };

    TokenStream::from(out)
}
