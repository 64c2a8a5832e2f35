use quote::ToTokens;
use syn::{Attribute, Field, FieldsNamed, Token, Type, punctuated::Punctuated};

pub(crate) const ENVELOPE: &str = "envelope";

fn attr_key(attr: &Attribute) -> String {
    attr.path().to_token_stream().to_string()
}

fn is_named(field: &Field, name: &str) -> bool {
    field.ident.as_ref().map(|i| i == name).unwrap_or(false)
}

/// 确保具名字段结构体包含 `envelope` 字段，并置于最前
/// - 缺失时新增 `pub envelope: <ty>`；
/// - 已存在时复用原定义（类型由用户负责），仅补齐 `extra_attrs` 中尚未出现的属性。
pub(crate) fn ensure_envelope_field(
    fields_named: &mut FieldsNamed,
    ty: &Type,
    extra_attrs: &[Attribute],
) {
    let old_named = fields_named.named.clone();
    let mut new_named: Punctuated<Field, Token![,]> = Punctuated::new();

    let mut envelope = match old_named.iter().find(|f| is_named(f, ENVELOPE)) {
        Some(existing) => existing.clone(),
        None => syn::parse_quote! { pub envelope: #ty },
    };

    for attr in extra_attrs {
        let key = attr_key(attr);
        if !envelope.attrs.iter().any(|a| attr_key(a) == key) {
            envelope.attrs.push(attr.clone());
        }
    }

    new_named.push(envelope);
    for f in old_named.into_iter().filter(|f| !is_named(f, ENVELOPE)) {
        new_named.push(f);
    }

    fields_named.named = new_named;
}
