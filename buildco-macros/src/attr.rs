use syn::punctuated::Punctuated;
use syn::{Ident, LitBool, LitInt, LitStr, Result, Token, Type, bracketed, parse::Parse, parse::ParseStream};

/// `#[command(...)]` / `#[query(...)]` 共用的键值参数
///
/// 支持的键：
/// - `name = "..."`：类型的稳定名称（必填）
/// - `output = Type`：处理器返回类型（默认 `()`，查询需显式给出）
/// - `invalidates = ["QueryA", "QueryB"]`：仅命令可用
/// - `ttl = <secs>` / `cache = false`：仅查询可用，二者互斥
#[derive(Default)]
pub(crate) struct MessageAttrConfig {
    pub(crate) name: Option<LitStr>,
    pub(crate) output: Option<Type>,
    pub(crate) invalidates: Option<Vec<LitStr>>,
    pub(crate) ttl: Option<LitInt>,
    pub(crate) cache: Option<LitBool>,
}

impl Parse for MessageAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = MessageAttrConfig::default();

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            let _eq: Token![=] = input.parse()?;

            match key.to_string().as_str() {
                "name" => set_once(&mut cfg.name, &key, input.parse()?)?,
                "output" => set_once(&mut cfg.output, &key, input.parse()?)?,
                "ttl" => set_once(&mut cfg.ttl, &key, input.parse()?)?,
                "cache" => set_once(&mut cfg.cache, &key, input.parse()?)?,
                "invalidates" => {
                    let content;
                    bracketed!(content in input);
                    let names = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                    set_once(&mut cfg.invalidates, &key, names.into_iter().collect())?;
                }
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        "unknown key; expected 'name' | 'output' | 'invalidates' | 'ttl' | 'cache'",
                    ));
                }
            }

            if input.is_empty() {
                break;
            }
            let _comma: Token![,] = input.parse()?;
        }

        Ok(cfg)
    }
}

fn set_once<T>(slot: &mut Option<T>, key: &Ident, value: T) -> Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(
            key.span(),
            format!("duplicate key '{key}' in attribute"),
        ));
    }
    *slot = Some(value);
    Ok(())
}
