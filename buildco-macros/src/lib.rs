//! buildco 过程宏
//!
//! - `#[command]`：为命令结构体注入 `envelope` 字段并实现 `Command`
//! - `#[query]`：为查询结构体注入（不参与序列化的）`envelope` 字段并实现 `Query`
//! - `#[value_object]`：为值对象合并常用派生
//!
use proc_macro::TokenStream;

mod attr;
mod command;
mod derive_utils;
mod field_utils;
mod query;
mod value_object;

/// 命令宏
///
/// ```ignore
/// #[command(name = "SubmitQuoteRequestCommand", output = QuoteId, invalidates = ["GetQuoteListQuery"])]
/// pub struct SubmitQuoteRequest {
///     pub customer_name: String,
/// }
/// ```
///
/// - `name` 必填，作为处理器注册与路由的稳定标识（不依赖 `type_name`）
/// - `output` 默认 `()`
/// - `invalidates` 列出命令成功后需要失效缓存的查询名称
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command::expand(attr, item)
}

/// 查询宏
///
/// ```ignore
/// #[query(name = "GetQuoteListQuery", output = QuoteListDto, ttl = 60)]
/// pub struct GetQuoteList {
///     pub status: Option<String>,
/// }
/// ```
///
/// - `name`、`output` 必填
/// - `ttl = <secs>` 指定缓存时长；`cache = false` 表示不缓存；均缺省时使用全局默认 TTL
#[proc_macro_attribute]
pub fn query(attr: TokenStream, item: TokenStream) -> TokenStream {
    query::expand(attr, item)
}

/// 值对象宏
#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    value_object::expand(attr, item)
}
