use serde::{Serialize, de::DeserializeOwned};

/// 数据传输对象（DTO）
///
/// - 作为查询的输出载体，面向接口/外部系统序列化友好；
/// - 需要可反序列化，以便在查询缓存中以 JSON 形式保存并还原；
/// - 与领域模型解耦，避免将领域对象直接暴露到接口层。
pub trait Dto: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Dto for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}
