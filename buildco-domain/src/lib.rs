//! buildco 领域层（buildco-domain）
//!
//! 提供建筑公司后台的领域模型与协作方接口：
//! - 报价申请（`quote`）与求职申请（`job_application`）实体
//! - 值对象（`value_object`）：邮箱、电话、服务类型、优先级
//! - 协作方端口（`ports`）：仓储、邮件、文件存储
//! - 领域层统一错误（`error`）
//!
//! 本 crate 不依赖任何存储或传输实现，处理器通过 `ports` 中的 trait 调用外部能力。
//!
pub mod entity;
pub mod error;
pub mod job_application;
pub mod ports;
pub mod quote;
pub mod value_object;
