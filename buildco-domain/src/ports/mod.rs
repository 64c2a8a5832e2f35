//! 协作方端口（ports）
//!
//! 定义处理器依赖的外部协作方接口：
//! - 实体仓储（`Repository`）：save / find_by_id / find_all / delete；
//! - 邮件通知（`EmailSender`）：发送确认或通知邮件；
//! - 文件存储（`FileStorage`）：上传 / 下载简历等附件。
//!
//! 本模块只描述协议，具体实现（数据库、SMTP、对象存储等）由上层提供并注入。
//!
mod file_storage;
mod notification;
mod repository;

pub use file_storage::{FileStorage, StoredFile};
pub use notification::{EmailMessage, EmailSender};
pub use repository::Repository;
