//! buildco 后台用例
//!
//! 报价申请与求职申请的命令、查询、校验器与进程内协作方，
//! 通过 `bootstrap::build_app` 组装为可直接分发的应用。
//!
pub mod bootstrap;
pub mod commands;
pub mod dto;
pub mod infra;
pub mod queries;
pub mod validators;

pub use bootstrap::{App, build_app};
