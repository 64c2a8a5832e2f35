//! 写操作：命令定义与处理器
//!
mod job_application;
mod quote;

pub use job_application::{ResumeUpload, SubmitJobApplication, SubmitJobApplicationHandler};
pub use quote::{
    DeleteQuote, DeleteQuoteHandler, SetQuotePriority, SetQuotePriorityHandler,
    SubmitQuoteRequest, SubmitQuoteRequestHandler, UpdateQuoteStatus, UpdateQuoteStatusHandler,
};
