use crate::error::DomainResult;
use crate::value_object::EmailAddress;
use async_trait::async_trait;
use bon::Builder;
use serde::{Deserialize, Serialize};

/// 待发送的邮件
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: EmailAddress,
    #[builder(into)]
    pub subject: String,
    #[builder(into)]
    pub body: String,
}

/// 邮件发送
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> DomainResult<()>;
}
