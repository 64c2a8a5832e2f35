use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use buildco_domain::error::{DomainError, DomainResult};
use buildco_domain::ports::{EmailMessage, EmailSender};

/// 不真正发信：记录到 tracing 并保留副本，供测试断言
#[derive(Debug, Default)]
pub struct InMemoryEmailSender {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已发送的邮件；锁中毒时仍返回其中已记录的内容
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, message: EmailMessage) -> DomainResult<()> {
        tracing::info!(email.to = %message.to, email.subject = %message.subject, "email queued");
        self.outbox
            .lock()
            .map_err(|_| DomainError::Notification {
                reason: "outbox lock poisoned".to_string(),
            })?
            .push(message);
        Ok(())
    }
}
